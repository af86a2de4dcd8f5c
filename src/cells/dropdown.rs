use crate::types::DropdownOption;

use super::QuickCell;
use super::overlay::{FlyoutSpec, Rect, Viewport};
use super::popover::{MenuItem, PopoverEvent};

/// Option picker with a search box over the column's configured options.
#[derive(Debug, Clone)]
pub struct DropdownCell {
    options: Vec<DropdownOption>,
    search: String,
    inner: QuickCell<String>,
}

impl DropdownCell {
    pub fn new(value: Option<&str>, options: Vec<DropdownOption>) -> Self {
        let items = filter_options(&options, "");
        Self {
            options,
            search: String::new(),
            inner: QuickCell::new(value.map(str::to_string), items, FlyoutSpec::DROPDOWN),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.inner.value().map(String::as_str)
    }

    pub fn selected_option(&self) -> Option<&DropdownOption> {
        let value = self.value()?;
        self.options.iter().find(|option| option.id == value)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn visible_items(&self) -> &[MenuItem<String>] {
        self.inner.popover().items()
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
        let items = filter_options(&self.options, &self.search);
        self.inner.popover_mut().set_items(items);
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    pub fn cell(&self) -> &QuickCell<String> {
        &self.inner
    }

    pub fn cell_mut(&mut self) -> &mut QuickCell<String> {
        &mut self.inner
    }

    /// Opening always starts from an empty search.
    pub fn toggle(&mut self, trigger: Rect, viewport: Viewport) -> PopoverEvent<String> {
        if !self.inner.is_open() {
            self.set_search("");
        }
        self.inner.toggle(trigger, viewport)
    }

    pub fn select(&mut self, index: usize) -> PopoverEvent<String> {
        self.inner.select(index)
    }
}

/// Case-insensitive substring match on option labels.
pub fn filter_options(options: &[DropdownOption], search: &str) -> Vec<MenuItem<String>> {
    let needle = search.trim().to_lowercase();
    options
        .iter()
        .filter(|option| needle.is_empty() || option.label.to_lowercase().contains(&needle))
        .map(|option| MenuItem::new(option.id.clone(), option.label.clone()))
        .collect()
}
