use crate::theme::Theme;
use crate::types::Priority;

use super::overlay::FlyoutSpec;
use super::popover::MenuItem;
use super::{Chip, QuickCell};

pub type PriorityCell = QuickCell<Priority>;

pub fn priority_items() -> Vec<MenuItem<Priority>> {
    Priority::ALL
        .into_iter()
        .map(|priority| MenuItem::new(priority, priority.as_str()))
        .collect()
}

pub fn priority_cell(value: Priority) -> PriorityCell {
    QuickCell::new(Some(value), priority_items(), FlyoutSpec::PRIORITY)
}

/// Unset priorities read as `Normal`.
pub fn priority_chip(value: Option<Priority>, theme: &Theme) -> Chip {
    let priority = value.unwrap_or_default();
    Chip {
        label: priority.as_str().to_string(),
        swatch: theme.priority(priority),
        is_placeholder: false,
    }
}
