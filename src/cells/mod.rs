//! Typed cell editors and the value routing between columns and tasks.
//!
//! A cell never mutates a task. It produces a [`CellWrite`], which is either a
//! structured-field patch (primary columns) or a `text_values` upsert
//! (secondary columns), and the container applies it.

pub mod dropdown;
pub mod inline;
pub mod overlay;
pub mod person;
pub mod popover;
pub mod priority;
pub mod registry;
pub mod status;

use std::collections::BTreeMap;

use crossterm::event::KeyEvent;

use crate::board_utils::normalize_status;
use crate::codec::{CellValue, encode, parse_date};
use crate::theme::Swatch;
use crate::types::{Column, ColumnType, Draft, PrimaryField, Priority, Task, TaskPatch};

use overlay::{FlyoutSpec, Rect, Viewport};
use popover::{MenuItem, Popover, PopoverEvent};

/// Static text for cells that have nothing to show or must not be edited.
pub const PLACEHOLDER: &str = "—";

/// Identifies one cell on the board. `task_id == None` is the group's draft row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub group_id: String,
    pub task_id: Option<String>,
    pub column_id: String,
}

impl CellKey {
    pub fn task(group_id: &str, task_id: &str, column_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            task_id: Some(task_id.to_string()),
            column_id: column_id.to_string(),
        }
    }

    pub fn draft(group_id: &str, column_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            task_id: None,
            column_id: column_id.to_string(),
        }
    }

    pub fn is_draft(&self) -> bool {
        self.task_id.is_none()
    }
}

/// Coloured label shown in a closed flyout cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub label: String,
    pub swatch: Swatch,
    pub is_placeholder: bool,
}

/// The two mutation kinds a row dispatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellWrite {
    Task(TaskPatch),
    TextValue { column_id: String, value: String },
}

impl CellWrite {
    pub fn apply_to_task(&self, task: &Task) -> Task {
        match self {
            Self::Task(patch) => patch.apply_to(task),
            Self::TextValue { column_id, value } => {
                let mut next = task.clone();
                next.text_values.insert(column_id.clone(), value.clone());
                next
            }
        }
    }

    pub fn apply_to_draft(&self, draft: &mut Draft) {
        match self {
            Self::Task(patch) => draft.merge(patch.clone()),
            Self::TextValue { column_id, value } => {
                draft
                    .text_values
                    .get_or_insert_with(BTreeMap::new)
                    .insert(column_id.clone(), value.clone());
            }
        }
    }
}

/// Raw stored value behind a cell, `None` when unset.
pub fn read_raw(task: &Task, column: &Column) -> Option<String> {
    if column.column_type == ColumnType::Name {
        return Some(task.name.clone());
    }
    match column.primary_field() {
        Some(PrimaryField::Status) => Some(task.status.as_str().to_string()),
        Some(PrimaryField::Priority) => Some(task.priority.as_str().to_string()),
        Some(PrimaryField::Person) => task.person_id.clone(),
        Some(PrimaryField::DueDate) => task.due_date.clone(),
        None => task
            .text_value(&column.id)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
    }
}

/// Raw value of a cell in the draft row.
pub fn read_draft_raw(draft: Option<&Draft>, column: &Column) -> Option<String> {
    let draft = draft?;
    if column.column_type == ColumnType::Name {
        return draft.name.clone().filter(|name| !name.is_empty());
    }
    match column.primary_field() {
        Some(PrimaryField::Status) => draft.status.map(|status| status.as_str().to_string()),
        Some(PrimaryField::Priority) => draft.priority.map(|priority| priority.as_str().to_string()),
        Some(PrimaryField::Person) => draft.person_id.clone().flatten(),
        Some(PrimaryField::DueDate) => draft.due_date.clone().flatten(),
        None => draft
            .text_values
            .as_ref()
            .and_then(|values| values.get(&column.id))
            .filter(|value| !value.is_empty())
            .cloned(),
    }
}

/// Routes a new value for `column` to the structured field or `text_values`.
/// `None` clears the cell.
pub fn write_cell(column: &Column, value: Option<&CellValue>) -> CellWrite {
    if column.column_type == ColumnType::Name {
        let name = value.map(encode).unwrap_or_default();
        return CellWrite::Task(TaskPatch::name(name));
    }

    let encoded = value.map(encode);
    match column.primary_field() {
        Some(PrimaryField::Status) => {
            let status = match value {
                Some(CellValue::Status(status)) => *status,
                _ => normalize_status(encoded.as_deref()),
            };
            CellWrite::Task(TaskPatch::status(status))
        }
        Some(PrimaryField::Priority) => {
            let priority = match value {
                Some(CellValue::Priority(priority)) => *priority,
                _ => encoded
                    .as_deref()
                    .and_then(|raw| raw.parse::<Priority>().ok())
                    .unwrap_or_default(),
            };
            CellWrite::Task(TaskPatch::priority(priority))
        }
        Some(PrimaryField::Person) => CellWrite::Task(TaskPatch::person(
            encoded.filter(|id| !id.trim().is_empty()),
        )),
        Some(PrimaryField::DueDate) => CellWrite::Task(TaskPatch::due_date(
            encoded
                .as_deref()
                .and_then(parse_date)
                .map(|date| date.format("%Y-%m-%d").to_string()),
        )),
        None => CellWrite::TextValue {
            column_id: column.id.clone(),
            value: encoded.unwrap_or_default(),
        },
    }
}

/// A flyout cell: current value plus its menu state machine.
#[derive(Debug, Clone)]
pub struct QuickCell<T> {
    value: Option<T>,
    popover: Popover<T>,
}

impl<T: Clone + PartialEq> QuickCell<T> {
    pub fn new(value: Option<T>, items: Vec<MenuItem<T>>, spec: FlyoutSpec) -> Self {
        Self {
            value,
            popover: Popover::new(items, spec),
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn popover(&self) -> &Popover<T> {
        &self.popover
    }

    pub fn popover_mut(&mut self) -> &mut Popover<T> {
        &mut self.popover
    }

    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    pub fn toggle(&mut self, trigger: Rect, viewport: Viewport) -> PopoverEvent<T> {
        let current = self.value.clone();
        self.popover.toggle(trigger, viewport, current.as_ref())
    }

    pub fn select(&mut self, index: usize) -> PopoverEvent<T> {
        let event = self.popover.select(index);
        self.remember(event)
    }

    pub fn select_value(&mut self, value: &T) -> PopoverEvent<T> {
        match self
            .popover
            .items()
            .iter()
            .position(|item| &item.value == value)
        {
            Some(index) => self.select(index),
            None => PopoverEvent::Ignored,
        }
    }

    pub fn dismiss(&mut self) -> PopoverEvent<T> {
        self.popover.dismiss()
    }

    pub fn handle_key(&mut self, key: KeyEvent, trigger: Rect, viewport: Viewport) -> PopoverEvent<T> {
        let current = self.value.clone();
        let event = self
            .popover
            .handle_key(key, trigger, viewport, current.as_ref());
        self.remember(event)
    }

    fn remember(&mut self, event: PopoverEvent<T>) -> PopoverEvent<T> {
        if let PopoverEvent::Committed(value) = &event {
            self.value = Some(value.clone());
        }
        event
    }
}
