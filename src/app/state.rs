//! Transient view state kept beside the board: per-group drafts, subtask
//! composer inputs, expansion and collapse sets, the resize session and the
//! column context menu. None of it is persisted.

use std::collections::{HashMap, HashSet};

use crate::cells::CellKey;
use crate::cells::overlay::{FlyoutSpec, Rect, Viewport};
use crate::cells::popover::{MenuItem, Popover, PopoverEvent};
use crate::types::{ColumnType, Draft};

/// Header resize in progress, captured on mouse down.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub group_id: String,
    pub column_id: String,
    pub start_x: f64,
    pub start_width: u32,
}

impl ResizeSession {
    /// Width for a pointer at `x`, never below `min_width`.
    pub fn width_at(&self, x: f64, min_width: u32) -> u32 {
        let width = (f64::from(self.start_width) + (x - self.start_x)).round();
        if width <= f64::from(min_width) {
            min_width
        } else {
            width as u32
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ColumnMenuAction {
    Add(ColumnType),
    Duplicate,
    MoveToStart,
    MoveToEnd,
    Delete,
}

pub fn column_type_label(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Name => "Item",
        ColumnType::Status => "Status",
        ColumnType::Priority => "Priority",
        ColumnType::Person => "People",
        ColumnType::Date => "Date",
        ColumnType::Text => "Text",
        ColumnType::LongText => "Long Text",
        ColumnType::Number => "Numbers",
        ColumnType::Money => "Money",
        ColumnType::Checkbox => "Checkbox",
        ColumnType::Dropdown => "Dropdown",
        ColumnType::Rating => "Rating",
        ColumnType::ProgressManual => "Progress",
        ColumnType::Button => "Button",
        ColumnType::Connection => "Connect Boards",
    }
}

/// Every type a user can add; a group has exactly one name column.
pub fn add_column_items() -> Vec<MenuItem<ColumnMenuAction>> {
    ColumnType::ALL
        .into_iter()
        .filter(|column_type| *column_type != ColumnType::Name)
        .map(|column_type| MenuItem::new(ColumnMenuAction::Add(column_type), column_type_label(column_type)))
        .collect()
}

/// Per-column actions. The name column gets none.
pub fn column_option_items(index: usize) -> Vec<MenuItem<ColumnMenuAction>> {
    if index == 0 {
        return Vec::new();
    }
    vec![
        MenuItem::new(ColumnMenuAction::Duplicate, "Duplicate column"),
        MenuItem::new(ColumnMenuAction::MoveToStart, "Move to start"),
        MenuItem::new(ColumnMenuAction::MoveToEnd, "Move to end"),
        MenuItem::new(ColumnMenuAction::Delete, "Delete column"),
    ]
}

/// Context menu anchored to a header: the add-column button when
/// `column_id` is `None`, a column's options otherwise.
#[derive(Debug, Clone)]
pub struct ColumnMenu {
    pub group_id: String,
    pub column_id: Option<String>,
    pub trigger: Rect,
    popover: Popover<ColumnMenuAction>,
}

impl ColumnMenu {
    pub fn open(
        group_id: &str,
        column_id: Option<&str>,
        items: Vec<MenuItem<ColumnMenuAction>>,
        trigger: Rect,
        viewport: Viewport,
    ) -> Self {
        let mut popover = Popover::new(items, FlyoutSpec::CONTEXT_MENU);
        popover.open(trigger, viewport, None);
        Self {
            group_id: group_id.to_string(),
            column_id: column_id.map(str::to_string),
            trigger,
            popover,
        }
    }

    pub fn popover(&self) -> &Popover<ColumnMenuAction> {
        &self.popover
    }

    pub fn popover_mut(&mut self) -> &mut Popover<ColumnMenuAction> {
        &mut self.popover
    }

    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.trigger.contains(x, y)
            || self
                .popover
                .menu_rect()
                .is_some_and(|rect| rect.contains(x, y))
    }

    pub fn pick(&mut self, index: usize) -> Option<ColumnMenuAction> {
        match self.popover.select(index) {
            PopoverEvent::Committed(action) => Some(action),
            _ => None,
        }
    }
}

/// What keyboard input is aimed at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    None,
    Cell(CellKey),
    Row {
        group_id: String,
        task_id: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct BoardUiState {
    /// Draft row per group id.
    pub drafts: HashMap<String, Draft>,
    /// Composer text per parent task id.
    pub subtask_inputs: HashMap<String, String>,
    /// Task ids whose subtasks are shown.
    pub expanded: HashSet<String>,
    /// Group ids rendered as chrome only.
    pub collapsed: HashSet<String>,
    pub resizing: Option<ResizeSession>,
    pub column_menu: Option<ColumnMenu>,
}

impl BoardUiState {
    pub fn draft(&self, group_id: &str) -> Option<&Draft> {
        self.drafts.get(group_id)
    }

    pub fn draft_mut(&mut self, group_id: &str) -> &mut Draft {
        self.drafts.entry(group_id.to_string()).or_default()
    }

    pub fn clear_draft(&mut self, group_id: &str) {
        self.drafts.remove(group_id);
    }

    pub fn subtask_input(&self, task_id: &str) -> &str {
        self.subtask_inputs
            .get(task_id)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn set_subtask_input(&mut self, task_id: &str, text: &str) {
        self.subtask_inputs
            .insert(task_id.to_string(), text.to_string());
    }

    pub fn clear_subtask_input(&mut self, task_id: &str) {
        self.subtask_inputs.remove(task_id);
    }

    pub fn toggle_expanded(&mut self, task_id: &str) -> bool {
        toggle(&mut self.expanded, task_id)
    }

    pub fn toggle_collapsed(&mut self, group_id: &str) -> bool {
        toggle(&mut self.collapsed, group_id)
    }

    pub fn is_collapsed(&self, group_id: &str) -> bool {
        self.collapsed.contains(group_id)
    }

    pub fn forget_task(&mut self, task_id: &str) {
        self.expanded.remove(task_id);
        self.subtask_inputs.remove(task_id);
    }

    pub fn forget_group(&mut self, group_id: &str) {
        self.drafts.remove(group_id);
        self.collapsed.remove(group_id);
        if self
            .resizing
            .as_ref()
            .is_some_and(|session| session.group_id == group_id)
        {
            self.resizing = None;
        }
        if self
            .column_menu
            .as_ref()
            .is_some_and(|menu| menu.group_id == group_id)
        {
            self.column_menu = None;
        }
    }
}

/// Returns whether `id` is in the set afterwards.
fn toggle(set: &mut HashSet<String>, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}
