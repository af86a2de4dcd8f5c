use crossterm::event::KeyEvent;

use crate::cells::CellKey;
use crate::cells::inline::InlineEdit;
use crate::cells::overlay::Rect;
use crate::matching::{SortMode, StatusFilter};

use super::actions::{ColumnEdge, NewColumn, SelectionScope};
use super::row_drag::DropTarget;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Key(KeyEvent),
    Resize(f64, f64),
    Click { x: f64, y: f64 },
    RightClick { x: f64, y: f64 },

    // Cells
    FocusCell(CellKey),
    FocusRow { group_id: String, task_id: String },
    ToggleCell { key: CellKey, trigger: Rect },
    PickOption { key: CellKey, index: usize },
    DismissCell(CellKey),
    DropdownSearch { key: CellKey, search: String },
    InlineEdit { key: CellKey, edit: InlineEdit },

    // Selection
    ToggleTaskSelected { group_id: String, task_id: String },
    ToggleGroupSelected(SelectionScope),
    DeleteSelected,
    DuplicateSelected,

    // Tasks and subtasks
    AddTask(String),
    DeleteTask { group_id: String, task_id: String },
    ToggleExpand(String),
    SubtaskInput { task_id: String, text: String },
    AddSubtask { group_id: String, task_id: String },
    CancelSubtask(String),
    RenameSubtask {
        group_id: String,
        task_id: String,
        subtask_id: String,
        name: String,
    },

    // Groups
    AddGroup,
    DeleteGroup(String),
    RenameGroup { group_id: String, title: String },
    TogglePin(String),
    ToggleCollapse(String),

    // Columns
    AddColumn { group_id: String, column: NewColumn },
    RenameColumn {
        group_id: String,
        column_id: String,
        title: String,
    },
    DeleteColumn { group_id: String, column_id: String },
    DuplicateColumn { group_id: String, column_id: String },
    MoveColumnTo {
        group_id: String,
        column_id: String,
        edge: ColumnEdge,
    },
    OpenColumnMenu {
        group_id: String,
        column_id: Option<String>,
        trigger: Rect,
    },
    PickColumnMenu(usize),
    DismissColumnMenu,
    ResizeStart {
        group_id: String,
        column_id: String,
        x: f64,
    },
    ResizeMove { x: f64 },
    ResizeEnd,
    ColumnDragStart {
        group_id: String,
        column_id: String,
        index: usize,
    },
    ColumnDrop { group_id: String, index: usize },
    ColumnDragEnd,

    // Row drag
    RowPointerDown {
        group_id: String,
        task_id: String,
        x: f64,
        y: f64,
    },
    RowPointerMove {
        x: f64,
        y: f64,
        over: Option<DropTarget>,
    },
    RowPointerUp,
    RowDragCancel,

    // Filtering
    SetQuery(String),
    SetStatusFilter(StatusFilter),
    SetSort(SortMode),

    Save,
}
