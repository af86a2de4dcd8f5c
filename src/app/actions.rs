//! Board transformations. Each takes the current board and returns the next
//! one; the input is never modified.

use tracing::debug;
use uuid::Uuid;

use crate::error::{BoardError, Result};
use crate::theme::group_color;
use crate::types::{
    Board, Column, ColumnType, DEFAULT_COLUMN_WIDTH, DropdownOption, Draft, Group, Subtask, Task,
    TaskPatch, default_columns,
};
use crate::ui::RowEvent;

pub const NEW_GROUP_TITLE: &str = "New Group";
pub const NEW_COLUMN_TITLE: &str = "New Column";
const COPY_SUFFIX: &str = " (Copy)";

/// Which groups a bulk selection toggle touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionScope {
    Group(String),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnEdge {
    Start,
    End,
}

/// Everything `add_column` needs besides the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewColumn {
    pub column_type: ColumnType,
    pub title: String,
    pub width: u32,
    pub options: Vec<DropdownOption>,
    pub currency: Option<String>,
}

impl NewColumn {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            title: NEW_COLUMN_TITLE.to_string(),
            width: DEFAULT_COLUMN_WIDTH,
            options: Vec::new(),
            currency: None,
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// `col_` plus four hex digits, unique within `group`.
fn new_column_id(group: &Group) -> String {
    loop {
        let simple = Uuid::new_v4().simple().to_string();
        let id = format!("col_{}", &simple[..4]);
        if group.column(&id).is_none() {
            return id;
        }
    }
}

fn group_mut<'a>(board: &'a mut Board, group_id: &str) -> Result<&'a mut Group> {
    board
        .groups
        .iter_mut()
        .find(|group| group.id == group_id)
        .ok_or_else(|| BoardError::group(group_id))
}

fn task_mut<'a>(group: &'a mut Group, task_id: &str) -> Result<&'a mut Task> {
    group
        .tasks
        .iter_mut()
        .find(|task| task.id == task_id)
        .ok_or_else(|| BoardError::task(task_id))
}

fn column_index(group: &Group, column_id: &str) -> Result<usize> {
    group
        .columns
        .iter()
        .position(|column| column.id == column_id)
        .ok_or_else(|| BoardError::column(column_id))
}

fn edit_group(board: &Board, group_id: &str, edit: impl FnOnce(&mut Group) -> Result<()>) -> Result<Board> {
    let mut next = board.clone();
    edit(group_mut(&mut next, group_id)?)?;
    Ok(next)
}

fn edit_task(
    board: &Board,
    group_id: &str,
    task_id: &str,
    edit: impl FnOnce(&mut Task) -> Result<()>,
) -> Result<Board> {
    edit_group(board, group_id, |group| edit(task_mut(group, task_id)?))
}

fn non_empty(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(BoardError::EmptyName { field })
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn new_group(title: &str, color: &str) -> Group {
    Group {
        id: new_id(),
        title: title.to_string(),
        color: color.to_string(),
        columns: default_columns(),
        tasks: Vec::new(),
        is_pinned: false,
    }
}

/// Appends a group with the default columns; colours cycle the palette.
pub fn add_group(board: &Board, title: Option<&str>) -> Board {
    let mut next = board.clone();
    let title = title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(NEW_GROUP_TITLE);
    next.groups
        .push(new_group(title, group_color(board.groups.len())));
    next
}

pub fn delete_group(board: &Board, group_id: &str) -> Result<Board> {
    if board.group(group_id).is_none() {
        return Err(BoardError::group(group_id));
    }
    let mut next = board.clone();
    next.groups.retain(|group| group.id != group_id);
    Ok(next)
}

/// Titles are not required to be unique.
pub fn rename_group(board: &Board, group_id: &str, title: &str) -> Result<Board> {
    edit_group(board, group_id, |group| {
        group.title = title.to_string();
        Ok(())
    })
}

pub fn toggle_group_pin(board: &Board, group_id: &str) -> Result<Board> {
    edit_group(board, group_id, |group| {
        group.is_pinned = !group.is_pinned;
        Ok(())
    })
}

pub fn add_column(board: &Board, group_id: &str, spec: NewColumn) -> Result<Board> {
    edit_group(board, group_id, |group| {
        let mut column = Column::new(new_column_id(group), spec.title, spec.column_type, spec.width);
        column.config.options = spec.options;
        column.config.currency = spec.currency;
        group.columns.push(column);
        Ok(())
    })
}

pub fn rename_column(board: &Board, group_id: &str, column_id: &str, title: &str) -> Result<Board> {
    edit_group(board, group_id, |group| {
        let index = column_index(group, column_id)?;
        group.columns[index].title = title.to_string();
        Ok(())
    })
}

/// Sets a column width, never below `min_width`.
pub fn resize_column(
    board: &Board,
    group_id: &str,
    column_id: &str,
    width: u32,
    min_width: u32,
) -> Result<Board> {
    edit_group(board, group_id, |group| {
        let index = column_index(group, column_id)?;
        group.columns[index].width = width.max(min_width);
        Ok(())
    })
}

/// Removes a column. The name column is protected. Stored values under the
/// column id are left on the tasks.
pub fn delete_column(board: &Board, group_id: &str, column_id: &str) -> Result<Board> {
    edit_group(board, group_id, |group| {
        let index = column_index(group, column_id)?;
        if group.columns[index].column_type == ColumnType::Name {
            return Err(BoardError::ProtectedColumn {
                id: column_id.to_string(),
            });
        }
        group.columns.remove(index);
        Ok(())
    })
}

/// Inserts a copy right after the source with a fresh id.
pub fn duplicate_column(board: &Board, group_id: &str, column_id: &str) -> Result<Board> {
    edit_group(board, group_id, |group| {
        let index = column_index(group, column_id)?;
        let source = &group.columns[index];
        if source.column_type == ColumnType::Name {
            return Err(BoardError::ProtectedColumn {
                id: column_id.to_string(),
            });
        }
        let mut copy = source.clone();
        copy.id = new_column_id(group);
        copy.title = format!("{}{COPY_SUFFIX}", source.title);
        group.columns.insert(index + 1, copy);
        Ok(())
    })
}

/// Moves a column to the first slot after the name column, or to the end.
pub fn move_column_to(board: &Board, group_id: &str, column_id: &str, edge: ColumnEdge) -> Result<Board> {
    let group = board.group(group_id).ok_or_else(|| BoardError::group(group_id))?;
    let from = column_index(group, column_id)?;
    let to = match edge {
        ColumnEdge::Start => 1,
        ColumnEdge::End => group.columns.len() - 1,
    };
    if from == to {
        debug!(group_id, column_id, "column already at requested edge");
        return Ok(board.clone());
    }
    reorder_column(board, group_id, from, to)
}

/// Array move within one group's columns. Neither end may be the name slot.
pub fn reorder_column(board: &Board, group_id: &str, from: usize, to: usize) -> Result<Board> {
    edit_group(board, group_id, |group| {
        let len = group.columns.len();
        if from == 0 || to == 0 || from >= len || to >= len {
            return Err(BoardError::InvalidColumnMove { from, to });
        }
        let column = group.columns.remove(from);
        group.columns.insert(to, column);
        Ok(())
    })
}

/// Builds a task from the draft and appends it with `order = tasks.len()`.
///
/// Draft values override the defaults (New, Normal, no person, no date);
/// the name is trimmed and must not be empty.
pub fn add_task(board: &Board, group_id: &str, name: &str, draft: Option<&Draft>) -> Result<Board> {
    let name = non_empty(name, "task name")?;
    edit_group(board, group_id, |group| {
        let mut task = Task::new(new_id(), name.as_str());
        if let Some(draft) = draft {
            task = draft.apply_to(&task);
            task.name = name.clone();
        }
        task.order = group.tasks.len() as i64;
        task.selected = false;
        group.tasks.push(task);
        Ok(())
    })
}

/// Merge patch; applying the same patch twice equals applying it once.
pub fn update_task(board: &Board, group_id: &str, task_id: &str, patch: &TaskPatch) -> Result<Board> {
    edit_task(board, group_id, task_id, |task| {
        *task = patch.apply_to(task);
        Ok(())
    })
}

pub fn update_task_text_value(
    board: &Board,
    group_id: &str,
    task_id: &str,
    column_id: &str,
    value: &str,
) -> Result<Board> {
    edit_task(board, group_id, task_id, |task| {
        task.text_values
            .insert(column_id.to_string(), value.to_string());
        Ok(())
    })
}

pub fn apply_row_event(board: &Board, event: &RowEvent) -> Result<Board> {
    match event {
        RowEvent::UpdateTask {
            group_id,
            task_id,
            patch,
        } => update_task(board, group_id, task_id, patch),
        RowEvent::UpdateTextValue {
            group_id,
            task_id,
            column_id,
            value,
        } => update_task_text_value(board, group_id, task_id, column_id, value),
    }
}

pub fn delete_task(board: &Board, group_id: &str, task_id: &str) -> Result<Board> {
    edit_group(board, group_id, |group| {
        let before = group.tasks.len();
        group.tasks.retain(|task| task.id != task_id);
        if group.tasks.len() == before {
            return Err(BoardError::task(task_id));
        }
        Ok(())
    })
}

pub fn set_task_selected(board: &Board, group_id: &str, task_id: &str, selected: bool) -> Result<Board> {
    edit_task(board, group_id, task_id, |task| {
        task.selected = selected;
        Ok(())
    })
}

pub fn set_group_selected(board: &Board, scope: &SelectionScope, selected: bool) -> Result<Board> {
    if let SelectionScope::Group(group_id) = scope
        && board.group(group_id).is_none()
    {
        return Err(BoardError::group(group_id));
    }
    let mut next = board.clone();
    for group in &mut next.groups {
        if matches!(scope, SelectionScope::Group(id) if *id != group.id) {
            continue;
        }
        for task in &mut group.tasks {
            task.selected = selected;
        }
    }
    Ok(next)
}

pub fn selected_count(board: &Board) -> usize {
    board
        .groups
        .iter()
        .flat_map(|group| &group.tasks)
        .filter(|task| task.selected)
        .count()
}

pub fn delete_selected_tasks(board: &Board) -> Board {
    let mut next = board.clone();
    for group in &mut next.groups {
        group.tasks.retain(|task| !task.selected);
    }
    next
}

/// Appends a selected copy of every selected task to its own group.
pub fn duplicate_selected_tasks(board: &Board) -> Board {
    let mut next = board.clone();
    for group in &mut next.groups {
        let copies: Vec<Task> = group
            .tasks
            .iter()
            .filter(|task| task.selected)
            .enumerate()
            .map(|(offset, task)| Task {
                id: new_id(),
                name: format!("{}{COPY_SUFFIX}", task.name),
                order: (group.tasks.len() + offset) as i64,
                ..task.clone()
            })
            .collect();
        group.tasks.extend(copies);
    }
    next
}

pub fn add_subtask(board: &Board, group_id: &str, task_id: &str, name: &str) -> Result<Board> {
    let name = non_empty(name, "subtask name")?;
    edit_task(board, group_id, task_id, |task| {
        task.subtasks.push(Subtask {
            id: new_id(),
            name,
            status: Default::default(),
        });
        Ok(())
    })
}

pub fn rename_subtask(
    board: &Board,
    group_id: &str,
    task_id: &str,
    subtask_id: &str,
    name: &str,
) -> Result<Board> {
    edit_task(board, group_id, task_id, |task| {
        let subtask = task
            .subtasks
            .iter_mut()
            .find(|subtask| subtask.id == subtask_id)
            .ok_or_else(|| BoardError::SubtaskNotFound {
                id: subtask_id.to_string(),
            })?;
        subtask.name = name.to_string();
        Ok(())
    })
}
