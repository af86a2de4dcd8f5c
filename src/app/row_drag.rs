//! Pointer and keyboard sortable rows, plus the cross-group drop contract.
//!
//! A session never edits the board while it is live. The board only changes
//! when `finish` resolves a drop, so cancelling at any point leaves the
//! pre-drag groups untouched.

use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::board_utils::resolve_task_status;
use crate::error::{BoardError, Result};
use crate::types::{Board, Group, PrimaryField, Status, Task};
use crate::ui::task_row::Translate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOrigin {
    pub group_id: String,
    pub task_id: String,
    pub index: usize,
}

/// Where the row would land: an index in the target group's task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub group_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    /// Pointer is down but has not travelled far enough to count as a drag.
    Pending,
    Dragging,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DragKeyOutcome {
    Continue,
    Drop,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowDrag {
    origin: DragOrigin,
    phase: DragPhase,
    start: (f64, f64),
    pointer: (f64, f64),
    activation_distance: f64,
    target: Option<DropTarget>,
}

impl RowDrag {
    pub fn pointer_down(origin: DragOrigin, x: f64, y: f64, activation_distance: f64) -> Self {
        Self {
            origin,
            phase: DragPhase::Pending,
            start: (x, y),
            pointer: (x, y),
            activation_distance,
            target: None,
        }
    }

    /// Space on a focused row: active at once, aimed at its own slot.
    pub fn keyboard_pickup(origin: DragOrigin) -> Self {
        let target = DropTarget {
            group_id: origin.group_id.clone(),
            index: origin.index,
        };
        Self {
            origin,
            phase: DragPhase::Dragging,
            start: (0.0, 0.0),
            pointer: (0.0, 0.0),
            activation_distance: 0.0,
            target: Some(target),
        }
    }

    pub fn origin(&self) -> &DragOrigin {
        &self.origin
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    pub fn target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    pub fn offset(&self) -> Translate {
        Translate {
            x: self.pointer.0 - self.start.0,
            y: self.pointer.1 - self.start.1,
        }
    }

    /// Returns true on the move that activates the drag.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.pointer = (x, y);
        if self.phase == DragPhase::Dragging {
            return false;
        }
        let (dx, dy) = (x - self.start.0, y - self.start.1);
        if dx.hypot(dy) >= self.activation_distance {
            self.phase = DragPhase::Dragging;
            return true;
        }
        false
    }

    /// Pointer is over a row slot, or over nothing droppable.
    pub fn hover(&mut self, target: Option<DropTarget>) {
        if self.is_active() {
            self.target = target;
        }
    }

    /// Up/Down move the keyboard target within its group, Space/Enter drop,
    /// Esc cancels.
    pub fn handle_key(&mut self, key: KeyEvent, board: &Board) -> DragKeyOutcome {
        match key.code {
            KeyCode::Esc => DragKeyOutcome::Cancel,
            KeyCode::Char(' ') | KeyCode::Enter if self.is_active() => DragKeyOutcome::Drop,
            KeyCode::Up => {
                self.step_target(-1, board);
                DragKeyOutcome::Continue
            }
            KeyCode::Down => {
                self.step_target(1, board);
                DragKeyOutcome::Continue
            }
            _ => DragKeyOutcome::Continue,
        }
    }

    fn step_target(&mut self, delta: isize, board: &Board) {
        let Some(target) = self.target.as_mut() else {
            return;
        };
        let Some(group) = board.group(&target.group_id) else {
            return;
        };
        let last = group.tasks.len().saturating_sub(1) as isize;
        target.index = (target.index as isize + delta).clamp(0, last.max(0)) as usize;
    }

    /// Resolves the drop. `Ok(None)` when the pointer never activated, the
    /// release was outside every row, or the row landed where it started.
    pub fn finish(self, board: &Board) -> Result<Option<Board>> {
        if self.phase != DragPhase::Dragging {
            return Ok(None);
        }
        let Some(target) = self.target else {
            debug!(task_id = %self.origin.task_id, "row released outside any drop target");
            return Ok(None);
        };
        if target.group_id == self.origin.group_id && target.index == self.origin.index {
            return Ok(None);
        }
        move_task(
            board,
            &self.origin.group_id,
            &self.origin.task_id,
            &target.group_id,
            target.index,
        )
        .map(Some)
    }
}

fn renumber(group: &mut Group) {
    for (index, task) in group.tasks.iter_mut().enumerate() {
        task.order = index as i64;
    }
}

/// Same group: array move to `to_index`. Other group: remove from the
/// source and insert at `to_index` (clamped) in the destination. Orders are
/// renumbered in every touched group.
pub fn move_task(
    board: &Board,
    from_group_id: &str,
    task_id: &str,
    to_group_id: &str,
    to_index: usize,
) -> Result<Board> {
    let source = board
        .group(from_group_id)
        .ok_or_else(|| BoardError::group(from_group_id))?;
    let destination = board
        .group(to_group_id)
        .ok_or_else(|| BoardError::group(to_group_id))?;
    let from_index = source
        .tasks
        .iter()
        .position(|task| task.id == task_id)
        .ok_or_else(|| BoardError::task(task_id))?;

    let mut next = board.clone();
    if from_group_id == to_group_id {
        let Some(group) = next.groups.iter_mut().find(|group| group.id == from_group_id) else {
            return Err(BoardError::group(from_group_id));
        };
        let task = group.tasks.remove(from_index);
        let to_index = to_index.min(group.tasks.len());
        group.tasks.insert(to_index, task);
        renumber(group);
        return Ok(next);
    }

    let mut task = source.tasks[from_index].clone();
    if status_schema(source) != status_schema(destination) {
        let status = resolve_task_status(source, &task);
        write_status(destination, &mut task, status);
    }

    for group in &mut next.groups {
        if group.id == from_group_id {
            group.tasks.remove(from_index);
            renumber(group);
        } else if group.id == to_group_id {
            let to_index = to_index.min(group.tasks.len());
            group.tasks.insert(to_index, task.clone());
            renumber(group);
        }
    }
    Ok(next)
}

/// Identity of a group's status column as far as storage is concerned.
fn status_schema(group: &Group) -> Option<(&str, bool)> {
    group.status_column().map(|column| {
        (
            column.id.as_str(),
            column.primary_field() == Some(PrimaryField::Status),
        )
    })
}

/// Stores `status` where `group` reads it from.
fn write_status(group: &Group, task: &mut Task, status: Status) {
    match group.status_column() {
        Some(column) if column.primary_field() != Some(PrimaryField::Status) => {
            task.text_values
                .insert(column.id.clone(), status.as_str().to_string());
        }
        _ => task.status = status,
    }
}
