//! Status normalization, per-task status resolution and weighted progress.

use serde::Serialize;

use crate::types::{Group, PrimaryField, Status, Subtask, Task};

/// Maps free-form status text onto a [`Status`]. Never fails: anything
/// unrecognised, including empty input, is `New`.
pub fn normalize_status(raw: Option<&str>) -> Status {
    let Some(raw) = raw else {
        return Status::New;
    };
    let value = raw.trim().to_lowercase();
    if value.is_empty() {
        return Status::New;
    }

    let has = |needles: &[&str]| needles.iter().any(|needle| value.contains(needle));
    if has(&["done", "complete"]) {
        Status::Done
    } else if has(&["work", "progress", "doing"]) {
        Status::Working
    } else if has(&["stuck", "block"]) {
        Status::Stuck
    } else if has(&["pending", "todo", "to do", "backlog"]) {
        Status::Pending
    } else if has(&["almost", "review"]) {
        Status::AlmostFinish
    } else {
        Status::New
    }
}

/// Anything that occupies a row in the progress computation.
pub trait StatusSource {
    fn primary_status(&self) -> Status;
    fn secondary_value(&self, column_id: &str) -> Option<&str>;
}

impl StatusSource for Task {
    fn primary_status(&self) -> Status {
        self.status
    }

    fn secondary_value(&self, column_id: &str) -> Option<&str> {
        self.text_value(column_id)
    }
}

impl StatusSource for Subtask {
    fn primary_status(&self) -> Status {
        self.status
    }

    fn secondary_value(&self, _column_id: &str) -> Option<&str> {
        None
    }
}

/// Resolves an item's status through the group's status column.
///
/// The first status-typed column wins. A primary column reads the structured
/// field, a secondary one reads `text_values[column.id]`. Groups without any
/// status column fall back to the structured field.
pub fn resolve_task_status<S: StatusSource + ?Sized>(group: &Group, item: &S) -> Status {
    match group.status_column() {
        Some(column) if column.primary_field() == Some(PrimaryField::Status) => {
            item.primary_status()
        }
        Some(column) => normalize_status(item.secondary_value(&column.id)),
        None => item.primary_status(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub done: usize,
    pub working: usize,
    pub stuck: usize,
    pub pending: usize,
    pub almost_finish: usize,
    pub new: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Done => self.done += 1,
            Status::Working => self.working += 1,
            Status::Stuck => self.stuck += 1,
            Status::Pending => self.pending += 1,
            Status::AlmostFinish => self.almost_finish += 1,
            Status::New => self.new += 1,
        }
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Done => self.done,
            Status::Working => self.working,
            Status::Stuck => self.stuck,
            Status::Pending => self.pending,
            Status::AlmostFinish => self.almost_finish,
            Status::New => self.new,
        }
    }

    pub fn sum(&self) -> usize {
        Status::ALL.into_iter().map(|status| self.get(status)).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub counts: StatusCounts,
    /// Weighted completion in `[0, 100]`.
    pub weighted: f64,
    pub total: usize,
}

impl ProgressSummary {
    /// Share of `status` in percent; zero when the group is empty.
    pub fn percent(&self, status: Status) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.counts.get(status) as f64 / self.total as f64 * 100.0
        }
    }

    pub fn rounded_weighted(&self) -> u32 {
        self.weighted.round() as u32
    }
}

/// Weighted progress over every task and every subtask of the group.
///
/// Weights are fixed (see [`Status::weight`]): Done 1, Almost Finish 0.75,
/// Working 0.5, Pending 0.25, New 0.1, Stuck 0. `tasks_override` replaces
/// `group.tasks` as the item source while keeping the group's schema.
pub fn calculate_progress(group: &Group, tasks_override: Option<&[Task]>) -> ProgressSummary {
    let tasks = tasks_override.unwrap_or(&group.tasks);
    let mut counts = StatusCounts::default();

    for task in tasks {
        counts.record(resolve_task_status(group, task));
        for subtask in &task.subtasks {
            counts.record(resolve_task_status(group, subtask));
        }
    }

    let total = counts.sum();
    if total == 0 {
        return ProgressSummary::default();
    }

    let score: f64 = Status::ALL
        .into_iter()
        .map(|status| counts.get(status) as f64 * status.weight())
        .sum();
    let weighted = (score / total as f64 * 100.0).clamp(0.0, 100.0);

    ProgressSummary {
        counts,
        weighted,
        total,
    }
}
