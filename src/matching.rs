//! Search, status filter and sort that produce a group's `filteredTasks`.

use std::cmp::Ordering;
use std::str::FromStr;

use nucleo::{Config, Matcher, Utf32Str};

use crate::board_utils::resolve_task_status;
use crate::codec::parse_date;
use crate::types::{Group, Status, Task};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum StatusFilter {
    #[default]
    All,
    Done,
    /// `New` or `Pending`.
    New,
    /// Anything not `Done`.
    Active,
}

impl StatusFilter {
    pub fn accepts(self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::Done => status == Status::Done,
            Self::New => matches!(status, Status::New | Status::Pending),
            Self::Active => status != Status::Done,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "done" => Ok(Self::Done),
            "new" => Ok(Self::New),
            "active" => Ok(Self::Active),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum SortMode {
    #[default]
    None,
    Name,
    DueAsc,
    DueDesc,
    Priority,
}

impl FromStr for SortMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "name" => Ok(Self::Name),
            "due-asc" | "due_asc" => Ok(Self::DueAsc),
            "due-desc" | "due_desc" => Ok(Self::DueDesc),
            "priority" => Ok(Self::Priority),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TaskFilter {
    pub query: String,
    pub status: StatusFilter,
    pub sort: SortMode,
}

impl TaskFilter {
    pub fn is_noop(&self) -> bool {
        normalize_fuzzy_needle(&self.query).is_empty()
            && self.status == StatusFilter::All
            && self.sort == SortMode::None
    }
}

/// Lowercased, trimmed needle. The matcher ignores case only when the needle
/// is already lowercase.
pub fn normalize_fuzzy_needle(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Cheap prefilter run before the matcher.
pub fn ascii_case_insensitive_subsequence(haystack: &str, needle: &str) -> bool {
    let mut needle_chars = needle.chars().filter(|ch| !ch.is_whitespace()).peekable();
    for ch in haystack.chars() {
        match needle_chars.peek() {
            Some(wanted) if ch.to_lowercase().eq(wanted.to_lowercase()) => {
                needle_chars.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    needle_chars.peek().is_none()
}

/// Text a task is searched by: its name plus every secondary value.
fn search_label(task: &Task) -> String {
    let mut label = task.name.clone();
    for value in task.text_values.values() {
        if !value.trim().is_empty() {
            label.push(' ');
            label.push_str(value);
        }
    }
    label
}

/// Fuzzy score of `task` against an already normalized needle.
pub fn task_match_score(matcher: &mut Matcher, task: &Task, needle: &str) -> Option<u16> {
    if needle.is_empty() {
        return Some(0);
    }
    let label = search_label(task);
    if !ascii_case_insensitive_subsequence(&label, needle) {
        return None;
    }
    let mut needle_buf = Vec::new();
    let mut label_buf = Vec::new();
    let needle_utf32 = Utf32Str::new(needle, &mut needle_buf);
    let label_utf32 = Utf32Str::new(label.as_str(), &mut label_buf);
    matcher.fuzzy_match(label_utf32, needle_utf32)
}

/// Character positions in `name` matched by `query`, for highlighting.
pub fn name_match_indices(name: &str, query: &str) -> Vec<usize> {
    let needle = normalize_fuzzy_needle(query);
    if needle.is_empty() {
        return Vec::new();
    }
    let mut matcher = Matcher::new(Config::DEFAULT);
    let mut needle_buf = Vec::new();
    let mut name_buf = Vec::new();
    let mut indices = Vec::new();
    let matched = matcher.fuzzy_indices(
        Utf32Str::new(name, &mut name_buf),
        Utf32Str::new(needle.as_str(), &mut needle_buf),
        &mut indices,
    );
    if matched.is_none() {
        return Vec::new();
    }
    indices.sort_unstable();
    indices.dedup();
    indices.into_iter().map(|index| index as usize).collect()
}

/// The visible rows of `group` under `filter`.
///
/// Tasks keep their `order` sequence unless a sort is requested; sorts are
/// stable so equal keys keep that sequence too.
pub fn filter_tasks(group: &Group, filter: &TaskFilter) -> Vec<Task> {
    let needle = normalize_fuzzy_needle(&filter.query);
    let mut matcher = Matcher::new(Config::DEFAULT);

    let mut visible: Vec<Task> = group
        .tasks
        .iter()
        .filter(|task| filter.status.accepts(resolve_task_status(group, *task)))
        .filter(|task| task_match_score(&mut matcher, task, &needle).is_some())
        .cloned()
        .collect();

    sort_tasks(&mut visible, filter.sort);
    visible
}

pub fn sort_tasks(tasks: &mut [Task], sort: SortMode) {
    match sort {
        SortMode::None => tasks.sort_by_key(|task| task.order),
        SortMode::Name => tasks.sort_by_cached_key(|task| task.name.to_lowercase()),
        SortMode::DueAsc => tasks.sort_by(|a, b| compare_due(a, b, false)),
        SortMode::DueDesc => tasks.sort_by(|a, b| compare_due(a, b, true)),
        SortMode::Priority => tasks.sort_by_key(|task| task.priority.sort_rank()),
    }
}

/// Missing or unparseable due dates sort last in both directions.
fn compare_due(a: &Task, b: &Task, descending: bool) -> Ordering {
    let left = a.due_date.as_deref().and_then(parse_date);
    let right = b.due_date.as_deref().and_then(parse_date);
    match (left, right) {
        (Some(left), Some(right)) if descending => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
