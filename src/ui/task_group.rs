//! A group as rendered: chrome, column headers, visible rows, draft row and
//! footer aggregates.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::board_utils::{ProgressSummary, calculate_progress};
use crate::cells::registry::{CellContext, CellView, render_cell, renderer};
use crate::cells::status::SET_STATUS;
use crate::cells::{PLACEHOLDER, read_draft_raw};
use crate::matching::{TaskFilter, filter_tasks};
use crate::theme::Theme;
use crate::types::{ColumnType, Draft, Group, Person, Status, Task};

use super::footer::FooterStat;
use super::task_row::{RowProps, RowStyle, TaskRow, Translate, task_row};

pub const ADD_ITEM: &str = "+ Add Item";

/// Header bar segment order.
const PROGRESS_ORDER: [Status; 6] = [
    Status::New,
    Status::Pending,
    Status::Working,
    Status::AlmostFinish,
    Status::Done,
    Status::Stuck,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSegment {
    pub status: Status,
    pub percent: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressBar {
    pub segments: Vec<ProgressSegment>,
    /// Rounded weighted percent, e.g. `"44%"`.
    pub label: String,
}

pub fn progress_bar(summary: &ProgressSummary, theme: &Theme) -> ProgressBar {
    let segments = PROGRESS_ORDER
        .into_iter()
        .filter_map(|status| {
            let percent = summary.percent(status);
            (percent > 0.0).then(|| ProgressSegment {
                status,
                percent,
                color: theme.status(status).background,
            })
        })
        .collect();
    ProgressBar {
        segments,
        label: format!("{}%", summary.rounded_weighted()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column_id: String,
    pub title: String,
    pub width: u32,
    pub index: usize,
    /// The name column is pinned in place.
    pub draggable: bool,
    pub resizable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftCell {
    pub column_id: String,
    pub view: CellView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FooterCell {
    pub column_id: String,
    pub stat: FooterStat,
}

/// Live row drag as the list sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowDragVisual<'a> {
    pub task_id: &'a str,
    pub offset: Translate,
}

#[derive(Debug, Clone, Copy)]
pub struct GroupProps<'a> {
    pub group: &'a Group,
    pub theme: &'a Theme,
    pub people: &'a [Person],
    pub filter: &'a TaskFilter,
    pub collapsed: bool,
    pub expanded: &'a HashSet<String>,
    pub draft: Option<&'a Draft>,
    pub subtask_inputs: &'a HashMap<String, String>,
    pub drag: Option<RowDragVisual<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupView {
    pub group_id: String,
    pub title: String,
    pub color: String,
    pub is_pinned: bool,
    pub collapsed: bool,
    pub all_selected: bool,
    pub some_selected: bool,
    pub progress: ProgressSummary,
    pub progress_bar: ProgressBar,
    /// Header, rows, draft and footer stay empty while collapsed.
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<TaskRow>,
    pub draft: Vec<DraftCell>,
    pub footer: Vec<FooterCell>,
}

pub fn group_view(props: GroupProps<'_>) -> GroupView {
    let GroupProps {
        group,
        theme,
        people,
        filter,
        collapsed,
        expanded,
        draft,
        subtask_inputs,
        drag,
    } = props;

    let progress = calculate_progress(group, None);
    let mut view = GroupView {
        group_id: group.id.clone(),
        title: group.title.clone(),
        color: group.color.clone(),
        is_pinned: group.is_pinned,
        collapsed,
        all_selected: group.all_selected(),
        some_selected: group.some_selected(),
        progress,
        progress_bar: progress_bar(&progress, theme),
        headers: Vec::new(),
        rows: Vec::new(),
        draft: Vec::new(),
        footer: Vec::new(),
    };
    if collapsed {
        return view;
    }

    view.headers = header_cells(group);
    view.rows = filter_tasks(group, filter)
        .iter()
        .map(|task| {
            task_row(RowProps {
                group,
                task,
                theme,
                people,
                expanded: expanded.contains(&task.id),
                subtask_input: subtask_inputs.get(&task.id).map(String::as_str),
                style: row_style(drag, &task.id),
            })
        })
        .collect();
    view.draft = draft_cells(group, draft, theme, people);
    view.footer = footer_cells(group, theme);
    view
}

fn row_style(drag: Option<RowDragVisual<'_>>, task_id: &str) -> RowStyle {
    match drag {
        Some(drag) if drag.task_id == task_id => RowStyle::dragging(drag.offset),
        _ => RowStyle::default(),
    }
}

pub fn header_cells(group: &Group) -> Vec<HeaderCell> {
    group
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| HeaderCell {
            column_id: column.id.clone(),
            title: column.title.clone(),
            width: column.width,
            index,
            draggable: index > 0,
            resizable: true,
        })
        .collect()
}

/// The "add task" row. Unset cells show the same neutral text as an empty
/// task cell; the name cell invites a new item.
pub fn draft_cells(group: &Group, draft: Option<&Draft>, theme: &Theme, people: &[Person]) -> Vec<DraftCell> {
    let preview = draft_preview(draft);
    group
        .columns
        .iter()
        .map(|column| {
            let view = match read_draft_raw(draft, column) {
                None => match column.column_type {
                    ColumnType::Name => CellView::Placeholder(ADD_ITEM),
                    ColumnType::Status => CellView::Placeholder(SET_STATUS),
                    _ if column.primary_field().is_some() => CellView::Placeholder(PLACEHOLDER),
                    _ => render_cell(&CellContext {
                        group,
                        task: &preview,
                        column,
                        theme,
                        people,
                    }),
                },
                Some(_) => render_cell(&CellContext {
                    group,
                    task: &preview,
                    column,
                    theme,
                    people,
                }),
            };
            DraftCell {
                column_id: column.id.clone(),
                view,
            }
        })
        .collect()
}

/// Draft values laid over an empty task, for rendering only.
fn draft_preview(draft: Option<&Draft>) -> Task {
    let empty = Task::new("", "");
    match draft {
        Some(draft) => draft.apply_to(&empty),
        None => empty,
    }
}

pub fn footer_cells(group: &Group, theme: &Theme) -> Vec<FooterCell> {
    group
        .columns
        .iter()
        .map(|column| FooterCell {
            column_id: column.id.clone(),
            stat: renderer(column.column_type).footer(group, column, theme),
        })
        .collect()
}
