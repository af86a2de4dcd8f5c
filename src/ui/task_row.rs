//! One grid row per task, plus the subtask rows it reveals when expanded.

use crate::cells::registry::{CellContext, CellView, Interaction, name_view, render_cell, renderer};
use crate::cells::{CellWrite, PLACEHOLDER, write_cell};
use crate::codec::CellValue;
use crate::theme::Theme;
use crate::types::{Column, ColumnType, Group, Person, Subtask, Task, TaskPatch};

pub const DRAG_TRANSITION: &str = "transform 200ms ease";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Translate {
    pub x: f64,
    pub y: f64,
}

/// Presentation of a row while the sortable list is live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowStyle {
    pub opacity: f64,
    pub transform: Option<Translate>,
    pub transition: Option<&'static str>,
}

impl Default for RowStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transform: None,
            transition: None,
        }
    }
}

impl RowStyle {
    /// The row being dragged stays in the layout but is invisible; the drag
    /// overlay is its only visible copy.
    pub fn dragging(offset: Translate) -> Self {
        Self {
            opacity: 0.0,
            transform: Some(offset),
            transition: Some(DRAG_TRANSITION),
        }
    }

    /// A neighbour sliding out of the way of the dragged row.
    pub fn displaced(offset: Translate) -> Self {
        Self {
            opacity: 1.0,
            transform: Some(offset),
            transition: Some(DRAG_TRANSITION),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowCell {
    pub column_id: String,
    pub width: u32,
    pub view: CellView,
    /// `None` for static cells.
    pub interaction: Option<Interaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtaskRow {
    pub subtask_id: String,
    pub cells: Vec<RowCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub group_id: String,
    pub task_id: String,
    pub selected: bool,
    pub cells: Vec<RowCell>,
    pub expanded: bool,
    /// "3 subtasks" next to the chevron; empty when there are none.
    pub subtask_badge: String,
    pub subtasks: Vec<SubtaskRow>,
    /// Text of the add-subtask composer, shown only while expanded.
    pub composer: Option<String>,
    pub style: RowStyle,
}

#[derive(Debug, Clone, Copy)]
pub struct RowProps<'a> {
    pub group: &'a Group,
    pub task: &'a Task,
    pub theme: &'a Theme,
    pub people: &'a [Person],
    pub expanded: bool,
    pub subtask_input: Option<&'a str>,
    pub style: RowStyle,
}

pub fn task_row(props: RowProps<'_>) -> TaskRow {
    let RowProps {
        group,
        task,
        theme,
        people,
        expanded,
        subtask_input,
        style,
    } = props;

    let cells = group
        .columns
        .iter()
        .map(|column| {
            let ctx = CellContext {
                group,
                task,
                column,
                theme,
                people,
            };
            RowCell {
                column_id: column.id.clone(),
                width: column.width,
                view: render_cell(&ctx),
                interaction: Some(renderer(column.column_type).interaction()),
            }
        })
        .collect();

    let subtasks = if expanded {
        task.subtasks
            .iter()
            .map(|subtask| subtask_row(group, subtask))
            .collect()
    } else {
        Vec::new()
    };

    TaskRow {
        group_id: group.id.clone(),
        task_id: task.id.clone(),
        selected: task.selected,
        cells,
        expanded,
        subtask_badge: subtask_badge(task.subtasks.len()),
        subtasks,
        composer: expanded.then(|| subtask_input.unwrap_or_default().to_string()),
        style,
    }
}

fn subtask_badge(count: usize) -> String {
    match count {
        0 => String::new(),
        count => format!("{count} subtasks"),
    }
}

/// Same grid as the parent, but only the name is live. Every other column
/// shows a static placeholder whatever its type.
pub fn subtask_row(group: &Group, subtask: &Subtask) -> SubtaskRow {
    let cells = group
        .columns
        .iter()
        .map(|column| {
            if column.column_type == ColumnType::Name {
                RowCell {
                    column_id: column.id.clone(),
                    width: column.width,
                    view: name_view(&subtask.name),
                    interaction: Some(Interaction::Inline),
                }
            } else {
                RowCell {
                    column_id: column.id.clone(),
                    width: column.width,
                    view: CellView::Placeholder(PLACEHOLDER),
                    interaction: None,
                }
            }
        })
        .collect();
    SubtaskRow {
        subtask_id: subtask.id.clone(),
        cells,
    }
}

/// The two mutations a row hands to its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    UpdateTask {
        group_id: String,
        task_id: String,
        patch: TaskPatch,
    },
    UpdateTextValue {
        group_id: String,
        task_id: String,
        column_id: String,
        value: String,
    },
}

impl RowEvent {
    pub fn from_write(group_id: &str, task_id: &str, write: CellWrite) -> Self {
        match write {
            CellWrite::Task(patch) => Self::UpdateTask {
                group_id: group_id.to_string(),
                task_id: task_id.to_string(),
                patch,
            },
            CellWrite::TextValue { column_id, value } => Self::UpdateTextValue {
                group_id: group_id.to_string(),
                task_id: task_id.to_string(),
                column_id,
                value,
            },
        }
    }
}

/// A committed value in a parent-row cell.
pub fn cell_changed(group_id: &str, task_id: &str, column: &Column, value: Option<&CellValue>) -> RowEvent {
    RowEvent::from_write(group_id, task_id, write_cell(column, value))
}

/// A committed value in a subtask-row cell. Only the name column produces an
/// event; it replaces the parent's subtask list with the renamed entry.
pub fn subtask_cell_changed(
    group_id: &str,
    task: &Task,
    subtask_id: &str,
    column: &Column,
    value: Option<&CellValue>,
) -> Option<RowEvent> {
    if column.column_type != ColumnType::Name {
        return None;
    }
    let name = match value {
        Some(CellValue::Text(name)) => name.clone(),
        _ => return None,
    };
    if !task.subtasks.iter().any(|subtask| subtask.id == subtask_id) {
        return None;
    }
    let subtasks = task
        .subtasks
        .iter()
        .map(|subtask| {
            if subtask.id == subtask_id {
                Subtask {
                    name: name.clone(),
                    ..subtask.clone()
                }
            } else {
                subtask.clone()
            }
        })
        .collect();
    Some(RowEvent::UpdateTask {
        group_id: group_id.to_string(),
        task_id: task.id.clone(),
        patch: TaskPatch {
            subtasks: Some(subtasks),
            ..TaskPatch::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemePreset;
    use crate::types::{COL_STATUS, Status, default_columns, default_people};

    fn sample_group() -> Group {
        let mut columns = default_columns();
        columns.push(Column::new("col_notes", "Notes", ColumnType::Text, 140));
        columns.push(Column::new("col_ok", "OK", ColumnType::Checkbox, 80));
        let mut task = Task::new("t1", "Ship");
        task.status = Status::Working;
        task.subtasks = vec![
            Subtask {
                id: "s1".to_string(),
                name: "Write notes".to_string(),
                status: Status::Done,
            },
            Subtask {
                id: "s2".to_string(),
                name: "Tag release".to_string(),
                status: Status::New,
            },
        ];
        Group {
            id: "g1".to_string(),
            title: "Sprint".to_string(),
            color: "#579bfc".to_string(),
            columns,
            tasks: vec![task],
            is_pinned: false,
        }
    }

    fn props<'a>(group: &'a Group, theme: &'a Theme, people: &'a [Person], expanded: bool) -> RowProps<'a> {
        RowProps {
            group,
            task: &group.tasks[0],
            theme,
            people,
            expanded,
            subtask_input: Some("Draft"),
            style: RowStyle::default(),
        }
    }

    #[test]
    fn renders_one_cell_per_column() {
        let group = sample_group();
        let theme = Theme::from_preset(ThemePreset::Light);
        let people = default_people();
        let row = task_row(props(&group, &theme, &people, false));
        assert_eq!(row.cells.len(), group.columns.len());
        assert_eq!(row.cells[0].view, CellView::Name("Ship".to_string()));
        assert_eq!(row.subtask_badge, "2 subtasks");
        assert!(row.subtasks.is_empty());
        assert_eq!(row.composer, None);
    }

    #[test]
    fn expanded_row_shows_subtasks_and_composer() {
        let group = sample_group();
        let theme = Theme::from_preset(ThemePreset::Dark);
        let people = default_people();
        let row = task_row(props(&group, &theme, &people, true));
        assert_eq!(row.subtasks.len(), 2);
        assert_eq!(row.composer.as_deref(), Some("Draft"));
    }

    #[test]
    fn subtask_rows_only_expose_the_name_cell() {
        let group = sample_group();
        let row = subtask_row(&group, &group.tasks[0].subtasks[0]);
        for (cell, column) in row.cells.iter().zip(&group.columns) {
            if column.column_type == ColumnType::Name {
                assert_eq!(cell.view, CellView::Name("Write notes".to_string()));
                assert!(cell.interaction.is_some());
            } else {
                assert_eq!(cell.view, CellView::Placeholder(PLACEHOLDER));
                assert_eq!(cell.interaction, None);
            }
        }
    }

    #[test]
    fn subtask_non_name_edits_fire_nothing() {
        let group = sample_group();
        let task = &group.tasks[0];
        for column in group.columns.iter().filter(|c| c.column_type != ColumnType::Name) {
            for value in [
                Some(CellValue::Status(Status::Done)),
                Some(CellValue::Text("x".to_string())),
                Some(CellValue::Checkbox(true)),
                None,
            ] {
                assert_eq!(
                    subtask_cell_changed("g1", task, "s1", column, value.as_ref()),
                    None,
                    "{} accepted a subtask edit",
                    column.id
                );
            }
        }
    }

    #[test]
    fn subtask_rename_patches_the_parent_list() {
        let group = sample_group();
        let task = &group.tasks[0];
        let name = group.column("col_name").unwrap();
        let event = subtask_cell_changed("g1", task, "s2", name, Some(&CellValue::Text("Tag v2".to_string())))
            .unwrap();
        let RowEvent::UpdateTask { patch, .. } = event else {
            panic!("rename is a task update");
        };
        let subtasks = patch.subtasks.unwrap();
        assert_eq!(subtasks[0].name, "Write notes");
        assert_eq!(subtasks[1].name, "Tag v2");
        assert_eq!(subtasks[1].status, Status::New);
    }

    #[test]
    fn parent_edits_route_to_the_two_mutation_kinds() {
        let group = sample_group();
        let status = group.column(COL_STATUS).unwrap();
        assert_eq!(
            cell_changed("g1", "t1", status, Some(&CellValue::Status(Status::Done))),
            RowEvent::UpdateTask {
                group_id: "g1".to_string(),
                task_id: "t1".to_string(),
                patch: TaskPatch::status(Status::Done),
            }
        );
        let ok = group.column("col_ok").unwrap();
        assert_eq!(
            cell_changed("g1", "t1", ok, Some(&CellValue::Checkbox(true))),
            RowEvent::UpdateTextValue {
                group_id: "g1".to_string(),
                task_id: "t1".to_string(),
                column_id: "col_ok".to_string(),
                value: "true".to_string(),
            }
        );
    }

    #[test]
    fn dragged_row_is_invisible() {
        let style = RowStyle::dragging(Translate { x: 0.0, y: 36.0 });
        assert_eq!(style.opacity, 0.0);
        assert_eq!(style.transition, Some(DRAG_TRANSITION));
        assert_eq!(RowStyle::default().opacity, 1.0);
    }
}
