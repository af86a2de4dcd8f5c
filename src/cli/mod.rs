use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use clap::{Args, Subcommand};
use serde_json::{Value, json};
use tracing::error;

use crate::app::actions::{self, ColumnEdge, NewColumn};
use crate::app::row_drag::move_task;
use crate::board_utils::{ProgressSummary, calculate_progress, resolve_task_status};
use crate::cells::registry::{CellContext, render_cell};
use crate::cells::write_cell;
use crate::codec::{CellValue, decode};
use crate::error::BoardError;
use crate::matching::{SortMode, StatusFilter, TaskFilter, filter_tasks};
use crate::settings::Settings;
use crate::store::{load_board, save_board};
use crate::theme::{Theme, group_color};
use crate::types::{
    Board, Column, ColumnType, DropdownOption, Draft, Group, Person, Status, Task, default_people,
};
use crate::ui::task_group::footer_cells;
use crate::ui::task_row::cell_changed;

const SCHEMA_VERSION: &str = "cli.v1";
const MIN_ID_PREFIX: usize = 4;

#[derive(Debug, Clone, Subcommand)]
pub enum RootCommand {
    /// Print every group with its visible tasks
    Show(ShowArgs),
    /// Print weighted progress per group
    Progress(ProgressArgs),
    Group {
        #[command(subcommand)]
        command: GroupCommand,
    },
    Column {
        #[command(subcommand)]
        command: ColumnCommand,
    },
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum GroupCommand {
    Add(GroupAddArgs),
    Rename(GroupRenameArgs),
    Pin(GroupSelectorArgs),
    Delete(GroupSelectorArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum ColumnCommand {
    Add(ColumnAddArgs),
    Rename(ColumnRenameArgs),
    Resize(ColumnResizeArgs),
    Move(ColumnMoveArgs),
    Delete(ColumnSelectorArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum TaskCommand {
    Add(TaskAddArgs),
    Set(TaskSetArgs),
    Move(TaskMoveArgs),
    Delete(TaskSelectorArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum SubtaskCommand {
    Add(SubtaskAddArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    /// Only this group (id or title)
    #[arg(long, value_name = "GROUP")]
    pub group: Option<String>,

    #[arg(long, value_name = "TEXT", default_value = "")]
    pub query: String,

    /// all, done, new or active
    #[arg(long, value_name = "FILTER", default_value = "all")]
    pub status: String,

    /// none, name, due-asc, due-desc or priority
    #[arg(long, value_name = "MODE", default_value = "none")]
    pub sort: String,
}

#[derive(Debug, Clone, Args)]
pub struct ProgressArgs {
    #[arg(long, value_name = "GROUP")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct GroupAddArgs {
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct GroupSelectorArgs {
    #[arg(long, value_name = "GROUP")]
    pub group: String,
}

#[derive(Debug, Clone, Args)]
pub struct GroupRenameArgs {
    #[arg(long, value_name = "GROUP")]
    pub group: String,

    #[arg(long, value_name = "TEXT")]
    pub title: String,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnAddArgs {
    #[arg(long, value_name = "GROUP")]
    pub group: String,

    #[arg(long = "type", value_name = "TYPE")]
    pub column_type: String,

    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Dropdown option label; repeat for more
    #[arg(long = "option", value_name = "LABEL")]
    pub options: Vec<String>,

    #[arg(long, value_name = "SYMBOL")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnSelectorArgs {
    #[arg(long, value_name = "GROUP")]
    pub group: String,

    #[arg(long, value_name = "COLUMN")]
    pub column: String,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnRenameArgs {
    #[command(flatten)]
    pub selector: ColumnSelectorArgs,

    #[arg(long, value_name = "TEXT")]
    pub title: String,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnResizeArgs {
    #[command(flatten)]
    pub selector: ColumnSelectorArgs,

    #[arg(long, value_name = "PX")]
    pub width: u32,
}

#[derive(Debug, Clone, Args)]
#[group(id = "column_target", required = true, multiple = false)]
pub struct ColumnMoveTarget {
    #[arg(long, value_name = "INDEX")]
    pub to: Option<usize>,

    #[arg(long)]
    pub start: bool,

    #[arg(long)]
    pub end: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnMoveArgs {
    #[command(flatten)]
    pub selector: ColumnSelectorArgs,

    #[command(flatten)]
    pub target: ColumnMoveTarget,
}

#[derive(Debug, Clone, Args)]
pub struct TaskAddArgs {
    #[arg(long, value_name = "GROUP")]
    pub group: String,

    #[arg(long, value_name = "TEXT")]
    pub name: String,

    /// Initial cell value; repeat for more
    #[arg(long = "set", value_name = "COLUMN=VALUE")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TaskSelectorArgs {
    #[arg(long, value_name = "GROUP")]
    pub group: String,

    /// Task id, id prefix or exact name
    #[arg(long, value_name = "TASK")]
    pub task: String,
}

#[derive(Debug, Clone, Args)]
pub struct TaskSetArgs {
    #[command(flatten)]
    pub selector: TaskSelectorArgs,

    #[arg(long, value_name = "COLUMN")]
    pub column: String,

    /// New value; empty clears the cell
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Debug, Clone, Args)]
pub struct TaskMoveArgs {
    #[command(flatten)]
    pub selector: TaskSelectorArgs,

    #[arg(long, value_name = "GROUP")]
    pub to_group: Option<String>,

    /// Position in the destination; defaults to the end
    #[arg(long, value_name = "INDEX")]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct SubtaskAddArgs {
    #[command(flatten)]
    pub selector: TaskSelectorArgs,

    #[arg(long, value_name = "TEXT")]
    pub name: String,
}

pub fn run(
    board_path: &Path,
    settings: &Settings,
    command: RootCommand,
    json_output: bool,
    quiet: bool,
) -> i32 {
    match execute(board_path, settings, command) {
        Ok(output) => {
            print_success(output, board_path, json_output, quiet);
            0
        }
        Err(err) => {
            print_error(&err, json_output);
            err.exit_code
        }
    }
}

struct CommandOutput {
    command: &'static str,
    data: Value,
    text: String,
}

enum Outcome {
    Read(CommandOutput),
    Write(Board, CommandOutput),
}

#[derive(Debug)]
struct CliError {
    exit_code: i32,
    code: &'static str,
    message: String,
    details: Option<Value>,
}

type CliResult<T> = Result<T, CliError>;

impl From<BoardError> for CliError {
    fn from(err: BoardError) -> Self {
        let code = match &err {
            BoardError::GroupNotFound { .. } => "GROUP_NOT_FOUND",
            BoardError::TaskNotFound { .. } => "TASK_NOT_FOUND",
            BoardError::SubtaskNotFound { .. } => "SUBTASK_NOT_FOUND",
            BoardError::ColumnNotFound { .. } => "COLUMN_NOT_FOUND",
            BoardError::InvalidColumnMove { .. } => "INVALID_COLUMN_MOVE",
            BoardError::ProtectedColumn { .. } => "PROTECTED_COLUMN",
            BoardError::EmptyName { .. } => "EMPTY_NAME",
            BoardError::Parse { .. } => "PARSE_ERROR",
        };
        if err.is_not_found() {
            not_found_error(code, err.to_string())
        } else {
            usage_error(code, err.to_string())
        }
    }
}

fn execute(board_path: &Path, settings: &Settings, command: RootCommand) -> CliResult<CommandOutput> {
    let board = load_board(board_path).map_err(|err| runtime_error(format_anyhow_error_chain(&err)))?;

    let outcome = match command {
        RootCommand::Show(args) => Outcome::Read(show(&board, settings, &args)?),
        RootCommand::Progress(args) => Outcome::Read(progress(&board, args.group.as_deref())?),
        RootCommand::Group { command } => execute_group_command(&board, command)?,
        RootCommand::Column { command } => execute_column_command(&board, settings, command)?,
        RootCommand::Task { command } => execute_task_command(&board, command)?,
        RootCommand::Subtask { command } => match command {
            SubtaskCommand::Add(args) => subtask_add(&board, args)?,
        },
    };

    match outcome {
        Outcome::Read(output) => Ok(output),
        Outcome::Write(next, output) => {
            save_board(&next, board_path).map_err(|err| runtime_error(format_anyhow_error_chain(&err)))?;
            Ok(output)
        }
    }
}

fn execute_group_command(board: &Board, command: GroupCommand) -> CliResult<Outcome> {
    match command {
        GroupCommand::Add(args) => {
            let next = actions::add_group(board, args.title.as_deref());
            let group = next.groups.last().ok_or_else(|| runtime_error("group was not added"))?;
            let output = CommandOutput {
                command: "group.add",
                data: group_json(group),
                text: format!("added group '{}' ({})", group.title, group.id),
            };
            Ok(Outcome::Write(next, output))
        }
        GroupCommand::Rename(args) => {
            let group = resolve_group(board, &args.group)?;
            let next = actions::rename_group(board, &group.id, &args.title)?;
            Ok(Outcome::Write(
                next,
                CommandOutput {
                    command: "group.rename",
                    data: json!({ "id": group.id, "title": args.title }),
                    text: format!("renamed group {} to '{}'", group.id, args.title),
                },
            ))
        }
        GroupCommand::Pin(args) => {
            let group = resolve_group(board, &args.group)?;
            let next = actions::toggle_group_pin(board, &group.id)?;
            let pinned = !group.is_pinned;
            Ok(Outcome::Write(
                next,
                CommandOutput {
                    command: "group.pin",
                    data: json!({ "id": group.id, "is_pinned": pinned }),
                    text: format!(
                        "{} group '{}'",
                        if pinned { "pinned" } else { "unpinned" },
                        group.title
                    ),
                },
            ))
        }
        GroupCommand::Delete(args) => {
            let group = resolve_group(board, &args.group)?;
            let next = actions::delete_group(board, &group.id)?;
            Ok(Outcome::Write(
                next,
                CommandOutput {
                    command: "group.delete",
                    data: json!({ "id": group.id, "deleted": true }),
                    text: format!("deleted group '{}'", group.title),
                },
            ))
        }
    }
}

fn execute_column_command(board: &Board, settings: &Settings, command: ColumnCommand) -> CliResult<Outcome> {
    match command {
        ColumnCommand::Add(args) => column_add(board, settings, args),
        ColumnCommand::Rename(args) => {
            let (group, column) = resolve_column_selector(board, &args.selector)?;
            let next = actions::rename_column(board, &group.id, &column.id, &args.title)?;
            Ok(Outcome::Write(
                next,
                CommandOutput {
                    command: "column.rename",
                    data: json!({ "group_id": group.id, "id": column.id, "title": args.title }),
                    text: format!("renamed column {} to '{}'", column.id, args.title),
                },
            ))
        }
        ColumnCommand::Resize(args) => {
            let (group, column) = resolve_column_selector(board, &args.selector)?;
            let next = actions::resize_column(
                board,
                &group.id,
                &column.id,
                args.width,
                settings.min_column_width,
            )?;
            let width = args.width.max(settings.min_column_width);
            Ok(Outcome::Write(
                next,
                CommandOutput {
                    command: "column.resize",
                    data: json!({ "group_id": group.id, "id": column.id, "width": width }),
                    text: format!("column {} is now {}px wide", column.id, width),
                },
            ))
        }
        ColumnCommand::Move(args) => {
            let (group, column) = resolve_column_selector(board, &args.selector)?;
            let next = match (args.target.to, args.target.start, args.target.end) {
                (Some(to), _, _) => {
                    let from = group
                        .columns
                        .iter()
                        .position(|candidate| candidate.id == column.id)
                        .ok_or_else(|| BoardError::column(&column.id))?;
                    actions::reorder_column(board, &group.id, from, to)?
                }
                (None, true, _) => actions::move_column_to(board, &group.id, &column.id, ColumnEdge::Start)?,
                (None, false, true) => actions::move_column_to(board, &group.id, &column.id, ColumnEdge::End)?,
                (None, false, false) => {
                    return Err(usage_error("MISSING_TARGET", "pass --to, --start or --end"));
                }
            };
            let order: Vec<String> = next
                .group(&group.id)
                .map(|group| group.columns.iter().map(|column| column.id.clone()).collect())
                .unwrap_or_default();
            Ok(Outcome::Write(
                next,
                CommandOutput {
                    command: "column.move",
                    data: json!({ "group_id": group.id, "columns": order }),
                    text: format!("column order: {}", order.join(", ")),
                },
            ))
        }
        ColumnCommand::Delete(args) => {
            let (group, column) = resolve_column_selector(board, &args)?;
            let next = actions::delete_column(board, &group.id, &column.id)?;
            Ok(Outcome::Write(
                next,
                CommandOutput {
                    command: "column.delete",
                    data: json!({ "group_id": group.id, "id": column.id, "deleted": true }),
                    text: format!("deleted column '{}'", column.title),
                },
            ))
        }
    }
}

fn column_add(board: &Board, settings: &Settings, args: ColumnAddArgs) -> CliResult<Outcome> {
    let group = resolve_group(board, &args.group)?;
    let column_type = ColumnType::from_str(&args.column_type).map_err(|()| {
        usage_error(
            "INVALID_COLUMN_TYPE",
            format!("unknown column type '{}'", args.column_type),
        )
    })?;
    if column_type == ColumnType::Name {
        return Err(usage_error("INVALID_COLUMN_TYPE", "a group has exactly one name column"));
    }

    let mut spec = NewColumn::new(column_type);
    if let Some(title) = args.title {
        spec.title = title;
    }
    spec.width = args
        .width
        .unwrap_or(settings.default_column_width)
        .max(settings.min_column_width);
    spec.currency = args.currency;
    spec.options = args
        .options
        .iter()
        .enumerate()
        .map(|(index, label)| DropdownOption {
            id: format!("opt{}", index + 1),
            label: label.clone(),
            color: group_color(index).to_string(),
        })
        .collect();

    let next = actions::add_column(board, &group.id, spec)?;
    let column = next
        .group(&group.id)
        .and_then(|group| group.columns.last())
        .ok_or_else(|| runtime_error("column was not added"))?;
    let output = CommandOutput {
        command: "column.add",
        data: serde_json::to_value(column).map_err(runtime_error)?,
        text: format!(
            "added {} column '{}' ({})",
            column_type.as_str(),
            column.title,
            column.id
        ),
    };
    Ok(Outcome::Write(next, output))
}

fn execute_task_command(board: &Board, command: TaskCommand) -> CliResult<Outcome> {
    match command {
        TaskCommand::Add(args) => task_add(board, args),
        TaskCommand::Set(args) => task_set(board, args),
        TaskCommand::Move(args) => task_move(board, args),
        TaskCommand::Delete(args) => {
            let (group, task) = resolve_task_selector(board, &args)?;
            let next = actions::delete_task(board, &group.id, &task.id)?;
            Ok(Outcome::Write(
                next,
                CommandOutput {
                    command: "task.delete",
                    data: json!({ "group_id": group.id, "id": task.id, "deleted": true }),
                    text: format!("deleted task '{}'", task.name),
                },
            ))
        }
    }
}

fn task_add(board: &Board, args: TaskAddArgs) -> CliResult<Outcome> {
    let group = resolve_group(board, &args.group)?;
    let people = default_people();
    let mut draft = Draft::default();
    for assignment in &args.values {
        let (column_ref, raw) = assignment.split_once('=').ok_or_else(|| {
            usage_error(
                "INVALID_ASSIGNMENT",
                format!("expected COLUMN=VALUE, got '{assignment}'"),
            )
        })?;
        let column = resolve_column(group, column_ref)?;
        let value = parse_cell_value(column, raw, &people)?;
        write_cell(column, value.as_ref()).apply_to_draft(&mut draft);
    }

    let next = actions::add_task(board, &group.id, &args.name, Some(&draft))?;
    let task = next
        .group(&group.id)
        .and_then(|group| group.tasks.last())
        .ok_or_else(|| runtime_error("task was not added"))?;
    let output = CommandOutput {
        command: "task.add",
        data: task_json(group, task),
        text: format!("added task '{}' ({})", task.name, task.id),
    };
    Ok(Outcome::Write(next, output))
}

fn task_set(board: &Board, args: TaskSetArgs) -> CliResult<Outcome> {
    let (group, task) = resolve_task_selector(board, &args.selector)?;
    let column = resolve_column(group, &args.column)?;
    let value = parse_cell_value(column, &args.value, &default_people())?;

    let event = cell_changed(&group.id, &task.id, column, value.as_ref());
    let next = actions::apply_row_event(board, &event)?;
    let updated = next
        .group(&group.id)
        .and_then(|group| group.task(&task.id))
        .ok_or_else(|| BoardError::task(&task.id))?;
    let output = CommandOutput {
        command: "task.set",
        data: task_json(group, updated),
        text: format!("set {} on '{}'", column.title, updated.name),
    };
    Ok(Outcome::Write(next, output))
}

fn task_move(board: &Board, args: TaskMoveArgs) -> CliResult<Outcome> {
    let (group, task) = resolve_task_selector(board, &args.selector)?;
    let destination = match args.to_group.as_deref() {
        Some(selector) => resolve_group(board, selector)?,
        None => group,
    };
    let index = args.index.unwrap_or(destination.tasks.len());
    let next = move_task(board, &group.id, &task.id, &destination.id, index)?;
    let position = next
        .group(&destination.id)
        .and_then(|group| group.tasks.iter().position(|candidate| candidate.id == task.id))
        .ok_or_else(|| BoardError::task(&task.id))?;
    let output = CommandOutput {
        command: "task.move",
        data: json!({
            "id": task.id,
            "from_group_id": group.id,
            "group_id": destination.id,
            "index": position
        }),
        text: format!(
            "moved '{}' to '{}' at position {}",
            task.name, destination.title, position
        ),
    };
    Ok(Outcome::Write(next, output))
}

fn subtask_add(board: &Board, args: SubtaskAddArgs) -> CliResult<Outcome> {
    let (group, task) = resolve_task_selector(board, &args.selector)?;
    let next = actions::add_subtask(board, &group.id, &task.id, &args.name)?;
    let subtask = next
        .group(&group.id)
        .and_then(|group| group.task(&task.id))
        .and_then(|task| task.subtasks.last())
        .ok_or_else(|| runtime_error("subtask was not added"))?;
    let output = CommandOutput {
        command: "subtask.add",
        data: serde_json::to_value(subtask).map_err(runtime_error)?,
        text: format!("added subtask '{}' to '{}'", subtask.name, task.name),
    };
    Ok(Outcome::Write(next, output))
}

/// CLI text to a cell value. Person cells accept a name or id, dropdown
/// cells an option label or id. Empty input clears the cell.
fn parse_cell_value(column: &Column, raw: &str, people: &[Person]) -> CliResult<Option<CellValue>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let invalid = || {
        usage_error(
            "INVALID_VALUE",
            format!(
                "'{}' is not a valid {} value",
                raw,
                column.column_type.as_str()
            ),
        )
    };
    match column.column_type {
        ColumnType::Person => people
            .iter()
            .find(|person| person.id == trimmed || person.name.eq_ignore_ascii_case(trimmed))
            .map(|person| Some(CellValue::Person(person.id.clone())))
            .ok_or_else(invalid),
        ColumnType::Dropdown => column
            .config
            .options
            .iter()
            .find(|option| option.id == trimmed || option.label.eq_ignore_ascii_case(trimmed))
            .map(|option| Some(CellValue::Choice(option.id.clone())))
            .ok_or_else(invalid),
        column_type => decode(column_type, Some(raw)).map(Some).ok_or_else(invalid),
    }
}

fn show(board: &Board, settings: &Settings, args: &ShowArgs) -> CliResult<CommandOutput> {
    let filter = TaskFilter {
        query: args.query.clone(),
        status: StatusFilter::from_str(&args.status)
            .map_err(|()| usage_error("INVALID_FILTER", format!("unknown status filter '{}'", args.status)))?,
        sort: SortMode::from_str(&args.sort)
            .map_err(|()| usage_error("INVALID_SORT", format!("unknown sort mode '{}'", args.sort)))?,
    };
    let groups = selected_groups(board, args.group.as_deref())?;
    let theme = Theme::from_preset(settings.theme_preset());
    let people = default_people();

    let mut sections = Vec::new();
    let mut data = Vec::new();
    for group in groups {
        let tasks = filter_tasks(group, &filter);
        let summary = calculate_progress(group, None);
        sections.push(render_group_text(group, &tasks, &summary, &theme, &people));
        data.push(json!({
            "group": group_json(group),
            "progress": progress_json(&summary),
            "tasks": tasks.iter().map(|task| task_json(group, task)).collect::<Vec<_>>()
        }));
    }

    let text = if sections.is_empty() {
        "No groups found.".to_string()
    } else {
        sections.join("\n\n")
    };
    Ok(CommandOutput {
        command: "show",
        data: json!({ "board": { "id": board.id, "name": board.name }, "groups": data }),
        text,
    })
}

fn render_group_text(
    group: &Group,
    tasks: &[Task],
    summary: &ProgressSummary,
    theme: &Theme,
    people: &[Person],
) -> String {
    let pin = if group.is_pinned { " [pinned]" } else { "" };
    let title = format!(
        "{}{} ({} tasks, {}%)",
        group.title,
        pin,
        group.tasks.len(),
        summary.rounded_weighted()
    );
    if group.columns.is_empty() {
        return title;
    }

    let headers: Vec<&str> = group.columns.iter().map(|column| column.title.as_str()).collect();
    let mut rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| {
            group
                .columns
                .iter()
                .map(|column| {
                    render_cell(&CellContext {
                        group,
                        task,
                        column,
                        theme,
                        people,
                    })
                    .label()
                    .replace('\n', " ")
                })
                .collect()
        })
        .collect();
    rows.push(
        footer_cells(group, theme)
            .iter()
            .map(|cell| cell.stat.label())
            .collect(),
    );

    format!("{title}\n{}", render_text_table(&headers, &rows))
}

fn progress(board: &Board, group: Option<&str>) -> CliResult<CommandOutput> {
    let groups = selected_groups(board, group)?;
    let headers = [
        "Group", "Total", "New", "Pending", "Working", "Almost", "Done", "Stuck", "Progress",
    ];
    let mut rows = Vec::new();
    let mut data = Vec::new();
    for group in groups {
        let summary = calculate_progress(group, None);
        let mut row = vec![group.title.clone(), summary.total.to_string()];
        row.extend(
            [
                Status::New,
                Status::Pending,
                Status::Working,
                Status::AlmostFinish,
                Status::Done,
                Status::Stuck,
            ]
            .into_iter()
            .map(|status| summary.counts.get(status).to_string()),
        );
        row.push(format!("{:.2}%", summary.weighted));
        rows.push(row);
        data.push(json!({
            "group_id": group.id,
            "title": group.title,
            "progress": progress_json(&summary)
        }));
    }

    let text = if rows.is_empty() {
        "No groups found.".to_string()
    } else {
        render_text_table(&headers, &rows)
    };
    Ok(CommandOutput {
        command: "progress",
        data: Value::Array(data),
        text,
    })
}

fn selected_groups<'a>(board: &'a Board, selector: Option<&str>) -> CliResult<Vec<&'a Group>> {
    match selector {
        Some(selector) => Ok(vec![resolve_group(board, selector)?]),
        None => Ok(board.groups_in_display_order()),
    }
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            if index < widths.len() && width > widths[index] {
                widths[index] = width;
            }
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|width| "-".repeat(*width + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let line = |cells: Vec<String>| {
        format!(
            "| {} |",
            cells
                .iter()
                .enumerate()
                .map(|(index, cell)| {
                    let width = widths[index];
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{cell}{}", " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join(" | ")
        )
    };

    let mut lines = Vec::new();
    lines.push(border.clone());
    lines.push(line(headers.iter().map(|header| header.to_string()).collect()));
    lines.push(border.clone());
    for row in rows {
        lines.push(line(row.iter().take(widths.len()).cloned().collect()));
    }
    lines.push(border);
    lines.join("\n")
}

/// Exact id first, then a case-insensitive title match.
fn resolve_group<'a>(board: &'a Board, selector: &str) -> CliResult<&'a Group> {
    if let Some(group) = board.group(selector) {
        return Ok(group);
    }
    let matches: Vec<&Group> = board
        .groups
        .iter()
        .filter(|group| group.title.eq_ignore_ascii_case(selector.trim()))
        .collect();
    match matches.as_slice() {
        [group] => Ok(*group),
        [] => Err(not_found_error(
            "GROUP_NOT_FOUND",
            format!("group '{selector}' not found"),
        )),
        many => Err(conflict_error(
            "GROUP_AMBIGUOUS",
            format!("'{selector}' matches {} groups; use an id", many.len()),
            Some(json!(many.iter().map(|group| group.id.as_str()).collect::<Vec<_>>())),
        )),
    }
}

fn resolve_column<'a>(group: &'a Group, selector: &str) -> CliResult<&'a Column> {
    if let Some(column) = group.column(selector) {
        return Ok(column);
    }
    group
        .columns
        .iter()
        .find(|column| column.title.eq_ignore_ascii_case(selector.trim()))
        .ok_or_else(|| {
            not_found_error(
                "COLUMN_NOT_FOUND",
                format!("column '{selector}' not found in '{}'", group.title),
            )
        })
}

fn resolve_column_selector<'a>(board: &'a Board, args: &ColumnSelectorArgs) -> CliResult<(&'a Group, &'a Column)> {
    let group = resolve_group(board, &args.group)?;
    Ok((group, resolve_column(group, &args.column)?))
}

/// Exact id, then a unique id prefix, then a unique exact name.
fn resolve_task_selector<'a>(board: &'a Board, args: &TaskSelectorArgs) -> CliResult<(&'a Group, &'a Task)> {
    let group = resolve_group(board, &args.group)?;
    let selector = args.task.trim();
    if let Some(task) = group.task(selector) {
        return Ok((group, task));
    }

    let mut seen = HashSet::new();
    let mut matches: Vec<&Task> = Vec::new();
    let by_prefix = group
        .tasks
        .iter()
        .filter(|task| selector.len() >= MIN_ID_PREFIX && task.id.starts_with(selector));
    let by_name = group
        .tasks
        .iter()
        .filter(|task| task.name.eq_ignore_ascii_case(selector));
    for task in by_prefix.chain(by_name) {
        if seen.insert(task.id.as_str()) {
            matches.push(task);
        }
    }

    match matches.as_slice() {
        [task] => Ok((group, *task)),
        [] => Err(not_found_error(
            "TASK_NOT_FOUND",
            format!("task '{selector}' not found in '{}'", group.title),
        )),
        many => Err(conflict_error(
            "TASK_AMBIGUOUS",
            format!("'{selector}' matches {} tasks; use an id", many.len()),
            Some(json!(many.iter().map(|task| task.id.as_str()).collect::<Vec<_>>())),
        )),
    }
}

fn group_json(group: &Group) -> Value {
    json!({
        "id": group.id,
        "title": group.title,
        "color": group.color,
        "is_pinned": group.is_pinned,
        "columns": group.columns.iter().map(|column| json!({
            "id": column.id,
            "title": column.title,
            "type": column.column_type.as_str(),
            "width": column.width
        })).collect::<Vec<_>>(),
        "task_count": group.tasks.len()
    })
}

fn task_json(group: &Group, task: &Task) -> Value {
    json!({
        "id": task.id,
        "name": task.name,
        "order": task.order,
        "selected": task.selected,
        "status": resolve_task_status(group, task).as_str(),
        "priority": task.priority.as_str(),
        "person_id": task.person_id,
        "due_date": task.due_date,
        "text_values": task.text_values,
        "subtasks": task.subtasks.iter().map(|subtask| json!({
            "id": subtask.id,
            "name": subtask.name,
            "status": subtask.status.as_str()
        })).collect::<Vec<_>>()
    })
}

fn progress_json(summary: &ProgressSummary) -> Value {
    json!({
        "total": summary.total,
        "weighted": summary.weighted,
        "rounded": summary.rounded_weighted(),
        "counts": {
            "new": summary.counts.get(Status::New),
            "pending": summary.counts.get(Status::Pending),
            "working": summary.counts.get(Status::Working),
            "almost_finish": summary.counts.get(Status::AlmostFinish),
            "done": summary.counts.get(Status::Done),
            "stuck": summary.counts.get(Status::Stuck)
        }
    })
}

fn usage_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 2,
        code,
        message: message.into(),
        details: None,
    }
}

fn not_found_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 3,
        code,
        message: message.into(),
        details: None,
    }
}

fn conflict_error(code: &'static str, message: impl Into<String>, details: Option<Value>) -> CliError {
    CliError {
        exit_code: 4,
        code,
        message: message.into(),
        details,
    }
}

fn runtime_error(err: impl std::fmt::Display) -> CliError {
    CliError {
        exit_code: 5,
        code: "RUNTIME_ERROR",
        message: err.to_string(),
        details: None,
    }
}

fn print_success(output: CommandOutput, board_path: &Path, json_output: bool, quiet: bool) {
    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "command": output.command,
            "board": board_path.display().to_string(),
            "data": output.data
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => println!("{value}"),
            Err(_) => println!("{}", payload),
        }
        return;
    }

    if quiet {
        return;
    }

    if output.text.is_empty() {
        println!("ok");
    } else {
        println!("{}", output.text);
    }
}

fn print_error(err: &CliError, json_output: bool) {
    error!(
        code = err.code,
        message = %err.message,
        details = ?err.details,
        "cli command failed"
    );

    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "error": {
                "code": err.code,
                "message": err.message,
                "details": err.details
            }
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => eprintln!("{value}"),
            Err(_) => eprintln!("{}", payload),
        }
        return;
    }

    eprintln!("error[{}]: {}", err.code, err.message);
}

fn format_anyhow_error_chain(err: &anyhow::Error) -> String {
    let mut seen = HashSet::new();
    let mut parts = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if seen.contains(&text) {
            continue;
        }
        seen.insert(text.clone());
        parts.push(text);
    }

    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn board_with_tasks() -> Board {
        let board = actions::add_group(&Board::default(), Some("Sprint"));
        let group_id = board.groups[0].id.clone();
        let board = actions::add_task(&board, &group_id, "Write docs", None).unwrap();
        actions::add_task(&board, &group_id, "Ship release", None).unwrap()
    }

    fn written(outcome: Outcome) -> (Board, CommandOutput) {
        match outcome {
            Outcome::Write(board, output) => (board, output),
            Outcome::Read(_) => panic!("expected a mutation"),
        }
    }

    #[test]
    fn groups_resolve_by_id_or_title() {
        let board = board_with_tasks();
        let id = board.groups[0].id.clone();
        assert_eq!(resolve_group(&board, &id).unwrap().id, id);
        assert_eq!(resolve_group(&board, "sprint").unwrap().id, id);

        let err = resolve_group(&board, "Backlog").unwrap_err();
        assert_eq!(err.exit_code, 3);
        assert_eq!(err.code, "GROUP_NOT_FOUND");
    }

    #[test]
    fn duplicate_titles_are_ambiguous() {
        let board = actions::add_group(&board_with_tasks(), Some("Sprint"));
        let err = resolve_group(&board, "Sprint").unwrap_err();
        assert_eq!(err.exit_code, 4);
        assert_eq!(err.code, "GROUP_AMBIGUOUS");
    }

    #[test]
    fn tasks_resolve_by_prefix_or_name() {
        let board = board_with_tasks();
        let task = &board.groups[0].tasks[1];
        let by_prefix = TaskSelectorArgs {
            group: "Sprint".to_string(),
            task: task.id[..8].to_string(),
        };
        assert_eq!(resolve_task_selector(&board, &by_prefix).unwrap().1.id, task.id);

        let by_name = TaskSelectorArgs {
            group: "Sprint".to_string(),
            task: "ship release".to_string(),
        };
        assert_eq!(resolve_task_selector(&board, &by_name).unwrap().1.id, task.id);
    }

    #[test]
    fn set_routes_primary_and_secondary_columns() {
        let board = board_with_tasks();
        let args = TaskSetArgs {
            selector: TaskSelectorArgs {
                group: "Sprint".to_string(),
                task: "Write docs".to_string(),
            },
            column: "Status".to_string(),
            value: "done".to_string(),
        };
        let (next, _) = written(task_set(&board, args).unwrap());
        assert_eq!(next.groups[0].tasks[0].status, Status::Done);

        let owner = TaskSetArgs {
            selector: TaskSelectorArgs {
                group: "Sprint".to_string(),
                task: "Write docs".to_string(),
            },
            column: "Owner".to_string(),
            value: "max".to_string(),
        };
        let (next, _) = written(task_set(&next, owner).unwrap());
        assert_eq!(next.groups[0].tasks[0].person_id.as_deref(), Some("p1"));
    }

    #[test]
    fn invalid_values_are_usage_errors() {
        let board = board_with_tasks();
        let args = TaskSetArgs {
            selector: TaskSelectorArgs {
                group: "Sprint".to_string(),
                task: "Write docs".to_string(),
            },
            column: "Due Date".to_string(),
            value: "someday".to_string(),
        };
        let err = task_set(&board, args).err().unwrap();
        assert_eq!(err.exit_code, 2);
        assert_eq!(err.code, "INVALID_VALUE");
    }

    #[test]
    fn protected_name_column_maps_to_usage_error() {
        let board = board_with_tasks();
        let args = ColumnSelectorArgs {
            group: "Sprint".to_string(),
            column: "col_name".to_string(),
        };
        let err = execute_column_command(&board, &Settings::default(), ColumnCommand::Delete(args))
            .err()
            .unwrap();
        assert_eq!(err.exit_code, 2);
        assert_eq!(err.code, "PROTECTED_COLUMN");
    }

    #[test]
    fn show_text_includes_footer_row() {
        let board = board_with_tasks();
        let args = ShowArgs {
            group: None,
            query: String::new(),
            status: "all".to_string(),
            sort: "name".to_string(),
        };
        let output = show(&board, &Settings::default(), &args).unwrap();
        assert!(output.text.starts_with("Sprint (2 tasks, 10%)"));
        assert!(output.text.contains("Ship release"));
        assert!(output.text.contains("2 count"));
        assert_eq!(output.data["groups"][0]["tasks"][0]["name"], "Ship release");
    }

    #[test]
    fn execute_persists_mutations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.json");
        let add = RootCommand::Group {
            command: GroupCommand::Add(GroupAddArgs {
                title: Some("Backlog".to_string()),
            }),
        };
        execute(&path, &Settings::default(), add).unwrap();

        let task = RootCommand::Task {
            command: TaskCommand::Add(TaskAddArgs {
                group: "Backlog".to_string(),
                name: "Triage".to_string(),
                values: vec!["Priority=High".to_string()],
            }),
        };
        let output = execute(&path, &Settings::default(), task).unwrap();
        assert_eq!(output.data["priority"], "High");

        let board = load_board(&path).unwrap();
        assert_eq!(board.groups[0].tasks[0].name, "Triage");
    }

    #[test]
    fn table_pads_to_widest_cell() {
        let table = render_text_table(&["A", "Bee"], &[vec!["long".to_string(), "x".to_string()]]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "+------+-----+");
        assert_eq!(lines[1], "| A    | Bee |");
        assert_eq!(lines[3], "| long | x   |");
    }

    #[test]
    fn format_anyhow_error_chain_includes_context_and_root_cause() {
        let err = anyhow::anyhow!("expected value at line 1").context("failed to parse board file");
        let message = format_anyhow_error_chain(&err);
        assert_eq!(message, "failed to parse board file: expected value at line 1");
    }
}
