use std::collections::BTreeMap;

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

use taskboard_grid::app::actions::{self, SelectionScope};
use taskboard_grid::app::interaction::InteractionKind;
use taskboard_grid::app::row_drag::DropTarget;
use taskboard_grid::app::{BoardApp, Message};
use taskboard_grid::board_utils::{calculate_progress, resolve_task_status};
use taskboard_grid::cells::CellKey;
use taskboard_grid::cells::inline::InlineEdit;
use taskboard_grid::cells::overlay::Rect;
use taskboard_grid::cells::popover::MENU_ITEM_HEIGHT;
use taskboard_grid::settings::Settings;
use taskboard_grid::store::{load_board, save_board};
use taskboard_grid::types::{
    Board, COL_DATE, COL_NAME, COL_PRIORITY, COL_STATUS, Column, ColumnType, Group, Priority,
    Status, Task, TaskPatch,
};
use taskboard_grid::ui::task_row::{cell_changed, subtask_cell_changed};

fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn task(id: &str, status: Status) -> Task {
    let mut task = Task::new(id, format!("Task {id}"));
    task.status = status;
    task
}

fn scenario_group() -> Group {
    Group {
        id: "g1".to_string(),
        title: "Sprint".to_string(),
        color: "#579bfc".to_string(),
        columns: vec![
            Column::new(COL_NAME, "Item", ColumnType::Name, 300),
            Column::new(COL_STATUS, "Status", ColumnType::Status, 128),
            Column::new(COL_PRIORITY, "Priority", ColumnType::Priority, 128),
        ],
        tasks: vec![
            task("t1", Status::Done),
            task("t2", Status::Working),
            task("t3", Status::Pending),
            task("t4", Status::Stuck),
        ],
        is_pinned: false,
    }
}

/// Two groups with the default columns: "A" holding three tasks, "B" two.
fn two_group_app() -> Result<BoardApp> {
    let mut board = actions::add_group(&Board::default(), Some("A"));
    board = actions::add_group(&board, Some("B"));
    let (a, b) = (board.groups[0].id.clone(), board.groups[1].id.clone());
    for name in ["a1", "a2", "a3"] {
        board = actions::add_task(&board, &a, name, None)?;
    }
    for name in ["b1", "b2"] {
        board = actions::add_task(&board, &b, name, None)?;
    }
    Ok(BoardApp::new(board, Settings::default()))
}

fn ids(app: &BoardApp, index: usize) -> (String, Vec<String>) {
    let group = &app.board.groups[index];
    (
        group.id.clone(),
        group.tasks.iter().map(|task| task.id.clone()).collect(),
    )
}

#[test]
fn weighted_progress_over_mixed_statuses() {
    let summary = calculate_progress(&scenario_group(), None);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.counts.get(Status::Done), 1);
    assert_eq!(summary.counts.get(Status::Working), 1);
    assert_eq!(summary.counts.get(Status::Pending), 1);
    assert_eq!(summary.counts.get(Status::Stuck), 1);
    assert_eq!(summary.counts.get(Status::AlmostFinish), 0);
    assert_eq!(summary.counts.get(Status::New), 0);
    assert!((summary.weighted - 43.75).abs() < 1e-9);
}

#[test]
fn custom_status_column_reads_text_values() {
    let mut group = scenario_group();
    group.columns[1].id = "col_status_2".to_string();
    let mut item = Task::new("t9", "Review me");
    item.text_values = BTreeMap::from([("col_status_2".to_string(), "In Review".to_string())]);
    assert_eq!(resolve_task_status(&group, &item), Status::AlmostFinish);
}

#[test]
fn status_resolution_is_total_and_progress_is_bounded() {
    let raw_values = ["", "done", "Working on it", "blocked", "todo", "??", "Almost there"];
    for status_column_id in [COL_STATUS, "col_custom_status"] {
        let mut group = scenario_group();
        group.columns[1].id = status_column_id.to_string();
        group.tasks = raw_values
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let mut item = Task::new(format!("t{index}"), *raw);
                item.text_values
                    .insert("col_custom_status".to_string(), raw.to_string());
                item
            })
            .collect();

        for item in &group.tasks {
            assert!(Status::ALL.contains(&resolve_task_status(&group, item)));
        }
        let summary = calculate_progress(&group, None);
        assert_eq!(summary.counts.sum(), summary.total);
        assert!((0.0..=100.0).contains(&summary.weighted));
    }

    let mut stuck = scenario_group();
    for item in &mut stuck.tasks {
        item.status = Status::Stuck;
    }
    assert_eq!(calculate_progress(&stuck, None).weighted, 0.0);

    let mut empty = scenario_group();
    empty.tasks.clear();
    let summary = calculate_progress(&empty, None);
    assert_eq!((summary.total, summary.weighted), (0, 0.0));
}

#[test]
fn same_patch_twice_equals_once() -> Result<()> {
    let board = Board {
        groups: vec![scenario_group()],
        ..Board::default()
    };
    let patch = TaskPatch {
        status: Some(Status::Done),
        priority: Some(Priority::Urgent),
        due_date: Some(Some("2026-03-01".to_string())),
        ..TaskPatch::default()
    };
    let once = actions::update_task(&board, "g1", "t2", &patch)?;
    let twice = actions::update_task(&once, "g1", "t2", &patch)?;
    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn subtask_rows_only_edit_their_name() -> Result<()> {
    let mut board = Board {
        groups: vec![scenario_group()],
        ..Board::default()
    };
    board = actions::add_subtask(&board, "g1", "t1", "Draft outline")?;
    let group = &board.groups[0];
    let parent = group.task("t1").context("parent task")?;
    let subtask_id = parent.subtasks[0].id.clone();

    for column in &group.columns[1..] {
        let value = taskboard_grid::codec::decode(column.column_type, Some("Done"));
        assert!(subtask_cell_changed("g1", parent, &subtask_id, column, value.as_ref()).is_none());
    }
    assert!(
        subtask_cell_changed(
            "g1",
            parent,
            &subtask_id,
            &group.columns[0],
            Some(&taskboard_grid::codec::CellValue::Text("Outline".to_string())),
        )
        .is_some()
    );
    Ok(())
}

#[test]
fn draft_commit_clears_slot_and_appends_in_order() -> Result<()> {
    let mut app = two_group_app()?;
    let (group_id, before) = ids(&app, 1);

    app.update(Message::InlineEdit {
        key: CellKey::draft(&group_id, COL_NAME),
        edit: InlineEdit::Text("Plan launch".to_string()),
    })?;
    let status_key = CellKey::draft(&group_id, COL_STATUS);
    app.update(Message::ToggleCell {
        key: status_key.clone(),
        trigger: Rect::new(300.0, 120.0, 128.0, 36.0),
    })?;
    app.update(Message::PickOption {
        key: status_key,
        index: 5,
    })?;
    assert!(app.ui.draft(&group_id).is_some());

    app.update(Message::AddTask(group_id.clone()))?;

    assert!(app.ui.draft(&group_id).is_none());
    let group = app.board.group(&group_id).context("group")?;
    let added = group.tasks.last().context("new task")?;
    assert_eq!(group.tasks.len(), before.len() + 1);
    assert_eq!(added.order, before.len() as i64);
    assert_eq!(added.name, "Plan launch");
    assert_eq!(added.status, Status::Done);
    Ok(())
}

#[test]
fn blank_draft_name_keeps_the_draft() -> Result<()> {
    let mut app = two_group_app()?;
    let (group_id, before) = ids(&app, 0);
    app.update(Message::InlineEdit {
        key: CellKey::draft(&group_id, COL_NAME),
        edit: InlineEdit::Text("   ".to_string()),
    })?;
    app.update(Message::AddTask(group_id.clone()))?;
    assert!(app.ui.draft(&group_id).is_some());
    assert_eq!(app.board.groups[0].tasks.len(), before.len());
    Ok(())
}

#[test]
fn pointer_drag_moves_task_across_groups() -> Result<()> {
    let mut app = two_group_app()?;
    let (a, a_tasks) = ids(&app, 0);
    let (b, _) = ids(&app, 1);
    let moved = a_tasks[0].clone();

    app.update(Message::RowPointerDown {
        group_id: a.clone(),
        task_id: moved.clone(),
        x: 10.0,
        y: 10.0,
    })?;
    app.update(Message::RowPointerMove {
        x: 12.0,
        y: 11.0,
        over: None,
    })?;
    assert!(!app.row_drag().context("pending drag")?.is_active());
    app.update(Message::RowPointerMove {
        x: 40.0,
        y: 200.0,
        over: Some(DropTarget {
            group_id: b.clone(),
            index: 1,
        }),
    })?;
    assert_eq!(app.board.group(&a).context("a")?.tasks.len(), 3);

    app.update(Message::RowPointerUp)?;

    let source = app.board.group(&a).context("a")?;
    let destination = app.board.group(&b).context("b")?;
    assert_eq!(source.tasks.len(), 2);
    assert_eq!(destination.tasks.len(), 3);
    assert_eq!(destination.tasks[1].id, moved);
    assert!(app.row_drag().is_none());
    Ok(())
}

#[test]
fn cancelled_drag_leaves_board_untouched() -> Result<()> {
    let mut app = two_group_app()?;
    let before = app.board.clone();
    let (a, a_tasks) = ids(&app, 0);
    let (b, _) = ids(&app, 1);

    app.update(Message::RowPointerDown {
        group_id: a,
        task_id: a_tasks[2].clone(),
        x: 0.0,
        y: 0.0,
    })?;
    app.update(Message::RowPointerMove {
        x: 0.0,
        y: 80.0,
        over: Some(DropTarget { group_id: b, index: 0 }),
    })?;
    app.update(key(KeyCode::Esc))?;

    assert!(app.row_drag().is_none());
    assert_eq!(app.board, before);
    assert!(!app.dirty);
    Ok(())
}

#[test]
fn keyboard_pickup_reorders_within_group() -> Result<()> {
    let mut app = two_group_app()?;
    let (a, a_tasks) = ids(&app, 0);
    app.update(Message::FocusRow {
        group_id: a.clone(),
        task_id: a_tasks[0].clone(),
    })?;
    app.update(key(KeyCode::Char(' ')))?;
    app.update(key(KeyCode::Down))?;
    app.update(key(KeyCode::Down))?;
    app.update(key(KeyCode::Enter))?;

    let (_, after) = ids(&app, 0);
    assert_eq!(after, vec![a_tasks[1].clone(), a_tasks[2].clone(), a_tasks[0].clone()]);
    let orders: Vec<i64> = app.board.groups[0].tasks.iter().map(|task| task.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn status_flyout_near_viewport_bottom_opens_above() -> Result<()> {
    let mut app = two_group_app()?;
    app.update(Message::Resize(1280.0, 800.0))?;
    let (a, a_tasks) = ids(&app, 0);
    let cell = CellKey::task(&a, &a_tasks[0], COL_STATUS);
    let trigger = Rect::new(300.0, 714.0, 128.0, 36.0);

    app.update(Message::ToggleCell {
        key: cell.clone(),
        trigger,
    })?;

    let menu = app
        .editor(&cell)
        .and_then(|editor| editor.menu_rect())
        .context("open status menu")?;
    assert!(menu.top < trigger.top);
    Ok(())
}

#[test]
fn opening_a_cell_keeps_other_cells_open() -> Result<()> {
    let mut app = two_group_app()?;
    let (a, a_tasks) = ids(&app, 0);
    let first = CellKey::task(&a, &a_tasks[0], COL_STATUS);
    let second = CellKey::task(&a, &a_tasks[1], COL_PRIORITY);

    app.update(Message::ToggleCell {
        key: first.clone(),
        trigger: Rect::new(300.0, 100.0, 128.0, 36.0),
    })?;
    app.update(Message::ToggleCell {
        key: second.clone(),
        trigger: Rect::new(430.0, 136.0, 128.0, 36.0),
    })?;
    let mut expected = vec![&first, &second];
    expected.sort();
    assert_eq!(app.open_cells(), expected);

    app.update(Message::Click { x: 1200.0, y: 20.0 })?;
    assert!(app.open_cells().is_empty());
    Ok(())
}

#[test]
fn clicking_a_status_row_commits_it() -> Result<()> {
    let mut app = two_group_app()?;
    let (a, a_tasks) = ids(&app, 0);
    let cell = CellKey::task(&a, &a_tasks[0], COL_STATUS);
    app.register_cell(cell.clone(), Rect::new(300.0, 100.0, 128.0, 36.0));

    app.update(Message::Click { x: 364.0, y: 118.0 })?;
    assert_eq!(app.open_cells(), vec![&cell]);

    // The menu opens 4px below the trigger; "Done" is the sixth row.
    let done_row = 140.0 + 5.0 * MENU_ITEM_HEIGHT + MENU_ITEM_HEIGHT / 2.0;
    app.update(Message::Click { x: 364.0, y: done_row })?;

    assert!(app.open_cells().is_empty());
    let item = app.board.groups[0].task(&a_tasks[0]).context("task")?;
    assert_eq!(item.status, Status::Done);
    assert!(app.dirty);
    assert_eq!(
        app.interaction_map
            .resolve_message(364.0, done_row, InteractionKind::LeftClick),
        None
    );
    Ok(())
}

#[test]
fn right_clicking_a_header_opens_its_menu() -> Result<()> {
    let mut app = two_group_app()?;
    let (a, _) = ids(&app, 0);
    let columns_before = app.board.groups[0].columns.len();
    app.register_header(&a, COL_STATUS, Rect::new(300.0, 60.0, 128.0, 36.0));

    app.update(Message::RightClick { x: 310.0, y: 70.0 })?;
    let menu = app.ui.column_menu.as_ref().context("column menu")?;
    assert_eq!(menu.column_id.as_deref(), Some(COL_STATUS));

    // First row, just under the header: "Duplicate column".
    app.update(Message::Click { x: 310.0, y: 110.0 })?;

    assert!(app.ui.column_menu.is_none());
    let columns = &app.board.groups[0].columns;
    assert_eq!(columns.len(), columns_before + 1);
    assert_eq!(columns[3].column_type, ColumnType::Status);
    Ok(())
}

#[test]
fn add_column_button_lists_every_addable_type() -> Result<()> {
    let mut app = two_group_app()?;
    let (a, _) = ids(&app, 0);
    app.register_add_column(&a, Rect::new(900.0, 60.0, 36.0, 36.0));

    app.update(Message::RightClick { x: 910.0, y: 70.0 })?;
    assert!(app.ui.column_menu.is_none());

    app.update(Message::Click { x: 910.0, y: 70.0 })?;
    let menu = app.ui.column_menu.as_ref().context("add-column menu")?;
    assert_eq!(menu.column_id, None);
    assert!(
        menu.popover()
            .items()
            .iter()
            .all(|item| item.label != "Item")
    );
    Ok(())
}

#[test]
fn committed_cells_update_primary_and_secondary_storage() -> Result<()> {
    let mut app = two_group_app()?;
    let (a, a_tasks) = ids(&app, 0);
    app.update(Message::AddColumn {
        group_id: a.clone(),
        column: actions::NewColumn::new(ColumnType::Text),
    })?;
    let notes = app.board.groups[0]
        .columns
        .last()
        .context("new column")?
        .clone();

    app.update(Message::InlineEdit {
        key: CellKey::task(&a, &a_tasks[0], &notes.id),
        edit: InlineEdit::Text("call vendor".to_string()),
    })?;
    app.update(Message::InlineEdit {
        key: CellKey::task(&a, &a_tasks[0], COL_DATE),
        edit: InlineEdit::PickDate(Some("2026-11-02".to_string())),
    })?;

    let item = app.board.groups[0].task(&a_tasks[0]).context("task")?;
    assert_eq!(item.text_values.get(&notes.id).map(String::as_str), Some("call vendor"));
    assert_eq!(item.due_date.as_deref(), Some("2026-11-02"));
    assert!(app.dirty);
    Ok(())
}

#[test]
fn selection_bulk_actions() -> Result<()> {
    let mut app = two_group_app()?;
    let (a, _) = ids(&app, 0);
    app.update(Message::ToggleGroupSelected(SelectionScope::Group(a.clone())))?;
    assert!(app.board.groups[0].all_selected());

    app.update(Message::DuplicateSelected)?;
    assert_eq!(app.board.groups[0].tasks.len(), 6);
    assert!(app.board.groups[0].tasks[3].name.ends_with(" (Copy)"));

    app.update(Message::DeleteSelected)?;
    assert!(app.board.groups[0].tasks.is_empty());
    assert_eq!(app.board.groups[1].tasks.len(), 2);
    Ok(())
}

#[test]
fn rejected_actions_are_recorded_not_raised() -> Result<()> {
    let mut app = two_group_app()?;
    let (a, _) = ids(&app, 0);
    app.update(Message::DeleteColumn {
        group_id: a,
        column_id: COL_NAME.to_string(),
    })?;
    assert!(app.last_error.is_some());
    assert_eq!(app.board.groups[0].columns[0].id, COL_NAME);
    Ok(())
}

#[test]
fn row_event_round_trips_through_the_store() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("board.json");

    let app = two_group_app()?;
    let group = &app.board.groups[0];
    let column = group.column(COL_STATUS).context("status column")?;
    let event = cell_changed(
        &group.id,
        &group.tasks[0].id,
        column,
        Some(&taskboard_grid::codec::CellValue::Status(Status::Working)),
    );
    let board = actions::apply_row_event(&app.board, &event)?;
    save_board(&board, &path)?;

    let mut reopened = BoardApp::open(&path, Settings::default())?;
    assert_eq!(reopened.board, board);
    assert_eq!(reopened.board.groups[0].tasks[0].status, Status::Working);

    reopened.update(Message::TogglePin(board.groups[1].id.clone()))?;
    reopened.update(Message::Save)?;
    assert!(!reopened.dirty);

    let saved = load_board(&path)?;
    assert!(saved.groups[1].is_pinned);
    assert_eq!(saved.groups_in_display_order()[0].title, "B");
    Ok(())
}
