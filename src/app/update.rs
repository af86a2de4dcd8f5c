use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::cells::inline::{InlineEdit, InlineOutcome, apply_inline};
use crate::cells::overlay::{Rect, Viewport};
use crate::cells::{CellKey, write_cell};
use crate::codec::CellValue;
use crate::types::ColumnType;
use crate::ui::task_row::{cell_changed, subtask_cell_changed};

use super::actions::{self, ColumnEdge, NewColumn, SelectionScope};
use super::column_drag::{drag_start, drop_column};
use super::editors::EditorOutcome;
use super::interaction::{InteractionKind, InteractionLayer};
use super::row_drag::{DragKeyOutcome, DragOrigin, RowDrag};
use super::state::{
    ColumnMenu, ColumnMenuAction, Focus, ResizeSession, add_column_items, column_option_items,
};
use super::{BoardApp, Message};

impl BoardApp {
    pub fn update(&mut self, message: Message) -> Result<()> {
        match message {
            Message::Key(key) => self.handle_key(key)?,
            Message::Resize(width, height) => {
                self.viewport = Viewport::new(width, height);
                self.interaction_map.clear();
                self.dismiss_all();
            }
            Message::Click { x, y } => self.handle_click(x, y)?,
            Message::RightClick { x, y } => {
                if let Some(message) =
                    self.interaction_map
                        .resolve_message(x, y, InteractionKind::RightClick)
                {
                    self.update(message)?;
                }
            }

            Message::FocusCell(key) => self.focus = Focus::Cell(key),
            Message::FocusRow { group_id, task_id } => {
                self.focus = Focus::Row { group_id, task_id };
            }
            Message::ToggleCell { key, trigger } => {
                let viewport = self.viewport;
                if let Some(editor) = self.prepare_editor(&key) {
                    let outcome = editor.toggle(trigger, viewport);
                    self.finish_edit(&key, outcome);
                }
                self.focus = Focus::Cell(key);
            }
            Message::PickOption { key, index } => {
                if let Some(editor) = self.editors.get_mut(&key) {
                    let outcome = editor.select(index);
                    self.finish_edit(&key, outcome);
                }
            }
            Message::DismissCell(key) => {
                if let Some(editor) = self.editors.get_mut(&key) {
                    editor.dismiss();
                }
            }
            Message::DropdownSearch { key, search } => {
                if let Some(editor) = self.editors.get_mut(&key) {
                    editor.set_search(&search);
                }
            }
            Message::InlineEdit { key, edit } => self.inline_edit(&key, &edit),

            Message::ToggleTaskSelected { group_id, task_id } => {
                let selected = self
                    .board
                    .group(&group_id)
                    .and_then(|group| group.task(&task_id))
                    .is_some_and(|task| task.selected);
                let next = actions::set_task_selected(&self.board, &group_id, &task_id, !selected);
                self.apply(next);
            }
            Message::ToggleGroupSelected(scope) => {
                let all_selected = match &scope {
                    SelectionScope::Group(group_id) => self
                        .board
                        .group(group_id)
                        .is_some_and(|group| group.all_selected()),
                    SelectionScope::All => {
                        !self.board.groups.is_empty()
                            && self.board.groups.iter().all(|group| group.all_selected())
                    }
                };
                let next = actions::set_group_selected(&self.board, &scope, !all_selected);
                self.apply(next);
            }
            Message::DeleteSelected => {
                let next = actions::delete_selected_tasks(&self.board);
                self.apply(Ok(next));
            }
            Message::DuplicateSelected => {
                let next = actions::duplicate_selected_tasks(&self.board);
                self.apply(Ok(next));
            }

            Message::AddTask(group_id) => self.add_task(&group_id),
            Message::DeleteTask { group_id, task_id } => {
                let next = actions::delete_task(&self.board, &group_id, &task_id);
                if self.apply(next) {
                    self.ui.forget_task(&task_id);
                }
            }
            Message::ToggleExpand(task_id) => {
                self.ui.toggle_expanded(&task_id);
            }
            Message::SubtaskInput { task_id, text } => self.ui.set_subtask_input(&task_id, &text),
            Message::AddSubtask { group_id, task_id } => {
                let name = self.ui.subtask_input(&task_id).to_string();
                let next = actions::add_subtask(&self.board, &group_id, &task_id, &name);
                if self.apply(next) {
                    self.ui.clear_subtask_input(&task_id);
                }
            }
            Message::CancelSubtask(task_id) => self.ui.clear_subtask_input(&task_id),
            Message::RenameSubtask {
                group_id,
                task_id,
                subtask_id,
                name,
            } => self.rename_subtask(&group_id, &task_id, &subtask_id, name),

            Message::AddGroup => {
                let next = actions::add_group(&self.board, None);
                self.apply(Ok(next));
            }
            Message::DeleteGroup(group_id) => {
                let next = actions::delete_group(&self.board, &group_id);
                if self.apply(next) {
                    self.ui.forget_group(&group_id);
                }
            }
            Message::RenameGroup { group_id, title } => {
                let next = actions::rename_group(&self.board, &group_id, &title);
                self.apply(next);
            }
            Message::TogglePin(group_id) => {
                let next = actions::toggle_group_pin(&self.board, &group_id);
                self.apply(next);
            }
            Message::ToggleCollapse(group_id) => {
                self.ui.toggle_collapsed(&group_id);
            }

            Message::AddColumn { group_id, column } => {
                let next = actions::add_column(&self.board, &group_id, column);
                self.apply(next);
            }
            Message::RenameColumn {
                group_id,
                column_id,
                title,
            } => {
                let next = actions::rename_column(&self.board, &group_id, &column_id, &title);
                self.apply(next);
            }
            Message::DeleteColumn {
                group_id,
                column_id,
            } => {
                let next = actions::delete_column(&self.board, &group_id, &column_id);
                self.apply(next);
            }
            Message::DuplicateColumn {
                group_id,
                column_id,
            } => {
                let next = actions::duplicate_column(&self.board, &group_id, &column_id);
                self.apply(next);
            }
            Message::MoveColumnTo {
                group_id,
                column_id,
                edge,
            } => {
                let next = actions::move_column_to(&self.board, &group_id, &column_id, edge);
                self.apply(next);
            }
            Message::OpenColumnMenu {
                group_id,
                column_id,
                trigger,
            } => self.open_column_menu(&group_id, column_id.as_deref(), trigger),
            Message::PickColumnMenu(index) => self.pick_column_menu(index)?,
            Message::DismissColumnMenu => self.ui.column_menu = None,
            Message::ResizeStart {
                group_id,
                column_id,
                x,
            } => {
                let width = self
                    .board
                    .group(&group_id)
                    .and_then(|group| group.column(&column_id))
                    .map(|column| column.width);
                if let Some(start_width) = width {
                    self.ui.resizing = Some(ResizeSession {
                        group_id,
                        column_id,
                        start_x: x,
                        start_width,
                    });
                }
            }
            Message::ResizeMove { x } => {
                if let Some(session) = self.ui.resizing.clone() {
                    let min_width = self.settings.min_column_width;
                    let next = actions::resize_column(
                        &self.board,
                        &session.group_id,
                        &session.column_id,
                        session.width_at(x, min_width),
                        min_width,
                    );
                    if !self.apply(next) {
                        self.ui.resizing = None;
                    }
                }
            }
            Message::ResizeEnd => self.ui.resizing = None,
            Message::ColumnDragStart {
                group_id,
                column_id,
                index,
            } => self.column_drag = drag_start(&group_id, &column_id, index),
            Message::ColumnDrop { group_id, index } => {
                if let Some(data) = self.column_drag.take()
                    && let Some(next) = drop_column(&self.board, &group_id, index, &data).transpose()
                {
                    self.apply(next);
                }
            }
            Message::ColumnDragEnd => self.column_drag = None,

            Message::RowPointerDown {
                group_id,
                task_id,
                x,
                y,
            } => {
                if let Some(origin) = self.drag_origin(&group_id, &task_id) {
                    self.row_drag = Some(RowDrag::pointer_down(
                        origin,
                        x,
                        y,
                        self.settings.drag_activation_distance,
                    ));
                }
            }
            Message::RowPointerMove { x, y, over } => {
                if let Some(drag) = self.row_drag.as_mut() {
                    if drag.pointer_move(x, y) {
                        debug!(task_id = %drag.origin().task_id, "row drag activated");
                    }
                    drag.hover(over);
                }
            }
            Message::RowPointerUp => self.finish_row_drag(),
            Message::RowDragCancel => self.cancel_row_drag(),

            Message::SetQuery(query) => self.filter.query = query,
            Message::SetStatusFilter(status) => self.filter.status = status,
            Message::SetSort(sort) => self.filter.sort = sort,

            Message::Save => self.save()?,
        }
        self.sync_menu_regions();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return self.save();
        }

        if let Some(drag) = self.row_drag.as_mut() {
            if drag.is_active() {
                match drag.handle_key(key, &self.board) {
                    DragKeyOutcome::Continue => {}
                    DragKeyOutcome::Drop => self.finish_row_drag(),
                    DragKeyOutcome::Cancel => self.cancel_row_drag(),
                }
                return Ok(());
            }
            if key.code == KeyCode::Esc {
                self.cancel_row_drag();
                return Ok(());
            }
        }

        if let Some(menu) = self.ui.column_menu.as_mut()
            && menu.is_open()
        {
            match key.code {
                KeyCode::Esc => self.ui.column_menu = None,
                KeyCode::Up => {
                    menu.popover_mut().move_selection(-1);
                }
                KeyCode::Down => {
                    menu.popover_mut().move_selection(1);
                }
                KeyCode::Enter => {
                    if let Some(index) = menu.popover().highlighted() {
                        return self.pick_column_menu(index);
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        match self.focus.clone() {
            Focus::Cell(cell) => self.handle_cell_key(&cell, key),
            Focus::Row { group_id, task_id } => self.handle_row_key(&group_id, &task_id, key),
            Focus::None => {
                if key.code == KeyCode::Esc {
                    self.dismiss_all();
                }
                Ok(())
            }
        }
    }

    fn handle_cell_key(&mut self, cell: &CellKey, key: KeyEvent) -> Result<()> {
        let viewport = self.viewport;
        if let Some(editor) = self.prepare_editor(cell) {
            let outcome = editor.handle_key(key, viewport);
            self.finish_edit(cell, outcome);
            return Ok(());
        }
        match key.code {
            KeyCode::Enter if cell.is_draft() => self.add_task(&cell.group_id),
            KeyCode::Esc => self.focus = Focus::None,
            _ => {}
        }
        Ok(())
    }

    fn handle_row_key(&mut self, group_id: &str, task_id: &str, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char(' ') => {
                if let Some(origin) = self.drag_origin(group_id, task_id) {
                    self.row_drag = Some(RowDrag::keyboard_pickup(origin));
                }
            }
            KeyCode::Delete => {
                return self.update(Message::DeleteTask {
                    group_id: group_id.to_string(),
                    task_id: task_id.to_string(),
                });
            }
            KeyCode::Right | KeyCode::Left => {
                self.ui.toggle_expanded(task_id);
            }
            KeyCode::Esc => self.focus = Focus::None,
            _ => {}
        }
        Ok(())
    }

    /// Closes every open menu the click missed, then routes the click. Hits
    /// on the base layer under an open menu are swallowed by the menu.
    fn handle_click(&mut self, x: f64, y: f64) -> Result<()> {
        let mut inside_menu = false;
        for editor in self.editors.values_mut().filter(|editor| editor.is_open()) {
            if editor.contains(x, y) {
                inside_menu |= editor
                    .menu_rect()
                    .is_some_and(|rect| rect.contains(x, y));
            } else {
                editor.dismiss();
            }
        }
        let column_menu_hit = self.ui.column_menu.as_ref().map(|menu| {
            (
                menu.contains(x, y),
                menu.popover()
                    .menu_rect()
                    .is_some_and(|rect| rect.contains(x, y)),
            )
        });
        match column_menu_hit {
            Some((false, _)) => self.ui.column_menu = None,
            Some((true, in_menu)) => inside_menu |= in_menu,
            None => {}
        }
        self.sync_menu_regions();

        let Some(node) = self
            .interaction_map
            .resolve_node(x, y, InteractionKind::LeftClick)
        else {
            return Ok(());
        };
        if inside_menu && node.layer == InteractionLayer::Base {
            return Ok(());
        }
        let message = node.message.clone();
        self.update(message)
    }

    fn finish_edit(&mut self, key: &CellKey, outcome: EditorOutcome) {
        if let EditorOutcome::Commit(value) = outcome {
            self.commit_cell(key, value);
        }
    }

    /// Routes a committed value: draft cells accumulate into the group's
    /// draft, task cells become a row mutation.
    fn commit_cell(&mut self, key: &CellKey, value: Option<CellValue>) {
        let Some(column) = self.column_for(key).cloned() else {
            return;
        };
        match key.task_id.as_deref() {
            None => write_cell(&column, value.as_ref()).apply_to_draft(self.ui.draft_mut(&key.group_id)),
            Some(task_id) => {
                let event = cell_changed(&key.group_id, task_id, &column, value.as_ref());
                let next = actions::apply_row_event(&self.board, &event);
                self.apply(next);
            }
        }
    }

    fn inline_edit(&mut self, key: &CellKey, edit: &InlineEdit) {
        let Some(column_type) = self.column_for(key).map(|column| column.column_type) else {
            return;
        };
        let current = self.cell_raw(key);
        match apply_inline(column_type, current.as_deref(), edit) {
            InlineOutcome::Write(value) => self.commit_cell(key, value),
            InlineOutcome::Rejected => {
                debug!(column_id = %key.column_id, ?edit, "inline edit rejected");
            }
        }
    }

    /// Commits the group's draft as a task and clears the slot. A blank name
    /// keeps the draft.
    fn add_task(&mut self, group_id: &str) {
        let draft = self.ui.draft(group_id).cloned();
        let name = draft
            .as_ref()
            .and_then(|draft| draft.name.clone())
            .unwrap_or_default();
        let next = actions::add_task(&self.board, group_id, &name, draft.as_ref());
        if self.apply(next) {
            self.ui.clear_draft(group_id);
            self.editors
                .retain(|key, _| !(key.is_draft() && key.group_id == group_id));
        }
    }

    fn rename_subtask(&mut self, group_id: &str, task_id: &str, subtask_id: &str, name: String) {
        let event = self.board.group(group_id).and_then(|group| {
            let task = group.task(task_id)?;
            let column = group
                .columns
                .iter()
                .find(|column| column.column_type == ColumnType::Name)?;
            subtask_cell_changed(group_id, task, subtask_id, column, Some(&CellValue::Text(name)))
        });
        match event {
            Some(event) => {
                let next = actions::apply_row_event(&self.board, &event);
                self.apply(next);
            }
            None => debug!(%task_id, %subtask_id, "subtask rename had no target"),
        }
    }

    fn open_column_menu(&mut self, group_id: &str, column_id: Option<&str>, trigger: Rect) {
        let Some(group) = self.board.group(group_id) else {
            return;
        };
        let items = match column_id {
            None => add_column_items(),
            Some(column_id) => match group.columns.iter().position(|column| column.id == column_id) {
                Some(index) => column_option_items(index),
                None => return,
            },
        };
        if items.is_empty() {
            debug!(%group_id, ?column_id, "column has no menu actions");
            return;
        }
        self.ui.column_menu = Some(ColumnMenu::open(
            group_id,
            column_id,
            items,
            trigger,
            self.viewport,
        ));
    }

    fn pick_column_menu(&mut self, index: usize) -> Result<()> {
        let Some(menu) = self.ui.column_menu.as_mut() else {
            return Ok(());
        };
        let Some(action) = menu.pick(index) else {
            return Ok(());
        };
        let group_id = menu.group_id.clone();
        let column_id = menu.column_id.clone();
        self.ui.column_menu = None;

        let message = match (action, column_id) {
            (ColumnMenuAction::Add(column_type), _) => {
                let mut column = NewColumn::new(column_type);
                column.width = self.settings.default_column_width;
                Message::AddColumn { group_id, column }
            }
            (ColumnMenuAction::Duplicate, Some(column_id)) => Message::DuplicateColumn {
                group_id,
                column_id,
            },
            (ColumnMenuAction::MoveToStart, Some(column_id)) => Message::MoveColumnTo {
                group_id,
                column_id,
                edge: ColumnEdge::Start,
            },
            (ColumnMenuAction::MoveToEnd, Some(column_id)) => Message::MoveColumnTo {
                group_id,
                column_id,
                edge: ColumnEdge::End,
            },
            (ColumnMenuAction::Delete, Some(column_id)) => Message::DeleteColumn {
                group_id,
                column_id,
            },
            (_, None) => return Ok(()),
        };
        self.update(message)
    }

    fn drag_origin(&self, group_id: &str, task_id: &str) -> Option<DragOrigin> {
        let index = self
            .board
            .group(group_id)?
            .tasks
            .iter()
            .position(|task| task.id == task_id)?;
        Some(DragOrigin {
            group_id: group_id.to_string(),
            task_id: task_id.to_string(),
            index,
        })
    }

    fn finish_row_drag(&mut self) {
        let Some(drag) = self.row_drag.take() else {
            return;
        };
        if let Some(next) = drag.finish(&self.board).transpose() {
            self.apply(next);
        }
    }

    fn cancel_row_drag(&mut self) {
        if let Some(drag) = self.row_drag.take() {
            debug!(task_id = %drag.origin().task_id, "row drag cancelled");
        }
    }
}
