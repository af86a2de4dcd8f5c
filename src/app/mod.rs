//! The board container: owns the board, transient view state and the live
//! editors and drag sessions, and applies every mutation the grid emits.

pub mod actions;
pub mod column_drag;
pub mod editors;
pub mod interaction;
pub mod messages;
pub mod row_drag;
pub mod state;
mod update;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::cells::CellKey;
use crate::cells::overlay::{Rect, Viewport};
use crate::cells::registry::{Interaction, renderer};
use crate::cells::{read_draft_raw, read_raw};
use crate::error::BoardError;
use crate::matching::TaskFilter;
use crate::settings::Settings;
use crate::store::{load_board, save_board};
use crate::theme::Theme;
use crate::types::{Board, Column, Person, default_people};
use crate::ui::task_group::RowDragVisual;
use crate::ui::{GroupProps, GroupView, group_view};

pub use self::editors::{CellEditor, EditorOutcome};
use self::interaction::{InteractionLayer, InteractionMap};
pub use self::messages::Message;
use self::row_drag::RowDrag;
pub use self::state::{BoardUiState, ColumnMenu, ColumnMenuAction, Focus, ResizeSession};

const DEFAULT_VIEWPORT: Viewport = Viewport::new(1280.0, 800.0);

pub struct BoardApp {
    pub board: Board,
    pub settings: Settings,
    pub theme: Theme,
    pub people: Vec<Person>,
    pub viewport: Viewport,
    pub filter: TaskFilter,
    pub ui: BoardUiState,
    pub focus: Focus,
    pub interaction_map: InteractionMap,
    /// Unsaved changes since load or the last save.
    pub dirty: bool,
    /// Last rejected action, for a status line.
    pub last_error: Option<String>,
    editors: HashMap<CellKey, CellEditor>,
    row_drag: Option<RowDrag>,
    column_drag: Option<String>,
    board_path: Option<PathBuf>,
}

impl BoardApp {
    pub fn new(board: Board, settings: Settings) -> Self {
        let theme = Theme::from_preset(settings.theme_preset());
        Self {
            board,
            settings,
            theme,
            people: default_people(),
            viewport: DEFAULT_VIEWPORT,
            filter: TaskFilter::default(),
            ui: BoardUiState::default(),
            focus: Focus::None,
            interaction_map: InteractionMap::default(),
            dirty: false,
            last_error: None,
            editors: HashMap::new(),
            row_drag: None,
            column_drag: None,
            board_path: None,
        }
    }

    /// Loads the board at `path` and saves back to it.
    pub fn open(path: &Path, settings: Settings) -> Result<Self> {
        let board = load_board(path)?;
        let mut app = Self::new(board, settings);
        app.board_path = Some(path.to_path_buf());
        Ok(app)
    }

    pub fn board_path(&self) -> Option<&Path> {
        self.board_path.as_deref()
    }

    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.board_path.clone() else {
            debug!("board has no backing file; skipping save");
            return Ok(());
        };
        save_board(&self.board, &path)?;
        self.dirty = false;
        Ok(())
    }

    /// Groups in display order (pinned first) projected for rendering.
    pub fn group_views(&self) -> Vec<GroupView> {
        let drag = self.row_drag.as_ref().filter(|drag| drag.is_active());
        self.board
            .groups_in_display_order()
            .into_iter()
            .map(|group| {
                group_view(GroupProps {
                    group,
                    theme: &self.theme,
                    people: &self.people,
                    filter: &self.filter,
                    collapsed: self.ui.is_collapsed(&group.id),
                    expanded: &self.ui.expanded,
                    draft: self.ui.draft(&group.id),
                    subtask_inputs: &self.ui.subtask_inputs,
                    drag: drag.map(|drag| RowDragVisual {
                        task_id: &drag.origin().task_id,
                        offset: drag.offset(),
                    }),
                })
            })
            .collect()
    }

    pub fn editor(&self, key: &CellKey) -> Option<&CellEditor> {
        self.editors.get(key)
    }

    /// Keys of every cell whose menu is currently open.
    pub fn open_cells(&self) -> Vec<&CellKey> {
        let mut keys: Vec<&CellKey> = self
            .editors
            .iter()
            .filter(|(_, editor)| editor.is_open())
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        keys
    }

    pub fn row_drag(&self) -> Option<&RowDrag> {
        self.row_drag.as_ref()
    }

    pub fn column_drag_payload(&self) -> Option<&str> {
        self.column_drag.as_deref()
    }

    /// Registers a laid-out cell for click routing: flyout cells toggle their
    /// menu, everything else takes focus.
    pub fn register_cell(&mut self, key: CellKey, rect: Rect) {
        let message = match self.column_for(&key).map(|column| renderer(column.column_type).interaction()) {
            Some(Interaction::Popover) => Message::ToggleCell {
                key: key.clone(),
                trigger: rect,
            },
            _ => Message::FocusCell(key.clone()),
        };
        if let Some(editor) = self.editors.get_mut(&key) {
            editor.set_trigger(rect);
        }
        self.interaction_map
            .register_click(InteractionLayer::Base, rect, message);
    }

    /// Registers a laid-out column header. Either button opens the column's
    /// menu anchored to the header.
    pub fn register_header(&mut self, group_id: &str, column_id: &str, rect: Rect) {
        self.interaction_map.register_header(
            InteractionLayer::Base,
            rect,
            Message::OpenColumnMenu {
                group_id: group_id.to_string(),
                column_id: Some(column_id.to_string()),
                trigger: rect,
            },
        );
    }

    /// Registers a group's add-column button.
    pub fn register_add_column(&mut self, group_id: &str, rect: Rect) {
        self.interaction_map.register_click(
            InteractionLayer::Base,
            rect,
            Message::OpenColumnMenu {
                group_id: group_id.to_string(),
                column_id: None,
                trigger: rect,
            },
        );
    }

    /// Re-registers the rows of every open flyout on `Overlay` and of the
    /// column menu on `ContextMenu`. Regions of closed menus are dropped.
    fn sync_menu_regions(&mut self) {
        self.interaction_map.clear_layer(InteractionLayer::Overlay);
        self.interaction_map.clear_layer(InteractionLayer::ContextMenu);
        for (key, editor) in self.editors.iter().filter(|(_, editor)| editor.is_open()) {
            for (index, rect) in editor.item_rects() {
                self.interaction_map.register_click(
                    InteractionLayer::Overlay,
                    rect,
                    Message::PickOption {
                        key: key.clone(),
                        index,
                    },
                );
            }
        }
        if let Some(menu) = self.ui.column_menu.as_ref().filter(|menu| menu.is_open()) {
            for (index, rect) in menu.popover().item_rects() {
                self.interaction_map.register_click(
                    InteractionLayer::ContextMenu,
                    rect,
                    Message::PickColumnMenu(index),
                );
            }
        }
    }

    fn column_for(&self, key: &CellKey) -> Option<&Column> {
        self.board.group(&key.group_id)?.column(&key.column_id)
    }

    /// Stored value behind a task or draft cell.
    fn cell_raw(&self, key: &CellKey) -> Option<String> {
        let group = self.board.group(&key.group_id)?;
        let column = group.column(&key.column_id)?;
        match &key.task_id {
            Some(task_id) => read_raw(group.task(task_id)?, column),
            None => read_draft_raw(self.ui.draft(&key.group_id), column),
        }
    }

    /// The editor for `key`, reseeded from the stored value unless it is
    /// open. `None` for cells that are edited in place or no longer exist.
    fn prepare_editor(&mut self, key: &CellKey) -> Option<&mut CellEditor> {
        let open = self.editors.get(key).is_some_and(CellEditor::is_open);
        if !open {
            let column = self.column_for(key)?.clone();
            if let Some(task_id) = key.task_id.as_deref() {
                self.board.group(&key.group_id)?.task(task_id)?;
            }
            let raw = self.cell_raw(key);
            let mut editor = CellEditor::for_column(
                &column,
                raw.as_deref(),
                &self.people,
                self.settings.menu_height_estimate,
            )?;
            if let Some(previous) = self.editors.get(key) {
                editor.set_trigger(previous.trigger());
            }
            self.editors.insert(key.clone(), editor);
        }
        self.editors.get_mut(key)
    }

    /// Drops editors whose cell no longer exists on the board.
    fn prune_editors(&mut self) {
        let board = &self.board;
        self.editors.retain(|key, _| {
            let Some(group) = board.group(&key.group_id) else {
                return false;
            };
            group.column(&key.column_id).is_some()
                && key
                    .task_id
                    .as_deref()
                    .is_none_or(|task_id| group.task(task_id).is_some())
        });
    }

    fn prune_focus(&mut self) {
        let stale = match &self.focus {
            Focus::None => false,
            Focus::Cell(key) => {
                self.column_for(key).is_none()
                    || key.task_id.as_deref().is_some_and(|task_id| {
                        self.board
                            .group(&key.group_id)
                            .and_then(|group| group.task(task_id))
                            .is_none()
                    })
            }
            Focus::Row { group_id, task_id } => self
                .board
                .group(group_id)
                .and_then(|group| group.task(task_id))
                .is_none(),
        };
        if stale {
            self.focus = Focus::None;
        }
    }

    /// Swaps in the next board, or records why the action was refused.
    fn apply(&mut self, next: crate::error::Result<Board>) -> bool {
        match next {
            Ok(board) => {
                self.board = board;
                self.dirty = true;
                self.last_error = None;
                self.prune_editors();
                self.prune_focus();
                true
            }
            Err(err) => {
                match &err {
                    BoardError::EmptyName { .. } => debug!(error = %err, "ignoring empty name"),
                    _ => warn!(error = %err, "board action rejected"),
                }
                self.last_error = Some(err.to_string());
                false
            }
        }
    }

    fn dismiss_all(&mut self) {
        for editor in self.editors.values_mut() {
            editor.dismiss();
        }
        self.ui.column_menu = None;
    }
}
