//! Flyout editors that are alive on the board, one per cell key.
//!
//! Any number of them can be open at once; opening one never touches another.

use crossterm::event::{KeyCode, KeyEvent};

use crate::board_utils::normalize_status;
use crate::cells::dropdown::DropdownCell;
use crate::cells::overlay::{Rect, Viewport};
use crate::cells::person::{PersonCell, committed_person, person_cell};
use crate::cells::popover::PopoverEvent;
use crate::cells::priority::{PriorityCell, priority_cell};
use crate::cells::status::{StatusCell, status_cell};
use crate::codec::CellValue;
use crate::types::{Column, ColumnType, Person, Priority};

#[derive(Debug, Clone)]
pub enum EditorKind {
    Status(StatusCell),
    Priority(PriorityCell),
    Person(PersonCell),
    Dropdown(DropdownCell),
}

/// Result of feeding input to an editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    /// Still open, or nothing happened.
    Pending,
    /// Closed without a value.
    Closed,
    /// Closed with a value; `None` clears the cell.
    Commit(Option<CellValue>),
}

fn outcome<T>(event: PopoverEvent<T>, value: impl FnOnce(T) -> CellValue) -> EditorOutcome {
    match event {
        PopoverEvent::Committed(picked) => EditorOutcome::Commit(Some(value(picked))),
        PopoverEvent::Cancelled => EditorOutcome::Closed,
        _ => EditorOutcome::Pending,
    }
}

fn person_outcome(event: PopoverEvent<crate::cells::person::PersonChoice>) -> EditorOutcome {
    if matches!(event, PopoverEvent::Cancelled) {
        return EditorOutcome::Closed;
    }
    match committed_person(event) {
        Some(person_id) => EditorOutcome::Commit(person_id.map(CellValue::Person)),
        None => EditorOutcome::Pending,
    }
}

#[derive(Debug, Clone)]
pub struct CellEditor {
    kind: EditorKind,
    trigger: Rect,
}

impl CellEditor {
    /// Editor for a flyout column seeded with the cell's raw value. Columns
    /// edited in place get `None`.
    pub fn for_column(column: &Column, raw: Option<&str>, people: &[Person], menu_height: f64) -> Option<Self> {
        let mut kind = match column.column_type {
            ColumnType::Status => EditorKind::Status(status_cell(raw.map(|raw| normalize_status(Some(raw))))),
            ColumnType::Priority => EditorKind::Priority(priority_cell(
                raw.and_then(|raw| raw.parse::<Priority>().ok())
                    .unwrap_or_default(),
            )),
            ColumnType::Person => EditorKind::Person(person_cell(raw, people)),
            ColumnType::Dropdown => EditorKind::Dropdown(DropdownCell::new(raw, column.config.options.clone())),
            _ => return None,
        };
        match &mut kind {
            EditorKind::Status(cell) => cell.popover_mut().set_estimated_height(menu_height),
            EditorKind::Priority(cell) => cell.popover_mut().set_estimated_height(menu_height),
            EditorKind::Person(cell) => cell.popover_mut().set_estimated_height(menu_height),
            EditorKind::Dropdown(cell) => cell.cell_mut().popover_mut().set_estimated_height(menu_height),
        }
        Some(Self {
            kind,
            trigger: Rect::default(),
        })
    }

    pub fn kind(&self) -> &EditorKind {
        &self.kind
    }

    pub fn trigger(&self) -> Rect {
        self.trigger
    }

    pub fn set_trigger(&mut self, trigger: Rect) {
        self.trigger = trigger;
    }

    pub fn is_open(&self) -> bool {
        match &self.kind {
            EditorKind::Status(cell) => cell.is_open(),
            EditorKind::Priority(cell) => cell.is_open(),
            EditorKind::Person(cell) => cell.is_open(),
            EditorKind::Dropdown(cell) => cell.is_open(),
        }
    }

    pub fn menu_rect(&self) -> Option<Rect> {
        match &self.kind {
            EditorKind::Status(cell) => cell.popover().menu_rect(),
            EditorKind::Priority(cell) => cell.popover().menu_rect(),
            EditorKind::Person(cell) => cell.popover().menu_rect(),
            EditorKind::Dropdown(cell) => cell.cell().popover().menu_rect(),
        }
    }

    /// Hit areas of the open menu's rows, by item index.
    pub fn item_rects(&self) -> Vec<(usize, Rect)> {
        match &self.kind {
            EditorKind::Status(cell) => cell.popover().item_rects(),
            EditorKind::Priority(cell) => cell.popover().item_rects(),
            EditorKind::Person(cell) => cell.popover().item_rects(),
            EditorKind::Dropdown(cell) => cell.cell().popover().item_rects(),
        }
    }

    /// Whether a click at `(x, y)` lands on this editor's trigger or menu.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.trigger.contains(x, y)
            || self
                .menu_rect()
                .is_some_and(|rect| rect.contains(x, y))
    }

    pub fn toggle(&mut self, trigger: Rect, viewport: Viewport) -> EditorOutcome {
        self.trigger = trigger;
        match &mut self.kind {
            EditorKind::Status(cell) => outcome(cell.toggle(trigger, viewport), CellValue::Status),
            EditorKind::Priority(cell) => outcome(cell.toggle(trigger, viewport), CellValue::Priority),
            EditorKind::Person(cell) => person_outcome(cell.toggle(trigger, viewport)),
            EditorKind::Dropdown(cell) => outcome(cell.toggle(trigger, viewport), CellValue::Choice),
        }
    }

    pub fn select(&mut self, index: usize) -> EditorOutcome {
        match &mut self.kind {
            EditorKind::Status(cell) => outcome(cell.select(index), CellValue::Status),
            EditorKind::Priority(cell) => outcome(cell.select(index), CellValue::Priority),
            EditorKind::Person(cell) => person_outcome(cell.select(index)),
            EditorKind::Dropdown(cell) => outcome(cell.select(index), CellValue::Choice),
        }
    }

    pub fn dismiss(&mut self) -> EditorOutcome {
        match &mut self.kind {
            EditorKind::Status(cell) => outcome(cell.dismiss(), CellValue::Status),
            EditorKind::Priority(cell) => outcome(cell.dismiss(), CellValue::Priority),
            EditorKind::Person(cell) => person_outcome(cell.dismiss()),
            EditorKind::Dropdown(cell) => outcome(cell.cell_mut().dismiss(), CellValue::Choice),
        }
    }

    /// Replaces the dropdown search text. Other editors ignore it.
    pub fn set_search(&mut self, search: &str) -> bool {
        match &mut self.kind {
            EditorKind::Dropdown(cell) if cell.is_open() => {
                cell.set_search(search);
                true
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, viewport: Viewport) -> EditorOutcome {
        let trigger = self.trigger;
        match &mut self.kind {
            EditorKind::Status(cell) => outcome(cell.handle_key(key, trigger, viewport), CellValue::Status),
            EditorKind::Priority(cell) => outcome(cell.handle_key(key, trigger, viewport), CellValue::Priority),
            EditorKind::Person(cell) => person_outcome(cell.handle_key(key, trigger, viewport)),
            EditorKind::Dropdown(cell) => {
                if cell.is_open() {
                    match key.code {
                        KeyCode::Char(c) => {
                            let search = format!("{}{c}", cell.search());
                            cell.set_search(&search);
                            return EditorOutcome::Pending;
                        }
                        KeyCode::Backspace => {
                            let mut search = cell.search().to_string();
                            search.pop();
                            cell.set_search(&search);
                            return EditorOutcome::Pending;
                        }
                        _ => {}
                    }
                } else if key.code == KeyCode::Enter || key.code == KeyCode::Char(' ') {
                    return outcome(cell.toggle(trigger, viewport), CellValue::Choice);
                }
                outcome(cell.cell_mut().handle_key(key, trigger, viewport), CellValue::Choice)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::overlay::Placement;
    use crate::types::{COL_PERSON, COL_STATUS, DropdownOption, Status, default_people};
    use crossterm::event::KeyModifiers;

    const VIEWPORT: Viewport = Viewport::new(1280.0, 800.0);

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn status_editor() -> CellEditor {
        let column = Column::new(COL_STATUS, "Status", ColumnType::Status, 128);
        CellEditor::for_column(&column, Some("Working on it"), &[], 250.0).unwrap()
    }

    #[test]
    fn inline_columns_have_no_flyout() {
        let column = Column::new("col_notes", "Notes", ColumnType::Text, 140);
        assert!(CellEditor::for_column(&column, None, &[], 250.0).is_none());
    }

    #[test]
    fn open_near_bottom_places_menu_above() {
        let mut editor = status_editor();
        let trigger = Rect::new(100.0, 714.0, 128.0, 36.0);
        assert_eq!(editor.toggle(trigger, VIEWPORT), EditorOutcome::Pending);
        let EditorKind::Status(cell) = editor.kind() else {
            panic!("status editor");
        };
        let position = cell.popover().position().unwrap();
        assert_eq!(position.placement, Placement::Above);
        assert!(position.top < trigger.top);
    }

    #[test]
    fn keyboard_commit_and_cancel() {
        let mut editor = status_editor();
        editor.set_trigger(Rect::new(0.0, 0.0, 128.0, 36.0));
        assert_eq!(editor.handle_key(key(KeyCode::Enter), VIEWPORT), EditorOutcome::Pending);
        assert!(editor.is_open());
        assert_eq!(editor.handle_key(key(KeyCode::Esc), VIEWPORT), EditorOutcome::Closed);
        assert!(!editor.is_open());

        editor.handle_key(key(KeyCode::Char(' ')), VIEWPORT);
        editor.handle_key(key(KeyCode::Down), VIEWPORT);
        let EditorOutcome::Commit(Some(CellValue::Status(status))) =
            editor.handle_key(key(KeyCode::Enter), VIEWPORT)
        else {
            panic!("expected a committed status");
        };
        assert_ne!(status, Status::Working);
        assert!(!editor.is_open());
    }

    #[test]
    fn clear_selection_commits_none() {
        let column = Column::new(COL_PERSON, "Owner", ColumnType::Person, 96);
        let people = default_people();
        let mut editor = CellEditor::for_column(&column, Some("p1"), &people, 250.0).unwrap();
        editor.toggle(Rect::new(0.0, 0.0, 96.0, 36.0), VIEWPORT);
        assert_eq!(editor.select(people.len()), EditorOutcome::Commit(None));
    }

    #[test]
    fn dropdown_typing_filters_then_commits_choice() {
        let mut column = Column::new("col_area", "Area", ColumnType::Dropdown, 140);
        column.config.options = ["Backend", "Frontend", "Design"]
            .iter()
            .enumerate()
            .map(|(idx, label)| DropdownOption {
                id: format!("opt{idx}"),
                label: label.to_string(),
                color: "#579bfc".to_string(),
            })
            .collect();
        let mut editor = CellEditor::for_column(&column, None, &[], 250.0).unwrap();
        editor.handle_key(key(KeyCode::Enter), VIEWPORT);
        for c in "des".chars() {
            editor.handle_key(key(KeyCode::Char(c)), VIEWPORT);
        }
        assert_eq!(
            editor.handle_key(key(KeyCode::Enter), VIEWPORT),
            EditorOutcome::Commit(Some(CellValue::Choice("opt2".to_string())))
        );
    }

    #[test]
    fn outside_points_are_not_contained() {
        let mut editor = status_editor();
        editor.toggle(Rect::new(100.0, 100.0, 128.0, 36.0), VIEWPORT);
        assert!(editor.contains(110.0, 110.0));
        assert!(!editor.contains(1000.0, 20.0));
    }
}
