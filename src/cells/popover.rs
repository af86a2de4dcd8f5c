//! Closed -> open -> committed | cancelled, shared by every flyout cell.

use crossterm::event::{KeyCode, KeyEvent};

use super::overlay::{FlyoutSpec, MenuPosition, Rect, Viewport, place_flyout};

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem<T> {
    pub value: T,
    pub label: String,
}

impl<T> MenuItem<T> {
    pub fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopoverState {
    Closed,
    Open {
        position: MenuPosition,
        highlighted: usize,
    },
}

/// What a popover interaction produced. `Committed` is the only variant that
/// should reach the owner's change handler.
#[derive(Debug, Clone, PartialEq)]
pub enum PopoverEvent<T> {
    Opened(MenuPosition),
    Highlighted(usize),
    Committed(T),
    Cancelled,
    Ignored,
}

impl<T> PopoverEvent<T> {
    pub fn committed(self) -> Option<T> {
        match self {
            Self::Committed(value) => Some(value),
            _ => None,
        }
    }
}

pub const MENU_ITEM_HEIGHT: f64 = 32.0;

#[derive(Debug, Clone)]
pub struct Popover<T> {
    items: Vec<MenuItem<T>>,
    spec: FlyoutSpec,
    state: PopoverState,
}

impl<T: Clone + PartialEq> Popover<T> {
    pub fn new(items: Vec<MenuItem<T>>, spec: FlyoutSpec) -> Self {
        Self {
            items,
            spec,
            state: PopoverState::Closed,
        }
    }

    pub fn items(&self) -> &[MenuItem<T>] {
        &self.items
    }

    /// Swaps the listed items, e.g. after a search edit. Keeps the popover open.
    pub fn set_items(&mut self, items: Vec<MenuItem<T>>) {
        self.items = items;
        if let PopoverState::Open { highlighted, .. } = &mut self.state {
            *highlighted = (*highlighted).min(self.items.len().saturating_sub(1));
        }
    }

    pub fn state(&self) -> PopoverState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PopoverState::Open { .. })
    }

    pub fn position(&self) -> Option<MenuPosition> {
        match self.state {
            PopoverState::Open { position, .. } => Some(position),
            PopoverState::Closed => None,
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        match self.state {
            PopoverState::Open { highlighted, .. } => Some(highlighted),
            PopoverState::Closed => None,
        }
    }

    /// Screen area of the open menu, for outside-click detection.
    pub fn menu_rect(&self) -> Option<Rect> {
        self.position()
            .map(|position| position.rect(self.spec.estimated_height))
    }

    /// Hit area of each listed item that fits inside the open menu, stacked
    /// from the menu top in `MENU_ITEM_HEIGHT` rows.
    pub fn item_rects(&self) -> Vec<(usize, Rect)> {
        let Some(menu) = self.menu_rect() else {
            return Vec::new();
        };
        (0..self.items.len())
            .map(|index| {
                let top = menu.top + index as f64 * MENU_ITEM_HEIGHT;
                (index, Rect::new(menu.left, top, menu.width, MENU_ITEM_HEIGHT))
            })
            .take_while(|(_, rect)| rect.bottom() <= menu.bottom())
            .collect()
    }

    pub fn set_estimated_height(&mut self, height: f64) {
        self.spec = self.spec.with_estimated_height(height);
    }

    /// Trigger click: opens when closed, closes without committing when open.
    pub fn toggle(&mut self, trigger: Rect, viewport: Viewport, current: Option<&T>) -> PopoverEvent<T> {
        if self.is_open() {
            self.dismiss()
        } else {
            self.open(trigger, viewport, current)
        }
    }

    pub fn open(&mut self, trigger: Rect, viewport: Viewport, current: Option<&T>) -> PopoverEvent<T> {
        let position = place_flyout(trigger, viewport, self.spec);
        let highlighted = current
            .and_then(|value| self.items.iter().position(|item| &item.value == value))
            .unwrap_or(0);
        self.state = PopoverState::Open {
            position,
            highlighted,
        };
        PopoverEvent::Opened(position)
    }

    pub fn move_selection(&mut self, delta: isize) -> PopoverEvent<T> {
        let len = self.items.len();
        match &mut self.state {
            PopoverState::Open { highlighted, .. } if len > 0 => {
                let next = (*highlighted as isize + delta).clamp(0, len as isize - 1);
                *highlighted = next as usize;
                PopoverEvent::Highlighted(*highlighted)
            }
            _ => PopoverEvent::Ignored,
        }
    }

    /// Picks `index` and closes. Fires at most once per open.
    pub fn select(&mut self, index: usize) -> PopoverEvent<T> {
        if !self.is_open() {
            return PopoverEvent::Ignored;
        }
        let Some(item) = self.items.get(index) else {
            return PopoverEvent::Ignored;
        };
        let value = item.value.clone();
        self.state = PopoverState::Closed;
        PopoverEvent::Committed(value)
    }

    pub fn commit_highlighted(&mut self) -> PopoverEvent<T> {
        match self.highlighted() {
            Some(index) => self.select(index),
            None => PopoverEvent::Ignored,
        }
    }

    /// Outside click or explicit cancel.
    pub fn dismiss(&mut self) -> PopoverEvent<T> {
        if self.is_open() {
            self.state = PopoverState::Closed;
            PopoverEvent::Cancelled
        } else {
            PopoverEvent::Ignored
        }
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        trigger: Rect,
        viewport: Viewport,
        current: Option<&T>,
    ) -> PopoverEvent<T> {
        if !self.is_open() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.open(trigger, viewport, current),
                _ => PopoverEvent::Ignored,
            };
        }

        match key.code {
            KeyCode::Esc => self.dismiss(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter => self.commit_highlighted(),
            _ => PopoverEvent::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn popover() -> Popover<&'static str> {
        Popover::new(
            vec![
                MenuItem::new("a", "A"),
                MenuItem::new("b", "B"),
                MenuItem::new("c", "C"),
            ],
            FlyoutSpec::STATUS,
        )
    }

    const TRIGGER: Rect = Rect::new(10.0, 10.0, 100.0, 30.0);
    const VIEWPORT: Viewport = Viewport::new(1024.0, 768.0);

    #[test]
    fn item_rects_stack_inside_the_open_menu() {
        let mut menu = popover();
        assert!(menu.item_rects().is_empty());
        menu.open(TRIGGER, VIEWPORT, None);
        let rects = menu.item_rects();
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0].1.top, 44.0);
        assert_eq!(rects[2].1.top, 44.0 + 2.0 * MENU_ITEM_HEIGHT);
        assert_eq!(rects[1].1.left, -20.0);

        menu.set_estimated_height(MENU_ITEM_HEIGHT * 2.0);
        menu.dismiss();
        menu.open(TRIGGER, VIEWPORT, None);
        assert_eq!(menu.item_rects().len(), 2);
    }

    #[test]
    fn select_commits_once_and_closes() {
        let mut menu = popover();
        assert!(matches!(menu.toggle(TRIGGER, VIEWPORT, None), PopoverEvent::Opened(_)));
        assert_eq!(menu.select(1), PopoverEvent::Committed("b"));
        assert!(!menu.is_open());
        assert_eq!(menu.select(1), PopoverEvent::Ignored);
    }

    #[test]
    fn toggle_and_dismiss_never_commit() {
        let mut menu = popover();
        menu.toggle(TRIGGER, VIEWPORT, None);
        assert_eq!(menu.toggle(TRIGGER, VIEWPORT, None), PopoverEvent::Cancelled);
        menu.open(TRIGGER, VIEWPORT, None);
        assert_eq!(menu.dismiss(), PopoverEvent::Cancelled);
        assert_eq!(menu.dismiss(), PopoverEvent::Ignored);
    }

    #[test]
    fn keyboard_flow_highlights_from_current_value() {
        let mut menu = popover();
        assert_eq!(
            menu.handle_key(key(KeyCode::Down), TRIGGER, VIEWPORT, None),
            PopoverEvent::Ignored
        );
        assert!(matches!(
            menu.handle_key(key(KeyCode::Char(' ')), TRIGGER, VIEWPORT, Some(&"b")),
            PopoverEvent::Opened(_)
        ));
        assert_eq!(menu.highlighted(), Some(1));
        menu.handle_key(key(KeyCode::Down), TRIGGER, VIEWPORT, None);
        menu.handle_key(key(KeyCode::Down), TRIGGER, VIEWPORT, None);
        assert_eq!(menu.highlighted(), Some(2));
        assert_eq!(
            menu.handle_key(key(KeyCode::Enter), TRIGGER, VIEWPORT, None),
            PopoverEvent::Committed("c")
        );
    }

    #[test]
    fn escape_cancels() {
        let mut menu = popover();
        menu.handle_key(key(KeyCode::Enter), TRIGGER, VIEWPORT, None);
        assert_eq!(
            menu.handle_key(key(KeyCode::Esc), TRIGGER, VIEWPORT, None),
            PopoverEvent::Cancelled
        );
        assert!(!menu.is_open());
    }

    #[test]
    fn shrinking_items_clamps_highlight() {
        let mut menu = popover();
        menu.open(TRIGGER, VIEWPORT, Some(&"c"));
        menu.set_items(vec![MenuItem::new("a", "A")]);
        assert_eq!(menu.highlighted(), Some(0));
        assert!(menu.is_open());
    }
}
