//! Viewport-aware placement for cell flyouts and context menus.

/// Screen rectangle in pixels; `top`/`left` are viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Placement {
    Below,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    /// Menu centred on the trigger.
    Center,
    /// Menu left edge at `trigger.left + offset`.
    Offset(f64),
}

/// Geometry of one kind of flyout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyoutSpec {
    pub menu_width: f64,
    pub estimated_height: f64,
    /// Distance between trigger and menu.
    pub gap: f64,
    pub alignment: Alignment,
}

pub const DEFAULT_MENU_HEIGHT: f64 = 250.0;

impl FlyoutSpec {
    pub const STATUS: Self = Self {
        menu_width: 160.0,
        estimated_height: DEFAULT_MENU_HEIGHT,
        gap: 4.0,
        alignment: Alignment::Center,
    };
    pub const PRIORITY: Self = Self {
        menu_width: 140.0,
        estimated_height: DEFAULT_MENU_HEIGHT,
        gap: 4.0,
        alignment: Alignment::Center,
    };
    pub const PERSON: Self = Self {
        menu_width: 180.0,
        estimated_height: DEFAULT_MENU_HEIGHT,
        gap: 5.0,
        alignment: Alignment::Offset(-90.0),
    };
    pub const DROPDOWN: Self = Self {
        menu_width: 200.0,
        estimated_height: DEFAULT_MENU_HEIGHT,
        gap: 4.0,
        alignment: Alignment::Center,
    };
    pub const CONTEXT_MENU: Self = Self {
        menu_width: 220.0,
        estimated_height: 320.0,
        gap: 4.0,
        alignment: Alignment::Offset(0.0),
    };

    pub fn with_estimated_height(mut self, height: f64) -> Self {
        self.estimated_height = height;
        self
    }
}

/// Absolute document position of an open flyout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPosition {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub placement: Placement,
}

impl MenuPosition {
    pub fn rect(&self, height: f64) -> Rect {
        Rect::new(self.left, self.top, self.width, height)
    }
}

/// Opens below when the remaining viewport space fits the estimated height,
/// otherwise above. Only the vertical axis avoids collisions.
pub fn place_flyout(trigger: Rect, viewport: Viewport, spec: FlyoutSpec) -> MenuPosition {
    let space_below = viewport.height - trigger.bottom();
    let placement = if space_below >= spec.estimated_height {
        Placement::Below
    } else {
        Placement::Above
    };

    let top = match placement {
        Placement::Below => trigger.bottom() + viewport.scroll_y + spec.gap,
        Placement::Above => trigger.top + viewport.scroll_y - spec.estimated_height - spec.gap,
    };
    let left = match spec.alignment {
        Alignment::Center => {
            trigger.left + viewport.scroll_x - (spec.menu_width - trigger.width) / 2.0
        }
        Alignment::Offset(offset) => trigger.left + viewport.scroll_x + offset,
    };

    MenuPosition {
        top,
        left,
        width: spec.menu_width,
        placement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_above_near_viewport_bottom() {
        let trigger = Rect::new(100.0, 718.0, 128.0, 32.0);
        assert_eq!(trigger.bottom(), 750.0);
        let position = place_flyout(trigger, Viewport::new(1280.0, 800.0), FlyoutSpec::STATUS);
        assert_eq!(position.placement, Placement::Above);
        assert!(position.top < trigger.top);
        assert_eq!(position.top, 718.0 - 250.0 - 4.0);
    }

    #[test]
    fn opens_below_when_space_fits_exactly() {
        let trigger = Rect::new(100.0, 518.0, 128.0, 32.0);
        let position = place_flyout(trigger, Viewport::new(1280.0, 800.0), FlyoutSpec::STATUS);
        assert_eq!(position.placement, Placement::Below);
        assert_eq!(position.top, 554.0);
    }

    #[test]
    fn centred_menus_straddle_the_trigger() {
        let trigger = Rect::new(100.0, 10.0, 128.0, 32.0);
        let position = place_flyout(trigger, Viewport::new(1280.0, 800.0), FlyoutSpec::STATUS);
        assert_eq!(position.left, 100.0 - (160.0 - 128.0) / 2.0);
        assert_eq!(position.width, 160.0);

        let person = place_flyout(trigger, Viewport::new(1280.0, 800.0), FlyoutSpec::PERSON);
        assert_eq!(person.left, 10.0);
        assert_eq!(person.top, 42.0 + 5.0);
    }

    #[test]
    fn scroll_offsets_shift_document_position() {
        let trigger = Rect::new(0.0, 0.0, 100.0, 20.0);
        let viewport = Viewport {
            scroll_y: 300.0,
            ..Viewport::new(800.0, 600.0)
        };
        let position = place_flyout(trigger, viewport, FlyoutSpec::PRIORITY);
        assert_eq!(position.top, 324.0);
    }

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(0.0, 0.0));
        assert!(!rect.contains(10.0, 5.0));
    }
}
