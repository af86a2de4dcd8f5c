use crate::theme::Theme;
use crate::types::Status;

use super::overlay::FlyoutSpec;
use super::popover::MenuItem;
use super::{Chip, QuickCell};

pub type StatusCell = QuickCell<Status>;

pub const SET_STATUS: &str = "Set Status";

pub fn status_items() -> Vec<MenuItem<Status>> {
    Status::ALL
        .into_iter()
        .map(|status| MenuItem::new(status, status.as_str()))
        .collect()
}

pub fn status_cell(value: Option<Status>) -> StatusCell {
    QuickCell::new(value, status_items(), FlyoutSpec::STATUS)
}

pub fn status_chip(value: Option<Status>, theme: &Theme) -> Chip {
    match value {
        Some(status) => Chip {
            label: status.as_str().to_string(),
            swatch: theme.status(status),
            is_placeholder: false,
        },
        None => Chip {
            label: SET_STATUS.to_string(),
            swatch: theme.empty,
            is_placeholder: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::overlay::{Placement, Rect, Viewport};
    use crate::cells::popover::PopoverEvent;
    use crate::theme::ThemePreset;

    #[test]
    fn near_bottom_of_viewport_opens_above() {
        let mut cell = status_cell(Some(Status::New));
        let trigger = Rect::new(40.0, 714.0, 128.0, 36.0);
        let PopoverEvent::Opened(position) = cell.toggle(trigger, Viewport::new(1280.0, 800.0))
        else {
            panic!("status menu should open");
        };
        assert_eq!(position.placement, Placement::Above);
        assert!(position.top < trigger.top);
    }

    #[test]
    fn selecting_commits_the_new_status() {
        let mut cell = status_cell(Some(Status::New));
        cell.toggle(Rect::new(0.0, 0.0, 128.0, 36.0), Viewport::new(1280.0, 800.0));
        assert_eq!(
            cell.select_value(&Status::Done),
            PopoverEvent::Committed(Status::Done)
        );
        assert_eq!(cell.value(), Some(&Status::Done));
        assert!(!cell.is_open());
    }

    #[test]
    fn chips_cover_missing_values_in_both_palettes() {
        for preset in ThemePreset::ALL {
            let theme = Theme::from_preset(preset);
            let empty = status_chip(None, &theme);
            assert_eq!(empty.label, SET_STATUS);
            assert!(empty.is_placeholder);
            assert_eq!(empty.swatch, theme.empty);

            let done = status_chip(Some(Status::Done), &theme);
            assert_eq!(done.label, "Done");
            assert_eq!(done.swatch, theme.status(Status::Done));
        }
    }
}
