use std::str::FromStr;

use crate::types::{Priority, Status};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ThemePreset {
    #[default]
    Light,
    Dark,
}

impl ThemePreset {
    pub const ALL: [Self; 2] = [Self::Light, Self::Dark];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub const fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode { Self::Dark } else { Self::Light }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl FromStr for ThemePreset {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" | "default" | "day" => Ok(Self::Light),
            "dark" | "night" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

/// Fill and text colour of a chip.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Swatch {
    pub background: &'static str,
    pub foreground: &'static str,
}

impl Swatch {
    const fn new(background: &'static str, foreground: &'static str) -> Self {
        Self {
            background,
            foreground,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub preset: ThemePreset,
    pub surface: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub text_muted: &'static str,
    /// Chip for a cell with no value ("Set Status", "—").
    pub empty: Swatch,
}

impl Theme {
    pub const fn from_preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::Light => Self {
                preset,
                surface: "#ffffff",
                border: "#e5e7eb",
                text: "#374151",
                text_muted: "#9ca3af",
                empty: Swatch::new("#f3f4f6", "#9ca3af"),
            },
            ThemePreset::Dark => Self {
                preset,
                surface: "#1a1d24",
                border: "#1f2937",
                text: "#d1d5db",
                text_muted: "#6b7280",
                empty: Swatch::new("#262a33", "#6b7280"),
            },
        }
    }

    pub const fn status(&self, status: Status) -> Swatch {
        match self.preset {
            ThemePreset::Light => match status {
                Status::New => Swatch::new("#797E93", "#ffffff"),
                Status::Pending => Swatch::new("#FFCB00", "#ffffff"),
                Status::Working => Swatch::new("#FDAB3D", "#ffffff"),
                Status::Stuck => Swatch::new("#E2445C", "#ffffff"),
                Status::AlmostFinish => Swatch::new("#A25DDC", "#ffffff"),
                Status::Done => Swatch::new("#00C875", "#ffffff"),
            },
            ThemePreset::Dark => match status {
                Status::New => Swatch::new("#4B4F5E", "#E5E7EB"),
                Status::Pending => Swatch::new("#8A7000", "#FEF3C7"),
                Status::Working => Swatch::new("#9A5F12", "#FFEDD5"),
                Status::Stuck => Swatch::new("#8C2434", "#FEE2E2"),
                Status::AlmostFinish => Swatch::new("#5E3382", "#F3E8FF"),
                Status::Done => Swatch::new("#00794A", "#D1FAE5"),
            },
        }
    }

    pub const fn priority(&self, priority: Priority) -> Swatch {
        match self.preset {
            ThemePreset::Light => match priority {
                Priority::Normal => Swatch::new("#C4C4C4", "#ffffff"),
                Priority::Low => Swatch::new("#579BFC", "#ffffff"),
                Priority::Medium => Swatch::new("#FDAB3D", "#ffffff"),
                Priority::High => Swatch::new("#401694", "#ffffff"),
                Priority::Urgent => Swatch::new("#E2445C", "#ffffff"),
            },
            ThemePreset::Dark => match priority {
                Priority::Normal => Swatch::new("#4B5563", "#E5E7EB"),
                Priority::Low => Swatch::new("#2F5C9C", "#DBEAFE"),
                Priority::Medium => Swatch::new("#9A5F12", "#FFEDD5"),
                Priority::High => Swatch::new("#5B2FB8", "#EDE9FE"),
                Priority::Urgent => Swatch::new("#8C2434", "#FEE2E2"),
            },
        }
    }
}

pub const GROUP_COLORS: [&str; 7] = [
    "#579bfc", "#00c875", "#ffcb00", "#ff5ac4", "#a25ddc", "#0086c0", "#784bd1",
];

/// Colour for the n-th group created on a board.
pub fn group_color(index: usize) -> &'static str {
    GROUP_COLORS[index % GROUP_COLORS.len()]
}
