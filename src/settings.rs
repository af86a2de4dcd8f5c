use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::theme::ThemePreset;
use crate::types::DEFAULT_COLUMN_WIDTH;

const DEFAULT_THEME: &str = "light";
const MIN_COLUMN_WIDTH_FLOOR: u32 = 40;
const MAX_COLUMN_WIDTH: u32 = 1_000;
const DEFAULT_MIN_COLUMN_WIDTH: u32 = 60;
const MIN_MENU_HEIGHT: f64 = 40.0;
const MAX_MENU_HEIGHT: f64 = 800.0;
const DEFAULT_MENU_HEIGHT_ESTIMATE: f64 = 250.0;
const MAX_DRAG_ACTIVATION_DISTANCE: f64 = 50.0;
const DEFAULT_DRAG_ACTIVATION_DISTANCE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: String,
    /// Board file; falls back to [`crate::store::default_board_path`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_path: Option<PathBuf>,
    pub default_column_width: u32,
    pub min_column_width: u32,
    /// Height reserved for a cell flyout when choosing above/below.
    pub menu_height_estimate: f64,
    /// Pointer travel (px) before a row press becomes a drag.
    pub drag_activation_distance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            board_path: None,
            default_column_width: DEFAULT_COLUMN_WIDTH,
            min_column_width: DEFAULT_MIN_COLUMN_WIDTH,
            menu_height_estimate: DEFAULT_MENU_HEIGHT_ESTIMATE,
            drag_activation_distance: DEFAULT_DRAG_ACTIVATION_DISTANCE,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("taskboard");
        path.push("settings.toml");
        Some(path)
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(mut settings) => {
                    settings.validate();
                    settings
                }
                Err(error) => {
                    warn!(
                        "failed to parse settings config '{}': {}",
                        path.display(),
                        error
                    );
                    Self::default()
                }
            },
            Err(error) => {
                warn!(
                    "failed to read settings config '{}': {}",
                    path.display(),
                    error
                );
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().ok_or_else(|| anyhow!("unable to determine config path"))?;
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        let mut validated = self.clone();
        validated.validate();
        let contents =
            toml::to_string_pretty(&validated).context("failed to serialize settings to TOML")?;
        write_atomically(path, contents.as_bytes())
    }

    pub fn theme_preset(&self) -> ThemePreset {
        ThemePreset::from_str(&self.theme).unwrap_or_default()
    }

    fn validate(&mut self) {
        self.min_column_width = self
            .min_column_width
            .clamp(MIN_COLUMN_WIDTH_FLOOR, MAX_COLUMN_WIDTH);
        self.default_column_width = self
            .default_column_width
            .clamp(self.min_column_width, MAX_COLUMN_WIDTH);

        self.menu_height_estimate = if self.menu_height_estimate.is_finite() {
            self.menu_height_estimate
                .clamp(MIN_MENU_HEIGHT, MAX_MENU_HEIGHT)
        } else {
            DEFAULT_MENU_HEIGHT_ESTIMATE
        };
        self.drag_activation_distance = if self.drag_activation_distance.is_finite() {
            self.drag_activation_distance
                .clamp(0.0, MAX_DRAG_ACTIVATION_DISTANCE)
        } else {
            DEFAULT_DRAG_ACTIVATION_DISTANCE
        };

        self.theme = match ThemePreset::from_str(&self.theme) {
            Ok(preset) => preset.as_str().to_string(),
            Err(()) => {
                warn!(
                    "invalid theme '{}' in settings config; falling back to default",
                    self.theme
                );
                DEFAULT_THEME.to_string()
            }
        };
    }
}

/// Writes `contents` next to `path` first, then renames over it.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("invalid path '{}'", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("invalid file name in '{}'", path.display()))?
        .to_string_lossy()
        .to_string();
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&tmp_path, contents).with_context(|| {
        format!("failed to write temporary file '{}'", tmp_path.display())
    })?;
    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to atomically rename '{}' to '{}'",
            tmp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
