//! Board persistence: one JSON document per board.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Deserialize;
use tracing::{info, warn};

use crate::settings::write_atomically;
use crate::types::{Board, COL_NAME, Column, ColumnType, Group, default_columns};

pub fn default_board_path() -> Option<PathBuf> {
    let mut path = dirs::data_local_dir()?;
    path.push("taskboard");
    path.push("board.json");
    Some(path)
}

/// On-disk shape. Older saves kept one `columns` list on the board itself.
#[derive(Debug, Deserialize)]
struct StoredBoard {
    #[serde(default = "default_board_id")]
    id: String,
    #[serde(default = "default_board_name")]
    name: String,
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    columns: Option<Vec<Column>>,
}

fn default_board_id() -> String {
    Board::default().id
}

fn default_board_name() -> String {
    Board::default().name
}

/// Reads the board at `path`; a missing file yields an empty default board.
pub fn load_board(path: &Path) -> anyhow::Result<Board> {
    if !path.exists() {
        info!("no board at '{}', starting empty", path.display());
        return Ok(Board::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read board file '{}'", path.display()))?;
    let board = parse_board(&contents)
        .with_context(|| format!("failed to parse board file '{}'", path.display()))?;
    info!(
        "loaded board '{}' with {} group(s) from '{}'",
        board.id,
        board.groups.len(),
        path.display()
    );
    Ok(board)
}

/// Parses and repairs a board document.
pub fn parse_board(contents: &str) -> anyhow::Result<Board> {
    let stored: StoredBoard = serde_json::from_str(contents)?;
    let legacy_columns = stored.columns.filter(|columns| !columns.is_empty());

    let groups = stored
        .groups
        .into_iter()
        .map(|mut group| {
            if group.columns.is_empty() {
                group.columns = match &legacy_columns {
                    Some(columns) => {
                        warn!("group '{}' has no columns; copying board columns", group.id);
                        columns.clone()
                    }
                    None => {
                        warn!("group '{}' has no columns; using defaults", group.id);
                        default_columns()
                    }
                };
            }
            repair_name_column(&mut group);
            group
        })
        .collect();

    Ok(Board {
        id: stored.id,
        name: stored.name,
        groups,
    })
}

/// Keeps exactly one leading `name` column.
fn repair_name_column(group: &mut Group) {
    match group
        .columns
        .iter()
        .position(|column| column.column_type == ColumnType::Name)
    {
        Some(0) => {}
        Some(index) => {
            warn!("group '{}' name column at {}; moving to front", group.id, index);
            let column = group.columns.remove(index);
            group.columns.insert(0, column);
        }
        None => {
            warn!("group '{}' has no name column; adding one", group.id);
            group
                .columns
                .insert(0, Column::new(COL_NAME, "Item", ColumnType::Name, 300));
        }
    }
}

pub fn save_board(board: &Board, path: &Path) -> anyhow::Result<()> {
    let contents =
        serde_json::to_string_pretty(board).context("failed to serialize board to JSON")?;
    write_atomically(path, contents.as_bytes())
        .with_context(|| format!("failed to save board to '{}'", path.display()))?;
    info!("saved board '{}' to '{}'", board.id, path.display());
    Ok(())
}

/// Resolves the board file from an explicit flag, settings, or the default.
pub fn resolve_board_path(
    explicit: Option<&Path>,
    configured: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    explicit
        .or(configured)
        .map(Path::to_path_buf)
        .or_else(default_board_path)
        .ok_or_else(|| anyhow!("unable to determine board path; pass --board"))
}
