//! Column header drag: a serialized payload handed from drag start to drop,
//! the way a native drag-and-drop data transfer works. Shares nothing with
//! row dragging.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::Board;

use super::actions::reorder_column;

pub const COLUMN_PAYLOAD_TYPE: &str = "COLUMN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDragPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub group_id: String,
    pub col_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DropEffect {
    None,
    Move,
}

/// Serialized payload for a header drag, or `None` for the name column.
pub fn drag_start(group_id: &str, col_id: &str, index: usize) -> Option<String> {
    if index == 0 {
        return None;
    }
    let payload = ColumnDragPayload {
        kind: COLUMN_PAYLOAD_TYPE.to_string(),
        group_id: group_id.to_string(),
        col_id: col_id.to_string(),
        index,
    };
    serde_json::to_string(&payload).ok()
}

pub fn drag_over(index: usize) -> DropEffect {
    if index == 0 {
        DropEffect::None
    } else {
        DropEffect::Move
    }
}

/// Applies a header drop on `target_index` of `group_id`.
///
/// Returns `Ok(None)` and leaves the board alone for anything that is not a
/// same-group column move onto a non-name slot: unreadable or foreign
/// payloads, drops on the origin or on index 0, and drops on another group.
pub fn drop_column(board: &Board, group_id: &str, target_index: usize, data: &str) -> Result<Option<Board>> {
    let payload: ColumnDragPayload = match serde_json::from_str(data) {
        Ok(payload) => payload,
        Err(err) => {
            debug!(error = %err, "ignoring unreadable column drop payload");
            return Ok(None);
        }
    };
    if payload.kind != COLUMN_PAYLOAD_TYPE {
        debug!(kind = %payload.kind, "ignoring non-column drop payload");
        return Ok(None);
    }
    if payload.group_id != group_id {
        debug!(from = %payload.group_id, to = %group_id, "cross-group column drops are not supported");
        return Ok(None);
    }
    if payload.index == target_index || target_index == 0 {
        return Ok(None);
    }
    reorder_column(board, group_id, payload.index, target_index).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::actions::add_group;

    fn board() -> (Board, String) {
        let board = add_group(&add_group(&Board::default(), Some("A")), Some("B"));
        let id = board.groups[0].id.clone();
        (board, id)
    }

    fn column_ids(board: &Board) -> Vec<&str> {
        board.groups[0].columns.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn payload_shape_and_name_column_refusal() {
        assert_eq!(drag_start("g1", "col_name", 0), None);
        let raw = drag_start("g1", "col_status", 2).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["type"], "COLUMN");
        assert_eq!(value["groupId"], "g1");
        assert_eq!(value["colId"], "col_status");
        assert_eq!(value["index"], 2);
    }

    #[test]
    fn drag_over_reports_effect() {
        assert_eq!(drag_over(0), DropEffect::None);
        assert_eq!(drag_over(3), DropEffect::Move);
    }

    #[test]
    fn drop_reorders_within_the_group() {
        let (board, group_id) = board();
        let data = drag_start(&group_id, "col_date", 4).unwrap();
        let next = drop_column(&board, &group_id, 1, &data).unwrap().unwrap();
        assert_eq!(
            column_ids(&next),
            vec!["col_name", "col_date", "col_person", "col_status", "col_priority"]
        );
    }

    #[test]
    fn guarded_drops_are_ignored() {
        let (board, group_id) = board();
        let other_id = board.groups[1].id.clone();
        let data = drag_start(&group_id, "col_status", 2).unwrap();

        assert_eq!(drop_column(&board, &group_id, 2, &data).unwrap(), None);
        assert_eq!(drop_column(&board, &group_id, 0, &data).unwrap(), None);
        assert_eq!(drop_column(&board, &other_id, 1, &data).unwrap(), None);
        assert_eq!(drop_column(&board, &group_id, 1, "not json").unwrap(), None);
        let task_payload = r#"{"type":"TASK","groupId":"x","colId":"y","index":1}"#;
        assert_eq!(drop_column(&board, &group_id, 1, task_payload).unwrap(), None);
    }
}
