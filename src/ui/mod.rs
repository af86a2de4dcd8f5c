//! View models for the board grid. Everything here is a pure projection of
//! board state; nothing in this tree mutates a group.

pub mod footer;
pub mod task_group;
pub mod task_row;

pub use task_group::{GroupProps, GroupView, group_view};
pub use task_row::{RowEvent, TaskRow};
