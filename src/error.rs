//! Error types for board operations

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors raised when a transformation cannot be applied to a board
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("group not found: {id}")]
    GroupNotFound { id: String },

    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    #[error("subtask not found: {id}")]
    SubtaskNotFound { id: String },

    #[error("column not found: {id}")]
    ColumnNotFound { id: String },

    /// Column index outside the group's schema, or a move onto the name slot
    #[error("invalid column move from {from} to {to}")]
    InvalidColumnMove { from: usize, to: usize },

    /// The name column cannot be removed or displaced
    #[error("column '{id}' is protected")]
    ProtectedColumn { id: String },

    #[error("{field} cannot be empty")]
    EmptyName { field: &'static str },

    #[error("parse error: {message}")]
    Parse { message: String },
}

impl BoardError {
    pub fn group(id: &str) -> Self {
        Self::GroupNotFound { id: id.to_string() }
    }

    pub fn task(id: &str) -> Self {
        Self::TaskNotFound { id: id.to_string() }
    }

    pub fn column(id: &str) -> Self {
        Self::ColumnNotFound { id: id.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GroupNotFound { .. }
                | Self::TaskNotFound { .. }
                | Self::SubtaskNotFound { .. }
                | Self::ColumnNotFound { .. }
        )
    }
}
