use thiserror::Error;

/// Errors surfaced while normalizing rows into tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("column name '{name}' collides with a mandatory row field")]
    ReservedColumn { name: String },

    #[error("timestamp must be ISO-8601 UTC: '{value}'")]
    TimestampNotUtc { value: String },

    #[error("column '{column}' declared as timestamp holds unparseable value '{value}'")]
    InvalidTimestamp { column: String, value: String },
}
