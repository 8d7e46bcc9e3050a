use crate::domain::entities::EntityKind;

/// Every failure an entity operation can report back to the shell.
///
/// Only `Store` originates below the domain layer; everything else is a
/// rule violation detected before (or instead of) a write.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Field '{field}' {reason}")]
    Validation { field: String, reason: String },
    #[error("{0}")]
    Conflict(String),
    #[error("{kind} '{key}' does not exist")]
    Referential { kind: EntityKind, key: String },
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },
    #[error("No record selected")]
    NoSelection,
    #[error("Storage error: {0}")]
    Store(String),
}

impl RecordError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Field name for validation failures, used by the REST error body
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for RecordError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<csv::Error> for RecordError {
    fn from(err: csv::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<std::io::Error> for RecordError {
    fn from(err: std::io::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<serde_yaml::Error> for RecordError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Store(err.to_string())
    }
}

pub type RecordResult<T> = Result<T, RecordError>;
