use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    DuplicateId,
    Storage,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Validation => "validation",
            ErrorCode::DuplicateId => "duplicate_id",
            ErrorCode::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejections reported next to the add form. The messages are shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill out all fields correctly.")]
    MissingField(&'static str),
    #[error("Please fill out all fields correctly.")]
    InvalidAge(String),
    #[error("Name must not contain numbers.")]
    NameContainsDigit,
    #[error("Please enter a valid birth date.")]
    InvalidDate(String),
}

impl ValidationError {
    /// Field the rejection refers to, for logging.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidAge(_) => "age",
            ValidationError::NameContainsDigit => "name",
            ValidationError::InvalidDate(_) => "birth_date",
        }
    }
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("ID already exists.")]
    DuplicateId { id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to persist roster: {0}")]
    Storage(String),
}

impl RosterError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RosterError::DuplicateId { .. } => ErrorCode::DuplicateId,
            RosterError::Validation(_) => ErrorCode::Validation,
            RosterError::Storage(_) => ErrorCode::Storage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key '{0}'; expected 'name' or 'age'")]
pub struct UnknownSortKey(pub String);

/// Status line shown to the user, tagged with the failure class that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusError {
    pub code: ErrorCode,
    pub message: String,
}

impl StatusError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&RosterError> for StatusError {
    fn from(value: &RosterError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_id_reads_as_user_message() {
        let err = RosterError::DuplicateId { id: "1".into() };
        assert_eq!(err.to_string(), "ID already exists.");
        assert_eq!(err.code(), ErrorCode::DuplicateId);
        assert_eq!(err.code().to_string(), "duplicate_id");
    }

    #[test]
    fn validation_errors_pass_message_through() {
        let err = RosterError::from(ValidationError::NameContainsDigit);
        let status = StatusError::from(&err);
        assert_eq!(status.code, ErrorCode::Validation);
        assert_eq!(status.message, "Name must not contain numbers.");
    }
}
