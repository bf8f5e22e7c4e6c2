//! Command Errors
//!
//! Every way a command can fail. Handlers validate fully before touching the
//! store, so returning one of these always means nothing was changed.

use std::collections::BTreeSet;
use thiserror::Error;

/// Errors returned by command handlers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    /// A required argument was not given
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    /// No JSON object payload, or the payload failed to parse
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The key does not exist
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The base document of an INDEX command does not exist
    #[error("Base key not found: {0}")]
    BaseKeyNotFound(String),

    /// The field is not one of the base document's fields
    #[error("Invalid field '{field}'. Valid fields: {}", join(.allowed))]
    InvalidField {
        field: String,
        allowed: BTreeSet<String>,
    },

    /// The value is not one of the base document's values
    #[error("Invalid value '{value}'. Valid values: {}", join(.allowed))]
    InvalidValue {
        value: String,
        allowed: BTreeSet<String>,
    },

    /// The document's field does not hold the given value
    #[error("Value mismatch: field '{field}' is '{actual}', not '{value}'")]
    ValueMismatch {
        field: String,
        value: String,
        actual: String,
    },

    /// A range bound is not a number
    #[error("Range bounds must be numbers, got '{start}' and '{end}'")]
    NonNumericRange { start: String, end: String },

    /// The verb is not a known command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

fn join(items: &BTreeSet<String>) -> String {
    items.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// Result type for command handlers.
pub type CommandResult = Result<String, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            CommandError::MissingArgument("key").to_string(),
            "Missing argument: key"
        );
        assert_eq!(
            CommandError::UnknownCommand("FOO".into()).to_string(),
            "Unknown command: FOO"
        );
    }

    #[test]
    fn test_allowed_sets_are_listed() {
        let allowed: BTreeSet<String> = ["status".to_string(), "age".to_string()].into();
        let err = CommandError::InvalidField {
            field: "role".into(),
            allowed,
        };
        assert_eq!(
            err.to_string(),
            "Invalid field 'role'. Valid fields: age, status"
        );
    }
}
