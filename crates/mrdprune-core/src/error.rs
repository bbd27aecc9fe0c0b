//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("cannot decode {kind} '{name}': missing field {field}")]
    MissingField {
        kind: &'static str,
        name: String,
        field: String,
    },

    #[error("cannot decode {kind} '{name}': {message}")]
    Conversion {
        kind: &'static str,
        name: String,
        message: String,
    },

    #[error("failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn missing(kind: &'static str, name: &str, field: impl Into<String>) -> Self {
        Self::MissingField {
            kind,
            name: name.to_string(),
            field: field.into(),
        }
    }

    pub(crate) fn conversion(kind: &'static str, name: &str, message: impl ToString) -> Self {
        Self::Conversion {
            kind,
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
