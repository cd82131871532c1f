//! Engine error taxonomy.
//!
//! Every error is raised during validation, before any indicator math runs.
//! The engine is a pure function of its input, so none of these are retryable.

use serde::{Deserialize, Serialize};

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A required field is absent.
    Schema,
    /// A field is present but not a finite number.
    TypeCoercion,
    /// The window is shorter than the active component needs.
    InsufficientHistory,
    /// Engine parameters are unusable (zero window, zero radius, ...).
    Config,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("schema error: required field '{field}' is absent from every record")]
    MissingField { field: String },

    #[error("schema error: required field '{field}' is absent from record {record}")]
    MissingFieldInRecord { field: String, record: usize },

    #[error("type coercion error: field '{field}' in record {record} is not a finite number: {value}")]
    TypeCoercion {
        field: String,
        record: usize,
        value: String,
    },

    #[error("insufficient history: {component} needs at least {required} bars, got {actual}")]
    InsufficientHistory {
        component: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } | Self::MissingFieldInRecord { .. } => ErrorKind::Schema,
            Self::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            Self::InsufficientHistory { .. } => ErrorKind::InsufficientHistory,
            Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn insufficient(component: &'static str, required: usize, actual: usize) -> Self {
        Self::InsufficientHistory {
            component,
            required,
            actual,
        }
    }
}
