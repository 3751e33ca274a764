//! Error types for GLOT

use thiserror::Error;

/// Step of a multi-statement DDL application.
///
/// Identifies how far a rendered batch or an object-rewrite sequence got
/// before a statement failed, so callers can reconcile partially-applied
/// schema changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStep {
    /// Statement at this index in a rendered batch
    Statement(usize),
    /// Creating the new object under its temporary name
    CreateTemp,
    /// Dropping the temporary object
    DropTemp,
    /// Dropping the original object
    DropOriginal,
    /// Creating the final object under its real name
    CreateFinal,
}

impl std::fmt::Display for DiffStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffStep::Statement(idx) => write!(f, "statement {}", idx),
            DiffStep::CreateTemp => write!(f, "create-temp"),
            DiffStep::DropTemp => write!(f, "drop-temp"),
            DiffStep::DropOriginal => write!(f, "drop-original"),
            DiffStep::CreateFinal => write!(f, "create-final"),
        }
    }
}

/// Core error type for GLOT operations
#[derive(Error, Debug)]
pub enum GlotError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Statement error: {message}")]
    Statement {
        /// Driver-reported error detail
        message: String,
        /// SQLSTATE or equivalent backend code, when the backend reported one
        code: Option<String>,
    },

    #[error("Diff application failed at {step}: {message}")]
    DiffApplication {
        /// The step the batch or rewrite sequence was on when it failed
        step: DiffStep,
        message: String,
    },

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl GlotError {
    /// Build a statement error without a backend code
    pub fn statement(message: impl Into<String>) -> Self {
        GlotError::Statement {
            message: message.into(),
            code: None,
        }
    }
}

/// Result type alias for GLOT operations
pub type Result<T> = std::result::Result<T, GlotError>;
