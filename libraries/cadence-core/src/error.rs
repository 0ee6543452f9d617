/// Core error types for Cadence
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Cadence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown enum variant in a textual representation
    #[error("Unknown {kind}: {value}")]
    UnknownVariant {
        /// Name of the type being parsed
        kind: &'static str,
        /// Rejected input
        value: String,
    },
}

impl CoreError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unknown variant error
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}
