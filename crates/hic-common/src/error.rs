//! Error types for the Hi-C contact viewer.

use thiserror::Error;

/// Result type alias using HicError.
pub type Result<T> = std::result::Result<T, HicError>;

/// Primary error type for session, query and coordinate operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HicError {
    // === Configuration Errors ===
    /// File-stat validation failure. The message is shown to the user verbatim.
    #[error("{0}")]
    Configuration(String),

    #[error("{0} resolution ladder is empty")]
    EmptyResolutionLadder(String),

    #[error("Invalid genome metadata: {0}")]
    InvalidGenomeMetadata(String),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    // === Query Errors ===
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed matrix response: {0}")]
    MalformedResponse(String),

    // === Contract Errors ===
    #[error("Chromosome not found: {0}")]
    UnknownChromosome(String),

    #[error("Invalid range {chr}:{start}-{stop}: {message}")]
    InvalidRange {
        chr: String,
        start: u64,
        stop: u64,
        message: String,
    },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Fragment index for {0} has not been built")]
    FragmentIndexMissing(String),
}

impl HicError {
    /// Create a Configuration error carrying a user-facing message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidRange error.
    pub fn invalid_range(chr: &str, start: u64, stop: u64, message: impl Into<String>) -> Self {
        Self::InvalidRange {
            chr: chr.to_string(),
            start,
            stop,
            message: message.into(),
        }
    }

    /// Create a Transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a MalformedResponse error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Fatal errors raised while opening a file or loading configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HicError::Configuration(_)
                | HicError::EmptyResolutionLadder(_)
                | HicError::InvalidGenomeMetadata(_)
                | HicError::InvalidConfig(_)
        )
    }

    /// Recoverable errors scoped to a single fetch. The caller shows
    /// "no data" for the query and keeps the previous view.
    pub fn is_query(&self) -> bool {
        matches!(self, HicError::Transport(_) | HicError::MalformedResponse(_))
    }
}

/// For server response bodies. Local files map to `InvalidConfig` where they are read.
impl From<serde_json::Error> for HicError {
    fn from(err: serde_json::Error) -> Self {
        HicError::MalformedResponse(format!("JSON error: {}", err))
    }
}
