//! Error types for the selector
//!
//! Provides error handling for:
//! - Remote collaborator failures (catalog search, preferred fetch, create)
//! - Illegal selector state combinations
//! - Configuration loading and validation

use std::path::PathBuf;

/// Failure reported by a remote collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Request never produced a usable response
    #[error("transport failure: {0}")]
    Transport(String),

    /// Remote side refused the request
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Response arrived but could not be understood
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// Create transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create rejection error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Errors while loading or validating selector configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Page size of zero would make pagination meaningless
    #[error("page size must be greater than zero")]
    ZeroPageSize,

    /// TOML could not be parsed into a configuration
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// IO error during config read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Operation-level selector errors
///
/// Guarded no-ops (missing uri, removing an unselected item) and remote
/// failures are not errors at this level; they are reported through
/// outcomes and notifications instead.
#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    /// Custom item submitted while the intake form is closed
    #[error("custom item form is not open")]
    IntakeNotOpen,

    /// Custom item submitted while another submission is pending
    #[error("custom item submission already in progress")]
    SubmissionInProgress,

    /// Configuration rejected at construction
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for selector operations
pub type SelectorResult<T> = Result<T, SelectorError>;
