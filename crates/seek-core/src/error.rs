//! Error types for Seek core operations.
//!
//! Per-query failures never surface here: providers absorb them and report
//! "no results". These errors come from activation, configuration and task
//! plumbing, where the caller can decide what to tell the user.

use thiserror::Error;

/// Result type alias using SeekError
pub type Result<T> = std::result::Result<T, SeekError>;

/// Core error types for Seek operations.
#[derive(Error, Debug)]
pub enum SeekError {
    // === Activation Errors ===
    /// The user's home directory could not be determined
    #[error("home directory could not be resolved")]
    HomeDirectoryUnavailable,

    /// A child process could not be started
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The platform opener rejected a file or URL
    #[error("failed to open {target}: {reason}")]
    Open { target: String, reason: String },

    /// The clipboard could not be written
    #[error("clipboard unavailable: {reason}")]
    Clipboard { reason: String },

    /// A path could not be turned into a file URL
    #[error("not an absolute path: {path}")]
    InvalidPath { path: String },

    // === Configuration Errors ===
    /// Configuration file parsing failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SeekError {
    /// Create an opener error
    pub fn open(target: impl Into<String>, reason: impl Into<String>) -> Self {
        SeekError::Open {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SeekError::open("https://example.com/", "no handler");
        assert_eq!(
            err.to_string(),
            "failed to open https://example.com/: no handler"
        );
    }
}
