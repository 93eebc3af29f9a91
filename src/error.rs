//! Domain error types and logging extension traits.
//!
//! The taxonomy follows the engine's propagation policy: failures local to
//! one source (unreadable file, malformed entry) never become `KeybeeError`
//! values at all - they are logged and the source is skipped. Only problems
//! the user must fix (bad custom pattern, broken config, failed cache write)
//! surface as errors.

use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for keybee.
#[derive(Error, Debug)]
pub enum KeybeeError {
    /// A user-supplied custom source pattern failed to compile.
    /// This is misconfiguration, not transient file content.
    #[error("invalid pattern for custom source '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to save config to '{path}': {source}")]
    ConfigSave {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save cache to '{path}': {source}")]
    CacheSave {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file watch error: {0}")]
    Watch(String),
}

pub type Result<T> = std::result::Result<T, KeybeeError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the pass should continue.
pub trait ResultExt<T> {
    /// Log the error with caller location and return None.
    fn log_err(self) -> Option<T>;
    /// Log as a warning with caller location and return None. Use for
    /// expected failures (missing file, stale entry).
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_mentions_source_name() {
        let err = regex::Regex::new("[unclosed").unwrap_err();
        let err = KeybeeError::InvalidPattern {
            name: "my-tool".to_string(),
            source: err,
        };
        assert!(err.to_string().contains("my-tool"));
    }

    #[test]
    fn log_err_returns_some_on_ok() {
        let value: std::result::Result<u32, String> = Ok(7);
        assert_eq!(value.log_err(), Some(7));
    }

    #[test]
    fn warn_on_err_returns_none_on_err() {
        let value: std::result::Result<u32, String> = Err("nope".to_string());
        assert_eq!(value.warn_on_err(), None);
    }
}
