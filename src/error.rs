use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for the script panel core.
#[derive(Error, Debug)]
pub enum ScriptPanelError {
    /// A configuration file exists on disk but is not valid JSON. This is
    /// surfaced instead of swallowed: overwriting a corrupt document would
    /// silently destroy user overrides.
    #[error("config file '{path}' is not valid JSON: {source}")]
    ConfigCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Favorite reorder steps are constrained to one slot per call; larger
    /// magnitudes would mis-wrap at the list edges.
    #[error("reorder step must be -1 or +1, got {direction}")]
    InvalidReorderStep { direction: i32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScriptPanelError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
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
    fn test_config_corrupt_display_includes_path() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ScriptPanelError::ConfigCorrupt {
            path: PathBuf::from("/roots/anim/local_config.json"),
            source,
        };
        let message = err.to_string();
        assert!(message.contains("local_config.json"));
        assert!(message.contains("not valid JSON"));
    }

    #[test]
    fn test_invalid_reorder_step_display() {
        let err = ScriptPanelError::InvalidReorderStep { direction: 3 };
        assert_eq!(err.to_string(), "reorder step must be -1 or +1, got 3");
    }

    #[test]
    fn test_warn_on_err_returns_none() {
        let result: std::result::Result<(), &str> = Err("nope");
        assert!(result.warn_on_err().is_none());
    }

    #[test]
    fn test_log_err_passes_through_ok() {
        let result: std::result::Result<u32, &str> = Ok(7);
        assert_eq!(result.log_err(), Some(7));
    }
}
