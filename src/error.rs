//! Error types for tubewatch.

use thiserror::Error;

/// Common error type for tubewatch.
#[derive(Error, Debug)]
pub enum TubewatchError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// State file exists but does not contain valid JSON.
    ///
    /// This is fatal: resetting a corrupt state file would re-notify every
    /// channel's backlog, so the operator has to look at it.
    #[error("state file corrupt: {0}")]
    StateCorrupt(String),

    /// Feed fetch error for a single channel.
    #[error("feed fetch error: {0}")]
    Fetch(String),

    /// Webhook delivery error for a single notification.
    #[error("webhook send error: {0}")]
    Send(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tubewatch operations.
pub type Result<T> = std::result::Result<T, TubewatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = TubewatchError::Config("webhook_url is empty".to_string());
        assert_eq!(err.to_string(), "configuration error: webhook_url is empty");
    }

    #[test]
    fn test_state_corrupt_error_display() {
        let err = TubewatchError::StateCorrupt("expected object".to_string());
        assert_eq!(err.to_string(), "state file corrupt: expected object");
    }

    #[test]
    fn test_fetch_error_display() {
        let err = TubewatchError::Fetch("HTTP error: 503".to_string());
        assert_eq!(err.to_string(), "feed fetch error: HTTP error: 503");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TubewatchError = io_err.into();
        assert!(matches!(err, TubewatchError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(sample_ok().unwrap(), 42);
    }
}
