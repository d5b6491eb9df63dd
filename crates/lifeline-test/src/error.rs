//! Test error types.

use std::time::Duration;

/// Result type alias for test operations.
pub type Result<T> = std::result::Result<T, TestError>;

/// Testing errors.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// Harness setup error.
    #[error("harness error: {0}")]
    Harness(String),

    /// Assertion failed.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// Timeout.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The child closed its output before the expected text appeared.
    #[error("end of output while waiting for {expected:?}")]
    UnexpectedEof {
        /// Text that was being waited for.
        expected: String,
    },

    /// Controller error.
    #[error("controller error: {0}")]
    Control(#[from] lifeline_core::ControlError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TestError {
    /// Creates a harness error.
    #[must_use]
    pub fn harness(msg: impl Into<String>) -> Self {
        Self::Harness(msg.into())
    }

    /// Creates an assertion error.
    #[must_use]
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_core::ControlError;

    #[test]
    fn test_harness_error() {
        let err = TestError::harness("stdout not piped");
        assert!(err.to_string().contains("harness error"));
        assert!(err.to_string().contains("stdout not piped"));
    }

    #[test]
    fn test_assertion_error() {
        let err = TestError::assertion("expected alive");
        assert!(err.to_string().contains("assertion failed"));
    }

    #[test]
    fn test_timeout_error() {
        let err = TestError::Timeout(Duration::from_secs(2));
        assert!(err.to_string().contains("2s"));
    }

    #[test]
    fn test_eof_error() {
        let err = TestError::UnexpectedEof {
            expected: "READY".to_string(),
        };
        assert!(err.to_string().contains("\"READY\""));
    }

    #[test]
    fn test_from_control_error() {
        let err: TestError = ControlError::Terminate(7).into();
        assert!(matches!(err, TestError::Control(_)));
        assert!(err.to_string().contains("could not terminate process 7"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: TestError = io_err.into();
        assert!(matches!(err, TestError::Io(_)));
    }
}
