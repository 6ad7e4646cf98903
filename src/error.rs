//! Error types for wp-remote-images
//!
//! Only fatal conditions surface as [`Error`]: an invalid configuration or a failed
//! post-list fetch. Per-image download failures are logged and reported through
//! [`Event::ImageFailed`](crate::types::Event::ImageFailed) instead, so a single
//! broken image never aborts a load.

use thiserror::Error;

/// Result type alias for wp-remote-images operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wp-remote-images
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "baseUrl")
        key: Option<String>,
    },

    /// Transport-level HTTP failure (connect, TLS, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// No progress on a request within the configured timeout
    #[error("timed out waiting on {url}")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filename rewrite pattern failed to compile
    #[error("invalid filename pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl Error {
    /// Build a [`Error::Config`] for the given configuration key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Whether the error came from the HTTP layer (transport, status or timeout)
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Http { .. } | Error::Timeout { .. }
        )
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_keeps_key() {
        let err = Error::config("must not be empty", "imageDirectory");
        match &err {
            Error::Config { message, key } => {
                assert_eq!(message, "must not be empty");
                assert_eq!(key.as_deref(), Some("imageDirectory"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "configuration error: must not be empty"
        );
    }

    #[test]
    fn http_error_display() {
        let err = Error::Http {
            status: 404,
            url: "https://example.com/wp-json/wp/v2/posts".into(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 404 from https://example.com/wp-json/wp/v2/posts"
        );
        assert!(err.is_network());
    }

    #[test]
    fn io_and_serialization_convert() {
        let io: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, Error::Io(_)));
        assert!(!io.is_network());

        let json: Error = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(json, Error::Serialization(_)));
    }
}
