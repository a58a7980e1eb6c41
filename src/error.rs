//! Error types for the Bottango API client
//!
//! Failures fall in two classes: a connection failure means the Bottango
//! application is unreachable and nothing useful can continue, every other
//! failure concerns a single request and leaves the client usable.

use thiserror::Error;

/// Result alias used across the client
pub type Result<T> = std::result::Result<T, BottangoError>;

/// Errors returned by [`crate::BottangoClient`] operations
#[derive(Debug, Error)]
pub enum BottangoError {
    /// The server refused or could not be reached
    #[error("Error connecting to bottango API at {host}:{port}")]
    Connection { host: String, port: u16 },

    /// The server answered with a non-success HTTP status
    #[error("Error in request at '{endpoint}': HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// Transport failure short of a connection failure (timeout, broken body, ...)
    #[error("Error in request at '{endpoint}': {message}")]
    Request { endpoint: String, message: String },

    /// The response body did not match the expected schema
    #[error("Error in request at '{endpoint}': malformed response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be serialized
    #[error("Error in request at '{endpoint}': could not encode body: {source}")]
    Encode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client itself could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl BottangoError {
    /// Whether the failure should end the process.
    ///
    /// Only connection failures are fatal; everything else is reported to
    /// the caller as missing data.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BottangoError::Connection { .. })
    }

    /// Endpoint the failed request targeted, if the error concerns one
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            BottangoError::Status { endpoint, .. }
            | BottangoError::Request { endpoint, .. }
            | BottangoError::Decode { endpoint, .. }
            | BottangoError::Encode { endpoint, .. } => Some(endpoint),
            BottangoError::Connection { .. } | BottangoError::ClientBuild(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_is_fatal_and_names_target() {
        let err = BottangoError::Connection {
            host: "localhost".to_string(),
            port: 59224,
        };
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Error connecting to bottango API at localhost:59224"
        );
        assert_eq!(err.endpoint(), None);
    }

    #[test]
    fn test_request_errors_are_recoverable() {
        let status = BottangoError::Status {
            endpoint: "PlaybackState/".to_string(),
            status: 500,
        };
        assert!(!status.is_fatal());
        assert_eq!(status.endpoint(), Some("PlaybackState/"));
        assert_eq!(
            status.to_string(),
            "Error in request at 'PlaybackState/': HTTP 500"
        );

        let decode = BottangoError::Decode {
            endpoint: "Animations/".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert!(!decode.is_fatal());
        assert!(decode.to_string().contains("malformed response"));
    }
}
