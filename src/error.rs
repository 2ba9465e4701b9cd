//! Error types for the sync adapter
//!
//! Every failure a dispatch can produce is a variant of [`SyncError`]; all of
//! them travel through the same rejection path.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

// == Sync Error Enum ==
/// Unified error type for a sync call.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The cache client failed while reading the derived key
    #[error("Cache read failed: {0}")]
    CacheRead(#[from] CacheClientError),

    /// Connection refused, reset, DNS failure and friends
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The exchange did not finish before the armed timeout fired
    #[error("Request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// The remote answered with a 4xx/5xx status
    #[error("Remote returned status {status} for {url}")]
    RemoteStatus {
        status: u16,
        url: String,
        headers: BTreeMap<String, String>,
        body: Value,
    },

    /// A response body (network or cached) was not valid JSON
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The outgoing payload could not be serialized
    #[error("Failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// No target url, or one that does not parse
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}

impl SyncError {
    /// Status code of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::RemoteStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded body of a remote rejection, if this is one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            SyncError::RemoteStatus { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SyncError::Timeout { .. })
    }
}

// == Collaborator Errors ==
/// Error reported by a cache client implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CacheClientError(pub String);

impl CacheClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Error reported by a transport before any status was received.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::with_source(err.to_string(), err)
    }
}

// == Result Type Alias ==
/// Convenience Result type for sync calls.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_status_accessors() {
        let err = SyncError::RemoteStatus {
            status: 404,
            url: "http://localhost/err".to_string(),
            headers: BTreeMap::new(),
            body: json!({"message": "Not Found"}),
        };

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body().unwrap()["message"], "Not Found");
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_timeout_display() {
        let err = SyncError::Timeout {
            after: Duration::from_millis(250),
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Request timed out after 250ms");
    }

    #[test]
    fn test_cache_client_error_converts() {
        let err: SyncError = CacheClientError::new("connection lost").into();
        assert!(matches!(err, SyncError::CacheRead(_)));
        assert!(err.to_string().contains("connection lost"));
    }
}
