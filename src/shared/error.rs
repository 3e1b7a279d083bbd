//! Shared Error Types
//!
//! This module defines the error types used across the sync core.
//!
//! # Error Categories
//!
//! - `ApiError` - Failures raised by the remote project API client
//! - `SnapshotError` - A value could not be captured as a detached JSON snapshot
//! - `SyncError` - Everything the queue, cache and orchestrator can return
//!
//! # Usage
//!
//! ```rust
//! use timetrack::shared::error::SyncError;
//!
//! let error = SyncError::invalid_payload("projectData must be a JSON object");
//! assert_eq!(error.code(), "INVALID_PAYLOAD");
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be moved across task boundaries.
use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable code returned when a forced sync leaves entries behind.
pub const OFFLINE_SYNC_INCOMPLETE: &str = "OFFLINE_SYNC_INCOMPLETE";

/// Errors raised by the remote project API client.
///
/// The variants mirror the facts the connectivity classifier inspects:
/// an explicit "unreachable" flag, an HTTP status, a low-level error code,
/// the generic request-failure type and the message text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client already knows the endpoint is unreachable
    #[error("network unreachable: {message}")]
    Unreachable {
        /// Human-readable error message
        message: String,
        /// Low-level error code such as `ECONNREFUSED`
        code: Option<String>,
    },

    /// Generic low-level request failure from the HTTP stack
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
        /// Application error code from the response body, if any
        code: Option<String>,
    },

    /// Credentials were rejected
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The server answered with something that is not a project record
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Any other failure reported by a client implementation
    #[error("{message}")]
    Other {
        /// Human-readable error message
        message: String,
        /// Optional error code
        code: Option<String>,
    },

    /// No remote endpoint is configured
    #[error("remote endpoint is not configured")]
    NotConfigured,
}

impl ApiError {
    /// Create an unreachable error without a code
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
            code: None,
        }
    }

    /// Create a status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// Create a generic error carrying a low-level code
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create a generic error from a message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            code: None,
        }
    }

    /// HTTP status attached to this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            Self::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    /// Low-level error code attached to this error, if any
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Unreachable { code, .. } | Self::Status { code, .. } | Self::Other { code, .. } => {
                code.as_deref()
            }
            _ => None,
        }
    }
}

/// A value could not be turned into a detached JSON snapshot.
#[derive(Debug, Error)]
#[error("value cannot be snapshotted: {reason}")]
pub struct SnapshotError {
    /// Why serialization failed
    pub reason: String,
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

/// Errors returned by the offline queue, the project cache and the orchestrator.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The save payload is not usable
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Reading or writing a store file failed
    #[error("storage error at {path}: {source}")]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A store could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A payload could not be snapshotted
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The remote API rejected the request
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No remote endpoint is configured
    #[error("remote endpoint is not configured")]
    NotConfigured,

    /// A forced sync finished with entries still queued
    #[error("offline sync incomplete: {drained} drained, {remaining} remaining")]
    SyncIncomplete {
        /// Entries that were saved during the attempt
        drained: usize,
        /// Entries still waiting in the queue
        remaining: usize,
    },
}

impl SyncError {
    /// Create an invalid payload error
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::Io { .. } => "STORAGE_IO",
            Self::Serialization(_) => "SERIALIZATION",
            Self::Snapshot(_) => "SNAPSHOT",
            Self::Api(_) => "API_ERROR",
            Self::NotConfigured => "NOT_CONFIGURED",
            Self::SyncIncomplete { .. } => OFFLINE_SYNC_INCOMPLETE,
        }
    }
}
