//! # Network Monitor
//!
//! Decides whether a failed request means "the server is unreachable" or "the
//! server said no".
//!
//! ## Features
//!
//! - **Connectivity Classification**: [`is_network_error`] inspects an
//!   [`ApiError`] and never panics
//! - **Status Tracking**: [`NetworkStatus`] is the tri-state reachability
//!   the orchestrator keeps
//!
//! An error counts as a network failure when any of these holds:
//!
//! - it is explicitly flagged unreachable
//! - its HTTP status is 502, 503 or 504
//! - its low-level code is a connection-failure code (refused, reset, DNS, timeout)
//! - it is a transport-level request failure of the HTTP client
//! - its message mentions fetch, network, connection or timeout failures
//!
//! The rule is a heuristic. A false negative surfaces an error to the user
//! instead of queuing; a false positive queues a save that will keep failing.

use crate::shared::error::ApiError;
use regex::Regex;
use std::sync::LazyLock;

/// Statuses returned by gateways and proxies when the origin is unreachable
const GATEWAY_STATUSES: [u16; 3] = [502, 503, 504];

static CONNECTION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(ECONNREFUSED|ECONNRESET|ECONNABORTED|ENOTFOUND|EAI_AGAIN|ETIMEDOUT|ESOCKETTIMEDOUT|EHOSTUNREACH|ENETUNREACH|EPIPE)$",
    )
    .expect("connection code pattern is valid")
});

static NETWORK_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(failed to fetch|fetch failed|network|connection|connect error|timed? ?out|timeout|dns|unreachable|socket hang up|ECONN|ENOTFOUND)")
        .expect("network message pattern is valid")
});

/// Reachability of the remote endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkStatus {
    /// No connectivity check or request has completed since start-up
    #[default]
    Unknown,
    Online,
    Offline,
}

impl NetworkStatus {
    /// `Some(true)` online, `Some(false)` offline, `None` unknown
    pub fn is_reachable(&self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Online => Some(true),
            Self::Offline => Some(false),
        }
    }
}

/// Whether `error` indicates that the remote endpoint is unreachable
pub fn is_network_error(error: &ApiError) -> bool {
    match error {
        ApiError::Unreachable { .. } => true,
        ApiError::NotConfigured | ApiError::Unauthorized(_) => false,
        ApiError::Request(err) => {
            if err.is_connect() || err.is_timeout() || err.is_request() {
                return true;
            }
            if let Some(status) = err.status() {
                return GATEWAY_STATUSES.contains(&status.as_u16());
            }
            matches_message(&err.to_string())
        }
        other => {
            if other
                .status_code()
                .is_some_and(|status| GATEWAY_STATUSES.contains(&status))
            {
                return true;
            }
            if other.error_code().is_some_and(|code| CONNECTION_CODE.is_match(code)) {
                return true;
            }
            matches_message(&other.to_string())
        }
    }
}

fn matches_message(message: &str) -> bool {
    NETWORK_MESSAGE.is_match(message)
}
