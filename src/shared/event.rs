/**
 * Sync Lifecycle Events
 *
 * This module defines the events the sync orchestrator broadcasts to the UI
 * layer. Each event names a lifecycle status (`queued`, `started`, `success`,
 * `partial`, `error`, `offline`, `online`) and carries the counts the UI
 * needs to render its indicator.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status carried by a sync event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// A save was buffered in the offline queue
    Queued,
    /// A drain of the offline queue began
    Started,
    /// Every queued entry was saved
    Success,
    /// Some entries were saved, some remain queued
    Partial,
    /// The drain saved nothing or failed outright
    Error,
    /// The remote endpoint became unreachable
    Offline,
    /// The remote endpoint became reachable again
    Online,
}

impl SyncStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Started => "started",
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Error => "error",
            Self::Offline => "offline",
            Self::Online => "online",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event broadcast to every subscriber of the sync orchestrator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncEvent {
    /// Lifecycle status
    pub status: SyncStatus,
    /// Entries waiting in the queue, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<usize>,
    /// Entries saved during a drain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<usize>,
    /// Entries that failed during a drain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    /// Human-readable detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the event was emitted
    pub timestamp: DateTime<Utc>,
}

impl SyncEvent {
    /// Create a bare event with the current timestamp
    pub fn new(status: SyncStatus) -> Self {
        Self {
            status,
            pending: None,
            processed: None,
            failed: None,
            message: None,
            timestamp: Utc::now(),
        }
    }

    /// A save was queued; `pending` is the queue length after the append
    pub fn queued(pending: usize) -> Self {
        Self::new(SyncStatus::Queued).with_pending(Some(pending))
    }

    /// A drain started with `pending` entries
    pub fn started(pending: usize) -> Self {
        Self::new(SyncStatus::Started).with_pending(Some(pending))
    }

    /// Every entry of the drain was saved
    pub fn success(processed: usize) -> Self {
        let mut event = Self::new(SyncStatus::Success).with_pending(Some(0));
        event.processed = Some(processed);
        event.failed = Some(0);
        event
    }

    /// Some entries were saved and some failed
    pub fn partial(processed: usize, failed: usize) -> Self {
        let mut event = Self::new(SyncStatus::Partial).with_pending(Some(failed));
        event.processed = Some(processed);
        event.failed = Some(failed);
        event
    }

    /// Every attempted entry failed and stays queued
    pub fn all_failed(failed: usize) -> Self {
        let mut event = Self::new(SyncStatus::Error).with_pending(Some(failed));
        event.processed = Some(0);
        event.failed = Some(failed);
        event.message = Some(format!("{} queued save(s) could not be synced", failed));
        event
    }

    /// The drain itself failed; `pending` is `None` when it could not be read
    pub fn error(pending: Option<usize>, message: impl Into<String>) -> Self {
        Self::new(SyncStatus::Error)
            .with_pending(pending)
            .with_message(message)
    }

    /// The endpoint became unreachable
    pub fn offline(pending: Option<usize>) -> Self {
        Self::new(SyncStatus::Offline).with_pending(pending)
    }

    /// The endpoint became reachable
    pub fn online(pending: Option<usize>) -> Self {
        Self::new(SyncStatus::Online).with_pending(pending)
    }

    /// Set the pending count
    pub fn with_pending(mut self, pending: Option<usize>) -> Self {
        self.pending = pending;
        self
    }

    /// Set the message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
