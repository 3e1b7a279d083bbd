//! # Offline Save Queue
//!
//! Buffers project saves that could not reach the server and replays them
//! once connectivity returns.
//!
//! ## Features
//!
//! - **Persistent Queue**: Entries live in `offline-save-queue.json` and
//!   survive app restarts
//! - **FIFO Replay**: Entries are attempted strictly in insertion order
//! - **Partial-Failure Tolerant**: A failing entry never stops the pass; it
//!   stays queued in its relative position
//! - **Disk Is the Source of Truth**: Every read parses the file fresh
//!
//! ## Usage
//!
//! ```rust,no_run
//! use timetrack::desktop::offline::queue::{OfflineQueue, SavePayload};
//! use timetrack::shared::CorruptionPolicy;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), timetrack::shared::SyncError> {
//! let queue = OfflineQueue::new("/tmp/offline-save-queue.json", CorruptionPolicy::Reset);
//!
//! queue.enqueue(SavePayload::new(json!({"id": "p1", "name": "Demo"}))).await?;
//!
//! let report = queue
//!     .drain(|project, original_name| async move {
//!         // Save remotely...
//!         let _ = (project, original_name);
//!         Ok::<(), timetrack::shared::SyncError>(())
//!     })
//!     .await?;
//! assert_eq!(report.processed, 1);
//! # Ok(())
//! # }
//! ```

use crate::desktop::offline::snapshot::Snapshot;
use crate::desktop::offline::storage::JsonArrayFile;
use crate::shared::config::CorruptionPolicy;
use crate::shared::error::{SnapshotError, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// One buffered save operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    /// Project state at enqueue time
    pub project_data: Value,
    /// Project name before this edit, used by the server to detect renames
    #[serde(default)]
    pub original_name: Option<String>,
    /// When the entry was appended
    pub enqueued_at: DateTime<Utc>,
}

/// Input to [`OfflineQueue::enqueue`]
#[derive(Debug, Clone, PartialEq)]
pub struct SavePayload {
    /// Project state to save; must be a JSON object
    pub project_data: Value,
    /// Project name before the edit
    pub original_name: Option<String>,
}

impl SavePayload {
    pub fn new(project_data: Value) -> Self {
        Self {
            project_data,
            original_name: None,
        }
    }

    /// Snapshot any serializable project into a payload
    pub fn from_project<T: Serialize + ?Sized>(project: &T) -> Result<Self, SnapshotError> {
        Ok(Self::new(Snapshot::capture(project)?.into_value()))
    }

    pub fn with_original_name(mut self, original_name: Option<String>) -> Self {
        self.original_name = original_name;
        self
    }
}

/// Per-entry outcome of a drain
#[derive(Debug)]
pub enum EntryOutcome {
    /// The processor saved the entry; it was removed
    Fulfilled,
    /// The processor failed; the entry stays queued
    Rejected(SyncError),
}

impl EntryOutcome {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled)
    }
}

/// Outcome of one queued entry
#[derive(Debug)]
pub struct EntryResult {
    /// Timestamp of the entry, which identifies it within the queue
    pub enqueued_at: DateTime<Utc>,
    pub outcome: EntryOutcome,
}

/// Summary of a drain pass
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Entries saved and removed
    pub processed: usize,
    /// Entries that failed and remain queued
    pub failed: usize,
    /// One result per attempted entry, in queue order
    pub results: Vec<EntryResult>,
}

impl DrainReport {
    pub fn attempted(&self) -> usize {
        self.results.len()
    }
}

/// Durable FIFO queue of pending project saves
#[derive(Debug)]
pub struct OfflineQueue {
    file: JsonArrayFile,
    /// Serializes read-modify-write cycles on the file
    write_lock: Mutex<()>,
}

impl OfflineQueue {
    pub fn new(path: impl Into<PathBuf>, policy: CorruptionPolicy) -> Self {
        Self {
            file: JsonArrayFile::new(path, policy),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Append a save to the queue and persist the full list.
    ///
    /// Fails with [`SyncError::InvalidPayload`] when `project_data` is not a
    /// JSON object.
    pub async fn enqueue(&self, payload: SavePayload) -> Result<QueueEntry, SyncError> {
        if !payload.project_data.is_object() {
            return Err(SyncError::invalid_payload("projectData must be a JSON object"));
        }

        let entry = QueueEntry {
            project_data: payload.project_data,
            original_name: payload.original_name,
            enqueued_at: Utc::now(),
        };

        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.push(entry.clone());
        self.file.write(&entries).await?;

        tracing::info!("[QUEUE] Save queued, {} pending", entries.len());
        Ok(entry)
    }

    /// Entries currently on disk, oldest first
    pub async fn get_pending(&self) -> Result<Vec<QueueEntry>, SyncError> {
        self.read_entries().await
    }

    pub async fn pending_count(&self) -> Result<usize, SyncError> {
        Ok(self.read_entries().await?.len())
    }

    /// Replay every entry through `processor` in FIFO order.
    ///
    /// A failing entry is kept and the pass continues. Succeeded entries are
    /// removed from the file afterwards; entries appended while the pass was
    /// running are preserved.
    pub async fn drain<F, Fut>(&self, mut processor: F) -> Result<DrainReport, SyncError>
    where
        F: FnMut(Value, Option<String>) -> Fut,
        Fut: Future<Output = Result<(), SyncError>>,
    {
        let entries = self.read_entries().await?;
        if entries.is_empty() {
            return Ok(DrainReport::default());
        }

        let mut report = DrainReport::default();
        let mut succeeded = Vec::new();

        for entry in &entries {
            let outcome = match processor(entry.project_data.clone(), entry.original_name.clone()).await {
                Ok(()) => {
                    report.processed += 1;
                    succeeded.push(entry.clone());
                    EntryOutcome::Fulfilled
                }
                Err(e) => {
                    tracing::warn!(
                        "[QUEUE] Queued save from {} failed: {}",
                        entry.enqueued_at.to_rfc3339(),
                        e
                    );
                    report.failed += 1;
                    EntryOutcome::Rejected(e)
                }
            };
            report.results.push(EntryResult {
                enqueued_at: entry.enqueued_at,
                outcome,
            });
        }

        if !succeeded.is_empty() {
            let _guard = self.write_lock.lock().await;
            let mut current = self.read_entries().await?;
            for done in &succeeded {
                if let Some(index) = current.iter().position(|entry| entry == done) {
                    current.remove(index);
                }
            }
            self.file.write(&current).await?;
        }

        tracing::info!(
            "[QUEUE] Drain finished: {} processed, {} failed",
            report.processed,
            report.failed
        );
        Ok(report)
    }

    /// Drop every queued entry; returns how many were removed
    pub async fn clear(&self) -> Result<usize, SyncError> {
        let _guard = self.write_lock.lock().await;
        let removed = self.read_entries().await?.len();
        self.file.write::<QueueEntry>(&[]).await?;
        if removed > 0 {
            tracing::warn!("[QUEUE] Cleared {} queued save(s)", removed);
        }
        Ok(removed)
    }

    async fn read_entries(&self) -> Result<Vec<QueueEntry>, SyncError> {
        let raw = self.file.read().await?;
        let mut entries = Vec::with_capacity(raw.len());
        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<QueueEntry>(value) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("[QUEUE] Skipping malformed queue entry #{}: {}", index, e);
                }
            }
        }
        Ok(entries)
    }
}
