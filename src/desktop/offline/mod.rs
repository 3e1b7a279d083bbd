//! # Offline Save System
//!
//! Keeps project saves durable while the server is unreachable.
//!
//! ## Architecture
//!
//! The offline system consists of:
//! - **Storage**: JSON-array files with atomic writes and corruption recovery
//! - **Snapshot**: detaches a project from live application state before queuing
//! - **Save Queue**: FIFO of saves waiting for the server, drained in order
//!
//! ## Key Components
//!
//! - `storage.rs`: the on-disk array file shared by the queue and the cache
//! - `snapshot.rs`: serialization of live values into plain JSON
//! - `queue.rs`: enqueue, inspect and drain queued saves
//!
//! ## Usage
//!
//! ```rust,no_run
//! use timetrack::desktop::offline::{OfflineQueue, SavePayload};
//! use timetrack::shared::CorruptionPolicy;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), timetrack::shared::SyncError> {
//! let queue = OfflineQueue::new("/tmp/offline-save-queue.json", CorruptionPolicy::Reset);
//! queue.enqueue(SavePayload::new(json!({"id": "p1", "name": "Demo"}))).await?;
//! assert_eq!(queue.pending_count().await?, 1);
//! # Ok(())
//! # }
//! ```

pub mod queue;
pub mod snapshot;
pub mod storage;

// Re-export main types
pub use queue::{DrainReport, EntryOutcome, EntryResult, OfflineQueue, QueueEntry, SavePayload};
pub use snapshot::Snapshot;
pub use storage::JsonArrayFile;
