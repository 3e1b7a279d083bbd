//! Shared Module
//!
//! This module contains types and data structures that are independent of the
//! desktop runtime: error types, lifecycle events, project record helpers and
//! validated configuration values.
//!
//! # Overview
//!
//! Nothing in here performs I/O. The types are used by the offline queue, the
//! project cache and the sync orchestrator, and are what the UI layer sees.

/// Error types
pub mod error;

/// Sync lifecycle events
pub mod event;

/// Project record helpers
pub mod project;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, CorruptionPolicy};
pub use error::{ApiError, SnapshotError, SyncError, OFFLINE_SYNC_INCOMPLETE};
pub use event::{SyncEvent, SyncStatus};
pub use project::IdentityKey;
