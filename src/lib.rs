//! Timetrack - Offline Project Sync Library
//!
//! Timetrack is a desktop time tracker whose projects live on a remote
//! service. This library keeps project edits from being lost when that
//! service cannot be reached.
//!
//! # Overview
//!
//! This library provides:
//! - A durable on-disk queue of project saves that failed for network reasons
//! - A local project cache that reflects queued edits immediately
//! - A classifier that separates "server unreachable" from "server said no"
//! - A sync orchestrator that checks connectivity and replays the queue
//! - Lifecycle events for the UI over a `tokio::sync::broadcast` channel
//!
//! # Module Structure
//!
//! - **`shared`** - Types with no I/O
//!   - Error types, sync events, project record helpers
//!   - Validated configuration values
//!
//! - **`desktop`** - The sync core running in the desktop process
//!   - Configuration loading from env and `config.toml`
//!   - HTTP project client
//!   - Offline queue, project cache, sync orchestrator
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use timetrack::desktop::{Config, HttpProjectApi, SyncOrchestrator};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let api = Arc::new(HttpProjectApi::new(config.clone())?);
//! let sync = SyncOrchestrator::from_config(&config, api);
//!
//! sync.start_watcher();
//! let outcome = sync
//!     .save_project(json!({"id": "p1", "name": "Demo"}), None)
//!     .await?;
//! println!("queued: {}", outcome.is_queued());
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - **Queue and cache**: every read-modify-write runs under a `tokio::sync::Mutex`
//! - **Orchestrator**: cheap to clone, all state behind `Arc`
//! - **Drains**: at most one per orchestrator, guarded by an atomic flag
//!
//! # Error Handling
//!
//! - `shared::error::ApiError` for remote failures, inspected by the classifier
//! - `shared::error::SyncError` for everything the sync core returns
//! - `shared::config::ConfigError` for configuration loading

/// Shared types and data structures
pub mod shared;

/// Desktop sync core
pub mod desktop;
