//! Desktop Sync Core
//!
//! Everything that runs inside the desktop process: configuration loading,
//! the HTTP project client, the offline queue, the project cache and the sync
//! orchestrator that ties them together.
//!
//! # Module Structure
//!
//! - **`config`** - data directory, file locations, env and file overrides
//! - **`api_client`** - [`ProjectApi`] trait and its reqwest implementation
//! - **`offline`** - durable save queue and its storage
//! - **`cache`** - local copy of the project list
//! - **`sync`** - connectivity classification, state and the orchestrator

pub mod api_client;
pub mod cache;
pub mod config;
pub mod offline;
pub mod sync;

pub use api_client::{HttpProjectApi, ProjectApi};
pub use cache::ProjectCache;
pub use config::Config;
pub use offline::{OfflineQueue, SavePayload};
pub use sync::{
    CheckOptions, DrainAttempt, ForceSyncResult, LoadedProjects, SaveOutcome, SkipReason,
    SyncOrchestrator,
};
