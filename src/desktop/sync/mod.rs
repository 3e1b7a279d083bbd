//! # Sync Orchestrator
//!
//! Coordinates the offline-resilient save pipeline: direct saves, queuing on
//! network failure, connectivity checks and replaying the queue.
//!
//! ## Architecture
//!
//! The orchestrator owns:
//! - **Project API**: the remote collaborator, behind [`ProjectApi`]
//! - **Offline Queue**: durable FIFO of saves that could not reach the server
//! - **Project Cache**: last known project list, updated optimistically
//! - **Connectivity State**: reachability and the drain re-entrancy flag
//! - **Event Channel**: `tokio::sync::broadcast` of [`SyncEvent`]s for the UI
//! - **Watcher**: periodic task that checks and drains the queue
//!
//! ## States
//!
//! `unknown` until the first connectivity check, then `online` / `offline`. Draining is a
//! sub-state guarded so that at most one drain runs per instance.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use timetrack::desktop::api_client::HttpProjectApi;
//! use timetrack::desktop::config::Config;
//! use timetrack::desktop::sync::SyncOrchestrator;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let api = Arc::new(HttpProjectApi::new(config.clone())?);
//! let sync = SyncOrchestrator::from_config(&config, api);
//!
//! let mut events = sync.subscribe();
//! sync.start_watcher();
//!
//! let outcome = sync.save_project(json!({"id": "p1", "name": "Demo"}), None).await?;
//! if outcome.is_queued() {
//!     println!("saved locally, will sync");
//! }
//! # let _ = events.recv().await;
//! # Ok(())
//! # }
//! ```

pub mod metrics;
pub mod network_monitor;
pub mod sync_state;

pub use metrics::SyncMetrics;
pub use network_monitor::{is_network_error, NetworkStatus};
pub use sync_state::ConnectivityState;

use crate::desktop::api_client::ProjectApi;
use crate::desktop::cache::ProjectCache;
use crate::desktop::config::Config;
use crate::desktop::offline::queue::{DrainReport, OfflineQueue, SavePayload};
use crate::shared::error::SyncError;
use crate::shared::event::SyncEvent;
use crate::shared::project::{self, QUEUED_FIELD};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Interval of the periodic queue watcher
    pub watch_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            watch_interval: crate::shared::config::DEFAULT_WATCH_INTERVAL,
        }
    }
}

/// Result of [`SyncOrchestrator::save_project`]
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The server accepted the save; carries its record
    Saved(Value),
    /// The server was unreachable; the save is queued. Carries the submitted
    /// record with `queued: true` and `pendingSync: true`.
    Queued(Value),
}

impl SaveOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }

    pub fn record(&self) -> &Value {
        match self {
            Self::Saved(record) | Self::Queued(record) => record,
        }
    }

    pub fn into_record(self) -> Value {
        match self {
            Self::Saved(record) | Self::Queued(record) => record,
        }
    }
}

/// Result of [`SyncOrchestrator::load_projects`]
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProjects {
    pub projects: Vec<Value>,
    /// `true` when the list came from the local cache because the server was unreachable
    pub offline: bool,
}

/// Why a queue check did not drain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No remote endpoint is configured
    NotConfigured,
    /// Nothing is queued
    QueueEmpty,
    /// Another drain holds the re-entrancy flag
    AlreadyDraining,
    /// The connectivity check found the endpoint unreachable
    Offline,
    /// The connectivity check failed for a reason other than connectivity
    ConnectionTestFailed,
}

impl SkipReason {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::QueueEmpty => "queue_empty",
            Self::AlreadyDraining => "already_draining",
            Self::Offline => "offline",
            Self::ConnectionTestFailed => "connection_test_failed",
        }
    }
}

/// Outcome of a queue check
#[derive(Debug)]
pub enum DrainAttempt {
    /// No drain was attempted
    Skipped(SkipReason),
    /// The drain ran to completion
    Drained(DrainReport),
    /// The drain itself failed; `pending` is `None` when it could not be re-read
    Errored { message: String, pending: Option<usize> },
}

impl DrainAttempt {
    /// Entries saved by this attempt
    pub fn drained(&self) -> usize {
        match self {
            Self::Drained(report) => report.processed,
            _ => 0,
        }
    }
}

/// Options for [`SyncOrchestrator::check_queue`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Drain without probing connectivity first
    pub skip_connection_test: bool,
}

/// Successful result of [`SyncOrchestrator::force_sync`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForceSyncResult {
    pub success: bool,
    pub drained: usize,
    pub remaining: usize,
}

/// Point-in-time view of the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivitySnapshot {
    pub status: NetworkStatus,
    pub draining: bool,
    pub watching: bool,
    /// Queue length, `None` when the queue could not be read
    pub pending: Option<usize>,
}

/// Main sync coordinator.
///
/// Cloning is cheap; clones share the queue, cache, state and event channel.
#[derive(Clone)]
pub struct SyncOrchestrator {
    api: Arc<dyn ProjectApi>,
    queue: Arc<OfflineQueue>,
    cache: Arc<ProjectCache>,
    state: Arc<ConnectivityState>,
    metrics: Arc<RwLock<SyncMetrics>>,
    events: broadcast::Sender<SyncEvent>,
    watcher: Arc<Mutex<Option<JoinHandle<()>>>>,
    config: SyncConfig,
}

impl std::fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("queue", &self.queue.path())
            .field("cache", &self.cache.path())
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SyncOrchestrator {
    /// Create an orchestrator over explicit parts
    pub fn new(
        api: Arc<dyn ProjectApi>,
        queue: OfflineQueue,
        cache: ProjectCache,
        config: SyncConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            queue: Arc::new(queue),
            cache: Arc::new(cache),
            state: Arc::new(ConnectivityState::new()),
            metrics: Arc::new(RwLock::new(SyncMetrics::new())),
            events,
            watcher: Arc::new(Mutex::new(None)),
            config,
        }
    }

    /// Create an orchestrator whose stores live in the configured data dir
    pub fn from_config(config: &Config, api: Arc<dyn ProjectApi>) -> Self {
        let policy = config.corruption_policy();
        Self::new(
            api,
            OfflineQueue::new(config.queue_path(), policy),
            ProjectCache::new(config.cache_path(), policy),
            SyncConfig {
                watch_interval: config.watch_interval(),
            },
        )
    }

    /// Receive every lifecycle event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    pub fn cache(&self) -> &ProjectCache {
        &self.cache
    }

    pub async fn metrics(&self) -> SyncMetrics {
        self.metrics.read().await.clone()
    }

    pub async fn connectivity(&self) -> ConnectivitySnapshot {
        ConnectivitySnapshot {
            status: self.state.status(),
            draining: self.state.is_draining(),
            watching: self.is_watching(),
            pending: self.queue.pending_count().await.ok(),
        }
    }

    /// Save a project, falling back to the offline queue when the server is unreachable.
    ///
    /// Network failures never reach the caller: the save is queued, the cache
    /// is updated with a `pendingSync` marker, a `queued` event is broadcast
    /// and [`SaveOutcome::Queued`] is returned. Any other failure is returned
    /// unchanged as [`SyncError::Api`].
    pub async fn save_project(
        &self,
        project: Value,
        original_name: Option<String>,
    ) -> Result<SaveOutcome, SyncError> {
        if !project.is_object() {
            return Err(SyncError::invalid_payload("project must be a JSON object"));
        }

        match self.api.save_project(&project, original_name.as_deref()).await {
            Ok(record) => {
                self.confirm_in_cache(&project, &record).await;
                Ok(SaveOutcome::Saved(record))
            }
            Err(e) if is_network_error(&e) => {
                tracing::warn!(
                    "[SYNC] Save of {} failed with a network error, queuing: {}",
                    project::project_name(&project).unwrap_or("<unnamed>"),
                    e
                );

                let optimistic = project::mark_pending(&project);
                self.queue
                    .enqueue(SavePayload::new(project).with_original_name(original_name))
                    .await?;
                let pending = self.queue.pending_count().await?;

                if let Err(cache_error) = self.cache.upsert_project(&optimistic).await {
                    tracing::warn!("[SYNC] Optimistic cache update failed: {}", cache_error);
                }

                self.emit(SyncEvent::queued(pending));
                self.mark_offline(Some(pending));

                let mut result = optimistic;
                if let Some(object) = result.as_object_mut() {
                    object.insert(QUEUED_FIELD.to_string(), Value::Bool(true));
                }
                Ok(SaveOutcome::Queued(result))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load projects from the server, or from the cache while offline
    pub async fn load_projects(&self) -> Result<LoadedProjects, SyncError> {
        match self.api.load_projects().await {
            Ok(projects) => {
                if let Err(e) = self.cache.set_projects(&Value::Array(projects.clone())).await {
                    tracing::warn!("[SYNC] Failed to refresh project cache: {}", e);
                }
                Ok(LoadedProjects {
                    projects,
                    offline: false,
                })
            }
            Err(e) if is_network_error(&e) => {
                tracing::warn!("[SYNC] Project load failed with a network error, using cache: {}", e);
                let pending = self.queue.pending_count().await.ok();
                self.mark_offline(pending);
                Ok(LoadedProjects {
                    projects: self.cache.get_cached_projects().await,
                    offline: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check the queue and drain it when the endpoint is reachable.
    ///
    /// Shared by the periodic watcher and manual triggers. Storage errors
    /// while counting the queue are returned; failures of the drain itself
    /// are reported as [`DrainAttempt::Errored`] and an `error` event.
    pub async fn check_queue(&self, options: CheckOptions) -> Result<DrainAttempt, SyncError> {
        if !self.api.is_configured() {
            tracing::debug!("[SYNC] Remote endpoint not configured, skipping queue check");
            return Ok(DrainAttempt::Skipped(SkipReason::NotConfigured));
        }

        let pending = self.queue.pending_count().await?;
        if pending == 0 {
            return Ok(DrainAttempt::Skipped(SkipReason::QueueEmpty));
        }

        let Some(_guard) = self.state.try_begin_drain() else {
            tracing::debug!("[SYNC] Drain already running, skipping");
            return Ok(DrainAttempt::Skipped(SkipReason::AlreadyDraining));
        };

        if !options.skip_connection_test {
            match self.api.test_connection().await {
                Ok(()) => self.mark_online(Some(pending)),
                Err(e) if is_network_error(&e) => {
                    tracing::debug!("[SYNC] Connectivity check failed: {}", e);
                    self.mark_offline(Some(pending));
                    return Ok(DrainAttempt::Skipped(SkipReason::Offline));
                }
                Err(e) => {
                    tracing::warn!("[SYNC] Connectivity check rejected: {}", e);
                    return Ok(DrainAttempt::Skipped(SkipReason::ConnectionTestFailed));
                }
            }
        }

        Ok(self.run_drain(pending).await)
    }

    /// Drain now and fail with `OFFLINE_SYNC_INCOMPLETE` if anything is left
    pub async fn force_sync(&self) -> Result<ForceSyncResult, SyncError> {
        if !self.api.is_configured() {
            return Err(SyncError::NotConfigured);
        }

        let attempt = self.check_queue(CheckOptions::default()).await?;
        let drained = attempt.drained();
        let remaining = self.queue.pending_count().await?;

        if remaining > 0 {
            return Err(SyncError::SyncIncomplete { drained, remaining });
        }
        Ok(ForceSyncResult {
            success: true,
            drained,
            remaining,
        })
    }

    /// The UI saw a request fail on its own; go offline and keep watching.
    ///
    /// Always broadcasts `offline`, even when the state already was offline.
    pub async fn report_connection_error(&self) {
        let pending = self.queue.pending_count().await.ok();
        let transition = self.state.set_status(NetworkStatus::Offline);
        if transition.changed() {
            tracing::info!("[SYNC] Connection lost (reported), {:?} save(s) pending", pending);
        }
        self.emit(SyncEvent::offline(pending));
        self.start_watcher();
    }

    /// Start the periodic watcher; returns `false` when it is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_watcher(&self) -> bool {
        let mut watcher = self.watcher.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if watcher.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let this = self.clone();
        let interval = self.config.watch_interval;
        *watcher = Some(tokio::spawn(async move { this.watch_loop(interval).await }));
        tracing::info!("[SYNC] Queue watcher started, interval {:?}", interval);
        true
    }

    pub fn stop_watcher(&self) {
        let mut watcher = self.watcher.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = watcher.take() {
            handle.abort();
            tracing::info!("[SYNC] Queue watcher stopped");
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn watch_loop(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match self.check_queue(CheckOptions::default()).await {
                Ok(DrainAttempt::Skipped(reason)) => {
                    tracing::trace!("[SYNC] Watch tick skipped: {}", reason.code());
                }
                Ok(_) => {}
                Err(e) => tracing::error!("[SYNC] Watch tick failed: {}", e),
            }
        }
    }

    async fn run_drain(&self, pending: usize) -> DrainAttempt {
        let run_id = Uuid::new_v4();
        tracing::info!("[SYNC] Draining {} queued save(s) (run {})", pending, run_id);
        self.emit(SyncEvent::started(pending));
        self.metrics.write().await.record_drain_start();

        let result = self
            .queue
            .drain(|project, original_name| self.replay(project, original_name))
            .await;

        match result {
            Ok(report) => {
                self.metrics
                    .write()
                    .await
                    .record_drain_finish(report.processed, report.failed);

                let event = match (report.processed, report.failed) {
                    (processed, 0) => SyncEvent::success(processed),
                    (0, failed) => SyncEvent::all_failed(failed),
                    (processed, failed) => SyncEvent::partial(processed, failed),
                };
                tracing::info!(
                    "[SYNC] Run {} finished: {} of {} saved",
                    run_id,
                    report.processed,
                    report.attempted()
                );
                self.emit(event);
                DrainAttempt::Drained(report)
            }
            Err(e) => {
                tracing::error!("[SYNC] Run {} failed: {}", run_id, e);
                self.metrics.write().await.record_drain_error();

                let pending = match self.queue.pending_count().await {
                    Ok(count) => Some(count),
                    Err(count_error) => {
                        tracing::warn!("[SYNC] Could not re-read queue after failed drain: {}", count_error);
                        None
                    }
                };
                let message = e.to_string();
                self.emit(SyncEvent::error(pending, message.clone()));
                DrainAttempt::Errored { message, pending }
            }
        }
    }

    /// Save one queued entry for real
    async fn replay(&self, project: Value, original_name: Option<String>) -> Result<(), SyncError> {
        let record = match self.api.save_project(&project, original_name.as_deref()).await {
            Ok(record) => record,
            Err(e) => {
                if is_network_error(&e) {
                    let pending = self.queue.pending_count().await.ok();
                    self.mark_offline(pending);
                }
                return Err(e.into());
            }
        };
        self.confirm_in_cache(&project, &record).await;
        Ok(())
    }

    /// Merge the server record over the submitted one and store it without the pending marker
    async fn confirm_in_cache(&self, submitted: &Value, record: &Value) {
        let confirmed = project::shallow_merge(submitted, record);
        if let Err(e) = self.cache.upsert_confirmed(&confirmed).await {
            tracing::warn!("[SYNC] Failed to update project cache after save: {}", e);
        }
    }

    fn mark_online(&self, pending: Option<usize>) {
        let transition = self.state.set_status(NetworkStatus::Online);
        if transition.previous == NetworkStatus::Offline {
            tracing::info!("[SYNC] Connection restored");
            self.emit(SyncEvent::online(pending));
        }
    }

    fn mark_offline(&self, pending: Option<usize>) {
        let transition = self.state.set_status(NetworkStatus::Offline);
        if transition.changed() {
            tracing::info!("[SYNC] Connection lost, {:?} save(s) pending", pending);
            self.emit(SyncEvent::offline(pending));
        }
    }

    fn emit(&self, event: SyncEvent) {
        match self.events.send(event) {
            Ok(receivers) => {
                tracing::debug!("[SYNC] Event broadcast to {} subscriber(s)", receivers);
            }
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!("[SYNC] No subscribers for {} event", event.status);
            }
        }
    }
}
