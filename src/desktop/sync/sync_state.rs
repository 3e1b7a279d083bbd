//! # Sync State Management
//!
//! In-memory connectivity state owned by one orchestrator instance. Nothing
//! here is persisted; a fresh instance starts in [`NetworkStatus::Unknown`].

use crate::desktop::sync::network_monitor::NetworkStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Reachability plus the drain re-entrancy flag
#[derive(Debug, Default)]
pub struct ConnectivityState {
    status: Mutex<NetworkStatus>,
    draining: AtomicBool,
}

/// Result of a status update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub previous: NetworkStatus,
    pub current: NetworkStatus,
}

impl Transition {
    /// Whether the status actually changed
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

impl ConnectivityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> NetworkStatus {
        *self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a new status and report what it replaced
    pub fn set_status(&self, status: NetworkStatus) -> Transition {
        let mut current = self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = *current;
        *current = status;
        Transition {
            previous,
            current: status,
        }
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Claim the drain flag; `None` when a drain is already running.
    ///
    /// The flag is released when the returned guard is dropped.
    pub fn try_begin_drain(&self) -> Option<DrainGuard<'_>> {
        self.draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| DrainGuard { state: self })
    }
}

/// Holds the drain flag for its lifetime
#[derive(Debug)]
pub struct DrainGuard<'a> {
    state: &'a ConnectivityState,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.state.draining.store(false, Ordering::SeqCst);
    }
}
