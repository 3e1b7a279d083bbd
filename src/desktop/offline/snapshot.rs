//! Best-effort snapshots.
//!
//! A queued save must not alias the caller's in-memory project, so the payload
//! is captured as an owned JSON tree at enqueue time. Capturing goes through
//! serde; values serde cannot represent (maps with non-string keys, failing
//! `Serialize` impls) yield a [`SnapshotError`] the caller can act on.

use crate::shared::error::SnapshotError;
use serde::Serialize;
use serde_json::Value;

/// Detached JSON copy of a value
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Value);

impl Snapshot {
    /// Capture `value` as an owned JSON tree
    pub fn capture<T: Serialize + ?Sized>(value: &T) -> Result<Self, SnapshotError> {
        Ok(Self(serde_json::to_value(value)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Snapshot> for Value {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.0
    }
}
