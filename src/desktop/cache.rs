//! # Local Project Cache
//!
//! Snapshot of the last known server-side project list, persisted to
//! `projects-cache.json`, so the UI keeps a project list while offline.
//!
//! Records are keyed by [`IdentityKey`]: `id` when present and non-null,
//! otherwise `name`. Records without either are always appended, so repeated
//! upserts of such records produce duplicates.

use crate::desktop::offline::storage::JsonArrayFile;
use crate::shared::config::CorruptionPolicy;
use crate::shared::error::SyncError;
use crate::shared::project::{self, IdentityKey};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// JSON-backed cache of project records
#[derive(Debug)]
pub struct ProjectCache {
    file: JsonArrayFile,
    write_lock: Mutex<()>,
}

impl ProjectCache {
    pub fn new(path: impl Into<PathBuf>, policy: CorruptionPolicy) -> Self {
        Self {
            file: JsonArrayFile::new(path, policy),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Replace the whole cache.
    ///
    /// Entries that are not JSON objects are dropped; a non-array input empties
    /// the cache. Returns the number of records stored.
    pub async fn set_projects(&self, projects: &Value) -> Result<usize, SyncError> {
        let records: Vec<Value> = match projects.as_array() {
            Some(items) => items.iter().filter(|item| item.is_object()).cloned().collect(),
            None => {
                tracing::warn!("[CACHE] Project list is not an array, clearing cache");
                Vec::new()
            }
        };

        let _guard = self.write_lock.lock().await;
        self.file.write(&records).await?;
        tracing::debug!("[CACHE] Stored {} project(s)", records.len());
        Ok(records.len())
    }

    /// Insert `project`, or shallow-merge it onto the record with the same identity.
    ///
    /// Returns the stored record.
    pub async fn upsert_project(&self, project: &Value) -> Result<Value, SyncError> {
        self.upsert_with(project, |_| {}).await
    }

    /// Upsert a record confirmed by the server; the stored record loses its
    /// `pendingSync` marker.
    pub async fn upsert_confirmed(&self, project: &Value) -> Result<Value, SyncError> {
        self.upsert_with(project, project::clear_pending).await
    }

    /// Cached records; an unreadable cache yields an empty list
    pub async fn get_cached_projects(&self) -> Vec<Value> {
        match self.file.read().await {
            Ok(records) => records.into_iter().filter(|r| r.is_object()).collect(),
            Err(e) => {
                tracing::error!("[CACHE] Failed to read project cache: {}", e);
                Vec::new()
            }
        }
    }

    async fn upsert_with<F>(&self, project: &Value, finish: F) -> Result<Value, SyncError>
    where
        F: FnOnce(&mut Value),
    {
        if !project.is_object() {
            return Err(SyncError::invalid_payload("project must be a JSON object"));
        }

        let _guard = self.write_lock.lock().await;
        let mut records: Vec<Value> = self.file.read().await?;

        let existing = IdentityKey::of(project).and_then(|key| {
            records
                .iter()
                .position(|record| IdentityKey::of(record).as_ref() == Some(&key))
        });

        let stored = match existing {
            Some(index) => {
                let mut merged = project::shallow_merge(&records[index], project);
                finish(&mut merged);
                records[index] = merged.clone();
                merged
            }
            None => {
                let mut fresh = project.clone();
                finish(&mut fresh);
                records.push(fresh.clone());
                fresh
            }
        };

        self.file.write(&records).await?;
        Ok(stored)
    }
}
