//! # JSON Store Files
//!
//! Both the offline queue and the project cache persist a single JSON array
//! that is rewritten in full on every mutation. This module owns the file
//! handling they share:
//!
//! - **Lazy creation**: the directory and an empty `[]` file are created on
//!   first access
//! - **Self-healing reads**: unparseable content is replaced by `[]` according
//!   to the configured [`CorruptionPolicy`]
//! - **Whole-file writes**: content is written to a sibling temp file and
//!   renamed over the original
//!
//! I/O failures are not swallowed here; they surface as [`SyncError::Io`].

use crate::shared::config::CorruptionPolicy;
use crate::shared::error::SyncError;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const EMPTY_ARRAY: &str = "[]";

/// A JSON array persisted at a fixed path
#[derive(Debug, Clone)]
pub struct JsonArrayFile {
    path: PathBuf,
    policy: CorruptionPolicy,
}

impl JsonArrayFile {
    pub fn new(path: impl Into<PathBuf>, policy: CorruptionPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty file if either is missing
    pub async fn ensure(&self) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::io(parent, e))?;
        }

        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::debug!("[STORE] Creating empty store at {}", self.path.display());
                self.write_raw(EMPTY_ARRAY).await
            }
            Err(e) => Err(SyncError::io(&self.path, e)),
        }
    }

    /// Read the stored array.
    ///
    /// Content that is not a JSON array is recovered per the corruption policy
    /// and an empty list is returned.
    pub async fn read(&self) -> Result<Vec<Value>, SyncError> {
        self.ensure().await?;

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SyncError::io(&self.path, e))?;

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(other) => {
                let found = match other {
                    Value::Null => "null",
                    Value::Bool(_) => "a boolean",
                    Value::Number(_) => "a number",
                    Value::String(_) => "a string",
                    _ => "an object",
                };
                self.recover(&format!("expected a JSON array, found {}", found)).await?;
                Ok(Vec::new())
            }
            Err(e) => {
                self.recover(&e.to_string()).await?;
                Ok(Vec::new())
            }
        }
    }

    /// Replace the stored array with `items`
    pub async fn write<T: Serialize>(&self, items: &[T]) -> Result<(), SyncError> {
        let contents = serde_json::to_string_pretty(items)?;
        self.ensure_parent().await?;
        self.write_raw(&contents).await
    }

    async fn ensure_parent(&self) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::io(parent, e))?;
        }
        Ok(())
    }

    async fn write_raw(&self, contents: &str) -> Result<(), SyncError> {
        let tmp = self.sibling("tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| SyncError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SyncError::io(&self.path, e))
    }

    async fn recover(&self, reason: &str) -> Result<(), SyncError> {
        match self.policy {
            CorruptionPolicy::Reset => {
                tracing::warn!(
                    "[STORE] Unreadable store at {} ({}), resetting to empty",
                    self.path.display(),
                    reason
                );
            }
            CorruptionPolicy::Quarantine => {
                let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
                let aside = self.sibling(&format!("corrupt-{}", stamp));
                tokio::fs::rename(&self.path, &aside)
                    .await
                    .map_err(|e| SyncError::io(&aside, e))?;
                tracing::warn!(
                    "[STORE] Unreadable store at {} ({}), moved to {}",
                    self.path.display(),
                    reason,
                    aside.display()
                );
            }
        }
        self.write_raw(EMPTY_ARRAY).await
    }

    /// `<file name>.<suffix>` next to the store file
    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        self.path.with_file_name(format!("{}.{}", name, suffix))
    }
}
