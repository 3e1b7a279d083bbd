//! Queue and cache store integration tests
//!
//! Exercise the on-disk behaviour of both stores through their public API.

use crate::common::TestWorkspace;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use timetrack::desktop::cache::ProjectCache;
use timetrack::desktop::offline::{OfflineQueue, SavePayload};
use timetrack::shared::{CorruptionPolicy, SyncError};

#[tokio::test]
async fn test_empty_drain_does_not_create_entries() {
    let workspace = TestWorkspace::new();
    let queue = workspace.queue();

    let report = queue
        .drain(|_, _| async { Ok::<(), SyncError>(()) })
        .await
        .unwrap();

    assert_eq!((report.processed, report.failed, report.attempted()), (0, 0, 0));
    assert_eq!(workspace.read_json(workspace.queue_path()), json!([]));
}

#[tokio::test]
async fn test_empty_drain_leaves_existing_file_untouched() {
    let workspace = TestWorkspace::new();
    std::fs::write(workspace.queue_path(), "[]").unwrap();
    let modified = std::fs::metadata(workspace.queue_path()).unwrap().modified().unwrap();

    let report = workspace
        .queue()
        .drain(|_, _| async { Ok::<(), SyncError>(()) })
        .await
        .unwrap();

    assert_eq!(report.attempted(), 0);
    assert_eq!(std::fs::read_to_string(workspace.queue_path()).unwrap(), "[]");
    assert_eq!(
        std::fs::metadata(workspace.queue_path()).unwrap().modified().unwrap(),
        modified
    );
    let leftovers: Vec<_> = std::fs::read_dir(workspace.dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name() != timetrack::desktop::config::QUEUE_FILE_NAME)
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_fifo_retained_after_partial_failure() {
    let workspace = TestWorkspace::new();
    let queue = workspace.queue();
    for name in ["A", "B", "C"] {
        queue.enqueue(SavePayload::new(json!({"name": name}))).await.unwrap();
    }

    let report = queue
        .drain(|project, _| async move {
            if project["name"] == "B" {
                Err(SyncError::invalid_payload("B is broken"))
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();
    assert_eq!((report.processed, report.failed), (2, 1));

    let on_disk = workspace.read_json(workspace.queue_path());
    let names: Vec<Value> = on_disk
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["projectData"]["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("B")]);

    let report = queue
        .drain(|_, _| async { Ok::<(), SyncError>(()) })
        .await
        .unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(queue.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_enqueue_during_drain_is_kept() {
    let workspace = TestWorkspace::new();
    let queue = Arc::new(workspace.queue());
    queue.enqueue(SavePayload::new(json!({"name": "first"}))).await.unwrap();

    let inner = queue.clone();
    let report = queue
        .drain(move |_, _| {
            let inner = inner.clone();
            async move {
                inner
                    .enqueue(SavePayload::new(json!({"name": "late"})))
                    .await
                    .map(|_| ())
            }
        })
        .await
        .unwrap();
    assert_eq!(report.processed, 1);

    let pending = queue.get_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].project_data, json!({"name": "late"}));
}

#[tokio::test]
async fn test_entry_round_trips_through_fresh_instance() {
    let workspace = TestWorkspace::new();
    let written = workspace
        .queue()
        .enqueue(SavePayload::new(json!({"id": 4, "tags": ["a", "b"]})).with_original_name(Some("Four".into())))
        .await
        .unwrap();

    let reread = workspace.queue().get_pending().await.unwrap();
    assert_eq!(reread, vec![written]);
}

#[tokio::test]
async fn test_garbage_files_self_heal() {
    let workspace = TestWorkspace::new();
    std::fs::write(workspace.queue_path(), "{not json").unwrap();
    std::fs::write(workspace.cache_path(), "\u{0}\u{1}garbage").unwrap();

    assert!(workspace.queue().get_pending().await.unwrap().is_empty());
    assert!(workspace.cache().get_cached_projects().await.is_empty());

    assert_eq!(workspace.read_json(workspace.queue_path()), json!([]));
    assert_eq!(workspace.read_json(workspace.cache_path()), json!([]));
}

#[tokio::test]
async fn test_quarantine_keeps_corrupt_copy() {
    let workspace = TestWorkspace::new();
    std::fs::write(workspace.cache_path(), "definitely not json").unwrap();
    let cache = ProjectCache::new(workspace.cache_path(), CorruptionPolicy::Quarantine);

    assert!(cache.get_cached_projects().await.is_empty());

    let aside: Vec<_> = std::fs::read_dir(workspace.dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().contains(".corrupt-"))
        .collect();
    assert_eq!(aside.len(), 1);
    assert_eq!(
        std::fs::read_to_string(aside[0].path()).unwrap(),
        "definitely not json"
    );
}

#[tokio::test]
async fn test_store_files_created_in_missing_directory() {
    let workspace = TestWorkspace::new();
    let nested = workspace.dir.path().join("profile").join("data");
    let queue = OfflineQueue::new(nested.join("queue.json"), CorruptionPolicy::Reset);

    assert_eq!(queue.pending_count().await.unwrap(), 0);
    assert!(nested.join("queue.json").exists());
}

#[tokio::test]
async fn test_cache_merge_and_identity_fallback() {
    let workspace = TestWorkspace::new();
    let cache = workspace.cache();

    cache
        .set_projects(&json!([{"id": 1, "name": "X", "extra": "keep"}]))
        .await
        .unwrap();
    cache.upsert_project(&json!({"id": 1, "name": "Y"})).await.unwrap();

    cache.upsert_project(&json!({"name": "Alpha", "rate": 10})).await.unwrap();
    cache.upsert_project(&json!({"name": "Beta"})).await.unwrap();
    cache.upsert_project(&json!({"name": "Alpha", "rate": 12})).await.unwrap();

    assert_eq!(
        cache.get_cached_projects().await,
        vec![
            json!({"id": 1, "name": "Y", "extra": "keep"}),
            json!({"name": "Alpha", "rate": 12}),
            json!({"name": "Beta"}),
        ]
    );
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TypedProject {
    id: u32,
    name: String,
    hourly_rate: f64,
}

#[tokio::test]
async fn test_typed_project_is_snapshotted() {
    let workspace = TestWorkspace::new();
    let queue = workspace.queue();
    let mut project = TypedProject {
        id: 12,
        name: "Consulting".into(),
        hourly_rate: 95.5,
    };

    let payload = SavePayload::from_project(&project).unwrap();
    queue.enqueue(payload).await.unwrap();
    project.name = "Edited after queuing".into();

    let pending = queue.get_pending().await.unwrap();
    assert_eq!(
        pending[0].project_data,
        json!({"id": 12, "name": "Consulting", "hourlyRate": 95.5})
    );
    assert_ne!(pending[0].project_data["name"], json!(project.name));
}

#[tokio::test]
async fn test_unrepresentable_project_is_rejected() {
    let mut project = std::collections::HashMap::new();
    project.insert((1, 2), "tuple keys");

    assert!(SavePayload::from_project(&project).is_err());
}
