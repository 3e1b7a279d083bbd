//! HTTP project client integration tests
//!
//! Run `HttpProjectApi` against a wiremock server and check how its errors
//! classify.

use crate::common::{closed_port_url, config_for, mount_health, mount_list, mount_save, TestWorkspace};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use timetrack::desktop::api_client::{HttpProjectApi, ProjectApi};
use timetrack::desktop::config::Config;
use timetrack::desktop::sync::{is_network_error, CheckOptions, DrainAttempt, SkipReason, SyncOrchestrator};
use timetrack::shared::{ApiError, AppConfig};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_save_sends_project_and_original_name() {
    let server = MockServer::start().await;
    let workspace = TestWorkspace::new();
    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "project": {"id": 5, "name": "New"},
            "originalName": "Old"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "project": {"id": 5, "name": "New", "updatedAt": "2026-01-01T00:00:00Z"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpProjectApi::new(config_for(&server, workspace.dir.path())).unwrap();
    let record = api
        .save_project(&json!({"id": 5, "name": "New"}), Some("Old"))
        .await
        .unwrap();

    assert_eq!(record["updatedAt"], json!("2026-01-01T00:00:00Z"));
}

#[tokio::test]
async fn test_load_accepts_bare_and_wrapped_lists() {
    let workspace = TestWorkspace::new();

    let bare = MockServer::start().await;
    mount_list(&bare, 200, json!([{"id": 1}, {"id": 2}])).await;
    let api = HttpProjectApi::new(config_for(&bare, workspace.dir.path())).unwrap();
    assert_eq!(api.load_projects().await.unwrap().len(), 2);

    let wrapped = MockServer::start().await;
    mount_list(&wrapped, 200, json!({"projects": [{"id": 3}]})).await;
    let api = HttpProjectApi::new(config_for(&wrapped, workspace.dir.path())).unwrap();
    assert_eq!(api.load_projects().await.unwrap(), vec![json!({"id": 3})]);
}

#[tokio::test]
async fn test_gateway_status_classifies_as_network() {
    let server = MockServer::start().await;
    let workspace = TestWorkspace::new();
    mount_save(&server, 503, json!({"message": "upstream down"})).await;

    let api = HttpProjectApi::new(config_for(&server, workspace.dir.path())).unwrap();
    let error = api.save_project(&json!({"id": 1}), None).await.unwrap_err();

    assert_eq!(error.status_code(), Some(503));
    assert!(is_network_error(&error));
}

#[tokio::test]
async fn test_validation_error_keeps_server_code() {
    let server = MockServer::start().await;
    let workspace = TestWorkspace::new();
    mount_save(
        &server,
        400,
        json!({"code": "rest_invalid_param", "message": "Invalid parameter(s): name"}),
    )
    .await;

    let api = HttpProjectApi::new(config_for(&server, workspace.dir.path())).unwrap();
    let error = api.save_project(&json!({"id": 1}), None).await.unwrap_err();

    assert_eq!(error.error_code(), Some("rest_invalid_param"));
    assert!(!is_network_error(&error));
}

#[tokio::test]
async fn test_rejected_token_is_not_network() {
    let server = MockServer::start().await;
    let workspace = TestWorkspace::new();
    mount_health(&server, 401).await;

    let api = HttpProjectApi::new(config_for(&server, workspace.dir.path())).unwrap();
    let error = api.test_connection().await.unwrap_err();

    assert_matches!(error, ApiError::Unauthorized(_));
    assert!(!is_network_error(&error));
}

#[tokio::test]
async fn test_refused_connection_classifies_as_network() {
    let workspace = TestWorkspace::new();
    let config = Config::with_builder(
        AppConfig::builder()
            .api_url(closed_port_url())
            .data_dir(workspace.dir.path())
            .request_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let api = HttpProjectApi::new(config).unwrap();
    let error = api.test_connection().await.unwrap_err();

    assert_matches!(error, ApiError::Request(_));
    assert!(is_network_error(&error));
}

#[tokio::test]
async fn test_orchestrator_over_http() {
    let server = MockServer::start().await;
    let workspace = TestWorkspace::new();
    let config = config_for(&server, workspace.dir.path());
    let sync = SyncOrchestrator::from_config(&config, Arc::new(HttpProjectApi::new(config.clone()).unwrap()));

    let down = Mock::given(method("POST"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(502))
        .mount_as_scoped(&server)
        .await;
    let outcome = sync.save_project(json!({"id": "h1", "name": "Http"}), None).await.unwrap();
    assert!(outcome.is_queued());
    drop(down);

    let attempt = sync.check_queue(CheckOptions::default()).await.unwrap();
    assert_matches!(attempt, DrainAttempt::Skipped(SkipReason::ConnectionTestFailed));

    mount_health(&server, 200).await;
    mount_save(&server, 200, json!({"id": "h1", "name": "Http", "revision": 2})).await;

    let result = sync.force_sync().await.unwrap();
    assert_eq!((result.drained, result.remaining), (1, 0));
    assert_eq!(
        sync.cache().get_cached_projects().await,
        vec![json!({"id": "h1", "name": "Http", "revision": 2})]
    );
}
