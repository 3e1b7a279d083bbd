//! Mock server helpers for integration tests
//!
//! Wraps `wiremock` to stand in for the remote project API.

use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use timetrack::desktop::config::Config;
use timetrack::shared::AppConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration pointing at `server`, with stores under `data_dir`
pub fn config_for(server: &MockServer, data_dir: &Path) -> Config {
    Config::with_builder(
        AppConfig::builder()
            .api_url(server.uri())
            .api_token("test-token")
            .data_dir(data_dir)
            .request_timeout(Duration::from_secs(2)),
    )
    .expect("valid test config")
}

/// `GET /health` answers with `status`
pub async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// `POST /projects` answers with `status` and `body`
pub async fn mount_save(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// `GET /projects` answers with `status` and `body`
pub async fn mount_list(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Base URL on which nothing listens
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
