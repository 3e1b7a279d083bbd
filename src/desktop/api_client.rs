/**
 * Project API Client
 *
 * The remote side of the save pipeline. `ProjectApi` is the interface the
 * sync orchestrator consumes; `HttpProjectApi` implements it over a REST
 * endpoint:
 *
 * - `GET  {base}/health`   - lightweight reachability check
 * - `GET  {base}/projects` - full project list
 * - `POST {base}/projects` - save one project, body `{ project, originalName }`
 *
 * Failures are reported as `ApiError` so the connectivity classifier can
 * inspect them.
 */
use crate::desktop::config::Config;
use crate::shared::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

/// Remote operations the sync core depends on
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// Whether an endpoint is configured at all
    fn is_configured(&self) -> bool {
        true
    }

    /// Save a project and return the server's record
    async fn save_project(&self, project: &Value, original_name: Option<&str>) -> Result<Value, ApiError>;

    /// Fetch every project
    async fn load_projects(&self) -> Result<Vec<Value>, ApiError>;

    /// Fail when the endpoint is unreachable
    async fn test_connection(&self) -> Result<(), ApiError>;
}

/// reqwest-backed implementation of [`ProjectApi`]
#[derive(Debug, Clone)]
pub struct HttpProjectApi {
    config: Config,
    client: Client,
}

impl HttpProjectApi {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> Result<String, ApiError> {
        self.config.api_url(path).ok_or(ApiError::NotConfigured)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_token() {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

#[async_trait]
impl ProjectApi for HttpProjectApi {
    fn is_configured(&self) -> bool {
        self.config.is_remote_configured()
    }

    async fn save_project(&self, project: &Value, original_name: Option<&str>) -> Result<Value, ApiError> {
        let url = self.endpoint("/projects")?;
        let body = json!({
            "project": project,
            "originalName": original_name,
        });

        let response = self.send(self.client.post(&url).json(&body)).await?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("save response is not JSON: {}", e)))?;

        match payload {
            Value::Object(mut object) => match object.remove("project") {
                Some(record @ Value::Object(_)) => Ok(record),
                Some(_) => Err(ApiError::InvalidResponse("`project` is not an object".into())),
                None => Ok(Value::Object(object)),
            },
            _ => Err(ApiError::InvalidResponse("save response is not an object".into())),
        }
    }

    async fn load_projects(&self) -> Result<Vec<Value>, ApiError> {
        let url = self.endpoint("/projects")?;
        let response = self.send(self.client.get(&url)).await?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("project list is not JSON: {}", e)))?;

        match payload {
            Value::Array(items) => Ok(items),
            Value::Object(mut object) => match object.remove("projects") {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(ApiError::InvalidResponse("missing `projects` array".into())),
            },
            _ => Err(ApiError::InvalidResponse("project list is not an array".into())),
        }
    }

    async fn test_connection(&self) -> Result<(), ApiError> {
        let url = self.endpoint("/health")?;
        self.send(self.client.get(&url)).await?;
        tracing::debug!("[API] Health check passed");
        Ok(())
    }
}

/// Map a non-success response to an [`ApiError`].
///
/// WordPress-style error bodies (`{"code": "...", "message": "..."}`) keep
/// their code and message.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    let code = parsed
        .as_ref()
        .and_then(|v| v.get("code"))
        .and_then(Value::as_str)
        .map(str::to_string);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
            code,
        },
    }
}
