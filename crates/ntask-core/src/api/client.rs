use anyhow::{Context, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;

use super::errors::{ApiError, ApiErrorKind};
use super::types::{
    CreateTaskRequest, CreatedTaskResponse, LoginRequest, LoginResponse, SignupRequest,
    SignupResponse, TaskListResponse, UpdateTaskRequest,
};
use crate::config::Config;
use crate::credentials::TokenStore;
use crate::tasks::{Task, TaskContext};

/// Default base URL for the NightTask API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP gateway to the NightTask API.
///
/// The single seam between client state and the network: every call attaches
/// the stored credential, serializes JSON, and normalizes any transport or
/// status failure into an [`ApiError`]. Stateless per call.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tokens: TokenStore,
}

impl ApiClient {
    /// Creates a new client from config and an injected token store.
    ///
    /// Base URL resolution order:
    /// 1. `NTASK_BASE_URL` env var (if set and non-empty)
    /// 2. `base_url` from config (if set and non-empty)
    /// 3. Default: `http://localhost:8080`
    pub fn new(config: &Config, tokens: TokenStore) -> Result<Self> {
        let base_url = Self::resolve_base_url(config.effective_base_url())?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("build HTTP client")?;

        Ok(Self {
            base_url,
            http,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves the base URL with precedence: env > config > default.
    /// Validates that the URL is well-formed.
    fn resolve_base_url(config_base_url: Option<&str>) -> Result<String> {
        if let Ok(env_url) = std::env::var("NTASK_BASE_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                Self::validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        if let Some(config_url) = config_base_url {
            let trimmed = config_url.trim();
            if !trimmed.is_empty() {
                Self::validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        Ok(DEFAULT_BASE_URL.to_string())
    }

    /// Validates that a URL is well-formed.
    fn validate_url(url: &str) -> Result<()> {
        url::Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
        Ok(())
    }

    /// Builds a request with the credential attached.
    ///
    /// The server expects the raw token in the `Authorization` header, with
    /// no scheme prefix.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        tracing::debug!(%method, path, "api request");
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method, &url)
            .header("accept", "application/json");
        if let Some(token) = self.tokens.get() {
            builder = builder.header("authorization", token);
        }
        builder
    }

    /// Sends a request and deserializes the success payload.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.settle(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::parse(format!("Malformed response body: {e}")))
    }

    /// Sends a request, discarding any success payload.
    async fn send_unit(&self, builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        self.settle(builder).await.map(|_| ())
    }

    async fn settle(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await.map_err(Self::classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }
        Ok(response)
    }

    /// Classifies a reqwest error into an ApiError.
    fn classify_reqwest_error(e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::timeout(format!("Request timed out: {e}"))
        } else if e.is_connect() {
            ApiError::timeout(format!("Connection failed: {e}"))
        } else {
            ApiError::new(ApiErrorKind::HttpStatus, format!("Network error: {e}"))
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.send(
            self.request(Method::POST, "/api/login")
                .json(&LoginRequest { email, password }),
        )
        .await
    }

    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupResponse, ApiError> {
        self.send(self.request(Method::POST, "/api/signup").json(&SignupRequest {
            username,
            email,
            password,
        }))
        .await
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let payload: TaskListResponse = self.send(self.request(Method::GET, "/api/todos")).await?;
        Ok(payload.todos)
    }

    /// Creates a task; the server assigns the id and both timestamps.
    pub async fn create_task(
        &self,
        title: &str,
        description: &str,
        context: TaskContext,
    ) -> Result<Task, ApiError> {
        let payload: CreatedTaskResponse = self
            .send(
                self.request(Method::POST, "/api/todos")
                    .json(&CreateTaskRequest {
                        title,
                        description,
                        is_completed: false,
                        context,
                    }),
            )
            .await?;
        Ok(payload.todo)
    }

    /// Updates a task's title and description. The server does not echo the
    /// updated record.
    pub async fn update_task(
        &self,
        id: &str,
        title: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.request(Method::PUT, &format!("/api/todos/{id}"))
                .json(&UpdateTaskRequest { title, description }),
        )
        .await
    }

    /// Toggles a task's completion status. The server does not echo the
    /// updated record.
    pub async fn toggle_task(&self, id: &str) -> Result<(), ApiError> {
        self.send_unit(
            self.request(Method::PATCH, &format!("/api/todos/toggle/{id}"))
                .json(&serde_json::json!({})),
        )
        .await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::DELETE, &format!("/api/todos/{id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer, tokens: TokenStore) -> ApiClient {
        let config = Config {
            base_url: Some(server.uri()),
            request_timeout_secs: 5,
        };
        ApiClient::new(&config, tokens).unwrap()
    }

    /// The stored credential rides the Authorization header verbatim.
    #[tokio::test]
    async fn test_authorization_header_attached() {
        let dir = tempdir().unwrap();
        let tokens = TokenStore::at(dir.path().join("credentials.json"));
        tokens.set("tok-abcdef123456").unwrap();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .and(header("authorization", "tok-abcdef123456"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"todos": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, tokens);
        let tasks = client.list_tasks().await.unwrap();
        assert!(tasks.is_empty());
    }

    /// Status failures surface the server's error message verbatim.
    #[tokio::test]
    async fn test_status_failure_is_normalized() {
        let dir = tempdir().unwrap();
        let tokens = TokenStore::at(dir.path().join("credentials.json"));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "token expired"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, tokens);
        let err = client.list_tasks().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.message, "token expired");
    }

    /// Toggle sends an empty JSON object to the toggle path.
    #[tokio::test]
    async fn test_toggle_request_shape() {
        let dir = tempdir().unwrap();
        let tokens = TokenStore::at(dir.path().join("credentials.json"));

        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/todos/toggle/t1"))
            .and(body_json(serde_json::json!({})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, tokens);
        client.toggle_task("t1").await.unwrap();
    }

    /// Config wins over the default; trailing slashes are trimmed.
    /// (The env half of the precedence chain is process-wide state and is
    /// exercised by the CLI integration tests instead.)
    #[test]
    fn test_resolve_base_url_config_over_default() {
        let from_config =
            ApiClient::resolve_base_url(Some("https://tasks.example.com/")).unwrap();
        assert_eq!(from_config, "https://tasks.example.com");

        let fallback = ApiClient::resolve_base_url(None).unwrap();
        assert_eq!(fallback, DEFAULT_BASE_URL);
    }

    /// Malformed base URLs are rejected up front.
    #[test]
    fn test_resolve_base_url_rejects_invalid() {
        assert!(ApiClient::resolve_base_url(Some("not a url")).is_err());
    }
}
