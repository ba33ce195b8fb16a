//! Syncthing REST API client
//!
//! Provides an HTTP client for one Syncthing daemon. Handles the API key
//! header, endpoint construction, JSON decoding and the mapping of HTTP
//! failures to [`DaemonError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use syncthing_mcp_client::client::SyncthingClient;
//! use syncthing_mcp_core::domain::InstanceName;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SyncthingClient::new(
//!     InstanceName::default_instance(),
//!     "http://localhost:8384",
//!     "api-key-here",
//!     Duration::from_secs(30),
//! )?;
//! let status: serde_json::Value = client.get("/rest/system/status", &[]).await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use syncthing_mcp_core::config::InstanceConfig;
use syncthing_mcp_core::domain::InstanceName;
use syncthing_mcp_core::ports::DaemonError;

use crate::ClientError;

/// Header carrying the daemon API key
const API_KEY_HEADER: &str = "X-API-Key";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Query string pairs
pub type Query<'a> = [(&'a str, String)];

/// HTTP client for a single Syncthing instance
#[derive(Debug, Clone)]
pub struct SyncthingClient {
    client: Client,
    name: InstanceName,
    /// Base URL with any trailing `/` stripped
    url: String,
    base: Url,
    api_key: String,
}

impl SyncthingClient {
    /// Creates a client for the daemon at `url`
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] if `url` is not an http(s) URL, or
    /// [`ClientError::Build`] if the HTTP client cannot be constructed
    pub fn new(
        name: InstanceName,
        url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let trimmed = url.trim().trim_end_matches('/').to_string();
        let base = Url::parse(&trimmed).map_err(|e| ClientError::InvalidUrl {
            instance: name.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                instance: name.to_string(),
                message: format!("unsupported scheme '{}'", base.scheme()),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            name,
            url: trimmed,
            base,
            api_key: api_key.into(),
        })
    }

    /// Creates a client from an instance entry of the configuration
    ///
    /// # Errors
    /// See [`SyncthingClient::new`]
    pub fn from_config(
        name: InstanceName,
        config: &InstanceConfig,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Self::new(name, &config.url, config.api_key.clone(), timeout)
    }

    /// Instance name this client is registered under
    pub fn name(&self) -> &InstanceName {
        &self.name
    }

    /// Base URL without trailing slash
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Builds the URL for an API path such as `/rest/db/status`
    ///
    /// Extra segments are percent-encoded, so folder IDs containing `/` or
    /// spaces address the right resource.
    pub fn endpoint(&self, path: &str, extra_segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(path.trim_start_matches('/').split('/'));
            segments.extend(extra_segments);
        }
        url
    }

    /// Creates an authenticated request builder
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(header::ACCEPT, "application/json")
    }

    // ========================================================================
    // Verb helpers
    // ========================================================================

    /// Authenticated GET decoding the JSON body into `T`
    ///
    /// # Errors
    /// Returns a [`DaemonError`] for transport failures, non-2xx statuses
    /// and undecodable bodies
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T, DaemonError> {
        self.get_at(self.endpoint(path, &[]), query).await
    }

    /// Authenticated GET against a pre-built URL
    ///
    /// # Errors
    /// See [`SyncthingClient::get`]
    pub async fn get_at<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &Query<'_>,
    ) -> Result<T, DaemonError> {
        let mut builder = self.request(Method::GET, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let response = self.send(builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(instance = %self.name, error = %e, "Undecodable response body");
            DaemonError::InvalidResponse(e.to_string())
        })
    }

    /// Authenticated POST with an optional JSON body
    ///
    /// # Errors
    /// Returns a [`DaemonError`] for transport failures and non-2xx statuses
    pub async fn post(
        &self,
        path: &str,
        query: &Query<'_>,
        body: Option<&Value>,
    ) -> Result<Value, DaemonError> {
        let mut builder = self.request(Method::POST, self.endpoint(path, &[]));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.write(builder).await
    }

    /// Authenticated PATCH with a JSON body against a pre-built URL
    ///
    /// # Errors
    /// Returns a [`DaemonError`] for transport failures and non-2xx statuses
    pub async fn patch_at(&self, url: Url, body: &Value) -> Result<Value, DaemonError> {
        self.write(self.request(Method::PATCH, url).json(body)).await
    }

    /// Authenticated PUT with a JSON body
    ///
    /// # Errors
    /// Returns a [`DaemonError`] for transport failures and non-2xx statuses
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, DaemonError> {
        self.write(self.request(Method::PUT, self.endpoint(path, &[])).json(body))
            .await
    }

    /// Authenticated DELETE
    ///
    /// # Errors
    /// Returns a [`DaemonError`] for transport failures and non-2xx statuses
    pub async fn delete(&self, path: &str, query: &Query<'_>) -> Result<Value, DaemonError> {
        let mut builder = self.request(Method::DELETE, self.endpoint(path, &[]));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        self.write(builder).await
    }

    // ========================================================================
    // Response handling
    // ========================================================================

    /// Sends a write request; bodies without JSON become `{"status": "ok"}`
    async fn write(&self, builder: RequestBuilder) -> Result<Value, DaemonError> {
        let response = self.send(builder).await?;
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        if is_json && !bytes.is_empty() {
            serde_json::from_slice(&bytes)
                .map_err(|e| DaemonError::InvalidResponse(e.to_string()))
        } else {
            Ok(json!({ "status": "ok" }))
        }
    }

    /// Sends a request and maps failures to [`DaemonError`]
    async fn send(&self, builder: RequestBuilder) -> Result<Response, DaemonError> {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        debug!(
            instance = %self.name,
            url = %response.url(),
            status = status.as_u16(),
            "Syncthing response"
        );
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(self.status_error(status, body))
    }

    fn status_error(&self, status: StatusCode, body: String) -> DaemonError {
        match status {
            StatusCode::UNAUTHORIZED => DaemonError::Unauthorized {
                instance: self.name.to_string(),
            },
            StatusCode::FORBIDDEN => DaemonError::Forbidden,
            StatusCode::NOT_FOUND => DaemonError::NotFound(body.trim().to_string()),
            other => DaemonError::Status {
                status: other.as_u16(),
                body: body.trim().to_string(),
            },
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> DaemonError {
        if e.is_timeout() {
            DaemonError::Timeout
        } else if e.is_connect() {
            DaemonError::Unreachable {
                url: self.url.clone(),
            }
        } else if e.is_decode() {
            DaemonError::InvalidResponse(e.to_string())
        } else {
            DaemonError::ConnectionClosed(e.to_string())
        }
    }
}
