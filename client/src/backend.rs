use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client as ReqwestClient, RequestBuilder};
use std::error::Error as _;
use thiserror::Error;
use tracing::debug;

use crate::config::BackendConfig;

/// A network-level failure: nothing came back from the Harvester
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn from_reqwest(method: &str, path: &str, err: &reqwest::Error) -> Self {
        let mut message = format!("{method} {path} failed: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message }
    }
}

/// Whatever the Harvester answered, whether success or error status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: String,
    /// Canonical reason phrase of `status`
    pub reason: String,
}

impl BackendResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self {
            status,
            body: body.into(),
            reason,
        }
    }

    /// Human-readable error text: the backend's own body if it sent one
    pub fn error_message(&self) -> String {
        let body = self.body.trim();
        if body.is_empty() {
            format!("{} {}", self.status, self.reason).trim_end().to_string()
        } else {
            format!("{} {}: {}", self.status, self.reason, body)
        }
    }
}

pub type BackendOutcome = Result<BackendResponse, TransportError>;

/// Calls against the Harvester's records API. Implementations never retry.
#[async_trait]
pub trait HarvesterApi: Send + Sync {
    async fn get(&self, path: &str) -> BackendOutcome;

    async fn put(&self, path: &str, body: Vec<u8>, content_type: &str) -> BackendOutcome;
}

/// reqwest-backed client for a configured Harvester
pub struct BackendClient {
    client: ReqwestClient,
    base_url: String,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, reqwest::Error> {
        let client = ReqwestClient::builder().build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.basic_auth {
            Some(auth) => request.basic_auth(&auth.username, Some(&auth.password)),
            None => request,
        }
    }

    async fn send(&self, method: &str, path: &str, request: RequestBuilder) -> BackendOutcome {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(method, path, &e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(method, path, &e))?;

        debug!("{} {} answered {}", method, path, status);
        Ok(BackendResponse::new(status, body))
    }
}

#[async_trait]
impl HarvesterApi for BackendClient {
    async fn get(&self, path: &str) -> BackendOutcome {
        let request = self.client.get(self.url(path));
        self.send("GET", path, request).await
    }

    async fn put(&self, path: &str, body: Vec<u8>, content_type: &str) -> BackendOutcome {
        let request = self
            .client
            .put(self.url(path))
            .header(CONTENT_TYPE, content_type)
            .body(body);
        self.send("PUT", path, request).await
    }
}
