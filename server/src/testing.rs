//! In-memory Harvester double that records every call it receives.

use async_trait::async_trait;
use harvester_client::{BackendOutcome, BackendResponse, HarvesterApi, TransportError};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

#[derive(Default)]
pub struct FakeHarvester {
    documents: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<RecordedCall>>,
    put_response: Option<(u16, String)>,
    get_response: Option<(u16, String)>,
    offline: Option<String>,
    put_failure: Option<String>,
}

impl FakeHarvester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `xml` with 200 for GET `path`
    pub fn with_document(self, path: impl Into<String>, xml: impl Into<String>) -> Self {
        self.documents.lock().unwrap().insert(path.into(), xml.into());
        self
    }

    /// Every GET answers with `status` and `body`
    pub fn failing_gets(mut self, status: u16, body: impl Into<String>) -> Self {
        self.get_response = Some((status, body.into()));
        self
    }

    /// Every PUT answers with `status` and `body` instead of storing the document
    pub fn rejecting_puts(mut self, status: u16, body: impl Into<String>) -> Self {
        self.put_response = Some((status, body.into()));
        self
    }

    /// GETs are served as usual, every PUT fails before reaching the backend
    pub fn dropping_puts(mut self, message: impl Into<String>) -> Self {
        self.put_failure = Some(message.into());
        self
    }

    /// Every call fails before reaching the backend
    pub fn offline(message: impl Into<String>) -> Self {
        Self {
            offline: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == "PUT")
            .collect()
    }

    pub fn document(&self, path: &str) -> Option<String> {
        self.documents.lock().unwrap().get(path).cloned()
    }
}

#[async_trait]
impl HarvesterApi for FakeHarvester {
    async fn get(&self, path: &str) -> BackendOutcome {
        self.calls.lock().unwrap().push(RecordedCall {
            method: "GET",
            path: path.to_string(),
            content_type: None,
            body: None,
        });

        if let Some(message) = &self.offline {
            return Err(TransportError::new(message.clone()));
        }
        if let Some((status, body)) = &self.get_response {
            return Ok(BackendResponse::new(*status, body.clone()));
        }

        match self.documents.lock().unwrap().get(path) {
            Some(xml) => Ok(BackendResponse::new(200, xml.clone())),
            None => Ok(BackendResponse::new(404, "")),
        }
    }

    async fn put(&self, path: &str, body: Vec<u8>, content_type: &str) -> BackendOutcome {
        let body = String::from_utf8(body).unwrap();
        self.calls.lock().unwrap().push(RecordedCall {
            method: "PUT",
            path: path.to_string(),
            content_type: Some(content_type.to_string()),
            body: Some(body.clone()),
        });

        if let Some(message) = self.offline.as_ref().or(self.put_failure.as_ref()) {
            return Err(TransportError::new(message.clone()));
        }
        if let Some((status, body)) = &self.put_response {
            return Ok(BackendResponse::new(*status, body.clone()));
        }

        self.documents.lock().unwrap().insert(path.to_string(), body);
        Ok(BackendResponse::new(204, ""))
    }
}
