use harvester_client::{codec, normalize_get, Extract, HarvesterApi, XML_CONTENT_TYPE};
use shared_types::{is_record_id, LookupResult, RecordDocument, ResourceKind};
use std::sync::Arc;
use tracing::{debug, info};

use crate::http::error::{ApiError, ApiResult};

/// List, fetch and update Harvester records of any [`ResourceKind`]
#[derive(Clone)]
pub struct RecordProxy {
    backend: Arc<dyn HarvesterApi>,
}

impl RecordProxy {
    pub fn new(backend: Arc<dyn HarvesterApi>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, kind: ResourceKind) -> ApiResult<serde_json::Value> {
        let outcome = self.backend.get(kind.backend_path()).await;
        found_or(normalize_get(outcome, Extract::Collection), || {
            format!("The Harvester has no {kind} collection")
        })
    }

    /// Reads one record without deciding how to respond
    pub async fn lookup(&self, kind: ResourceKind, id: &str) -> LookupResult {
        if !is_record_id(id) {
            debug!("'{}' cannot address a {}, not asking the Harvester", id, kind);
            return LookupResult::NotFound;
        }
        let outcome = self.backend.get(&kind.record_path(id)).await;
        normalize_get(outcome, Extract::Record(kind.root_property()))
    }

    pub async fn get_by_id(&self, kind: ResourceKind, id: &str) -> ApiResult<RecordDocument> {
        found_or(self.lookup(kind, id).await, || {
            format!("No {kind} found with ID {id}")
        })
    }

    /// Replaces a record with `body`, but only once the record is known to exist.
    ///
    /// The fetched record is not merged: the inbound JSON is the full new
    /// content. A body that cannot be turned into XML fails with 500 before
    /// anything is sent to the Harvester.
    pub async fn update_by_id(&self, kind: ResourceKind, id: &str, body: &[u8]) -> ApiResult<()> {
        self.verify(kind, id, || format!("No {kind} with ID {id} to update"))
            .await?;

        let xml = codec::json_body_to_xml(kind.root_property(), body)?;
        self.put_xml(kind, id, xml).await
    }

    /// Fetches the record the caller is about to overwrite
    pub async fn verify(
        &self,
        kind: ResourceKind,
        id: &str,
        not_found: impl FnOnce() -> String,
    ) -> ApiResult<RecordDocument> {
        found_or(self.lookup(kind, id).await, not_found)
    }

    /// Wraps `record` in the kind's root property and PUTs it unchecked
    pub async fn write(&self, kind: ResourceKind, id: &str, record: &RecordDocument) -> ApiResult<()> {
        let xml = codec::record_to_xml(kind.root_property(), record)?;
        self.put_xml(kind, id, xml).await
    }

    async fn put_xml(&self, kind: ResourceKind, id: &str, xml: String) -> ApiResult<()> {
        let path = kind.record_path(id);
        debug!("Produced XML document for PUT {}: {}", path, xml);

        let response = self
            .backend
            .put(&path, xml.into_bytes(), XML_CONTENT_TYPE)
            .await?;

        if response.status == 204 {
            info!("PUT {} {} succeeded", kind, id);
            Ok(())
        } else {
            Err(ApiError::Upstream {
                status: response.status,
                message: format!(
                    "PUT {kind} {id} encountered a problem: {}",
                    response.error_message()
                ),
            })
        }
    }
}

/// Unwraps a found record; every other outcome becomes the matching error
pub fn found_or(result: LookupResult, not_found: impl FnOnce() -> String) -> ApiResult<RecordDocument> {
    match result {
        LookupResult::Found(record) => Ok(record),
        LookupResult::NotFound => Err(ApiError::NotFound(not_found())),
        LookupResult::BackendError { status, message } => Err(ApiError::Upstream { status, message }),
        LookupResult::TransportError(message) => Err(ApiError::Transport(message)),
    }
}
