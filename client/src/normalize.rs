use shared_types::LookupResult;
use tracing::warn;

use crate::backend::BackendOutcome;
use crate::codec;

/// Status reported when a 200 response cannot be translated
pub const TRANSLATION_FAILURE_STATUS: u16 = 500;

/// What to pull out of a successful GET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract<'a> {
    /// A single record wrapped in the given root property
    Record(&'a str),
    /// A whole record set
    Collection,
}

/// Folds a backend GET (network failure, HTTP status, XML body) into a
/// [`LookupResult`].
pub fn normalize_get(outcome: BackendOutcome, extract: Extract<'_>) -> LookupResult {
    let response = match outcome {
        Ok(response) => response,
        Err(err) => return LookupResult::TransportError(err.message),
    };

    match response.status {
        200 => {}
        404 => return LookupResult::NotFound,
        status => {
            return LookupResult::BackendError {
                status,
                message: response.error_message(),
            };
        }
    }

    let translated = match extract {
        Extract::Collection => codec::collection_xml_to_json(&response.body),
        Extract::Record(root) => codec::xml_to_json(&response.body).and_then(|mut json| {
            json.get_mut(root).map(serde_json::Value::take).ok_or_else(|| {
                codec::CodecError::Xml(format!("expected root element <{root}> in response"))
            })
        }),
    };

    match translated {
        Ok(json) => LookupResult::Found(json),
        Err(err) => {
            warn!("Could not translate Harvester response: {}", err);
            LookupResult::BackendError {
                status: TRANSLATION_FAILURE_STATUS,
                message: format!("Could not translate Harvester response: {err}"),
            }
        }
    }
}
