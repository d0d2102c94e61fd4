//! Access to the Harvester's XML records API: configuration, the HTTP client,
//! XML/JSON translation and the folding of responses into lookup outcomes.

mod backend;
pub mod codec;
mod config;
mod normalize;

pub use backend::{BackendClient, BackendOutcome, BackendResponse, HarvesterApi, TransportError};
pub use codec::CodecError;
pub use config::{BackendConfig, BasicAuth, ConfigError, Protocol};
pub use normalize::{normalize_get, Extract, TRANSLATION_FAILURE_STATUS};

/// Content type of every record sent to the Harvester
pub const XML_CONTENT_TYPE: &str = "application/xml";
