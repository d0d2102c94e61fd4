use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters left as-is in a path segment; everything else is percent-encoded
const ENCODE_CHARACTERS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One administrative record as seen by clients. Its shape is defined by the
/// Harvester; the proxy only ever looks inside it for the step `script` field.
pub type RecordDocument = serde_json::Value;

/// The administrative record categories exposed by the Harvester
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Storage,
    Harvestable,
    Transformation,
    Step,
    TransformationStep,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Storage,
        ResourceKind::Harvestable,
        ResourceKind::Transformation,
        ResourceKind::Step,
        ResourceKind::TransformationStep,
    ];

    /// Path segment under the proxy's base path, e.g. `transformation-steps`
    pub fn segment(self) -> &'static str {
        match self {
            ResourceKind::Storage => "storages",
            ResourceKind::Harvestable => "harvestables",
            ResourceKind::Transformation => "transformations",
            ResourceKind::Step => "steps",
            ResourceKind::TransformationStep => "transformation-steps",
        }
    }

    /// Collection path on the Harvester
    pub fn backend_path(self) -> &'static str {
        match self {
            ResourceKind::Storage => "/harvester/records/storages",
            ResourceKind::Harvestable => "/harvester/records/harvestables",
            ResourceKind::Transformation => "/harvester/records/transformations",
            ResourceKind::Step => "/harvester/records/steps",
            ResourceKind::TransformationStep => "/harvester/records/tsas",
        }
    }

    /// Wrapper key anchoring a single record in JSON and its root element in XML
    pub fn root_property(self) -> &'static str {
        match self {
            ResourceKind::Storage => "storage",
            ResourceKind::Harvestable => "harvestable",
            ResourceKind::Transformation => "transformation",
            ResourceKind::Step => "step",
            ResourceKind::TransformationStep => "transformationStepAssociation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Storage => "storage",
            ResourceKind::Harvestable => "harvestable",
            ResourceKind::Transformation => "transformation",
            ResourceKind::Step => "step",
            ResourceKind::TransformationStep => "transformation-step association",
        }
    }

    /// Harvester path of a single record. The id always stays one path
    /// segment: `?`, `/`, `#` and the like are percent-encoded.
    pub fn record_path(self, id: &str) -> String {
        format!(
            "{}/{}",
            self.backend_path(),
            utf8_percent_encode(id, ENCODE_CHARACTERS)
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.segment() == s)
            .ok_or_else(|| UnknownResourceKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownResourceKind(pub String);

impl fmt::Display for UnknownResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown resource type: {}", self.0)
    }
}

impl std::error::Error for UnknownResourceKind {}

/// Whether `id` can name a record at all. URL parsers resolve `.` and `..`
/// segments, encoded or not, so such ids would address another resource.
pub fn is_record_id(id: &str) -> bool {
    !matches!(id, "" | "." | "..")
}

/// Outcome of a read against the Harvester.
///
/// Every decision downstream of a backend GET (respond with data, respond
/// 404, relay an error, go ahead with a PUT) branches on this type rather
/// than on raw status codes.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult<T = RecordDocument> {
    Found(T),
    NotFound,
    BackendError { status: u16, message: String },
    TransportError(String),
}
