use serde_json::Value;
use shared_types::{RecordDocument, ResourceKind};
use tracing::info;

use super::records::{found_or, RecordProxy};
use crate::http::error::{ApiError, ApiResult};

const SCRIPT_FIELD: &str = "script";

#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Rewrites every `\r\n` and lone `\r` as [`LINE_SEPARATOR`]
pub fn normalize_line_endings(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            let _ = chars.next_if_eq(&'\n');
            normalized.push_str(LINE_SEPARATOR);
        } else {
            normalized.push(c);
        }
    }
    normalized
}

/// Exposes the `script` text of a step as a resource of its own
#[derive(Clone)]
pub struct ScriptFieldAdapter {
    records: RecordProxy,
}

impl ScriptFieldAdapter {
    pub fn new(records: RecordProxy) -> Self {
        Self { records }
    }

    pub async fn get_script(&self, id: &str) -> ApiResult<String> {
        let step = found_or(self.records.lookup(ResourceKind::Step, id).await, || {
            format!("Did not find step with ID {id} to GET script from")
        })?;

        Ok(normalize_line_endings(script_of(&step)?))
    }

    /// Replaces only the script; every other field of the stored step is
    /// written back as fetched.
    pub async fn put_script(&self, id: &str, script: String) -> ApiResult<()> {
        let mut step = self
            .records
            .verify(ResourceKind::Step, id, || {
                format!("Did not find step with ID {id} to PUT script to")
            })
            .await?;

        let fields = step.as_object_mut().ok_or_else(|| {
            ApiError::Translation(format!("Step {id} is not a structured record"))
        })?;
        fields.insert(SCRIPT_FIELD.to_string(), Value::String(script));

        self.records.write(ResourceKind::Step, id, &step).await?;
        info!("Script updated for step {}", id);
        Ok(())
    }
}

fn script_of(step: &RecordDocument) -> ApiResult<&str> {
    match step.get(SCRIPT_FIELD) {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(script)) => Ok(script),
        Some(_) => Err(ApiError::Translation(
            "Step script is not a text value".to_string(),
        )),
    }
}
