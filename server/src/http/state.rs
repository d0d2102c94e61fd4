use harvester_client::HarvesterApi;
use std::sync::Arc;

use crate::proxy::{RecordProxy, ScriptFieldAdapter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub records: RecordProxy,
    pub scripts: ScriptFieldAdapter,
}

impl AppState {
    pub fn new(backend: Arc<dyn HarvesterApi>) -> Self {
        let records = RecordProxy::new(backend);
        let scripts = ScriptFieldAdapter::new(records.clone());
        Self { records, scripts }
    }
}
