mod records;
mod script;

pub use records::RecordProxy;
pub use script::{normalize_line_endings, ScriptFieldAdapter, LINE_SEPARATOR};
