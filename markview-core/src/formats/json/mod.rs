//! JSON format
//!
//! The render tree serialized with serde. Nodes are adjacently tagged
//! (`{"type": "heading", "value": {...}}`), matching the document tree's JSON shape.

use crate::error::FormatError;
use crate::format::RenderFormat;
use crate::render::RenderTree;

pub struct JsonFormat;

impl RenderFormat for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Render tree as pretty-printed JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn serialize(&self, tree: &RenderTree) -> Result<String, FormatError> {
        serde_json::to_string_pretty(tree)
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }
}
