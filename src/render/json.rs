//! JSON serialization of the document model.

use crate::error::Result;
use crate::model::Document;

/// Serialize a document to pretty-printed JSON.
pub fn to_json(document: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Serialize a document to compact JSON.
pub fn to_json_compact(document: &Document) -> Result<String> {
    Ok(serde_json::to_string(document)?)
}
