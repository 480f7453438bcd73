//! Output rendering for reconstructed documents.

pub mod json;
pub mod markdown;

pub use json::{to_json, to_json_compact};
pub use markdown::render_markdown;
