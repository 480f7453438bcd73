//! Reconstructs document structure from positioned text fragments.
//!
//! An external extractor supplies, per page, text atoms with bounding
//! boxes and font attributes, plus any vector line segments. This crate
//! rebuilds the structure a human reader perceives: headings, paragraphs,
//! nested lists, code blocks with indent levels, blockquotes, and tables
//! (bordered and borderless, with confidence scoring). The result is a
//! typed document model, serializable to Markdown or JSON.
//!
//! Coordinates are top-left origin with y growing downward; reading order
//! is ascending y, then ascending x.
//!
//! # Example
//!
//! ```
//! use relayout::{Atom, BBox, PageInput};
//!
//! let mut page = PageInput::new(612.0, 792.0);
//! page.add_atom(Atom::new(
//!     "Overview",
//!     BBox::new(50.0, 40.0, 170.0, 64.0),
//!     24.0,
//!     "Helvetica-Bold",
//! ));
//! page.add_atom(Atom::new(
//!     "Body text follows the heading.",
//!     BBox::new(50.0, 90.0, 350.0, 102.0),
//!     12.0,
//!     "Helvetica",
//! ));
//!
//! let markdown = relayout::to_markdown(&[page]);
//! assert!(markdown.starts_with("# Overview"));
//! ```

pub mod config;
pub mod error;
pub mod geom;
pub mod input;
pub mod model;
mod pipeline;
pub mod render;

pub use config::Settings;
pub use error::{Error, Result};
pub use geom::BBox;
pub use input::{Atom, PageInput, Segment};
pub use model::{Block, BlockKind, CodeLine, Document, Page, Table, TableScore};
pub use render::{render_markdown, to_json, to_json_compact};

/// Reconstruct a document with default settings.
pub fn reconstruct(pages: &[PageInput]) -> Document {
    pipeline::reconstruct_pages(pages, &Settings::default())
}

/// Reconstruct a document with custom settings.
///
/// Settings are validated before the pipeline runs; a misconfigured value
/// returns [`Error::InvalidConfig`] and no page is processed.
pub fn reconstruct_with_settings(pages: &[PageInput], settings: &Settings) -> Result<Document> {
    settings.validate()?;
    Ok(pipeline::reconstruct_pages(pages, settings))
}

/// Reconstruct a document and render it to Markdown in one call.
pub fn to_markdown(pages: &[PageInput]) -> String {
    render_markdown(&reconstruct(pages))
}
