//! Document model types for reconstructed structure.
//!
//! This module defines the intermediate representation that bridges layout
//! analysis and markup rendering. Blocks are immutable tagged variants with
//! geometry as a common field; no shared mutable state crosses pipeline
//! stages.

mod block;
mod document;

pub use block::{Block, BlockKind, CodeLine, Table, TableScore};
pub use document::{Document, Page};
