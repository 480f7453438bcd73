//! Document assembly: final per-page fixups and cross-page collection.

use crate::model::{Block, BlockKind, Document, Page};

/// Collect processed pages into a document, in input page order.
pub(crate) fn assemble(pages: Vec<Page>) -> Document {
    Document { pages }
}

/// Normalize list nesting within each contiguous list sequence.
///
/// The first item of a sequence anchors depth 0 whatever its absolute
/// margin was, and no item may nest more than one level deeper than its
/// predecessor. Any non-list block ends the sequence.
pub(crate) fn normalize_list_depths(blocks: &mut [Block]) {
    let mut prev_depth: Option<u8> = None;
    let mut anchor: u8 = 0;

    for block in blocks.iter_mut() {
        if let BlockKind::ListItem { depth, .. } = &mut block.kind {
            match prev_depth {
                None => {
                    anchor = *depth;
                    *depth = 0;
                }
                Some(prev) => {
                    *depth = depth.saturating_sub(anchor).min(prev + 1);
                }
            }
            prev_depth = Some(*depth);
        } else {
            prev_depth = None;
        }
    }
}
