//! Inline code merging.
//!
//! A short monospace fragment sandwiched between two paragraphs is usually
//! an identifier mid-sentence, not a code block. The merger collapses the
//! paragraph, fragment, paragraph triple into one paragraph with the
//! fragment wrapped in backticks. Merging only fires on single-line,
//! unindented, unfenced code blocks within vertical reach of both
//! neighbors, and the output contains no code block, so a second pass
//! changes nothing.

use crate::config::Settings;
use crate::model::{Block, BlockKind};

use super::lines::{needs_space, Line};

/// Line text with mid-line monospace spans wrapped in backticks. Lines
/// that are mostly monospace are code, not prose, and pass through as-is.
pub(crate) fn line_text_with_code_marks(line: &Line) -> String {
    if line.is_monospace() {
        return line.text();
    }
    let mut out = String::new();
    for (i, span) in line.spans.iter().enumerate() {
        if i > 0 && needs_space(&line.spans[i - 1], span) {
            out.push(' ');
        }
        if span.is_monospace() && !span.text.trim().is_empty() {
            out.push('`');
            out.push_str(span.text.trim());
            out.push('`');
        } else {
            out.push_str(&span.text);
        }
    }
    out
}

/// Merge inline code fragments into their surrounding paragraphs.
pub(crate) fn merge_inline(blocks: Vec<Block>, settings: &Settings) -> Vec<Block> {
    let mut blocks = blocks;
    let mut out: Vec<Block> = Vec::with_capacity(blocks.len());
    let mut i = 0;

    while i < blocks.len() {
        if i + 2 < blocks.len() && mergeable(&blocks[i], &blocks[i + 1], &blocks[i + 2], settings)
        {
            let after = blocks[i + 2].clone();
            let fragment = blocks[i + 1].clone();
            let before = blocks[i].clone();
            let merged = merge_triple(before, fragment, after);
            // The merged paragraph may itself precede another fragment.
            blocks[i + 2] = merged;
            i += 2;
        } else {
            out.push(blocks[i].clone());
            i += 1;
        }
    }
    out
}

fn mergeable(before: &Block, middle: &Block, after: &Block, settings: &Settings) -> bool {
    let (BlockKind::Paragraph { .. }, BlockKind::Paragraph { .. }) = (&before.kind, &after.kind)
    else {
        return false;
    };
    let BlockKind::CodeBlock { language, lines } = &middle.kind else {
        return false;
    };
    if language.is_some() || lines.len() != 1 {
        return false;
    }
    let line = &lines[0];
    if line.indent != 0 || line.text.chars().count() > settings.inline_code_max_chars {
        return false;
    }

    // The fragment must sit directly between its neighbors vertically.
    let reach = middle.bbox.height().max(12.0) * 1.5;
    let gap_above = middle.bbox.y0 - before.bbox.y1;
    let gap_below = after.bbox.y0 - middle.bbox.y1;
    gap_above <= reach && gap_below <= reach
}

fn merge_triple(before: Block, middle: Block, after: Block) -> Block {
    let bbox = before.bbox.union(&middle.bbox).union(&after.bbox);
    let code = middle.plain_text();
    let text = format!(
        "{} `{}` {}",
        before.plain_text().trim_end(),
        code.trim(),
        after.plain_text().trim_start()
    );
    Block::new(BlockKind::Paragraph { text }, bbox)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::BBox;
    use crate::input::Atom;
    use crate::model::CodeLine;
    use crate::pipeline::lines::group_lines;

    fn paragraph(text: &str, y0: f32) -> Block {
        Block::new(
            BlockKind::Paragraph { text: text.into() },
            BBox::new(50.0, y0, 400.0, y0 + 12.0),
        )
    }

    fn fragment(text: &str, y0: f32) -> Block {
        Block::new(
            BlockKind::CodeBlock {
                language: None,
                lines: vec![CodeLine::new(0, text)],
            },
            BBox::new(50.0, y0, 200.0, y0 + 12.0),
        )
    }

    #[test]
    fn test_sandwich_merges_to_one_paragraph() {
        let blocks = vec![
            paragraph("call the", 20.0),
            fragment("parse_atoms", 36.0),
            paragraph("function first", 52.0),
        ];
        let merged = merge_inline(blocks, &Settings::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].plain_text(),
            "call the `parse_atoms` function first"
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let blocks = vec![
            paragraph("call the", 20.0),
            fragment("parse_atoms", 36.0),
            paragraph("function first", 52.0),
        ];
        let settings = Settings::default();
        let once = merge_inline(blocks, &settings);
        let twice = merge_inline(once.clone(), &settings);
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn test_fenced_fragment_not_merged() {
        let mut frag = fragment("parse_atoms", 36.0);
        if let BlockKind::CodeBlock { language, .. } = &mut frag.kind {
            *language = Some("rust".into());
        }
        let blocks = vec![
            paragraph("call the", 20.0),
            frag,
            paragraph("function first", 52.0),
        ];
        assert_eq!(merge_inline(blocks, &Settings::default()).len(), 3);
    }

    #[test]
    fn test_long_fragment_not_merged() {
        let long = "a".repeat(Settings::default().inline_code_max_chars + 1);
        let blocks = vec![
            paragraph("call the", 20.0),
            fragment(&long, 36.0),
            paragraph("function first", 52.0),
        ];
        assert_eq!(merge_inline(blocks, &Settings::default()).len(), 3);
    }

    #[test]
    fn test_distant_fragment_not_merged() {
        let blocks = vec![
            paragraph("call the", 20.0),
            fragment("parse_atoms", 200.0),
            paragraph("function first", 400.0),
        ];
        assert_eq!(merge_inline(blocks, &Settings::default()).len(), 3);
    }

    #[test]
    fn test_mid_line_monospace_wrapped() {
        let atoms = vec![
            Atom::new("run the", BBox::new(10.0, 10.0, 52.0, 22.0), 12.0, "Helvetica"),
            Atom::new("build", BBox::new(58.0, 10.0, 88.0, 22.0), 12.0, "Courier"),
            Atom::new(
                "command now",
                BBox::new(94.0, 10.0, 160.0, 22.0),
                12.0,
                "Helvetica",
            ),
        ];
        let lines = group_lines(&atoms, &Settings::default());
        assert_eq!(
            line_text_with_code_marks(&lines[0]),
            "run the `build` command now"
        );
    }

    #[test]
    fn test_mostly_monospace_line_unmarked() {
        let atoms = vec![Atom::new(
            "let x = 1;",
            BBox::new(10.0, 10.0, 70.0, 20.0),
            10.0,
            "Courier",
        )];
        let lines = group_lines(&atoms, &Settings::default());
        assert_eq!(line_text_with_code_marks(&lines[0]), "let x = 1;");
    }

    #[test]
    fn test_chained_fragments_merge() {
        let blocks = vec![
            paragraph("use", 20.0),
            fragment("alpha", 36.0),
            paragraph("and", 52.0),
            fragment("beta", 68.0),
            paragraph("together", 84.0),
        ];
        let merged = merge_inline(blocks, &Settings::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].plain_text(), "use `alpha` and `beta` together");
    }
}
