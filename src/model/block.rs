//! Block-level types.

use serde::{Deserialize, Serialize};

use crate::geom::BBox;

/// A typed structural element with its bounding geometry.
///
/// The bounding box is the union of the constituent atom boxes; downstream
/// ordering and merge-adjacency tests rely on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// The structural variant
    pub kind: BlockKind,
    /// Union of constituent atom bounding boxes
    pub bbox: BBox,
}

impl Block {
    /// Create a new block.
    pub fn new(kind: BlockKind, bbox: BBox) -> Self {
        Self { kind, bbox }
    }

    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, BlockKind::Paragraph { .. })
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self.kind, BlockKind::Table(_))
    }

    /// Check if this block is a list item.
    pub fn is_list_item(&self) -> bool {
        matches!(self.kind, BlockKind::ListItem { .. })
    }

    /// Get the plain text content of the block, without markup delimiters.
    pub fn plain_text(&self) -> String {
        match &self.kind {
            BlockKind::Heading { text, .. } => text.clone(),
            BlockKind::Paragraph { text } => text.clone(),
            BlockKind::ListItem { text, .. } => text.clone(),
            BlockKind::CodeBlock { lines, .. } => lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            BlockKind::Table(table) => table.plain_text(),
            BlockKind::Blockquote { text } => text.clone(),
            BlockKind::HorizontalRule => String::new(),
        }
    }
}

/// The structural type of a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// A heading with level 1-6
    Heading {
        /// Heading level (1 = largest)
        level: u8,
        /// Heading text
        text: String,
    },

    /// A regular paragraph
    Paragraph {
        /// Paragraph text
        text: String,
    },

    /// A single list item
    ListItem {
        /// Whether the item belongs to a numbered list
        ordered: bool,
        /// Nesting depth (0 = top level)
        depth: u8,
        /// Item text, marker stripped
        text: String,
    },

    /// A code block with indentation expressed as levels, never raw spacing
    CodeBlock {
        /// Language hint from an explicit fence, if present
        language: Option<String>,
        /// Code lines in order
        lines: Vec<CodeLine>,
    },

    /// A table
    Table(Table),

    /// A blockquote; multi-line quotes join their lines with '\n'
    Blockquote {
        /// Quote text, markers stripped
        text: String,
    },

    /// A horizontal rule
    HorizontalRule,
}

/// A single line of a code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLine {
    /// Indent level relative to the block's left margin (0 = at margin)
    pub indent: u32,
    /// Line text
    pub text: String,
}

impl CodeLine {
    /// Create a new code line.
    pub fn new(indent: u32, text: impl Into<String>) -> Self {
        Self {
            indent,
            text: text.into(),
        }
    }
}

/// A reconstructed table. Rectangular by construction: every row has the
/// same column count, short rows padded with empty cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Rows of cell text, top-to-bottom then left-to-right
    pub rows: Vec<Vec<String>>,
    /// Composite detection confidence in [0, 1]; 1.0 for bordered grids
    pub confidence: f32,
    /// Component scores for borderless detection; `None` for bordered grids
    pub score: Option<TableScore>,
}

impl Table {
    /// Create a table, padding short rows to the widest row.
    pub fn new(mut rows: Vec<Vec<String>>, confidence: f32, score: Option<TableScore>) -> Self {
        let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        for row in &mut rows {
            while row.len() < columns {
                row.push(String::new());
            }
        }
        Self {
            rows,
            confidence,
            score,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether all rows have equal length.
    pub fn is_rectangular(&self) -> bool {
        let cols = self.column_count();
        self.rows.iter().all(|r| r.len() == cols)
    }

    /// Tab-separated plain text, rows joined with newlines.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Component scores behind a borderless table decision.
///
/// Each heuristic is exposed individually so a regression in one is
/// detectable without re-deriving the others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableScore {
    /// Column-position consistency across rows
    pub alignment: f32,
    /// Row-length regularity (same cell count across rows)
    pub regularity: f32,
    /// Satisfaction of the minimum row/column counts
    pub size: f32,
    /// Content validity (cells are not all single-character fragments)
    pub content: f32,
}

impl TableScore {
    /// Weighted composite in [0, 1].
    pub fn composite(&self) -> f32 {
        0.35 * self.alignment + 0.25 * self.regularity + 0.2 * self.size + 0.2 * self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_padded_rectangular() {
        let table = Table::new(
            vec![
                vec!["a".into(), "b".into(), "c".into()],
                vec!["d".into()],
            ],
            0.8,
            None,
        );
        assert!(table.is_rectangular());
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[1], vec!["d".to_string(), String::new(), String::new()]);
    }

    #[test]
    fn test_score_composite_bounds() {
        let perfect = TableScore {
            alignment: 1.0,
            regularity: 1.0,
            size: 1.0,
            content: 1.0,
        };
        assert!((perfect.composite() - 1.0).abs() < 1e-6);

        let zero = TableScore {
            alignment: 0.0,
            regularity: 0.0,
            size: 0.0,
            content: 0.0,
        };
        assert_eq!(zero.composite(), 0.0);
    }

    #[test]
    fn test_block_plain_text() {
        let block = Block::new(
            BlockKind::CodeBlock {
                language: Some("rust".into()),
                lines: vec![CodeLine::new(0, "fn main() {"), CodeLine::new(1, "}")],
            },
            crate::geom::BBox::default(),
        );
        assert_eq!(block.plain_text(), "fn main() {\n}");
    }
}
