//! Markdown rendering.
//!
//! Blocks render independently and join with blank lines, except ordered
//! list items, which carry per-depth counters so "1. 2. 3." numbering
//! survives nesting. Pipe characters inside table cells are escaped.

use crate::model::{Block, BlockKind, Document, Table};

/// Render a document to Markdown.
pub fn render_markdown(document: &Document) -> String {
    let mut out = String::new();
    let mut numbering = ListNumbering::default();
    for page in &document.pages {
        for block in &page.blocks {
            if !matches!(block.kind, BlockKind::ListItem { .. }) {
                numbering.reset();
            }
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&render_block(block, &mut numbering));
        }
    }
    out
}

/// Per-depth counters for ordered list numbering.
#[derive(Debug, Default)]
struct ListNumbering {
    counters: Vec<usize>,
}

impl ListNumbering {
    fn next(&mut self, depth: u8) -> usize {
        let depth = depth as usize;
        // Entering a shallower level discards deeper counters.
        self.counters.truncate(depth + 1);
        while self.counters.len() <= depth {
            self.counters.push(0);
        }
        self.counters[depth] += 1;
        self.counters[depth]
    }

    fn reset(&mut self) {
        self.counters.clear();
    }
}

fn render_block(block: &Block, numbering: &mut ListNumbering) -> String {
    match &block.kind {
        BlockKind::Heading { level, text } => {
            format!("{} {}", "#".repeat((*level).clamp(1, 6) as usize), text)
        }
        BlockKind::Paragraph { text } => text.clone(),
        BlockKind::ListItem {
            ordered,
            depth,
            text,
        } => {
            let indent = "  ".repeat(*depth as usize);
            if *ordered {
                format!("{}{}. {}", indent, numbering.next(*depth), text)
            } else {
                format!("{indent}- {text}")
            }
        }
        BlockKind::CodeBlock { language, lines } => {
            let mut out = String::from("```");
            if let Some(language) = language {
                out.push_str(language);
            }
            out.push('\n');
            for line in lines {
                out.push_str(&" ".repeat(line.indent as usize));
                out.push_str(&line.text);
                out.push('\n');
            }
            out.push_str("```");
            out
        }
        BlockKind::Table(table) => render_table(table),
        BlockKind::Blockquote { text } => text
            .lines()
            .map(|l| format!("> {l}"))
            .collect::<Vec<_>>()
            .join("\n"),
        BlockKind::HorizontalRule => "---".to_string(),
    }
}

fn render_table(table: &Table) -> String {
    let columns = table.column_count();
    if columns == 0 {
        return String::new();
    }

    let mut out = String::new();
    for (i, row) in table.rows.iter().enumerate() {
        out.push('|');
        for cell in row {
            out.push(' ');
            out.push_str(&cell.replace('|', "\\|"));
            out.push_str(" |");
        }
        out.push('\n');
        if i == 0 {
            out.push('|');
            for _ in 0..columns {
                out.push_str(" --- |");
            }
            out.push('\n');
        }
    }
    out.pop();
    out
}
