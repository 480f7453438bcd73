//! The reconstruction pipeline.
//!
//! Stages run in a fixed order per page: line grouping, block
//! classification, table resolution, block materialization, inline code
//! merging, list depth normalization. Pages are independent; with
//! parallelism enabled they are processed on the rayon pool and collected
//! back in input order, so output is identical either way.

pub(crate) mod assemble;
pub(crate) mod classify;
pub(crate) mod code;
pub(crate) mod inline;
pub(crate) mod lines;
pub(crate) mod tables;

use rayon::prelude::*;

use crate::config::Settings;
use crate::input::PageInput;
use crate::model::{Block, BlockKind, Document, Page};

use classify::{strip_list_marker, strip_quote_marker, Run, RunClass};
use tables::Resolved;

/// Run the full pipeline over one page.
pub(crate) fn process_page(input: &PageInput, number: u32, settings: &Settings) -> Page {
    let lines = lines::group_lines(&input.atoms, settings);
    let runs = classify::classify_page(lines, input.effective_width(), settings);
    let resolved = tables::resolve_tables(runs, &input.segments, settings);

    let blocks = materialize(resolved, settings);
    let mut blocks = inline::merge_inline(blocks, settings);
    assemble::normalize_list_depths(&mut blocks);

    log::debug!("page {}: {} blocks", number, blocks.len());
    Page { number, blocks }
}

/// Run the pipeline over all pages and assemble the document.
pub(crate) fn reconstruct_pages(pages: &[PageInput], settings: &Settings) -> Document {
    let processed: Vec<Page> = if settings.parallel {
        pages
            .par_iter()
            .enumerate()
            .map(|(i, page)| process_page(page, i as u32 + 1, settings))
            .collect()
    } else {
        pages
            .iter()
            .enumerate()
            .map(|(i, page)| process_page(page, i as u32 + 1, settings))
            .collect()
    };
    assemble::assemble(processed)
}

/// Turn resolved runs and tables into blocks.
fn materialize(resolved: Vec<Resolved>, settings: &Settings) -> Vec<Block> {
    resolved
        .into_iter()
        .map(|item| match item {
            Resolved::Table { table, bbox } => Block::new(BlockKind::Table(table), bbox),
            Resolved::Run(run) => materialize_run(run, settings),
        })
        .collect()
}

fn materialize_run(run: Run, settings: &Settings) -> Block {
    let bbox = run.bbox();
    let kind = match run.class {
        RunClass::Heading(level) => BlockKind::Heading {
            level,
            text: joined_text(&run, " "),
        },
        RunClass::ListItem { ordered, depth } => {
            let mut text = strip_list_marker(&run.lines[0].text());
            for line in &run.lines[1..] {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(line.text().trim());
            }
            BlockKind::ListItem {
                ordered,
                depth,
                text,
            }
        }
        RunClass::Code { language } => BlockKind::CodeBlock {
            language,
            lines: code::reconstruct_indents(&run.lines, settings),
        },
        RunClass::Blockquote => {
            let text = run
                .lines
                .iter()
                .map(|l| strip_quote_marker(&l.text()))
                .collect::<Vec<_>>()
                .join("\n");
            BlockKind::Blockquote { text }
        }
        RunClass::HorizontalRule => BlockKind::HorizontalRule,
        // Candidates rejected by the detector come back as plain runs, so
        // anything still marked here reads as a paragraph.
        RunClass::Paragraph | RunClass::TableCandidate => {
            let text = run
                .lines
                .iter()
                .map(|l| inline::line_text_with_code_marks(l).trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            BlockKind::Paragraph { text }
        }
    };
    Block::new(kind, bbox)
}

fn joined_text(run: &Run, separator: &str) -> String {
    run.lines
        .iter()
        .map(|l| l.text().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
