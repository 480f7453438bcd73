//! Block classification: groups consecutive lines into typed candidate runs.
//!
//! Classification is an explicit ordered rule list; the first matching rule
//! wins, so the tie-break between ambiguous readings (indented prose that
//! resembles both code and blockquote, say) is fixed and auditable rather
//! than heuristics racing. Rule order: list item, code, blockquote, heading,
//! horizontal rule, paragraph.
//!
//! Dense multi-span regions are not classified here; they are marked as
//! table candidates and deferred to the table detector.

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::Settings;
use crate::geom::BBox;

use super::lines::Line;

/// Candidate classification for a run of consecutive lines.
#[derive(Debug, Clone, PartialEq)]
pub enum RunClass {
    /// Heading with level 1-6
    Heading(u8),
    /// Regular paragraph
    Paragraph,
    /// Single list item
    ListItem {
        /// Numbered versus bulleted
        ordered: bool,
        /// Nesting depth from left-margin quantization
        depth: u8,
    },
    /// Code run; language comes from a fence hint when present
    Code {
        /// Fence language hint
        language: Option<String>,
    },
    /// Blockquote
    Blockquote,
    /// Horizontal rule made of text glyphs
    HorizontalRule,
    /// Deferred to the table detector
    TableCandidate,
}

/// A run of consecutive lines with a candidate classification.
#[derive(Debug, Clone)]
pub struct Run {
    /// Candidate class
    pub class: RunClass,
    /// Constituent lines, top-to-bottom
    pub lines: Vec<Line>,
}

impl Run {
    /// Union of the constituent line boxes.
    pub fn bbox(&self) -> BBox {
        BBox::union_of(self.lines.iter().map(|l| &l.bbox)).unwrap_or_default()
    }

    /// Total word count across lines.
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.word_count()).sum()
    }
}

/// Per-line classification produced by the rule list.
#[derive(Debug, Clone, PartialEq)]
enum LineClass {
    ListMarker { ordered: bool },
    FenceOpen { language: Option<String> },
    CodeText,
    Quote,
    Heading(u8),
    Rule,
    Text,
}

/// Font size ranking for heading detection on one page.
///
/// The body size is the most common size (weighted by character count);
/// distinct sizes above it, largest first, are heading sizes.
#[derive(Debug, Clone, Default)]
pub(crate) struct FontRanking {
    body_size: f32,
    heading_sizes: Vec<f32>,
}

impl FontRanking {
    /// Build the ranking from a page's lines.
    pub(crate) fn from_lines(lines: &[Line]) -> Self {
        // Key sizes at 0.1pt precision; BTreeMap keeps iteration stable.
        let mut histogram: BTreeMap<i32, usize> = BTreeMap::new();
        for line in lines {
            for span in &line.spans {
                let key = (span.font_size * 10.0).round() as i32;
                *histogram.entry(key).or_insert(0) += span.text.chars().count();
            }
        }

        let Some((&body_key, _)) = histogram
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)))
        else {
            return Self::default();
        };
        let body_size = body_key as f32 / 10.0;

        let mut heading_sizes: Vec<f32> = histogram
            .keys()
            .filter(|&&k| k > body_key + 5)
            .map(|&k| k as f32 / 10.0)
            .collect();
        heading_sizes.sort_by(|a, b| b.total_cmp(a));

        Self {
            body_size,
            heading_sizes,
        }
    }

    /// Heading level for a line, or `None` for body text. Requires boldness
    /// and a font size ranked among the page's top distinct sizes.
    fn heading_level(&self, line: &Line, limit: usize) -> Option<u8> {
        if !line.is_bold() {
            return None;
        }
        let size = line.font_size();
        if size <= self.body_size + 0.5 {
            return None;
        }
        for (i, &heading_size) in self.heading_sizes.iter().take(limit).enumerate() {
            if size >= heading_size - 0.5 {
                return Some((i + 1).min(6) as u8);
            }
        }
        None
    }
}

/// Classifier for one page's lines.
pub(crate) struct Classifier<'a> {
    settings: &'a Settings,
    ranking: FontRanking,
    ordered_marker: Regex,
}

struct RuleContext<'c> {
    line: &'c Line,
    text: String,
}

impl<'a> Classifier<'a> {
    /// Create a classifier, deriving font statistics from the page's lines.
    pub(crate) fn new(settings: &'a Settings, lines: &[Line]) -> Self {
        Self {
            settings,
            ranking: FontRanking::from_lines(lines),
            ordered_marker: Regex::new(r"^(?:\d{1,3}|[a-zA-Z])[.)](?:\s+|$)").unwrap(),
        }
    }

    /// Create a classifier that never emits headings or table candidates,
    /// used when a rejected table region falls back to default handling.
    pub(crate) fn fallback(settings: &'a Settings) -> Self {
        Self {
            settings,
            ranking: FontRanking::default(),
            ordered_marker: Regex::new(r"^(?:\d{1,3}|[a-zA-Z])[.)](?:\s+|$)").unwrap(),
        }
    }

    /// Group and classify lines into candidate runs.
    pub(crate) fn classify(
        &self,
        lines: Vec<Line>,
        page_width: f32,
        defer_tables: bool,
    ) -> Vec<Run> {
        if lines.is_empty() {
            return vec![];
        }

        let avg_spacing = average_line_spacing(&lines);
        let classes: Vec<LineClass> = lines.iter().map(|l| self.classify_line(l)).collect();

        let mut runs: Vec<Run> = Vec::new();
        let mut list_stack: Vec<(f32, u8)> = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            match classes[i].clone() {
                LineClass::FenceOpen { language } => {
                    let mut body = Vec::new();
                    let mut j = i + 1;
                    while j < lines.len() && !is_fence(&lines[j].text()) {
                        body.push(lines[j].clone());
                        j += 1;
                    }
                    runs.push(Run {
                        class: RunClass::Code { language },
                        lines: body,
                    });
                    // Skip the closing fence if one was found.
                    i = if j < lines.len() { j + 1 } else { j };
                    list_stack.clear();
                }
                LineClass::CodeText => {
                    let mut body = vec![lines[i].clone()];
                    let mut j = i + 1;
                    while j < lines.len()
                        && classes[j] == LineClass::CodeText
                        && gap_ok(&lines[j - 1], &lines[j], avg_spacing, self.settings)
                    {
                        body.push(lines[j].clone());
                        j += 1;
                    }
                    runs.push(Run {
                        class: RunClass::Code { language: None },
                        lines: body,
                    });
                    i = j;
                    list_stack.clear();
                }
                LineClass::Quote => {
                    let mut body = vec![lines[i].clone()];
                    let mut j = i + 1;
                    while j < lines.len()
                        && classes[j] == LineClass::Quote
                        && gap_ok(&lines[j - 1], &lines[j], avg_spacing, self.settings)
                    {
                        body.push(lines[j].clone());
                        j += 1;
                    }
                    runs.push(Run {
                        class: RunClass::Blockquote,
                        lines: body,
                    });
                    i = j;
                    list_stack.clear();
                }
                LineClass::Heading(level) => {
                    let mut body = vec![lines[i].clone()];
                    let mut j = i + 1;
                    while j < lines.len()
                        && classes[j] == LineClass::Heading(level)
                        && gap_ok(&lines[j - 1], &lines[j], avg_spacing, self.settings)
                    {
                        body.push(lines[j].clone());
                        j += 1;
                    }
                    runs.push(Run {
                        class: RunClass::Heading(level),
                        lines: body,
                    });
                    i = j;
                    list_stack.clear();
                }
                LineClass::Rule => {
                    runs.push(Run {
                        class: RunClass::HorizontalRule,
                        lines: vec![lines[i].clone()],
                    });
                    i += 1;
                    list_stack.clear();
                }
                LineClass::ListMarker { ordered } => {
                    let depth = list_depth(
                        &mut list_stack,
                        lines[i].x0(),
                        self.settings.list_indent_unit,
                    );
                    let mut body = vec![lines[i].clone()];
                    let mut j = i + 1;
                    // Wrapped continuation lines hang indented under the item.
                    while j < lines.len()
                        && classes[j] == LineClass::Text
                        && gap_ok(&lines[j - 1], &lines[j], avg_spacing, self.settings)
                        && lines[j].x0() > lines[i].x0() + 2.0
                    {
                        body.push(lines[j].clone());
                        j += 1;
                    }
                    runs.push(Run {
                        class: RunClass::ListItem { ordered, depth },
                        lines: body,
                    });
                    i = j;
                }
                LineClass::Text => {
                    let mut body = vec![lines[i].clone()];
                    let mut j = i + 1;
                    while j < lines.len()
                        && classes[j] == LineClass::Text
                        && continuation_ok(&lines[j - 1], &lines[j], avg_spacing, self.settings)
                    {
                        body.push(lines[j].clone());
                        j += 1;
                    }
                    runs.push(Run {
                        class: RunClass::Paragraph,
                        lines: body,
                    });
                    i = j;
                    list_stack.clear();
                }
            }
        }

        if defer_tables {
            self.promote_table_candidates(&mut runs, page_width);
        }

        runs
    }

    /// Apply the ordered rule list to one line. First match wins; the order
    /// is the documented tie-break for ambiguous lines.
    fn classify_line(&self, line: &Line) -> LineClass {
        let ctx = RuleContext {
            line,
            text: line.text(),
        };
        let rules: [(&str, &dyn Fn(&RuleContext<'_>) -> Option<LineClass>); 5] = [
            ("list-marker", &|c| self.rule_list_marker(c)),
            ("code", &|c| self.rule_code(c)),
            ("blockquote", &|c| self.rule_blockquote(c)),
            ("heading", &|c| self.rule_heading(c)),
            ("horizontal-rule", &|c| self.rule_horizontal(c)),
        ];
        for (name, rule) in rules {
            if let Some(class) = rule(&ctx) {
                log::trace!("line {:?} matched rule {}", ctx.text, name);
                return class;
            }
        }
        LineClass::Text
    }

    fn rule_list_marker(&self, ctx: &RuleContext<'_>) -> Option<LineClass> {
        let trimmed = ctx.text.trim_start();
        if let Some(first) = trimmed.chars().next() {
            if is_bullet_char(first) {
                let rest = &trimmed[first.len_utf8()..];
                if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                    return Some(LineClass::ListMarker { ordered: false });
                }
            }
        }
        if self.ordered_marker.is_match(trimmed) {
            return Some(LineClass::ListMarker { ordered: true });
        }
        None
    }

    fn rule_code(&self, ctx: &RuleContext<'_>) -> Option<LineClass> {
        let trimmed = ctx.text.trim();
        if let Some(rest) = trimmed.strip_prefix("```") {
            let language = rest.trim();
            return Some(LineClass::FenceOpen {
                language: if language.is_empty() {
                    None
                } else {
                    Some(language.to_string())
                },
            });
        }
        if ctx.line.is_monospace() {
            return Some(LineClass::CodeText);
        }
        None
    }

    fn rule_blockquote(&self, ctx: &RuleContext<'_>) -> Option<LineClass> {
        if ctx.text.trim_start().starts_with('>') {
            Some(LineClass::Quote)
        } else {
            None
        }
    }

    fn rule_heading(&self, ctx: &RuleContext<'_>) -> Option<LineClass> {
        self.ranking
            .heading_level(ctx.line, self.settings.heading_rank_limit)
            .map(LineClass::Heading)
    }

    fn rule_horizontal(&self, ctx: &RuleContext<'_>) -> Option<LineClass> {
        let trimmed = ctx.text.trim();
        let mut chars = trimmed.chars();
        let first = chars.next()?;
        if trimmed.chars().count() >= 3
            && matches!(first, '-' | '_' | '=' | '*' | '—' | '–')
            && chars.all(|c| c == first)
            && ctx.line.spans.len() == 1
        {
            Some(LineClass::Rule)
        } else {
            None
        }
    }

    /// Mark dense multi-span paragraph runs as table candidates.
    fn promote_table_candidates(&self, runs: &mut [Run], page_width: f32) {
        for run in runs.iter_mut() {
            if run.class != RunClass::Paragraph || run.lines.len() < 2 {
                continue;
            }
            let multi_span = run.lines.iter().filter(|l| l.spans.len() >= 2).count();
            if multi_span * 2 < run.lines.len() {
                continue;
            }
            if run.word_count() < self.settings.min_words_in_table {
                continue;
            }
            if page_width > 0.0
                && run.bbox().width() / page_width > self.settings.max_table_width_ratio
            {
                continue;
            }
            log::debug!(
                "deferring {} lines ({} words) to table detection",
                run.lines.len(),
                run.word_count()
            );
            run.class = RunClass::TableCandidate;
        }
    }
}

/// Classify a page's lines into candidate runs.
pub fn classify_page(lines: Vec<Line>, page_width: f32, settings: &Settings) -> Vec<Run> {
    let classifier = Classifier::new(settings, &lines);
    classifier.classify(lines, page_width, true)
}

/// Default paragraph/list handling for a region the table detector rejected.
/// Never emits headings or further table candidates, so no text loops back.
pub(crate) fn classify_fallback(lines: Vec<Line>, settings: &Settings) -> Vec<Run> {
    let classifier = Classifier::fallback(settings);
    classifier.classify(lines, 0.0, false)
}

/// Nesting depth for a list item at margin `x0`, quantized by `unit`.
///
/// The stack holds (margin, depth) of open ancestor items; a wider margin
/// than the nearest ancestor opens a deeper level, a narrower one pops back.
fn list_depth(stack: &mut Vec<(f32, u8)>, x0: f32, unit: f32) -> u8 {
    let tolerance = unit * 0.5;
    while let Some(&(margin, _)) = stack.last() {
        if x0 < margin - tolerance {
            stack.pop();
        } else {
            break;
        }
    }

    let depth = match stack.last() {
        Some(&(margin, depth)) if x0 > margin + tolerance => {
            let steps = ((x0 - margin) / unit).round().max(1.0) as u8;
            depth.saturating_add(steps)
        }
        Some(&(_, depth)) => depth,
        None => 0,
    };

    if let Some(&(margin, _)) = stack.last() {
        if (x0 - margin).abs() <= tolerance {
            stack.pop();
        }
    }
    stack.push((x0, depth));
    depth
}

/// Average vertical spacing between consecutive lines.
fn average_line_spacing(lines: &[Line]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[1].y_center() - w[0].y_center()).abs())
        .filter(|s| *s > 0.1)
        .collect();
    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Vertical continuation between two lines.
fn gap_ok(prev: &Line, curr: &Line, avg_spacing: f32, settings: &Settings) -> bool {
    (curr.y_center() - prev.y_center()).abs() <= avg_spacing * settings.block_gap_factor
}

/// Full paragraph continuation signal: vertical gap, left margin, font size.
fn continuation_ok(prev: &Line, curr: &Line, avg_spacing: f32, settings: &Settings) -> bool {
    gap_ok(prev, curr, avg_spacing, settings)
        && (prev.x0() - curr.x0()).abs() <= settings.continuation_margin
        && (prev.font_size() - curr.font_size()).abs() <= 1.0
}

fn is_fence(text: &str) -> bool {
    text.trim().starts_with("```")
}

fn is_bullet_char(c: char) -> bool {
    matches!(
        c,
        '-' | '–' | '—' | '•' | '·' | '*' | '○' | '▪' | '◦' | '▸' | '▹' | '►' | '■' | '●' | '□'
            | '◆' | '◇' | '▶' | '▷' | '➤' | '➜'
    )
}

/// Strip the list marker from an item's first-line text.
pub(crate) fn strip_list_marker(text: &str) -> String {
    let trimmed = text.trim_start();
    if let Some(first) = trimmed.chars().next() {
        if is_bullet_char(first) {
            let rest = &trimmed[first.len_utf8()..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim_start().to_string();
            }
        }
    }
    let marker = Regex::new(r"^(?:\d{1,3}|[a-zA-Z])[.)](?:\s+|$)").unwrap();
    marker.replace(trimmed, "").to_string()
}

/// Strip the quote marker from one line of a blockquote.
pub(crate) fn strip_quote_marker(text: &str) -> String {
    text.trim_start()
        .strip_prefix('>')
        .map(|t| t.trim_start().to_string())
        .unwrap_or_else(|| text.trim_start().to_string())
}
