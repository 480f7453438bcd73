//! Line grouping: clusters atoms into lines by vertical proximity.
//!
//! Atoms whose vertical centers fall within a tolerance band (derived from
//! the smaller atom's font size) join the same line. Within a line, spans
//! are sorted by x0, and adjacent spans separated by a gap smaller than a
//! fraction of the average character width are concatenated back into one
//! run, repairing fragmented output from the extractor.

use std::cmp::Ordering;

use crate::config::Settings;
use crate::geom::BBox;
use crate::input::Atom;

/// A text span inside a line. Produced from one or more merged atoms.
#[derive(Debug, Clone)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Bounding box
    pub bbox: BBox,
    /// Font name
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the span is bold
    pub bold: bool,
}

impl Span {
    /// Build a span from an input atom.
    pub fn from_atom(atom: &Atom) -> Self {
        Self {
            text: atom.text.clone(),
            bbox: atom.bbox,
            font_name: atom.font_name.clone(),
            font_size: atom.font_size,
            bold: atom.bold,
        }
    }

    /// Whether the span uses a fixed-width font.
    pub fn is_monospace(&self) -> bool {
        let lower = self.font_name.to_lowercase();
        lower.contains("mono")
            || lower.contains("courier")
            || lower.contains("consolas")
            || lower.contains("menlo")
            || lower.contains("typewriter")
    }

    /// Average character width, estimated from the box and text length.
    pub fn avg_char_width(&self) -> f32 {
        let chars = self.text.chars().count();
        if chars > 0 && self.bbox.width() > 0.0 {
            self.bbox.width() / chars as f32
        } else {
            self.font_size * 0.5
        }
    }
}

/// An ordered sequence of spans sharing a vertical band.
///
/// Ordering invariant: spans sorted ascending by x0.
#[derive(Debug, Clone)]
pub struct Line {
    /// Spans sorted by x0
    pub spans: Vec<Span>,
    /// Union of span boxes
    pub bbox: BBox,
}

impl Line {
    /// Build a line from spans, restoring the x0 ordering invariant.
    pub fn from_spans(mut spans: Vec<Span>) -> Self {
        spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        let bbox = BBox::union_of(spans.iter().map(|s| &s.bbox)).unwrap_or_default();
        Self { spans, bbox }
    }

    /// Left edge of the line.
    pub fn x0(&self) -> f32 {
        self.bbox.x0
    }

    /// Vertical center of the line.
    pub fn y_center(&self) -> f32 {
        self.bbox.y_center()
    }

    /// Dominant font size, weighted by text length.
    pub fn font_size(&self) -> f32 {
        let total_chars: usize = self.spans.iter().map(|s| s.text.chars().count()).sum();
        if total_chars == 0 {
            return self.spans.first().map(|s| s.font_size).unwrap_or(0.0);
        }
        let weighted: f32 = self
            .spans
            .iter()
            .map(|s| s.font_size * s.text.chars().count() as f32)
            .sum();
        weighted / total_chars as f32
    }

    /// Whether the line is predominantly bold (by character count).
    pub fn is_bold(&self) -> bool {
        let bold_chars: usize = self
            .spans
            .iter()
            .filter(|s| s.bold)
            .map(|s| s.text.chars().count())
            .sum();
        let total: usize = self.spans.iter().map(|s| s.text.chars().count()).sum();
        total > 0 && bold_chars as f32 / total as f32 > 0.5
    }

    /// Whether the line is predominantly monospace (by character count).
    pub fn is_monospace(&self) -> bool {
        let mono_chars: usize = self
            .spans
            .iter()
            .filter(|s| s.is_monospace())
            .map(|s| s.text.chars().count())
            .sum();
        let total: usize = self.spans.iter().map(|s| s.text.chars().count()).sum();
        total > 0 && mono_chars as f32 / total as f32 > 0.5
    }

    /// Total word count across spans.
    pub fn word_count(&self) -> usize {
        self.spans
            .iter()
            .map(|s| s.text.split_whitespace().count())
            .sum()
    }

    /// Combined text of all spans, with spaces inserted at real gaps.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                if needs_space(prev, span) {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }
        result
    }
}

/// Whether a space belongs between two adjacent spans, judged by the gap
/// relative to the following span's average character width.
pub(crate) fn needs_space(prev: &Span, curr: &Span) -> bool {
    let gap = curr.bbox.x0 - prev.bbox.x1;
    let threshold = curr.avg_char_width() * 0.2;
    gap > threshold && !prev.text.ends_with(' ') && !curr.text.starts_with(' ')
}

/// Group a page's atoms into lines, top-to-bottom.
pub fn group_lines(atoms: &[Atom], settings: &Settings) -> Vec<Line> {
    if atoms.is_empty() {
        return vec![];
    }

    let mut spans: Vec<Span> = atoms
        .iter()
        .filter(|a| !a.text.is_empty())
        .map(Span::from_atom)
        .collect();

    // Sort by vertical center, then x0, so band assignment is deterministic.
    spans.sort_by(|a, b| {
        match a.bbox.y_center().total_cmp(&b.bbox.y_center()) {
            Ordering::Equal => a.bbox.x0.total_cmp(&b.bbox.x0),
            ord => ord,
        }
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut band_center: Option<f32> = None;

    for span in spans {
        let y = span.bbox.y_center();
        match band_center {
            Some(center) => {
                let band_font = current
                    .iter()
                    .map(|s| s.font_size)
                    .fold(span.font_size, f32::min);
                let tolerance = band_font * settings.line_band_factor;
                if (y - center).abs() <= tolerance {
                    current.push(span);
                } else {
                    lines.push(build_line(std::mem::take(&mut current), settings));
                    band_center = Some(y);
                    current.push(span);
                }
            }
            None => {
                band_center = Some(y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(build_line(current, settings));
    }

    lines
}

/// Sort a line's spans by x0 and repair extractor fragmentation: adjacent
/// spans in the same font with a sub-character gap become one span.
fn build_line(mut spans: Vec<Span>, settings: &Settings) -> Line {
    spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

    let mut repaired: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match repaired.last_mut() {
            Some(prev) if can_merge(prev, &span, settings) => {
                prev.text.push_str(&span.text);
                prev.bbox = prev.bbox.union(&span.bbox);
            }
            _ => repaired.push(span),
        }
    }

    Line::from_spans(repaired)
}

fn can_merge(prev: &Span, curr: &Span, settings: &Settings) -> bool {
    if prev.font_name != curr.font_name
        || prev.bold != curr.bold
        || (prev.font_size - curr.font_size).abs() > 0.1
    {
        return false;
    }
    let gap = curr.bbox.x0 - prev.bbox.x1;
    gap < curr.avg_char_width() * settings.gap_repair_factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(text: &str, x: f32, y: f32, w: f32) -> Atom {
        Atom::new(text, BBox::new(x, y, x + w, y + 12.0), 12.0, "Helvetica")
    }

    #[test]
    fn test_group_by_vertical_band() {
        let atoms = vec![
            atom("world", 60.0, 100.0, 30.0),
            atom("hello", 10.0, 101.0, 30.0),
            atom("next", 10.0, 120.0, 25.0),
        ];
        let lines = group_lines(&atoms, &Settings::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "hello world");
        assert_eq!(lines[1].text(), "next");
    }

    #[test]
    fn test_spans_sorted_by_x0() {
        let atoms = vec![
            atom("b", 50.0, 10.0, 10.0),
            atom("a", 10.0, 10.0, 10.0),
            atom("c", 90.0, 10.0, 10.0),
        ];
        let lines = group_lines(&atoms, &Settings::default());
        assert_eq!(lines.len(), 1);
        let xs: Vec<f32> = lines[0].spans.iter().map(|s| s.bbox.x0).collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_fragment_repair() {
        // "Hel" and "lo" with a near-zero gap come back as one span.
        let atoms = vec![
            atom("Hel", 10.0, 10.0, 18.0),
            atom("lo", 28.3, 10.0, 12.0),
        ];
        let lines = group_lines(&atoms, &Settings::default());
        assert_eq!(lines[0].spans.len(), 1);
        assert_eq!(lines[0].text(), "Hello");
    }

    #[test]
    fn test_fragment_repair_respects_font_boundary() {
        let mut mono = atom("code", 28.3, 10.0, 24.0);
        mono.font_name = "Courier".into();
        let atoms = vec![atom("see", 10.0, 10.0, 18.0), mono];
        let lines = group_lines(&atoms, &Settings::default());
        assert_eq!(lines[0].spans.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_lines(&[], &Settings::default()).is_empty());
    }

    #[test]
    fn test_line_word_count() {
        let atoms = vec![
            atom("alpha beta", 10.0, 10.0, 60.0),
            atom("gamma", 100.0, 10.0, 30.0),
        ];
        let lines = group_lines(&atoms, &Settings::default());
        assert_eq!(lines[0].word_count(), 3);
    }
}
