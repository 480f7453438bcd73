//! Input contract for the extraction collaborator.
//!
//! The crate does not read page bytes itself. An external extractor supplies,
//! for each page, an ordered list of positioned text atoms and a list of
//! vector line segments (used for bordered table detection). Atoms are
//! immutable once produced; every pipeline stage builds fresh structures
//! from them.

use serde::{Deserialize, Serialize};

use crate::geom::BBox;

/// A positioned run of text from one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    /// The text content
    pub text: String,
    /// Bounding box in page coordinates
    pub bbox: BBox,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    pub bold: bool,
}

impl Atom {
    /// Create a new atom, inferring boldness from the font name.
    pub fn new(
        text: impl Into<String>,
        bbox: BBox,
        font_size: f32,
        font_name: impl Into<String>,
    ) -> Self {
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        Self {
            text: text.into(),
            bbox,
            font_name,
            font_size,
            bold,
        }
    }

    /// Whether the atom uses a fixed-width font.
    pub fn is_monospace(&self) -> bool {
        let lower = self.font_name.to_lowercase();
        lower.contains("mono")
            || lower.contains("courier")
            || lower.contains("consolas")
            || lower.contains("menlo")
            || lower.contains("typewriter")
    }
}

/// A vector line segment, used by the bordered table strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Segment {
    /// Start X
    pub x0: f32,
    /// Start Y
    pub y0: f32,
    /// End X
    pub x1: f32,
    /// End Y
    pub y1: f32,
}

impl Segment {
    /// Create a new segment.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Whether the segment is horizontal within `tolerance`.
    pub fn is_horizontal(&self, tolerance: f32) -> bool {
        (self.y1 - self.y0).abs() <= tolerance
    }

    /// Whether the segment is vertical within `tolerance`.
    pub fn is_vertical(&self, tolerance: f32) -> bool {
        (self.x1 - self.x0).abs() <= tolerance
    }

    /// Segment length.
    pub fn length(&self) -> f32 {
        let dx = self.x1 - self.x0;
        let dy = self.y1 - self.y0;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Everything the extractor produced for one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInput {
    /// Page width in points; 0.0 when the extractor did not report it
    pub width: f32,
    /// Page height in points; 0.0 when the extractor did not report it
    pub height: f32,
    /// Positioned text atoms, in extractor order
    pub atoms: Vec<Atom>,
    /// Vector line segments
    pub segments: Vec<Segment>,
}

impl PageInput {
    /// Create an empty page with known dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            atoms: Vec::new(),
            segments: Vec::new(),
        }
    }

    /// Add an atom to the page.
    pub fn add_atom(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    /// Add a vector segment to the page.
    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Check if the page carries no text.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Effective page width: the reported width, or the horizontal text
    /// extent when the extractor did not report dimensions.
    pub fn effective_width(&self) -> f32 {
        if self.width > 0.0 {
            return self.width;
        }
        let min_x = self
            .atoms
            .iter()
            .map(|a| a.bbox.x0)
            .fold(f32::INFINITY, f32::min);
        let max_x = self
            .atoms
            .iter()
            .map(|a| a.bbox.x1)
            .fold(f32::NEG_INFINITY, f32::max);
        if max_x > min_x {
            max_x - min_x
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_bold_inference() {
        let a = Atom::new("x", BBox::new(0.0, 0.0, 5.0, 10.0), 12.0, "Helvetica-Bold");
        assert!(a.bold);
        let b = Atom::new("x", BBox::new(0.0, 0.0, 5.0, 10.0), 12.0, "Helvetica");
        assert!(!b.bold);
    }

    #[test]
    fn test_atom_monospace() {
        assert!(Atom::new("x", BBox::default(), 10.0, "Courier New").is_monospace());
        assert!(Atom::new("x", BBox::default(), 10.0, "DejaVu Sans Mono").is_monospace());
        assert!(!Atom::new("x", BBox::default(), 10.0, "Times-Roman").is_monospace());
    }

    #[test]
    fn test_segment_orientation() {
        let h = Segment::new(0.0, 100.0, 300.0, 100.5);
        assert!(h.is_horizontal(2.0));
        assert!(!h.is_vertical(2.0));

        let v = Segment::new(50.0, 0.0, 50.0, 200.0);
        assert!(v.is_vertical(2.0));
        assert_eq!(v.length(), 200.0);
    }

    #[test]
    fn test_effective_width_fallback() {
        let mut page = PageInput::default();
        page.add_atom(Atom::new("a", BBox::new(10.0, 0.0, 30.0, 12.0), 12.0, "F"));
        page.add_atom(Atom::new("b", BBox::new(90.0, 0.0, 110.0, 12.0), 12.0, "F"));
        assert_eq!(page.effective_width(), 100.0);

        let sized = PageInput::new(612.0, 792.0);
        assert_eq!(sized.effective_width(), 612.0);
    }
}
