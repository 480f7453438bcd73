//! Geometric primitives shared by all pipeline stages.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page coordinates.
///
/// The coordinate system has its origin at the top-left corner of the page:
/// x grows to the right, y grows downward. All stages order content by
/// ascending y (top to bottom), then ascending x (left to right).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box, clamping inverted extents to zero width/height.
    ///
    /// Extractors occasionally emit boxes with x1 < x0 or y1 < y0; clamping
    /// here keeps every downstream geometric comparison well-defined.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0,
            y0,
            x1: x1.max(x0),
            y1: y1.max(y0),
        }
    }

    /// Width of the box (never negative).
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box (never negative).
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal center.
    pub fn x_center(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical center.
    pub fn y_center(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Union of a sequence of boxes, or `None` for an empty sequence.
    pub fn union_of<'a>(boxes: impl IntoIterator<Item = &'a BBox>) -> Option<BBox> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, b| match acc {
                Some(u) => Some(u.union(b)),
                None => Some(*b),
            })
    }

    /// Check whether a point lies inside the box (edges inclusive).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_box_clamped() {
        let b = BBox::new(10.0, 10.0, 5.0, 3.0);
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
        assert_eq!(b.x1, 10.0);
        assert_eq!(b.y1, 10.0);
    }

    #[test]
    fn test_union() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 20.0, 8.0);
        let u = a.union(&b);
        assert_eq!(u, BBox::new(0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn test_union_of_empty() {
        assert!(BBox::union_of(std::iter::empty::<&BBox>()).is_none());
    }

    #[test]
    fn test_contains_point() {
        let b = BBox::new(10.0, 10.0, 20.0, 20.0);
        assert!(b.contains_point(10.0, 10.0));
        assert!(b.contains_point(15.0, 18.0));
        assert!(!b.contains_point(9.9, 15.0));
        assert!(!b.contains_point(15.0, 20.1));
    }
}
