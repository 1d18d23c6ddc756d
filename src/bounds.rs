//! Reference box and the candidate box implied by a transform.

use serde::{Deserialize, Serialize};

use crate::accumulator::Transform;

// Float slack when comparing edges, in screen units.
const EDGE_EPS: f64 = 1e-9;

/// The element's box as measured by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ReferenceBox {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Hosts report a zero-sized box before layout has happened.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
    pub aspect_ratio: f64,
}

impl CandidateBox {
    /// Scale is applied about the element centre, then the move offset.
    pub fn from_transform(t: &Transform, r: &ReferenceBox) -> Self {
        let width = r.width * t.scale_x;
        let height = r.height * t.scale_y;
        let left = r.left + t.move_x + t.dx + (r.width - width) / 2.0;
        let top = r.top + t.move_y + t.dy + (r.height - height) / 2.0;
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
            width,
            height,
            aspect_ratio: width / height,
        }
    }

    pub fn fits_horizontally(&self, r: &ReferenceBox) -> bool {
        self.left >= r.left - EDGE_EPS && self.right <= r.right() + EDGE_EPS
    }

    pub fn fits_vertically(&self, r: &ReferenceBox) -> bool {
        self.top >= r.top - EDGE_EPS && self.bottom <= r.bottom() + EDGE_EPS
    }

    pub fn aspect_within(&self, min: f64, max: f64) -> bool {
        self.aspect_ratio.is_finite() && self.aspect_ratio >= min && self.aspect_ratio <= max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(scale_x: f64, scale_y: f64, move_x: f64, move_y: f64) -> Transform {
        Transform {
            scale_x,
            scale_y,
            move_x,
            move_y,
            ..Transform::default()
        }
    }

    #[test]
    fn identity_transform_reproduces_reference() {
        let r = ReferenceBox::new(10.0, 20.0, 100.0, 50.0);
        let b = CandidateBox::from_transform(&Transform::default(), &r);
        assert_eq!((b.left, b.top, b.right, b.bottom), (10.0, 20.0, 110.0, 70.0));
        assert_eq!(b.aspect_ratio, 2.0);
        assert!(b.fits_horizontally(&r) && b.fits_vertically(&r));
    }

    #[test]
    fn scaling_is_about_the_centre() {
        let r = ReferenceBox::new(0.0, 0.0, 100.0, 100.0);
        let b = CandidateBox::from_transform(&transform(0.5, 2.0, 0.0, 0.0), &r);
        assert_eq!((b.left, b.right), (25.0, 75.0));
        assert_eq!((b.top, b.bottom), (-50.0, 150.0));
        assert!(b.fits_horizontally(&r));
        assert!(!b.fits_vertically(&r));
        assert_eq!(b.aspect_ratio, 0.25);
        assert!(!b.aspect_within(0.5, 2.0));
    }

    #[test]
    fn committed_and_running_offsets_both_count() {
        let r = ReferenceBox::new(0.0, 0.0, 100.0, 100.0);
        let mut t = transform(0.5, 0.5, 20.0, -10.0);
        t.dx = 5.0;
        t.dy = 10.0;
        let b = CandidateBox::from_transform(&t, &r);
        assert_eq!((b.left, b.top), (50.0, 25.0));
        assert!(b.fits_vertically(&r));
    }

    #[test]
    fn zero_sized_box_is_unmeasured() {
        assert!(!ReferenceBox::new(0.0, 0.0, 0.0, 10.0).is_measured());
        assert!(ReferenceBox::new(0.0, 0.0, 1.0, 1.0).is_measured());
    }
}
