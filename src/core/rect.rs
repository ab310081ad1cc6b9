//! Axis-Aligned Rectangles
//!
//! Top-left origin, y growing downward, fixed-point edges.

use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_SCALE};
use super::vec2::FixedVec2;

/// Axis-aligned rectangle in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: Fixed,
    /// Top edge
    pub y: Fixed,
    /// Width (non-negative)
    pub w: Fixed,
    /// Height (non-negative)
    pub h: Fixed,
}

impl Rect {
    /// Create from fixed-point edges.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, w: Fixed, h: Fixed) -> Self {
        Self { x, y, w, h }
    }

    /// Create from whole pixels.
    #[inline]
    pub const fn from_ints(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
            w: w << FIXED_SCALE,
            h: h << FIXED_SCALE,
        }
    }

    /// Non-negative size with far edges representable as `Fixed`.
    pub fn is_well_formed(&self) -> bool {
        self.w >= 0
            && self.h >= 0
            && self.x.checked_add(self.w).is_some()
            && self.y.checked_add(self.h).is_some()
    }

    #[inline]
    pub fn right(&self) -> Fixed {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> Fixed {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> FixedVec2 {
        FixedVec2::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Strict overlap test. Touching edges do not overlap, so a body
    /// resting exactly on a surface is not in collision with it.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// True if `other` lies entirely inside this rectangle (edges inclusive).
    #[inline]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True if the point lies inside (edges inclusive).
    #[inline]
    pub fn contains_point(&self, p: FixedVec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_strict() {
        let floor = Rect::from_ints(0, 416, 960, 64);
        let standing = Rect::from_ints(120, 368, 34, 48);
        assert!(!standing.overlaps(&floor), "resting contact is not overlap");

        let sunk = Rect::new(standing.x, standing.y + 1, standing.w, standing.h);
        assert!(sunk.overlaps(&floor));
        assert!(floor.overlaps(&sunk));
    }

    #[test]
    fn test_overlap_disjoint() {
        let a = Rect::from_ints(0, 0, 10, 10);
        let b = Rect::from_ints(20, 0, 10, 10);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_contains() {
        let world = Rect::from_ints(0, 0, 960, 480);
        assert!(world.contains_rect(&Rect::from_ints(0, 0, 960, 480)));
        assert!(!world.contains_rect(&Rect::from_ints(950, 0, 20, 10)));
        assert!(world.contains_point(FixedVec2::from_ints(960, 480)));
        assert!(!world.contains_point(FixedVec2::from_ints(-1, 5)));
    }

    #[test]
    fn test_edges_and_center() {
        let r = Rect::from_ints(280, 296, 120, 18);
        assert_eq!(r.right(), Rect::from_ints(400, 0, 0, 0).x);
        assert_eq!(r.bottom(), Rect::from_ints(0, 314, 0, 0).y);
        assert_eq!(r.center(), FixedVec2::from_ints(340, 305));
    }
}
