//! Axis-aligned rectangle geometry.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing coordinates produced by kerf arithmetic.
pub const EPSILON: f64 = 1e-9;

/// An axis-aligned rectangle in sheet coordinates.
///
/// The origin is the sheet's bottom-left corner; `x` grows to the right and
/// `y` grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle anchored at the origin.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns true if both extents are finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Returns true if a `width` x `height` piece fits inside without rotation.
    pub fn fits(&self, width: f64, height: f64) -> bool {
        width <= self.width && height <= self.height
    }

    /// Returns true if `self` lies entirely inside `other`.
    ///
    /// Uses plain coordinate comparison so that identical rectangles contain
    /// each other.
    pub fn is_contained_in(&self, other: &Rect) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.right() <= other.right()
            && self.top() <= other.top()
    }

    /// Returns true if the interiors of the two rectangles overlap.
    ///
    /// Rectangles that merely share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() - EPSILON
            && other.x < self.right() - EPSILON
            && self.y < other.top() - EPSILON
            && other.y < self.top() - EPSILON
    }

    /// Grows the rectangle to the right and upward by `amount`.
    ///
    /// Placed pieces reserve the kerf on their right and top sides, which is
    /// where the next cut runs.
    pub fn expanded(&self, amount: f64) -> Rect {
        Rect::new(self.x, self.y, self.width + amount, self.height + amount)
    }

    /// Translates the rectangle.
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Returns true if the rectangle lies within `[0, width] x [0, height]`.
    pub fn within_bounds(&self, width: f64, height: f64) -> bool {
        self.x >= -EPSILON
            && self.y >= -EPSILON
            && self.right() <= width + EPSILON
            && self.top() <= height + EPSILON
    }
}

/// Removes every rectangle that is contained in another one.
///
/// When two rectangles are identical the earlier one is dropped. Order of the
/// survivors is preserved.
pub fn prune_contained(rects: &mut Vec<Rect>) {
    let mut i = 0;
    while i < rects.len() {
        let mut removed_i = false;
        let mut j = i + 1;
        while j < rects.len() {
            if rects[i].is_contained_in(&rects[j]) {
                rects.remove(i);
                removed_i = true;
                break;
            }
            if rects[j].is_contained_in(&rects[i]) {
                rects.remove(j);
            } else {
                j += 1;
            }
        }
        if !removed_i {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rect_edges_and_area() {
        let r = Rect::new(10.0, 5.0, 20.0, 30.0);
        assert_relative_eq!(r.right(), 30.0);
        assert_relative_eq!(r.top(), 35.0);
        assert_relative_eq!(r.area(), 600.0);
    }

    #[test]
    fn test_containment() {
        let outer = Rect::sized(100.0, 100.0);
        let inner = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(inner.is_contained_in(&outer));
        assert!(!outer.is_contained_in(&inner));
        assert!(outer.is_contained_in(&outer));
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_expanded_grows_right_and_up() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0).expanded(0.5);
        assert_eq!(r, Rect::new(1.0, 2.0, 3.5, 4.5));
    }

    #[test]
    fn test_prune_contained() {
        let mut rects = vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(60.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 0.0, 50.0, 50.0),
        ];
        prune_contained(&mut rects);
        assert_eq!(
            rects,
            vec![
                Rect::new(60.0, 0.0, 10.0, 10.0),
                Rect::new(0.0, 0.0, 50.0, 50.0)
            ]
        );
    }

    #[test]
    fn test_well_formed() {
        assert!(Rect::sized(1.0, 0.0).is_well_formed());
        assert!(!Rect::sized(-1.0, 2.0).is_well_formed());
        assert!(!Rect::sized(f64::NAN, 2.0).is_well_formed());
    }
}
