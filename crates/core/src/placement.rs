//! Placed piece representation.

use crate::cut::Piece;
use crate::geometry::Rect;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A piece placed on a sheet.
///
/// `width` and `height` are the footprint on the sheet, i.e. already swapped
/// when `rotated` is set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedCut {
    /// The placed piece.
    pub piece: Piece,
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Footprint width.
    pub width: f64,
    /// Footprint height.
    pub height: f64,
    /// Whether the piece was turned by 90 degrees.
    pub rotated: bool,
    /// Whether the piece belongs to the grid block of a pattern layout.
    pub is_pattern: bool,
}

impl PlacedCut {
    /// Places `piece` at `(x, y)` in the given orientation.
    pub fn new(piece: Piece, x: f64, y: f64, rotated: bool) -> Self {
        let (width, height) = piece.oriented(rotated);
        Self {
            piece,
            x,
            y,
            width,
            height,
            rotated,
            is_pattern: false,
        }
    }

    /// Marks the placement as part of a pattern block.
    pub fn with_pattern(mut self, is_pattern: bool) -> Self {
        self.is_pattern = is_pattern;
        self
    }

    /// Returns this placement shifted by `(dx, dy)`.
    pub fn translated(mut self, dx: f64, dy: f64) -> Self {
        self.x += dx;
        self.y += dy;
        self
    }

    /// Footprint rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Footprint plus the kerf reserved on its right and top sides.
    pub fn kerf_rect(&self, kerf: f64) -> Rect {
        self.rect().expanded(kerf)
    }

    /// Footprint area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Sum of the footprint areas of a placement set.
pub fn placed_area(placed: &[PlacedCut]) -> f64 {
    placed.iter().map(PlacedCut::area).sum()
}

/// Utilization percentage of a placement set on a `width` x `height` sheet.
pub fn utilization_percent(placed: &[PlacedCut], width: f64, height: f64) -> f64 {
    let total = width * height;
    if total > 0.0 {
        (placed_area(placed) / total * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}
