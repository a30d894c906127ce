//! Piece ordering strategies.
//!
//! Greedy packers are sensitive to the order in which pieces arrive. Running
//! the same packer over several orderings is the cheapest way to diversify
//! the search. All orderings are descending and stable, so pieces with equal
//! keys keep their cut-list order.

use crate::cut::Piece;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Metric used to order pieces before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SortStrategy {
    /// Area, largest first.
    Area,
    /// Perimeter, largest first.
    Perimeter,
    /// Width, widest first.
    Width,
    /// Height, tallest first.
    Height,
    /// Longer side, largest first.
    LongSide,
    /// Shorter side, largest first.
    ShortSide,
    /// Ratio of longer to shorter side, most elongated first.
    SideRatio,
    /// Diagonal length, largest first.
    Diagonal,
}

impl SortStrategy {
    /// All strategies in enumeration order.
    pub const ALL: [SortStrategy; 8] = [
        SortStrategy::Area,
        SortStrategy::Perimeter,
        SortStrategy::Width,
        SortStrategy::Height,
        SortStrategy::LongSide,
        SortStrategy::ShortSide,
        SortStrategy::SideRatio,
        SortStrategy::Diagonal,
    ];

    /// Sort key of a `width` x `height` rectangle.
    pub fn key(&self, width: f64, height: f64) -> f64 {
        match self {
            Self::Area => width * height,
            Self::Perimeter => 2.0 * (width + height),
            Self::Width => width,
            Self::Height => height,
            Self::LongSide => width.max(height),
            Self::ShortSide => width.min(height),
            Self::SideRatio => width.max(height) / width.min(height),
            Self::Diagonal => width.hypot(height),
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Area => "ByArea",
            Self::Perimeter => "ByPerimeter",
            Self::Width => "ByWidth",
            Self::Height => "ByHeight",
            Self::LongSide => "ByLongerSide",
            Self::ShortSide => "ByShorterSide",
            Self::SideRatio => "BySideRatio",
            Self::Diagonal => "ByDiagonal",
        }
    }
}

/// Returns `pieces` ordered by `strategy`, descending.
pub fn sort_pieces(pieces: &[Piece], strategy: SortStrategy) -> Vec<Piece> {
    let mut sorted = pieces.to_vec();
    sorted.sort_by(|a, b| {
        strategy
            .key(b.width, b.height)
            .total_cmp(&strategy.key(a.width, a.height))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::{expand_cuts, Cut};

    fn pieces() -> Vec<Piece> {
        expand_cuts(&[
            Cut::new("wide", 90.0, 10.0),
            Cut::new("square", 40.0, 40.0),
            Cut::new("tall", 20.0, 60.0),
        ])
        .unwrap()
    }

    fn order(strategy: SortStrategy) -> Vec<String> {
        sort_pieces(&pieces(), strategy)
            .into_iter()
            .map(|p| p.original_id)
            .collect()
    }

    #[test]
    fn test_sort_by_area() {
        assert_eq!(order(SortStrategy::Area), ["square", "tall", "wide"]);
    }

    #[test]
    fn test_sort_by_sides() {
        assert_eq!(order(SortStrategy::Width), ["wide", "square", "tall"]);
        assert_eq!(order(SortStrategy::Height), ["tall", "square", "wide"]);
        assert_eq!(order(SortStrategy::LongSide), ["wide", "tall", "square"]);
        assert_eq!(order(SortStrategy::ShortSide), ["square", "tall", "wide"]);
    }

    #[test]
    fn test_sort_by_ratio_and_diagonal() {
        assert_eq!(order(SortStrategy::SideRatio), ["wide", "tall", "square"]);
        assert_eq!(order(SortStrategy::Diagonal), ["wide", "tall", "square"]);
        // square and tall tie on perimeter and keep their cut-list order
        assert_eq!(order(SortStrategy::Perimeter), ["wide", "square", "tall"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let pieces = expand_cuts(&[Cut::new("A", 10.0, 20.0), Cut::new("B", 20.0, 10.0)]).unwrap();
        let sorted = sort_pieces(&pieces, SortStrategy::Area);
        assert_eq!(sorted[0].original_id, "A");
        assert_eq!(sorted[1].original_id, "B");
    }
}
