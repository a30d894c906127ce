//! Packing result representation.

use crate::placement::PlacedCut;
use crate::sorting::SortStrategy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Algorithm family that produced a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PackingMethod {
    /// Guillotine free-rectangle packer.
    Guillotine,
    /// MaxRects free-rectangle packer.
    MaxRects,
    /// Skyline packer.
    Skyline,
    /// Grid pattern plus salvage of the leftover strips.
    HybridPattern,
    /// Nothing could be placed.
    #[default]
    None,
}

impl PackingMethod {
    /// Returns a display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Guillotine => "Guillotine",
            Self::MaxRects => "MaxRects",
            Self::Skyline => "Skyline",
            Self::HybridPattern => "hybrid-pattern",
            Self::None => "none",
        }
    }
}

/// Direction of a straight cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CutOrientation {
    /// Cut parallel to the y axis at a fixed x.
    Vertical,
    /// Cut parallel to the x axis at a fixed y.
    Horizontal,
}

/// A straight cut the operator performs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CutLine {
    /// Sequential id within the layout.
    pub id: usize,
    /// Cut direction.
    pub orientation: CutOrientation,
    /// x for vertical cuts, y for horizontal cuts (centre of the kerf).
    pub position: f64,
    /// Start coordinate along the cut.
    pub start: f64,
    /// End coordinate along the cut.
    pub end: f64,
    /// Suggested execution order (lower first).
    pub order: usize,
}

/// A reusable leftover rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Remnant {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// `width * height`.
    pub area: f64,
}

impl Remnant {
    /// Creates a remnant, computing its area.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            area: width * height,
        }
    }
}

/// Result of packing one sheet.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackingResult {
    /// Placed pieces.
    pub placed_cuts: Vec<PlacedCut>,

    /// Utilization percentage (0 - 100).
    /// Calculated as: placed area / sheet area * 100
    pub utilization: f64,

    /// Straight cuts to perform (pattern layouts only).
    pub cut_lines: Vec<CutLine>,

    /// Algorithm family of the winning layout.
    pub method: PackingMethod,

    /// Reusable leftovers, largest first.
    pub remnants: Vec<Remnant>,

    /// Number of unit pieces requested.
    pub requested: usize,

    /// Name of the winning strategy (packer, rules and sort order).
    pub strategy: Option<String>,

    /// Sort strategy of the winning layout, when one was used.
    pub sort_strategy: Option<SortStrategy>,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl PackingResult {
    /// Creates an empty result for `requested` pieces.
    pub fn empty(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    /// Returns the number of placed pieces.
    pub fn placed_count(&self) -> usize {
        self.placed_cuts.len()
    }

    /// Returns the number of requested pieces that were not placed.
    pub fn unplaced_count(&self) -> usize {
        self.requested.saturating_sub(self.placed_cuts.len())
    }

    /// Returns true if every requested piece was placed.
    pub fn is_complete(&self) -> bool {
        self.unplaced_count() == 0
    }

    /// Returns true if at least one piece was placed.
    pub fn is_successful(&self) -> bool {
        !self.placed_cuts.is_empty()
    }

    /// Returns utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.utilization)
    }

    /// Number of placed copies of the given cut.
    pub fn placed_of(&self, cut_id: &str) -> usize {
        self.placed_cuts
            .iter()
            .filter(|pc| pc.piece.original_id == cut_id)
            .count()
    }
}

/// Summary statistics for a packing result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackingSummary {
    /// Total pieces requested.
    pub total_requested: usize,
    /// Total pieces placed.
    pub total_placed: usize,
    /// Utilization percentage.
    pub utilization_percent: f64,
    /// Number of remnants.
    pub remnant_count: usize,
    /// Computation time in milliseconds.
    pub time_ms: u64,
    /// Strategy used.
    pub strategy: String,
}

impl From<&PackingResult> for PackingSummary {
    fn from(result: &PackingResult) -> Self {
        Self {
            total_requested: result.requested,
            total_placed: result.placed_cuts.len(),
            utilization_percent: result.utilization,
            remnant_count: result.remnants.len(),
            time_ms: result.computation_time_ms,
            strategy: result
                .strategy
                .clone()
                .unwrap_or_else(|| result.method.name().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::Cut;

    fn placed(n: usize) -> Vec<PlacedCut> {
        Cut::new("A", 10.0, 10.0)
            .with_quantity(n)
            .pieces()
            .map(|p| PlacedCut::new(p, 0.0, 0.0, false))
            .collect()
    }

    #[test]
    fn test_empty_result() {
        let result = PackingResult::empty(3);
        assert_eq!(result.placed_count(), 0);
        assert_eq!(result.unplaced_count(), 3);
        assert!(!result.is_complete());
        assert!(!result.is_successful());
        assert_eq!(result.method, PackingMethod::None);
    }

    #[test]
    fn test_partial_result() {
        let mut result = PackingResult::empty(2);
        result.placed_cuts = placed(1);
        result.utilization = 64.0;
        assert_eq!(result.unplaced_count(), 1);
        assert!(result.is_successful());
        assert_eq!(result.utilization_percent(), "64.0%");
        assert_eq!(result.placed_of("A"), 1);
    }

    #[test]
    fn test_summary() {
        let mut result = PackingResult::empty(2);
        result.placed_cuts = placed(2);
        result.utilization = 75.0;
        result.method = PackingMethod::Skyline;

        let summary = PackingSummary::from(&result);
        assert_eq!(summary.total_placed, 2);
        assert_eq!(summary.utilization_percent, 75.0);
        assert_eq!(summary.strategy, "Skyline");
    }
}
