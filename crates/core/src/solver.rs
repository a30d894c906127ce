//! Packer trait and search configuration.

use crate::cut::Piece;
use crate::placement::PlacedCut;
use crate::sheet::Sheet;
use crate::sorting::SortStrategy;
use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest side length a leftover must have to be reported as a remnant.
pub const MIN_REMNANT_SIZE: f64 = 10.0;

/// A single-sheet packer.
///
/// Packers place pieces greedily in the order given. A piece that fits
/// nowhere is left out and packing continues with the next one.
/// Implementations must be pure so that candidates can be evaluated
/// concurrently.
pub trait Packer: Send + Sync {
    /// Short name including the rule parameters, e.g. `MaxRects (BestShortSideFit)`.
    fn name(&self) -> String;

    /// Packs `pieces` onto `sheet`.
    ///
    /// Returns `Error::Internal` if the packer's working state becomes
    /// malformed.
    fn pack(&self, pieces: &[Piece], sheet: &Sheet) -> Result<Vec<PlacedCut>>;
}

/// Algorithm used to decompose leftover space into remnants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RemnantScan {
    /// Row-major greedy growth from the first free cell.
    #[default]
    Greedy,
    /// Repeated extraction of the largest free rectangle.
    Histogram,
}

/// Configuration of the multi-strategy search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Piece orderings to try, in enumeration order.
    pub sort_strategies: Vec<SortStrategy>,

    /// Whether to include the Guillotine packer variants.
    pub include_guillotine: bool,

    /// Whether to include the MaxRects packer variants.
    pub include_maxrects: bool,

    /// Whether to include the Skyline packer variants.
    pub include_skyline: bool,

    /// Evaluate candidates on the rayon thread pool.
    pub parallel: bool,

    /// Maximum search time in milliseconds (0 = unlimited).
    ///
    /// Candidates not started before the deadline are skipped, which makes the
    /// result depend on machine speed. The first candidate always runs.
    pub time_limit_ms: u64,

    /// Remnant decomposition algorithm.
    pub remnant_scan: RemnantScan,

    /// Minimum remnant side length (never below [`MIN_REMNANT_SIZE`]).
    pub min_remnant_size: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sort_strategies: SortStrategy::ALL.to_vec(),
            include_guillotine: true,
            include_maxrects: true,
            include_skyline: true,
            parallel: true,
            time_limit_ms: 0,
            remnant_scan: RemnantScan::default(),
            min_remnant_size: MIN_REMNANT_SIZE,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the piece orderings to try.
    pub fn with_sort_strategies(mut self, strategies: Vec<SortStrategy>) -> Self {
        self.sort_strategies = strategies;
        self
    }

    /// Enables or disables the Guillotine variants.
    pub fn with_guillotine(mut self, enabled: bool) -> Self {
        self.include_guillotine = enabled;
        self
    }

    /// Enables or disables the MaxRects variants.
    pub fn with_maxrects(mut self, enabled: bool) -> Self {
        self.include_maxrects = enabled;
        self
    }

    /// Enables or disables the Skyline variants.
    pub fn with_skyline(mut self, enabled: bool) -> Self {
        self.include_skyline = enabled;
        self
    }

    /// Enables or disables parallel candidate evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the time limit in milliseconds.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the remnant decomposition algorithm.
    pub fn with_remnant_scan(mut self, scan: RemnantScan) -> Self {
        self.remnant_scan = scan;
        self
    }

    /// Sets the minimum remnant side length.
    pub fn with_min_remnant_size(mut self, size: f64) -> Self {
        self.min_remnant_size = size.max(MIN_REMNANT_SIZE);
        self
    }

    /// Returns true if the configuration can produce at least one candidate.
    pub fn has_candidates(&self) -> bool {
        !self.sort_strategies.is_empty()
            && (self.include_guillotine || self.include_maxrects || self.include_skyline)
    }
}
