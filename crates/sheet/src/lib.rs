//! # U-Cutstock Sheet
//!
//! Single-sheet rectangle packing for the U-Cutstock cutting optimizer.
//!
//! Given a cut list and one stock sheet, this crate finds a layout that wastes
//! as little material as possible while honouring the kerf, per-cut rotation
//! and the cutting method.
//!
//! ## Features
//!
//! - Guillotine, MaxRects and Skyline packers with their classic rule sets
//! - Multi-strategy search over sort orders and rule variants (rayon)
//! - Grid-first pattern packing for hand-snapped manual cutting
//! - Remnant extraction from the leftover space
//! - Minimum safe cut dimensions by glass thickness
//!
//! ## Quick Start
//!
//! ```rust
//! use u_cutstock_sheet::{pack, Cut, Sheet};
//!
//! let cuts = vec![Cut::new("door", 50.0, 30.0).with_quantity(8)];
//! let sheet = Sheet::new(200.0, 300.0).with_kerf(0.3);
//!
//! let result = pack(&cuts, &sheet).unwrap();
//! assert!(result.is_complete());
//! println!(
//!     "placed {} pieces, utilization {}",
//!     result.placed_count(),
//!     result.utilization_percent()
//! );
//! ```
//!
//! ## Manual Cutting
//!
//! ```rust
//! use u_cutstock_sheet::{pack, Cut, CuttingMethod, PackingMethod, Sheet};
//!
//! let cuts = vec![
//!     Cut::new("panel", 60.0, 60.0),
//!     Cut::new("tile", 30.0, 30.0).with_quantity(4),
//! ];
//! let sheet = Sheet::new(100.0, 100.0).with_cutting_method(CuttingMethod::Manual);
//!
//! let result = pack(&cuts, &sheet).unwrap();
//! assert_eq!(result.method, PackingMethod::HybridPattern);
//! ```

pub mod guillotine;
pub mod maxrects;
pub mod optimizer;
pub mod pattern;
pub mod remnants;
pub mod skyline;
pub mod validation;

pub use guillotine::{
    is_guillotine_cuttable, GuillotineFitRule, GuillotinePacker, GuillotineSplitRule,
};
pub use maxrects::{MaxRectsFitRule, MaxRectsPacker};
pub use optimizer::{pack_leftover, Optimizer, PackerVariant, StrategyOutcome};
pub use pattern::{explore_patterns, grid_cut_lines, leftover_strips, GridPattern, PatternPacker};
pub use remnants::{calculate_remnants, calculate_remnants_with};
pub use skyline::{SkylineFitRule, SkylinePacker};
pub use validation::{
    method_recommendation, minimum_dimension, standard_thicknesses, validate_cut_dimensions,
    validate_cut_list, CutValidation, MethodRecommendation, ValidationStatus,
};

// Re-export core types
pub use u_cutstock_core::{
    Config, Cut, CutLine, CutOrientation, CuttingMethod, Error, PackingMethod, PackingResult,
    PackingSummary, Packer, Piece, PlacedCut, Remnant, RemnantScan, Result, Sheet, SortStrategy,
};

use std::time::Instant;

/// Packs `cuts` onto `sheet` with the default configuration.
///
/// Manual sheets use the pattern packer, machine sheets the multi-strategy
/// optimizer. The result carries the remnants of the layout.
pub fn pack(cuts: &[Cut], sheet: &Sheet) -> Result<PackingResult> {
    pack_with_config(cuts, sheet, &Config::default())
}

/// Packs `cuts` onto `sheet` with an explicit configuration.
///
/// Malformed input fails with an error before any packing. A layout that
/// leaves pieces out is returned normally; check
/// [`PackingResult::is_complete`].
pub fn pack_with_config(cuts: &[Cut], sheet: &Sheet, config: &Config) -> Result<PackingResult> {
    let start = Instant::now();
    sheet.validate()?;
    u_cutstock_core::validate_cuts(cuts)?;

    let mut result = match sheet.cutting_method {
        CuttingMethod::Manual => PatternPacker::new(config.clone()).pack(cuts, sheet)?,
        CuttingMethod::Machine => Optimizer::new(config.clone()).best(cuts, sheet)?,
    };

    result.remnants = calculate_remnants_with(
        &result.placed_cuts,
        sheet,
        config.remnant_scan,
        config.min_remnant_size,
    )?;
    result.computation_time_ms = start.elapsed().as_millis() as u64;

    log::debug!(
        "packed {}/{} pieces on {}x{} ({}), {:.2}% in {} ms",
        result.placed_count(),
        result.requested,
        sheet.width,
        sheet.height,
        result.method.name(),
        result.utilization,
        result.computation_time_ms
    );
    Ok(result)
}
