//! # U-Cutstock Inventory
//!
//! Chooses which stock sheets to cut an order from.
//!
//! Inventory holds purchased full sheets and remnants left over from earlier
//! jobs. For an order of cuts in one material and thickness the suggestion
//! engine tries several sourcing strategies, packs each sheet with
//! `u-cutstock-sheet`, and ranks the plans so that remnants are reused
//! whenever that does not waste noticeably more material.
//!
//! ## Example
//!
//! ```rust
//! use u_cutstock_core::{Cut, CuttingMethod};
//! use u_cutstock_inventory::{
//!     generate_material_suggestions, MaterialSheet, MaterialType, SheetOrigin,
//! };
//!
//! let stock = vec![
//!     MaterialSheet::new("R1", MaterialType::Glass, 4.0, 120.0, 80.0)
//!         .with_origin(SheetOrigin::Remnant),
//!     MaterialSheet::new("F1", MaterialType::Glass, 4.0, 600.0, 400.0).with_cost(50.0),
//! ];
//! let cuts = vec![Cut::new("shelf", 50.0, 30.0).with_quantity(4)];
//!
//! let result = generate_material_suggestions(
//!     &cuts,
//!     &stock,
//!     MaterialType::Glass,
//!     4.0,
//!     0.3,
//!     CuttingMethod::Machine,
//!     5,
//! )
//! .unwrap();
//!
//! let best = result.best_suggestion.unwrap();
//! assert!(best.uses_remnants);
//! assert_eq!(best.sheets_used, ["R1"]);
//! ```

pub mod material;
pub mod suggestion;

pub use material::{
    derive_remnant_sheets, MaterialSheet, MaterialType, SheetOrigin, SheetStatus,
    DEFAULT_REMNANT_MIN_SIDE,
};
pub use suggestion::{
    generate_material_suggestions, OptimizationSuggestion, SheetUsage, SuggestionConfig,
    SuggestionEngine, SuggestionRequest, SuggestionResult, SuggestionStrategy,
};
