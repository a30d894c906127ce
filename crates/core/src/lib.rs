//! # U-Cutstock Core
//!
//! Core types and traits for the U-Cutstock sheet cutting optimizer.
//!
//! This crate provides the data model shared by the single-sheet packers
//! (`u-cutstock-sheet`) and the inventory stock selection
//! (`u-cutstock-inventory`).
//!
//! ## Core Components
//!
//! - **Cut list**: [`Cut`] requests expand into unit [`Piece`]s
//! - **Stock**: [`Sheet`] with kerf and [`CuttingMethod`]
//! - **Layouts**: [`PlacedCut`], [`PackingResult`], [`CutLine`], [`Remnant`]
//! - **Geometry**: [`Rect`] and free-list pruning
//! - **Search**: [`Packer`] trait, [`SortStrategy`] and [`Config`]
//!
//! ## Configuration
//!
//! ```rust
//! use u_cutstock_core::{Config, SortStrategy};
//!
//! let config = Config::new()
//!     .with_sort_strategies(vec![SortStrategy::Area, SortStrategy::LongSide])
//!     .with_parallel(false)
//!     .with_time_limit(2000);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod cut;
pub mod error;
pub mod geometry;
pub mod placement;
pub mod result;
pub mod sheet;
pub mod solver;
pub mod sorting;

// Re-exports
pub use cut::{expand_cuts, total_quantity, validate_cuts, Cut, CutId, Piece};
pub use error::{Error, Result};
pub use geometry::{prune_contained, Rect, EPSILON};
pub use placement::{placed_area, utilization_percent, PlacedCut};
pub use result::{CutLine, CutOrientation, PackingMethod, PackingResult, PackingSummary, Remnant};
pub use sheet::{CuttingMethod, Sheet};
pub use solver::{Config, Packer, RemnantScan, MIN_REMNANT_SIZE};
pub use sorting::{sort_pieces, SortStrategy};
