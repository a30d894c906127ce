//! Stock selection for an order.
//!
//! Several fulfilment strategies are tried independently against the
//! matching inventory. Each strategy that covers the whole cut list becomes a
//! suggestion; suggestions are then ranked so that reusing remnants comes
//! first unless it costs noticeably more material.

use crate::material::{MaterialSheet, MaterialType};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use u_cutstock_core::{
    total_quantity, validate_cuts, Config, Cut, CuttingMethod, Error, PlacedCut, Remnant, Result,
};
use u_cutstock_sheet::pack_with_config;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration of the suggestion engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuggestionConfig {
    /// Maximum number of suggestions returned.
    pub max_suggestions: usize,

    /// Allowed thickness deviation in millimetres (exclusive).
    pub thickness_tolerance: f64,

    /// Utilization difference, in percentage points, within which two
    /// suggestions are ranked by cost instead.
    pub utilization_tie_band: f64,

    /// Maximum number of full sheets in a multi-sheet plan.
    pub max_full_sheets: usize,

    /// Configuration of the per-sheet packing.
    pub packing: Config,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 5,
            thickness_tolerance: 0.5,
            utilization_tie_band: 5.0,
            max_full_sheets: 3,
            packing: Config::default(),
        }
    }
}

impl SuggestionConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of suggestions.
    pub fn with_max_suggestions(mut self, n: usize) -> Self {
        self.max_suggestions = n;
        self
    }

    /// Sets the thickness tolerance.
    pub fn with_thickness_tolerance(mut self, tolerance: f64) -> Self {
        self.thickness_tolerance = tolerance;
        self
    }

    /// Sets the utilization tie band.
    pub fn with_utilization_tie_band(mut self, band: f64) -> Self {
        self.utilization_tie_band = band;
        self
    }

    /// Sets the maximum number of full sheets per plan.
    pub fn with_max_full_sheets(mut self, n: usize) -> Self {
        self.max_full_sheets = n;
        self
    }

    /// Sets the packing configuration.
    pub fn with_packing(mut self, packing: Config) -> Self {
        self.packing = packing;
        self
    }
}

/// How a suggestion sources its sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SuggestionStrategy {
    /// Remnants only, largest first.
    RemnantsOnly,
    /// The smallest full sheet that holds the whole order.
    SingleFullSheet,
    /// Remnants first, one full sheet for the rest.
    RemnantsThenFullSheet,
    /// Several full sheets, smallest first.
    MultipleFullSheets,
}

impl SuggestionStrategy {
    /// All strategies in generation order.
    pub const ALL: [SuggestionStrategy; 4] = [
        SuggestionStrategy::RemnantsOnly,
        SuggestionStrategy::SingleFullSheet,
        SuggestionStrategy::RemnantsThenFullSheet,
        SuggestionStrategy::MultipleFullSheets,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            SuggestionStrategy::RemnantsOnly => "Remnants only",
            SuggestionStrategy::SingleFullSheet => "Single full sheet",
            SuggestionStrategy::RemnantsThenFullSheet => "Remnants + full sheet",
            SuggestionStrategy::MultipleFullSheets => "Multiple full sheets",
        }
    }
}

/// One sheet of a suggestion with its layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SheetUsage {
    /// Inventory id of the sheet.
    pub sheet_id: String,
    /// The inventory sheet as it was when planned.
    pub sheet: MaterialSheet,
    /// Layout on this sheet.
    pub placed_cuts: Vec<PlacedCut>,
    /// Utilization percentage of this sheet.
    pub utilization: f64,
    /// Sheet area not covered by pieces.
    pub waste_area: f64,
    /// Leftovers of the layout.
    pub remnants: Vec<Remnant>,
}

/// A candidate fulfilment plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizationSuggestion {
    /// 1-based position in generation order.
    pub suggestion_number: usize,
    /// Strategy that produced the plan.
    pub strategy: SuggestionStrategy,
    /// Sheet ids in cutting order.
    pub sheets_used: Vec<String>,
    /// Per-sheet layouts, parallel to `sheets_used`.
    pub sheet_details: Vec<SheetUsage>,
    /// Utilization over all sheets, percentage.
    pub total_utilization: f64,
    /// Summed waste area.
    pub total_waste: f64,
    /// Summed sheet cost.
    pub total_cost: f64,
    /// True if at least one sheet is a remnant.
    pub uses_remnants: bool,
    /// Leftovers of every sheet in the plan.
    pub estimated_remnants: Vec<Remnant>,
}

/// Ranked suggestions.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuggestionResult {
    /// Suggestions, best first.
    pub suggestions: Vec<OptimizationSuggestion>,
    /// The default selection, equal to `suggestions[0]`.
    pub best_suggestion: Option<OptimizationSuggestion>,
}

/// An order to source from inventory.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionRequest<'a> {
    /// Cut list of the order.
    pub cuts: &'a [Cut],
    /// Whole inventory; non-matching sheets are ignored.
    pub available_sheets: &'a [MaterialSheet],
    /// Required material.
    pub material_type: MaterialType,
    /// Required thickness in millimetres.
    pub thickness: f64,
    /// Blade width used on every sheet.
    pub kerf: f64,
    /// How the sheets will be cut.
    pub cutting_method: CuttingMethod,
}

/// Material suggestion engine.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    config: SuggestionConfig,
}

impl SuggestionEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: SuggestionConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Generates and ranks suggestions for `request`.
    ///
    /// An order no strategy can fulfil yields an empty result.
    pub fn suggest(&self, request: &SuggestionRequest<'_>) -> Result<SuggestionResult> {
        let start = Instant::now();
        validate_cuts(request.cuts)?;
        if !(request.kerf.is_finite() && request.kerf >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "kerf must be zero or positive, got {}",
                request.kerf
            )));
        }
        if !(request.thickness.is_finite() && request.thickness > 0.0) {
            return Err(Error::InvalidInput(format!(
                "thickness must be a positive number, got {}",
                request.thickness
            )));
        }
        if total_quantity(request.cuts) == 0 {
            return Ok(SuggestionResult::default());
        }

        let stock: Vec<&MaterialSheet> = request
            .available_sheets
            .iter()
            .filter(|s| {
                s.matches(
                    request.material_type,
                    request.thickness,
                    self.config.thickness_tolerance,
                )
            })
            .collect();
        for sheet in &stock {
            sheet.validate()?;
        }

        // Remnants largest first, full sheets smallest first. Both sorts are
        // stable, so inventory order breaks ties.
        let mut remnants: Vec<&MaterialSheet> =
            stock.iter().copied().filter(|s| s.is_remnant()).collect();
        remnants.sort_by(|a, b| b.area().total_cmp(&a.area()));
        let mut full_sheets: Vec<&MaterialSheet> =
            stock.iter().copied().filter(|s| !s.is_remnant()).collect();
        full_sheets.sort_by(|a, b| a.area().total_cmp(&b.area()));

        let planner = Planner {
            request,
            packing: &self.config.packing,
            max_full_sheets: self.config.max_full_sheets,
            remnants: &remnants,
            full_sheets: &full_sheets,
        };

        let plans: Vec<Result<Option<Vec<SheetUsage>>>> = SuggestionStrategy::ALL
            .par_iter()
            .map(|&strategy| planner.run(strategy))
            .collect();

        let mut suggestions = Vec::new();
        for (strategy, plan) in SuggestionStrategy::ALL.into_iter().zip(plans) {
            if let Some(usages) = plan? {
                suggestions.push(build_suggestion(suggestions.len() + 1, strategy, usages));
            }
        }

        let mut ranked = rank_suggestions(suggestions, self.config.utilization_tie_band);
        ranked.truncate(self.config.max_suggestions);

        log::info!(
            "{} suggestion(s) from {} matching sheet(s) ({} remnants) in {} ms",
            ranked.len(),
            stock.len(),
            remnants.len(),
            start.elapsed().as_millis()
        );

        Ok(SuggestionResult {
            best_suggestion: ranked.first().cloned(),
            suggestions: ranked,
        })
    }
}

/// Generates ranked suggestions with the default configuration and the given
/// suggestion limit.
pub fn generate_material_suggestions(
    cuts: &[Cut],
    available_sheets: &[MaterialSheet],
    material_type: MaterialType,
    thickness: f64,
    kerf: f64,
    cutting_method: CuttingMethod,
    max_suggestions: usize,
) -> Result<SuggestionResult> {
    let engine =
        SuggestionEngine::new(SuggestionConfig::default().with_max_suggestions(max_suggestions));
    engine.suggest(&SuggestionRequest {
        cuts,
        available_sheets,
        material_type,
        thickness,
        kerf,
        cutting_method,
    })
}

/// Shared inputs of the fulfilment strategies.
struct Planner<'a> {
    request: &'a SuggestionRequest<'a>,
    packing: &'a Config,
    max_full_sheets: usize,
    remnants: &'a [&'a MaterialSheet],
    full_sheets: &'a [&'a MaterialSheet],
}

impl Planner<'_> {
    fn run(&self, strategy: SuggestionStrategy) -> Result<Option<Vec<SheetUsage>>> {
        match strategy {
            SuggestionStrategy::RemnantsOnly => self.remnants_only(),
            SuggestionStrategy::SingleFullSheet => self.single_full_sheet(),
            SuggestionStrategy::RemnantsThenFullSheet => self.remnants_then_full_sheet(),
            SuggestionStrategy::MultipleFullSheets => self.multiple_full_sheets(),
        }
    }

    /// Packs as much of `demand` as fits onto `stock`.
    fn pack(&self, demand: &[Cut], stock: &MaterialSheet) -> Result<SheetUsage> {
        let sheet = stock.to_sheet(self.request.kerf, self.request.cutting_method);
        let result = pack_with_config(demand, &sheet, self.packing)?;
        Ok(SheetUsage {
            sheet_id: stock.id.clone(),
            sheet: stock.clone(),
            waste_area: stock.area() * (1.0 - result.utilization / 100.0),
            utilization: result.utilization,
            placed_cuts: result.placed_cuts,
            remnants: result.remnants,
        })
    }

    /// Fills remnants largest first until the demand is met or remnants run
    /// out. Returns the sheets used and the unmet demand.
    fn fill_remnants(&self) -> Result<(Vec<SheetUsage>, Vec<Cut>)> {
        let mut demand = self.request.cuts.to_vec();
        let mut usages = Vec::new();
        for &remnant in self.remnants {
            if demand.is_empty() {
                break;
            }
            let usage = self.pack(&demand, remnant)?;
            if !usage.placed_cuts.is_empty() {
                demand = remaining_demand(&demand, &usage.placed_cuts);
                usages.push(usage);
            }
        }
        Ok((usages, demand))
    }

    /// The smallest full sheet that holds all of `demand`.
    fn smallest_complete(&self, demand: &[Cut]) -> Result<Option<SheetUsage>> {
        let needed = total_quantity(demand);
        for &sheet in self.full_sheets {
            let usage = self.pack(demand, sheet)?;
            if usage.placed_cuts.len() == needed {
                return Ok(Some(usage));
            }
        }
        Ok(None)
    }

    fn remnants_only(&self) -> Result<Option<Vec<SheetUsage>>> {
        if self.remnants.is_empty() {
            return Ok(None);
        }
        let (usages, demand) = self.fill_remnants()?;
        Ok(demand.is_empty().then_some(usages))
    }

    fn single_full_sheet(&self) -> Result<Option<Vec<SheetUsage>>> {
        Ok(self.smallest_complete(self.request.cuts)?.map(|u| vec![u]))
    }

    fn remnants_then_full_sheet(&self) -> Result<Option<Vec<SheetUsage>>> {
        if self.remnants.is_empty() || self.full_sheets.is_empty() {
            return Ok(None);
        }
        let (mut usages, demand) = self.fill_remnants()?;
        // Covered by the other strategies.
        if usages.is_empty() || demand.is_empty() {
            return Ok(None);
        }
        Ok(self.smallest_complete(&demand)?.map(|usage| {
            usages.push(usage);
            usages
        }))
    }

    fn multiple_full_sheets(&self) -> Result<Option<Vec<SheetUsage>>> {
        let mut demand = self.request.cuts.to_vec();
        let mut usages = Vec::new();
        for &sheet in self.full_sheets {
            if demand.is_empty() || usages.len() >= self.max_full_sheets {
                break;
            }
            let usage = self.pack(&demand, sheet)?;
            if !usage.placed_cuts.is_empty() {
                demand = remaining_demand(&demand, &usage.placed_cuts);
                usages.push(usage);
            }
        }
        Ok((demand.is_empty() && !usages.is_empty()).then_some(usages))
    }
}

/// Demand left after `placed` was cut, by original cut id. Cuts that are
/// fully covered are dropped.
fn remaining_demand(demand: &[Cut], placed: &[PlacedCut]) -> Vec<Cut> {
    let mut placed_per_cut: HashMap<&str, usize> = HashMap::new();
    for pc in placed {
        *placed_per_cut.entry(pc.piece.original_id.as_str()).or_default() += 1;
    }

    demand
        .iter()
        .filter_map(|cut| {
            let done = placed_per_cut.get(cut.id.as_str()).copied().unwrap_or(0);
            let left = cut.quantity.saturating_sub(done);
            (left > 0).then(|| cut.clone().with_quantity(left))
        })
        .collect()
}

fn build_suggestion(
    suggestion_number: usize,
    strategy: SuggestionStrategy,
    usages: Vec<SheetUsage>,
) -> OptimizationSuggestion {
    let total_area: f64 = usages.iter().map(|u| u.sheet.area()).sum();
    let total_waste: f64 = usages.iter().map(|u| u.waste_area).sum();
    let total_cost: f64 = usages.iter().map(|u| u.sheet.cost).sum();
    let total_utilization = if total_area > 0.0 {
        (total_area - total_waste) / total_area * 100.0
    } else {
        0.0
    };

    OptimizationSuggestion {
        suggestion_number,
        strategy,
        sheets_used: usages.iter().map(|u| u.sheet_id.clone()).collect(),
        uses_remnants: usages.iter().any(|u| u.sheet.is_remnant()),
        estimated_remnants: usages.iter().flat_map(|u| u.remnants.iter().copied()).collect(),
        sheet_details: usages,
        total_utilization,
        total_waste,
        total_cost,
    }
}

/// Returns true if `a` should be listed before `b`.
fn ranks_before(a: &OptimizationSuggestion, b: &OptimizationSuggestion, tie_band: f64) -> bool {
    if a.uses_remnants != b.uses_remnants {
        return a.uses_remnants;
    }
    let diff = a.total_utilization - b.total_utilization;
    if diff.abs() > tie_band {
        return diff > 0.0;
    }
    a.total_cost < b.total_cost
}

/// Stable insertion ranking.
///
/// The tie band makes the ordering non-transitive, which the standard sorts
/// do not accept, so each suggestion is inserted before the first one it
/// ranks ahead of.
fn rank_suggestions(
    suggestions: Vec<OptimizationSuggestion>,
    tie_band: f64,
) -> Vec<OptimizationSuggestion> {
    let mut ranked: Vec<OptimizationSuggestion> = Vec::with_capacity(suggestions.len());
    for s in suggestions {
        let pos = ranked
            .iter()
            .position(|r| ranks_before(&s, r, tie_band))
            .unwrap_or(ranked.len());
        ranked.insert(pos, s);
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::SheetOrigin;

    fn suggestion(n: usize, remnants: bool, utilization: f64, cost: f64) -> OptimizationSuggestion {
        OptimizationSuggestion {
            suggestion_number: n,
            strategy: SuggestionStrategy::SingleFullSheet,
            sheets_used: Vec::new(),
            sheet_details: Vec::new(),
            total_utilization: utilization,
            total_waste: 0.0,
            total_cost: cost,
            uses_remnants: remnants,
            estimated_remnants: Vec::new(),
        }
    }

    fn numbers(ranked: &[OptimizationSuggestion]) -> Vec<usize> {
        ranked.iter().map(|s| s.suggestion_number).collect()
    }

    #[test]
    fn test_remnants_rank_first() {
        let ranked = rank_suggestions(
            vec![suggestion(1, false, 90.0, 10.0), suggestion(2, true, 40.0, 0.0)],
            5.0,
        );
        assert_eq!(numbers(&ranked), [2, 1]);
    }

    #[test]
    fn test_utilization_outside_band() {
        let ranked = rank_suggestions(
            vec![suggestion(1, false, 60.0, 1.0), suggestion(2, false, 80.0, 50.0)],
            5.0,
        );
        assert_eq!(numbers(&ranked), [2, 1]);
    }

    #[test]
    fn test_cost_inside_band() {
        let ranked = rank_suggestions(
            vec![suggestion(1, false, 80.0, 50.0), suggestion(2, false, 77.0, 20.0)],
            5.0,
        );
        assert_eq!(numbers(&ranked), [2, 1]);
    }

    #[test]
    fn test_tie_band_is_configurable() {
        let candidates = || {
            vec![suggestion(1, false, 80.0, 50.0), suggestion(2, false, 60.0, 10.0)]
        };
        assert_eq!(numbers(&rank_suggestions(candidates(), 5.0)), [1, 2]);
        assert_eq!(numbers(&rank_suggestions(candidates(), 30.0)), [2, 1]);
    }

    #[test]
    fn test_ties_keep_generation_order() {
        let ranked = rank_suggestions(
            vec![suggestion(1, false, 70.0, 10.0), suggestion(2, false, 70.0, 10.0)],
            5.0,
        );
        assert_eq!(numbers(&ranked), [1, 2]);
    }

    #[test]
    fn test_remaining_demand_by_cut_id() {
        let demand = vec![
            Cut::new("A", 10.0, 10.0).with_quantity(3),
            Cut::new("B", 20.0, 20.0).with_quantity(1),
        ];
        let placed: Vec<PlacedCut> = demand[0]
            .pieces()
            .take(2)
            .chain(demand[1].pieces())
            .map(|p| PlacedCut::new(p, 0.0, 0.0, false))
            .collect();

        let left = remaining_demand(&demand, &placed);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, "A");
        assert_eq!(left[0].quantity, 1);
    }

    #[test]
    fn test_build_suggestion_totals() {
        let remnant = MaterialSheet::new("R", MaterialType::Glass, 4.0, 100.0, 100.0)
            .with_origin(SheetOrigin::Remnant);
        let full = MaterialSheet::new("F", MaterialType::Glass, 4.0, 200.0, 100.0).with_cost(30.0);
        let usage = |sheet: &MaterialSheet, utilization: f64| SheetUsage {
            sheet_id: sheet.id.clone(),
            sheet: sheet.clone(),
            placed_cuts: Vec::new(),
            utilization,
            waste_area: sheet.area() * (1.0 - utilization / 100.0),
            remnants: Vec::new(),
        };

        let s = build_suggestion(
            3,
            SuggestionStrategy::RemnantsThenFullSheet,
            vec![usage(&remnant, 50.0), usage(&full, 25.0)],
        );
        assert_eq!(s.sheets_used, ["R", "F"]);
        assert!(s.uses_remnants);
        assert_eq!(s.total_cost, 30.0);
        assert!((s.total_waste - 20000.0).abs() < 1e-9);
        // (30000 - 20000) / 30000
        assert!((s.total_utilization - 100.0 / 3.0).abs() < 1e-9);
    }
}
