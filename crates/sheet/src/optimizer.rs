//! Multi-strategy search over sort orders and packer variants.

use crate::guillotine::{GuillotineFitRule, GuillotinePacker, GuillotineSplitRule};
use crate::maxrects::{MaxRectsFitRule, MaxRectsPacker};
use crate::skyline::{SkylineFitRule, SkylinePacker};
use rayon::prelude::*;
use std::time::{Duration, Instant};
use u_cutstock_core::{
    expand_cuts, placed_area, sort_pieces, utilization_percent, Config, Cut, PackingMethod,
    Error, PackingResult, Packer, Piece, PlacedCut, Result, Sheet, SortStrategy,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A packer algorithm together with its rule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PackerVariant {
    /// Guillotine packer.
    Guillotine(GuillotineSplitRule, GuillotineFitRule),
    /// MaxRects packer.
    MaxRects(MaxRectsFitRule),
    /// Skyline packer.
    Skyline(SkylineFitRule),
}

impl PackerVariant {
    /// Instantiates the packer.
    pub fn packer(&self) -> Box<dyn Packer> {
        match *self {
            Self::Guillotine(split, fit) => Box::new(GuillotinePacker::new(split, fit)),
            Self::MaxRects(fit) => Box::new(MaxRectsPacker::new(fit)),
            Self::Skyline(fit) => Box::new(SkylinePacker::new(fit)),
        }
    }

    /// Packing method family.
    pub fn method(&self) -> PackingMethod {
        match self {
            Self::Guillotine(..) => PackingMethod::Guillotine,
            Self::MaxRects(_) => PackingMethod::MaxRects,
            Self::Skyline(_) => PackingMethod::Skyline,
        }
    }

    /// Variants tried for each sort order, in enumeration order: every
    /// Guillotine split and fit pair, then the MaxRects and Skyline rules.
    pub fn search_set(config: &Config) -> Vec<PackerVariant> {
        let mut variants = Vec::new();
        if config.include_guillotine {
            for split in GuillotineSplitRule::ALL {
                for fit in GuillotineFitRule::ALL {
                    variants.push(Self::Guillotine(split, fit));
                }
            }
        }
        if config.include_maxrects {
            variants.extend(MaxRectsFitRule::ALL.map(Self::MaxRects));
        }
        if config.include_skyline {
            variants.extend(SkylineFitRule::ALL.map(Self::Skyline));
        }
        variants
    }

    /// Variants used to fill the leftover strips of a pattern layout.
    pub fn leftover_set() -> Vec<PackerVariant> {
        vec![
            Self::MaxRects(MaxRectsFitRule::BestShortSideFit),
            Self::MaxRects(MaxRectsFitRule::BestAreaFit),
            Self::Skyline(SkylineFitRule::MinWaste),
            Self::Guillotine(GuillotineSplitRule::MinimizeArea, GuillotineFitRule::BestAreaFit),
        ]
    }
}

/// One evaluated (sort order, packer variant) combination.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrategyOutcome {
    /// Human-readable name, e.g. `MaxRects (BestAreaFit) + ByArea`.
    pub name: String,
    /// Packer variant.
    pub variant: PackerVariant,
    /// Piece ordering.
    pub sort_strategy: SortStrategy,
    /// Utilization percentage.
    pub utilization: f64,
    /// Placements.
    pub placed_cuts: Vec<PlacedCut>,
}

impl StrategyOutcome {
    /// Number of placed pieces.
    pub fn placed_count(&self) -> usize {
        self.placed_cuts.len()
    }

    /// Packing method family.
    pub fn method(&self) -> PackingMethod {
        self.variant.method()
    }

    /// Converts the outcome into a result for `requested` pieces.
    pub fn into_result(self, requested: usize) -> PackingResult {
        PackingResult {
            method: self.variant.method(),
            utilization: self.utilization,
            strategy: Some(self.name),
            sort_strategy: Some(self.sort_strategy),
            placed_cuts: self.placed_cuts,
            requested,
            ..PackingResult::default()
        }
    }
}

/// Wall-clock budget of a search, started when created.
///
/// The first candidate always runs; later ones are skipped once the budget
/// is spent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// Budget of `time_limit_ms` from now; zero means unlimited.
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            at: (config.time_limit_ms > 0)
                .then(|| Instant::now() + Duration::from_millis(config.time_limit_ms)),
        }
    }

    /// Returns true if candidate `index` may still start.
    pub(crate) fn allows(&self, index: usize) -> bool {
        index == 0 || self.at.map_or(true, |at| Instant::now() < at)
    }
}

/// Multi-strategy optimizer for a single sheet.
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    config: Config,
}

impl Optimizer {
    /// Creates an optimizer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every candidate and returns the ranked catalogue.
    ///
    /// Complete candidates come first by utilization; if none is complete the
    /// catalogue holds the partial ones by placed count, then utilization.
    /// Candidates placing nothing or failing internally are left out.
    pub fn optimize(&self, cuts: &[Cut], sheet: &Sheet) -> Result<Vec<StrategyOutcome>> {
        self.check_config()?;
        sheet.validate()?;
        let pieces = expand_cuts(cuts)?;
        Ok(self.rank(&pieces, sheet))
    }

    /// Runs the search and returns the best candidate as a result.
    pub fn best(&self, cuts: &[Cut], sheet: &Sheet) -> Result<PackingResult> {
        self.check_config()?;
        sheet.validate()?;
        let pieces = expand_cuts(cuts)?;
        Ok(self.best_for_pieces(&pieces, sheet))
    }

    fn check_config(&self) -> Result<()> {
        if self.config.has_candidates() {
            Ok(())
        } else {
            Err(Error::InvalidInput(
                "configuration enables no packer family or sort strategy".into(),
            ))
        }
    }

    /// Like [`Optimizer::best`] for already expanded pieces.
    pub fn best_for_pieces(&self, pieces: &[Piece], sheet: &Sheet) -> PackingResult {
        let start = Instant::now();
        let mut result = self
            .rank(pieces, sheet)
            .into_iter()
            .next()
            .map(|outcome| outcome.into_result(pieces.len()))
            .unwrap_or_else(|| PackingResult::empty(pieces.len()));
        result.computation_time_ms = start.elapsed().as_millis() as u64;

        if !result.is_complete() {
            log::warn!(
                "partial plan: placed {} of {} pieces on {}x{} sheet",
                result.placed_count(),
                result.requested,
                sheet.width,
                sheet.height
            );
        }
        result
    }

    fn rank(&self, pieces: &[Piece], sheet: &Sheet) -> Vec<StrategyOutcome> {
        let candidates: Vec<(SortStrategy, PackerVariant)> = self
            .config
            .sort_strategies
            .iter()
            .flat_map(|&sort| {
                PackerVariant::search_set(&self.config)
                    .into_iter()
                    .map(move |variant| (sort, variant))
            })
            .collect();

        let outcomes = self.evaluate(&candidates, pieces, sheet);
        let evaluated = outcomes.len();
        let ranked = rank_outcomes(outcomes, pieces.len());

        log::debug!(
            "evaluated {} of {} candidates for {} pieces, winner: {}",
            evaluated,
            candidates.len(),
            pieces.len(),
            ranked.first().map_or("none", |o| o.name.as_str())
        );
        ranked
    }

    /// Evaluates candidates, keeping enumeration order in the output.
    fn evaluate(
        &self,
        candidates: &[(SortStrategy, PackerVariant)],
        pieces: &[Piece],
        sheet: &Sheet,
    ) -> Vec<StrategyOutcome> {
        let deadline = Deadline::from_config(&self.config);

        let run = |index: usize, &(sort, variant): &(SortStrategy, PackerVariant)| {
            if !deadline.allows(index) {
                return None;
            }
            run_candidate(sort, variant, pieces, sheet)
        };

        if self.config.parallel {
            candidates
                .par_iter()
                .enumerate()
                .map(|(i, c)| run(i, c))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            let mut outcomes = Vec::with_capacity(candidates.len());
            for (i, candidate) in candidates.iter().enumerate() {
                if !deadline.allows(i) {
                    log::debug!("time limit reached after {} candidates", i);
                    break;
                }
                outcomes.extend(run(i, candidate));
            }
            outcomes
        }
    }
}

fn run_candidate(
    sort: SortStrategy,
    variant: PackerVariant,
    pieces: &[Piece],
    sheet: &Sheet,
) -> Option<StrategyOutcome> {
    let packer = variant.packer();
    let name = format!("{} + {}", packer.name(), sort.name());
    let sorted = sort_pieces(pieces, sort);

    match packer.pack(&sorted, sheet) {
        Ok(placed_cuts) if placed_cuts.is_empty() => None,
        Ok(placed_cuts) => {
            let utilization = utilization_percent(&placed_cuts, sheet.width, sheet.height);
            log::trace!("{}: {} placed, {:.2}%", name, placed_cuts.len(), utilization);
            Some(StrategyOutcome {
                name,
                variant,
                sort_strategy: sort,
                utilization,
                placed_cuts,
            })
        }
        Err(e) => {
            log::warn!("{} failed and is excluded: {}", name, e);
            None
        }
    }
}

/// Orders outcomes best first. The sort is stable, so enumeration order
/// breaks ties.
fn rank_outcomes(outcomes: Vec<StrategyOutcome>, requested: usize) -> Vec<StrategyOutcome> {
    let (mut complete, mut partial): (Vec<_>, Vec<_>) = outcomes
        .into_iter()
        .partition(|o| o.placed_count() >= requested);

    if !complete.is_empty() {
        complete.sort_by(|a, b| b.utilization.total_cmp(&a.utilization));
        return complete;
    }

    partial.sort_by(|a, b| {
        b.placed_count()
            .cmp(&a.placed_count())
            .then_with(|| b.utilization.total_cmp(&a.utilization))
    });
    partial
}

/// Packs `pieces` into a leftover strip with every leftover variant and keeps
/// the placement covering the largest area. Earlier variants win ties.
pub fn pack_leftover(pieces: &[Piece], strip: &Sheet) -> Vec<PlacedCut> {
    let mut best: Vec<PlacedCut> = Vec::new();
    let mut best_area = 0.0;

    for variant in PackerVariant::leftover_set() {
        let packer = variant.packer();
        match packer.pack(pieces, strip) {
            Ok(placed) => {
                let area = placed_area(&placed);
                if area > best_area {
                    best_area = area;
                    best = placed;
                }
            }
            Err(e) => log::warn!("{} failed on leftover strip: {}", packer.name(), e),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sequential() -> Config {
        Config::new().with_parallel(false)
    }

    #[test]
    fn test_search_set_order() {
        let variants = PackerVariant::search_set(&Config::default());
        assert_eq!(variants.len(), 36 + 5 + 2);
        assert_eq!(
            variants[0],
            PackerVariant::Guillotine(
                GuillotineSplitRule::ShorterLeftoverAxis,
                GuillotineFitRule::BestAreaFit
            )
        );
        assert_eq!(
            variants[35],
            PackerVariant::Guillotine(
                GuillotineSplitRule::LongerAxis,
                GuillotineFitRule::WorstLongSideFit
            )
        );
        assert_eq!(variants[36], PackerVariant::MaxRects(MaxRectsFitRule::BestShortSideFit));
        assert_eq!(variants[42], PackerVariant::Skyline(SkylineFitRule::BottomLeft));
    }

    #[test]
    fn test_search_set_respects_family_flags() {
        let config = Config::new().with_guillotine(false).with_skyline(false);
        let variants = PackerVariant::search_set(&config);
        assert_eq!(variants.len(), 5);
        assert!(variants.iter().all(|v| v.method() == PackingMethod::MaxRects));
    }

    #[test]
    fn test_empty_search_rejected() {
        let cuts = vec![Cut::new("A", 10.0, 10.0)];
        let sheet = Sheet::new(100.0, 100.0);
        let no_packers = Config::new()
            .with_guillotine(false)
            .with_maxrects(false)
            .with_skyline(false);
        let no_sorts = Config::new().with_sort_strategies(Vec::new());
        for config in [no_packers, no_sorts] {
            assert!(matches!(
                Optimizer::new(config).best(&cuts, &sheet),
                Err(Error::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_complete_beats_partial() {
        let cuts = vec![Cut::new("A", 50.0, 50.0).with_quantity(4)];
        let catalogue = Optimizer::new(sequential())
            .optimize(&cuts, &Sheet::new(100.0, 100.0))
            .unwrap();
        assert!(!catalogue.is_empty());
        assert!(catalogue.iter().all(|o| o.placed_count() == 4));
        assert_relative_eq!(catalogue[0].utilization, 100.0);
    }

    #[test]
    fn test_catalogue_sorted_by_utilization() {
        let cuts = vec![
            Cut::new("A", 45.0, 35.0).with_quantity(3),
            Cut::new("B", 20.0, 15.0).with_quantity(5),
        ];
        let catalogue = Optimizer::new(sequential())
            .optimize(&cuts, &Sheet::new(120.0, 80.0).with_kerf(0.5))
            .unwrap();
        for pair in catalogue.windows(2) {
            assert!(pair[0].utilization >= pair[1].utilization);
        }
    }

    #[test]
    fn test_partial_ranking_by_count() {
        let cuts = vec![Cut::new("A", 80.0, 80.0).with_quantity(2)];
        let result = Optimizer::new(sequential())
            .best(&cuts, &Sheet::new(100.0, 100.0))
            .unwrap();
        assert_eq!(result.placed_count(), 1);
        assert!(!result.is_complete());
        assert_relative_eq!(result.utilization, 64.0);
    }

    #[test]
    fn test_nothing_fits_gives_empty_result() {
        let cuts = vec![Cut::new("A", 200.0, 200.0)];
        let result = Optimizer::default()
            .best(&cuts, &Sheet::new(100.0, 100.0))
            .unwrap();
        assert_eq!(result.placed_count(), 0);
        assert_eq!(result.method, PackingMethod::None);
        assert_eq!(result.requested, 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let cuts = vec![
            Cut::new("A", 31.0, 22.0).with_quantity(7),
            Cut::new("B", 17.0, 40.0).with_quantity(4),
            Cut::new("C", 12.0, 12.0).with_quantity(9),
        ];
        let sheet = Sheet::new(150.0, 100.0).with_kerf(0.3);
        let par = Optimizer::new(Config::new().with_parallel(true))
            .best(&cuts, &sheet)
            .unwrap();
        let seq = Optimizer::new(sequential()).best(&cuts, &sheet).unwrap();
        assert_eq!(par.strategy, seq.strategy);
        assert_eq!(par.placed_cuts, seq.placed_cuts);
    }

    #[test]
    fn test_rank_outcomes_stable_on_ties() {
        let make = |name: &str, utilization: f64| StrategyOutcome {
            name: name.into(),
            variant: PackerVariant::MaxRects(MaxRectsFitRule::BottomLeft),
            sort_strategy: SortStrategy::Area,
            utilization,
            placed_cuts: Vec::new(),
        };
        let ranked = rank_outcomes(
            vec![make("first", 50.0), make("second", 50.0), make("third", 60.0)],
            0,
        );
        let names: Vec<_> = ranked.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["third", "first", "second"]);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let optimizer = Optimizer::default();
        assert!(optimizer
            .best(&[Cut::new("A", -1.0, 10.0)], &Sheet::new(100.0, 100.0))
            .is_err());
        assert!(optimizer
            .best(&[Cut::new("A", 1.0, 10.0)], &Sheet::new(0.0, 100.0))
            .is_err());
    }

    #[test]
    fn test_deadline() {
        let unlimited = Deadline::from_config(&Config::default());
        assert!((0..100).all(|i| unlimited.allows(i)));

        let limited = Deadline::from_config(&Config::new().with_time_limit(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(limited.allows(0));
        assert!(!limited.allows(1));
    }

    #[test]
    fn test_time_limit_cuts_search_short() {
        let cuts = vec![
            Cut::new("A", 20.0, 20.0).with_quantity(150),
            Cut::new("B", 35.0, 15.0).with_quantity(40),
        ];
        let sheet = Sheet::new(400.0, 400.0).with_kerf(0.3);
        let candidates = 8 * PackerVariant::search_set(&Config::default()).len();

        for parallel in [false, true] {
            let config = Config::new().with_parallel(parallel).with_time_limit(1);
            let catalogue = Optimizer::new(config.clone()).optimize(&cuts, &sheet).unwrap();
            assert!(!catalogue.is_empty());
            assert!(catalogue.len() < candidates);

            let best = Optimizer::new(config).best(&cuts, &sheet).unwrap();
            assert!(best.is_successful());
        }
    }

    #[test]
    fn test_pack_leftover_prefers_largest_area() {
        let pieces = expand_cuts(&[Cut::new("A", 10.0, 10.0).with_quantity(6)]).unwrap();
        let placed = pack_leftover(&pieces, &Sheet::new(30.0, 20.0));
        assert_eq!(placed.len(), 6);
    }
}
