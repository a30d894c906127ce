//! Pattern-hybrid packing for manual cutting.
//!
//! A dominant cut is laid out as a uniform grid in the sheet's lower-left
//! corner, separated by straight through-cuts. The strips to the right of and
//! above the grid are then filled with the remaining pieces by the machine
//! packers. Every grid of every cut is tried and the best sheet wins.

use crate::optimizer::{pack_leftover, Deadline};
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use u_cutstock_core::geometry::Rect;
use u_cutstock_core::{
    expand_cuts, total_quantity, utilization_percent, Config, Cut, CutLine, CutOrientation,
    PackingMethod, PackingResult, Piece, PlacedCut, Result, Sheet,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Leftover strips thinner than this are not worth packing.
pub const MIN_STRIP_SIZE: f64 = 5.0;

/// Utilization difference (in percentage points) below which two layouts are
/// compared by piece count instead.
const UTILIZATION_EPSILON: f64 = 0.01;

/// A uniform `cols` x `rows` grid of one cut.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridPattern {
    /// Index of the cut in the cut list.
    pub cut_index: usize,
    /// Whether the cut is laid out rotated.
    pub rotated: bool,
    /// Number of columns.
    pub cols: usize,
    /// Number of rows.
    pub rows: usize,
    /// Footprint width of one cell.
    pub piece_width: f64,
    /// Footprint height of one cell.
    pub piece_height: f64,
    /// Number of cells actually filled, at most `cols * rows`.
    pub total_pieces: usize,
}

impl GridPattern {
    /// Width of the grid block including the kerf between columns.
    pub fn block_width(&self, kerf: f64) -> f64 {
        self.cols as f64 * self.piece_width + (self.cols as f64 - 1.0) * kerf
    }

    /// Height of the grid block including the kerf between rows.
    pub fn block_height(&self, kerf: f64) -> f64 {
        self.rows as f64 * self.piece_height + (self.rows as f64 - 1.0) * kerf
    }

    /// Rows that hold at least one piece.
    fn filled_rows(&self) -> usize {
        self.rows.min(self.total_pieces.div_ceil(self.cols))
    }

    /// Pieces in column `col`. Cells are filled row by row.
    fn pieces_in_column(&self, col: usize) -> usize {
        self.rows
            .min(self.total_pieces.saturating_sub(col).div_ceil(self.cols))
    }
}

/// Enumerates the grid patterns of every cut that fit `sheet`.
///
/// For each cut and orientation this yields the largest grid (filled up to
/// the requested quantity) followed by every smaller grid holding fewer
/// pieces than requested.
pub fn explore_patterns(cuts: &[Cut], sheet: &Sheet) -> Vec<GridPattern> {
    let kerf = sheet.kerf;
    let mut patterns = Vec::new();

    for (cut_index, cut) in cuts.iter().enumerate() {
        if cut.quantity == 0 {
            continue;
        }
        for &rotated in orientations(cut) {
            let (w, h) = if rotated {
                (cut.height, cut.width)
            } else {
                (cut.width, cut.height)
            };
            if w > sheet.width || h > sheet.height {
                continue;
            }

            let max_cols = ((sheet.width + kerf) / (w + kerf)).floor() as usize;
            let max_rows = ((sheet.height + kerf) / (h + kerf)).floor() as usize;
            if max_cols == 0 || max_rows == 0 {
                continue;
            }

            let grid = |cols: usize, rows: usize, total_pieces: usize| GridPattern {
                cut_index,
                rotated,
                cols,
                rows,
                piece_width: w,
                piece_height: h,
                total_pieces,
            };

            patterns.push(grid(max_cols, max_rows, (max_cols * max_rows).min(cut.quantity)));

            for cols in 1..=max_cols {
                for rows in 1..=max_rows {
                    let pieces = cols * rows;
                    if pieces >= cut.quantity {
                        continue;
                    }
                    let candidate = grid(cols, rows, pieces);
                    if candidate.block_width(kerf) <= sheet.width
                        && candidate.block_height(kerf) <= sheet.height
                    {
                        patterns.push(candidate);
                    }
                }
            }
        }
    }

    patterns
}

/// Square cuts look the same in both orientations.
fn orientations(cut: &Cut) -> &'static [bool] {
    if cut.rotatable && cut.width != cut.height {
        &[false, true]
    } else {
        &[false]
    }
}

/// Cut lines separating the cells of a grid, columns first.
///
/// Vertical lines run the height of the filled rows. Horizontal lines are
/// emitted per column strip, across that strip only, between the pieces it
/// holds.
pub fn grid_cut_lines(pattern: &GridPattern, kerf: f64) -> Vec<CutLine> {
    let mut lines = Vec::new();
    let w = pattern.piece_width;
    let h = pattern.piece_height;

    let rows = pattern.filled_rows();
    let line_height = rows as f64 * h + (rows as f64 - 1.0) * kerf;
    for col in 1..pattern.cols {
        lines.push(CutLine {
            id: lines.len(),
            orientation: CutOrientation::Vertical,
            position: col as f64 * w + (col as f64 - 1.0) * kerf + kerf / 2.0,
            start: 0.0,
            end: line_height,
            order: col,
        });
    }

    if pattern.rows > 1 {
        for strip in 0..pattern.cols {
            let strip_x = strip as f64 * (w + kerf);
            for row in 1..pattern.pieces_in_column(strip) {
                lines.push(CutLine {
                    id: lines.len(),
                    orientation: CutOrientation::Horizontal,
                    position: row as f64 * h + (row as f64 - 1.0) * kerf + kerf / 2.0,
                    start: strip_x,
                    end: strip_x + w,
                    order: pattern.cols + row,
                });
            }
        }
    }

    lines
}

/// Strips of `sheet` right of and above a grid block.
pub fn leftover_strips(pattern: &GridPattern, sheet: &Sheet) -> Vec<Rect> {
    let kerf = sheet.kerf;
    let block_width = pattern.block_width(kerf);
    let block_height = pattern.block_height(kerf);
    let mut strips = Vec::with_capacity(2);

    if block_width < sheet.width {
        strips.push(Rect::new(
            block_width + kerf,
            0.0,
            sheet.width - block_width - kerf,
            sheet.height,
        ));
    }
    if block_height < sheet.height {
        strips.push(Rect::new(
            0.0,
            block_height + kerf,
            block_width,
            sheet.height - block_height - kerf,
        ));
    }
    strips
}

/// Grid-first packer used for manual cutting.
#[derive(Debug, Clone, Default)]
pub struct PatternPacker {
    config: Config,
}

impl PatternPacker {
    /// Creates a pattern packer. `parallel` and `time_limit_ms` are read
    /// from the config.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Builds the layout of every explored pattern, in exploration order.
    ///
    /// With a time limit, patterns not started before the deadline are
    /// skipped; the first pattern always runs.
    pub fn layouts(&self, cuts: &[Cut], sheet: &Sheet) -> Result<Vec<PackingResult>> {
        sheet.validate()?;
        let pieces = expand_cuts(cuts)?;
        let deadline = Deadline::from_config(&self.config);

        let patterns = explore_patterns(cuts, sheet);
        let run = |index: usize, pattern: &GridPattern| {
            deadline
                .allows(index)
                .then(|| self.layout(pattern, cuts, &pieces, sheet))
        };

        let layouts: Vec<PackingResult> = if self.config.parallel {
            patterns
                .par_iter()
                .enumerate()
                .map(|(i, p)| run(i, p))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            patterns
                .iter()
                .enumerate()
                .map_while(|(i, p)| run(i, p))
                .collect()
        };

        if layouts.len() < patterns.len() {
            log::debug!(
                "time limit reached after {} of {} patterns",
                layouts.len(),
                patterns.len()
            );
        }
        Ok(layouts)
    }

    /// Packs `cuts` onto `sheet` and returns the best pattern layout.
    pub fn pack(&self, cuts: &[Cut], sheet: &Sheet) -> Result<PackingResult> {
        let start = Instant::now();
        let layouts = self.layouts(cuts, sheet)?;
        let evaluated = layouts.len();

        let mut best: Option<PackingResult> = None;
        for layout in layouts.into_iter().filter(PackingResult::is_successful) {
            if best.as_ref().map_or(true, |b| is_better(&layout, b)) {
                best = Some(layout);
            }
        }

        let mut result = best.unwrap_or_else(|| PackingResult {
            method: PackingMethod::HybridPattern,
            ..PackingResult::empty(total_quantity(cuts))
        });
        result.computation_time_ms = start.elapsed().as_millis() as u64;

        log::debug!(
            "{} grid patterns evaluated, best: {} ({:.2}%, {} of {} pieces)",
            evaluated,
            result.strategy.as_deref().unwrap_or("none"),
            result.utilization,
            result.placed_count(),
            result.requested
        );
        Ok(result)
    }

    /// Builds the full sheet layout for one grid pattern.
    fn layout(
        &self,
        pattern: &GridPattern,
        cuts: &[Cut],
        pieces: &[Piece],
        sheet: &Sheet,
    ) -> PackingResult {
        let kerf = sheet.kerf;
        let cut = &cuts[pattern.cut_index];

        // The first `total_pieces` copies of the cut go into the grid.
        let grid_pieces: Vec<&Piece> = pieces
            .iter()
            .filter(|p| p.original_id == cut.id)
            .take(pattern.total_pieces)
            .collect();

        let mut placed_cuts: Vec<PlacedCut> = grid_pieces
            .iter()
            .enumerate()
            .map(|(n, piece)| {
                let col = n % pattern.cols;
                let row = n / pattern.cols;
                PlacedCut::new(
                    (*piece).clone(),
                    col as f64 * (pattern.piece_width + kerf),
                    row as f64 * (pattern.piece_height + kerf),
                    pattern.rotated,
                )
                .with_pattern(true)
            })
            .collect();

        let mut used: HashSet<&str> = grid_pieces.iter().map(|p| p.id.as_str()).collect();

        for strip in leftover_strips(pattern, sheet) {
            if strip.width < MIN_STRIP_SIZE || strip.height < MIN_STRIP_SIZE {
                continue;
            }
            let remaining: Vec<Piece> = pieces
                .iter()
                .filter(|p| !used.contains(p.id.as_str()))
                .cloned()
                .collect();
            if remaining.is_empty() {
                break;
            }

            let strip_sheet = sheet.resized(strip.width, strip.height);
            for pc in pack_leftover(&remaining, &strip_sheet) {
                if let Some(piece) = pieces.iter().find(|p| p.id == pc.piece.id) {
                    used.insert(piece.id.as_str());
                }
                placed_cuts.push(pc.translated(strip.x, strip.y).with_pattern(false));
            }
        }

        let name = format!(
            "Pattern {}x{} of '{}'{}",
            pattern.cols,
            pattern.rows,
            cut.id,
            if pattern.rotated { " (rotated)" } else { "" }
        );

        PackingResult {
            utilization: utilization_percent(&placed_cuts, sheet.width, sheet.height),
            cut_lines: grid_cut_lines(pattern, kerf),
            method: PackingMethod::HybridPattern,
            requested: pieces.len(),
            strategy: Some(name),
            placed_cuts,
            ..PackingResult::default()
        }
    }
}

/// Higher utilization wins; within the epsilon the layout with more pieces.
fn is_better(candidate: &PackingResult, best: &PackingResult) -> bool {
    let diff = candidate.utilization - best.utilization;
    if diff.abs() > UTILIZATION_EPSILON {
        diff > 0.0
    } else {
        candidate.placed_count() > best.placed_count()
    }
}
