//! Guillotine free-rectangle packer.
//!
//! Every placement consumes the lower-left corner of a free rectangle and
//! splits the remainder with one straight, edge-to-edge cut. The resulting
//! layouts can always be separated by a sequence of guillotine cuts, which is
//! what makes them legal for manual score-and-snap cutting.

use u_cutstock_core::geometry::{prune_contained, Rect, EPSILON};
use u_cutstock_core::{Error, Packer, Piece, PlacedCut, Result, Sheet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decides the direction of the cut that splits a consumed free rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GuillotineSplitRule {
    /// Split along the shorter leftover side.
    ShorterLeftoverAxis,
    /// Split along the longer leftover side.
    LongerLeftoverAxis,
    /// Choose the split whose children have the smaller total area.
    MinimizeArea,
    /// Choose the split whose children have the larger total area.
    MaximizeArea,
    /// Split along the shorter side of the free rectangle.
    ShorterAxis,
    /// Split along the longer side of the free rectangle.
    LongerAxis,
}

impl GuillotineSplitRule {
    /// All split rules.
    pub const ALL: [GuillotineSplitRule; 6] = [
        GuillotineSplitRule::ShorterLeftoverAxis,
        GuillotineSplitRule::LongerLeftoverAxis,
        GuillotineSplitRule::MinimizeArea,
        GuillotineSplitRule::MaximizeArea,
        GuillotineSplitRule::ShorterAxis,
        GuillotineSplitRule::LongerAxis,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShorterLeftoverAxis => "ShorterLeftoverAxis",
            Self::LongerLeftoverAxis => "LongerLeftoverAxis",
            Self::MinimizeArea => "MinimizeArea",
            Self::MaximizeArea => "MaximizeArea",
            Self::ShorterAxis => "ShorterAxis",
            Self::LongerAxis => "LongerAxis",
        }
    }
}

/// Scores a candidate free rectangle for a piece. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GuillotineFitRule {
    /// Smallest leftover area.
    BestAreaFit,
    /// Smallest leftover on the shorter side.
    BestShortSideFit,
    /// Smallest leftover on the longer side.
    BestLongSideFit,
    /// Largest leftover area.
    WorstAreaFit,
    /// Largest leftover on the shorter side.
    WorstShortSideFit,
    /// Largest leftover on the longer side.
    WorstLongSideFit,
}

impl GuillotineFitRule {
    /// All fit rules.
    pub const ALL: [GuillotineFitRule; 6] = [
        GuillotineFitRule::BestAreaFit,
        GuillotineFitRule::BestShortSideFit,
        GuillotineFitRule::BestLongSideFit,
        GuillotineFitRule::WorstAreaFit,
        GuillotineFitRule::WorstShortSideFit,
        GuillotineFitRule::WorstLongSideFit,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BestAreaFit => "BestAreaFit",
            Self::BestShortSideFit => "BestShortSideFit",
            Self::BestLongSideFit => "BestLongSideFit",
            Self::WorstAreaFit => "WorstAreaFit",
            Self::WorstShortSideFit => "WorstShortSideFit",
            Self::WorstLongSideFit => "WorstLongSideFit",
        }
    }

    /// Score of placing a `width` x `height` piece into `rect`.
    pub fn score(&self, width: f64, height: f64, rect: &Rect) -> f64 {
        let leftover_horiz = rect.width - width;
        let leftover_vert = rect.height - height;
        let short_side = leftover_horiz.min(leftover_vert);
        let long_side = leftover_horiz.max(leftover_vert);
        let area = rect.area() - width * height;

        match self {
            Self::BestAreaFit => area,
            Self::BestShortSideFit => short_side,
            Self::BestLongSideFit => long_side,
            Self::WorstAreaFit => -area,
            Self::WorstShortSideFit => -short_side,
            Self::WorstLongSideFit => -long_side,
        }
    }
}

/// Guillotine packer parameterised by split and fit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuillotinePacker {
    split: GuillotineSplitRule,
    fit: GuillotineFitRule,
}

impl GuillotinePacker {
    /// Creates a packer with the given rules.
    pub fn new(split: GuillotineSplitRule, fit: GuillotineFitRule) -> Self {
        Self { split, fit }
    }

    /// Split rule.
    pub fn split_rule(&self) -> GuillotineSplitRule {
        self.split
    }

    /// Fit rule.
    pub fn fit_rule(&self) -> GuillotineFitRule {
        self.fit
    }

    /// Splits `rect` after a `placed_width` x `placed_height` piece was put
    /// into its lower-left corner.
    ///
    /// Returns up to two children separated from the piece by `kerf`.
    pub fn split_free_rect(
        &self,
        rect: &Rect,
        placed_width: f64,
        placed_height: f64,
        kerf: f64,
    ) -> Vec<Rect> {
        let right_width = rect.width - placed_width - kerf;
        let top_height = rect.height - placed_height - kerf;

        let has_top = top_height > EPSILON;
        let has_right = right_width > EPSILON;

        match (has_right, has_top) {
            (false, false) => Vec::new(),
            (true, false) => vec![Rect::new(
                rect.x + placed_width + kerf,
                rect.y,
                right_width,
                rect.height,
            )],
            (false, true) => vec![Rect::new(
                rect.x,
                rect.y + placed_height + kerf,
                rect.width,
                top_height,
            )],
            (true, true) => {
                let horizontal = self.split_horizontally(
                    rect,
                    placed_width,
                    placed_height,
                    right_width,
                    top_height,
                );
                if horizontal {
                    // The horizontal cut spans the full width above the piece.
                    vec![
                        Rect::new(
                            rect.x + placed_width + kerf,
                            rect.y,
                            right_width,
                            placed_height,
                        ),
                        Rect::new(
                            rect.x,
                            rect.y + placed_height + kerf,
                            rect.width,
                            top_height,
                        ),
                    ]
                } else {
                    // The vertical cut spans the full height right of the piece.
                    vec![
                        Rect::new(
                            rect.x,
                            rect.y + placed_height + kerf,
                            placed_width,
                            top_height,
                        ),
                        Rect::new(
                            rect.x + placed_width + kerf,
                            rect.y,
                            right_width,
                            rect.height,
                        ),
                    ]
                }
            }
        }
    }

    fn split_horizontally(
        &self,
        rect: &Rect,
        placed_width: f64,
        placed_height: f64,
        right_width: f64,
        top_height: f64,
    ) -> bool {
        let horizontal_area = right_width * placed_height + rect.width * top_height;
        let vertical_area = placed_width * top_height + right_width * rect.height;

        match self.split {
            GuillotineSplitRule::ShorterLeftoverAxis => right_width <= top_height,
            GuillotineSplitRule::LongerLeftoverAxis => right_width > top_height,
            GuillotineSplitRule::MinimizeArea => horizontal_area <= vertical_area,
            GuillotineSplitRule::MaximizeArea => horizontal_area > vertical_area,
            GuillotineSplitRule::ShorterAxis => rect.width <= rect.height,
            GuillotineSplitRule::LongerAxis => rect.width > rect.height,
        }
    }
}

impl Default for GuillotinePacker {
    fn default() -> Self {
        Self::new(
            GuillotineSplitRule::MinimizeArea,
            GuillotineFitRule::BestAreaFit,
        )
    }
}

impl Packer for GuillotinePacker {
    fn name(&self) -> String {
        format!("Guillotine ({}, {})", self.split.name(), self.fit.name())
    }

    fn pack(&self, pieces: &[Piece], sheet: &Sheet) -> Result<Vec<PlacedCut>> {
        let mut placed = Vec::new();
        let mut free_rects = vec![sheet.bounds()];

        for piece in pieces {
            // (free index, rotated, score)
            let mut best: Option<(usize, bool, f64)> = None;

            for (i, rect) in free_rects.iter().enumerate() {
                for &rotated in piece.orientations() {
                    let (w, h) = piece.oriented(rotated);
                    if !rect.fits(w, h) {
                        continue;
                    }
                    let score = self.fit.score(w, h, rect);
                    if best.map_or(true, |(_, _, s)| score < s) {
                        best = Some((i, rotated, score));
                    }
                }
            }

            let Some((index, rotated, _)) = best else {
                continue;
            };

            let rect = free_rects[index];
            let placement = PlacedCut::new(piece.clone(), rect.x, rect.y, rotated);
            let children =
                self.split_free_rect(&rect, placement.width, placement.height, sheet.kerf);

            if let Some(bad) = children.iter().find(|r| !r.is_well_formed()) {
                return Err(Error::Internal(format!(
                    "guillotine split produced malformed free rectangle {:?}",
                    bad
                )));
            }

            free_rects.splice(index..=index, children);
            prune_contained(&mut free_rects);
            placed.push(placement);
        }

        Ok(placed)
    }
}

/// Checks whether a set of rectangles can be separated from a
/// `width` x `height` region by recursive edge-to-edge cuts.
///
/// A cut may run anywhere that crosses no rectangle, including inside kerf
/// gaps.
pub fn is_guillotine_cuttable(rects: &[Rect], width: f64, height: f64) -> bool {
    separable(rects, Rect::sized(width, height))
}

fn separable(rects: &[Rect], region: Rect) -> bool {
    if rects.len() <= 1 {
        return true;
    }

    // Vertical cut candidates: right edges of the rectangles.
    for r in rects {
        let line = r.right();
        if line <= region.x + EPSILON || line >= region.right() - EPSILON {
            continue;
        }
        let (left, right): (Vec<Rect>, Vec<Rect>) =
            rects.iter().partition(|o| o.right() <= line + EPSILON);
        if !left.is_empty()
            && !right.is_empty()
            && right.iter().all(|o| o.x >= line - EPSILON)
        {
            let left_region = Rect::new(region.x, region.y, line - region.x, region.height);
            let right_region = Rect::new(line, region.y, region.right() - line, region.height);
            return separable(&left, left_region) && separable(&right, right_region);
        }
    }

    // Horizontal cut candidates: top edges of the rectangles.
    for r in rects {
        let line = r.top();
        if line <= region.y + EPSILON || line >= region.top() - EPSILON {
            continue;
        }
        let (below, above): (Vec<Rect>, Vec<Rect>) =
            rects.iter().partition(|o| o.top() <= line + EPSILON);
        if !below.is_empty()
            && !above.is_empty()
            && above.iter().all(|o| o.y >= line - EPSILON)
        {
            let below_region = Rect::new(region.x, region.y, region.width, line - region.y);
            let above_region = Rect::new(region.x, line, region.width, region.top() - line);
            return separable(&below, below_region) && separable(&above, above_region);
        }
    }

    false
}
