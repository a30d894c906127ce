//! MaxRects packer.
//!
//! Keeps the list of maximal free rectangles. Free rectangles may overlap, so
//! a placement can cut into several of them at once. Layouts are generally
//! tighter than guillotine layouts but need not be guillotine-cuttable.
//!
//! Every piece occupies its footprint plus the kerf on its right and top
//! sides, and the free space starts as the sheet grown by one kerf. A piece
//! flush with the far sheet edge therefore still fits, and no two
//! kerf-expanded footprints ever overlap.

use u_cutstock_core::geometry::{prune_contained, Rect, EPSILON};
use u_cutstock_core::{Error, Packer, Piece, PlacedCut, Result, Sheet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement heuristic. Scores are `(primary, secondary)` pairs, lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MaxRectsFitRule {
    /// Shorter leftover side, then longer leftover side.
    BestShortSideFit,
    /// Longer leftover side, then shorter leftover side.
    BestLongSideFit,
    /// Leftover area, then shorter leftover side.
    BestAreaFit,
    /// Lowest position, then leftmost.
    BottomLeft,
    /// Most edge contact with the sheet border and placed pieces.
    ContactPoint,
}

impl MaxRectsFitRule {
    /// All fit rules in enumeration order.
    pub const ALL: [MaxRectsFitRule; 5] = [
        MaxRectsFitRule::BestShortSideFit,
        MaxRectsFitRule::BestLongSideFit,
        MaxRectsFitRule::BestAreaFit,
        MaxRectsFitRule::BottomLeft,
        MaxRectsFitRule::ContactPoint,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BestShortSideFit => "BestShortSideFit",
            Self::BestLongSideFit => "BestLongSideFit",
            Self::BestAreaFit => "BestAreaFit",
            Self::BottomLeft => "BottomLeft",
            Self::ContactPoint => "ContactPoint",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Score {
    primary: f64,
    secondary: f64,
}

impl Score {
    fn better_than(&self, other: &Score) -> bool {
        self.primary < other.primary
            || (self.primary == other.primary && self.secondary < other.secondary)
    }
}

/// MaxRects packer parameterised by a fit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxRectsPacker {
    fit: MaxRectsFitRule,
}

impl MaxRectsPacker {
    /// Creates a packer with the given fit rule.
    pub fn new(fit: MaxRectsFitRule) -> Self {
        Self { fit }
    }

    /// Fit rule.
    pub fn fit_rule(&self) -> MaxRectsFitRule {
        self.fit
    }

    fn score(&self, width: f64, height: f64, rect: &Rect, used: &[Rect]) -> Score {
        let leftover_horiz = rect.width - width;
        let leftover_vert = rect.height - height;
        let short_side = leftover_horiz.min(leftover_vert);
        let long_side = leftover_horiz.max(leftover_vert);

        let (primary, secondary) = match self.fit {
            MaxRectsFitRule::BestShortSideFit => (short_side, long_side),
            MaxRectsFitRule::BestLongSideFit => (long_side, short_side),
            MaxRectsFitRule::BestAreaFit => (rect.area() - width * height, short_side),
            MaxRectsFitRule::BottomLeft => (rect.y, rect.x),
            MaxRectsFitRule::ContactPoint => {
                (-(contact_score(rect.x, rect.y, width, height, used) as f64), 0.0)
            }
        };
        Score { primary, secondary }
    }
}

impl Default for MaxRectsPacker {
    fn default() -> Self {
        Self::new(MaxRectsFitRule::BestShortSideFit)
    }
}

/// Number of edges of the candidate that touch the sheet origin axes or a
/// placed piece.
fn contact_score(x: f64, y: f64, width: f64, height: f64, used: &[Rect]) -> usize {
    let mut score = 0;
    if x == 0.0 || y == 0.0 {
        score += 1;
    }

    let right = x + width;
    let top = y + height;
    for u in used {
        let vertical_overlap = u.y < top && u.top() > y;
        if (u.x == right || u.right() == x) && vertical_overlap {
            score += 1;
        }
        let horizontal_overlap = u.x < right && u.right() > x;
        if (u.y == top || u.top() == y) && horizontal_overlap {
            score += 1;
        }
    }
    score
}

/// Splits `free` around the kerf-inflated `used` rectangle.
///
/// Returns `None` if they do not overlap, otherwise the up to four maximal
/// strips of `free` that remain outside `used`.
fn split_free_node(free: &Rect, used: &Rect) -> Option<Vec<Rect>> {
    if !free.intersects(used) {
        return None;
    }

    let mut parts = Vec::with_capacity(4);
    if used.y > free.y + EPSILON {
        parts.push(Rect::new(free.x, free.y, free.width, used.y - free.y));
    }
    if used.top() < free.top() - EPSILON {
        parts.push(Rect::new(
            free.x,
            used.top(),
            free.width,
            free.top() - used.top(),
        ));
    }
    if used.x > free.x + EPSILON {
        parts.push(Rect::new(free.x, free.y, used.x - free.x, free.height));
    }
    if used.right() < free.right() - EPSILON {
        parts.push(Rect::new(
            used.right(),
            free.y,
            free.right() - used.right(),
            free.height,
        ));
    }
    Some(parts)
}

impl Packer for MaxRectsPacker {
    fn name(&self) -> String {
        format!("MaxRects ({})", self.fit.name())
    }

    fn pack(&self, pieces: &[Piece], sheet: &Sheet) -> Result<Vec<PlacedCut>> {
        let mut placed: Vec<PlacedCut> = Vec::new();
        let mut used: Vec<Rect> = Vec::new();
        let kerf = sheet.kerf;
        let mut free_rects = vec![Rect::sized(sheet.width + kerf, sheet.height + kerf)];

        for piece in pieces {
            // (x, y, rotated, score)
            let mut best: Option<(f64, f64, bool, Score)> = None;

            for rect in &free_rects {
                for &rotated in piece.orientations() {
                    let (w, h) = piece.oriented(rotated);
                    let (w, h) = (w + kerf, h + kerf);
                    if !rect.fits(w, h) {
                        continue;
                    }
                    let score = self.score(w, h, rect, &used);
                    if best.map_or(true, |(_, _, _, s)| score.better_than(&s)) {
                        best = Some((rect.x, rect.y, rotated, score));
                    }
                }
            }

            let Some((x, y, rotated, _)) = best else {
                continue;
            };

            let placement = PlacedCut::new(piece.clone(), x, y, rotated);
            let blocked = placement.kerf_rect(kerf);

            let mut next = Vec::with_capacity(free_rects.len() + 4);
            for free in &free_rects {
                match split_free_node(free, &blocked) {
                    Some(parts) => next.extend(parts),
                    None => next.push(*free),
                }
            }
            if let Some(bad) = next.iter().find(|r| !r.is_well_formed()) {
                return Err(Error::Internal(format!(
                    "maxrects split produced malformed free rectangle {:?}",
                    bad
                )));
            }
            prune_contained(&mut next);
            free_rects = next;

            used.push(blocked);
            placed.push(placement);
        }

        Ok(placed)
    }
}
