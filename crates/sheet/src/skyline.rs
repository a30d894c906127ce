//! Skyline packer.
//!
//! The occupied region is described by its upper contour, a left-to-right
//! sequence of horizontal segments covering the full sheet width. Pieces
//! land on the contour and raise it. Space trapped below a piece is lost,
//! which keeps the packer fast but slightly less dense than MaxRects.

use u_cutstock_core::geometry::EPSILON;
use u_cutstock_core::{Error, Packer, Piece, PlacedCut, Result, Sheet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SkylineFitRule {
    /// Least area trapped below the piece, then lowest landing height.
    MinWaste,
    /// Lowest landing height, then leftmost.
    BottomLeft,
}

impl SkylineFitRule {
    /// All fit rules in enumeration order.
    pub const ALL: [SkylineFitRule; 2] = [SkylineFitRule::MinWaste, SkylineFitRule::BottomLeft];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinWaste => "MinWaste",
            Self::BottomLeft => "BottomLeft",
        }
    }
}

/// One horizontal segment of the contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkylineNode {
    /// Left edge of the segment.
    pub x: f64,
    /// Height of the contour over the segment.
    pub y: f64,
    /// Segment length.
    pub width: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    node: usize,
    y: f64,
    waste: f64,
    rotated: bool,
}

/// Skyline packer parameterised by a fit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkylinePacker {
    fit: SkylineFitRule,
}

impl SkylinePacker {
    /// Creates a packer with the given fit rule.
    pub fn new(fit: SkylineFitRule) -> Self {
        Self { fit }
    }

    /// Fit rule.
    pub fn fit_rule(&self) -> SkylineFitRule {
        self.fit
    }

    fn better(&self, candidate: &Candidate, best: &Candidate) -> bool {
        match self.fit {
            SkylineFitRule::MinWaste => {
                candidate.waste < best.waste
                    || (candidate.waste == best.waste && candidate.y < best.y)
            }
            SkylineFitRule::BottomLeft => {
                candidate.y < best.y || (candidate.y == best.y && candidate.waste < best.waste)
            }
        }
    }
}

impl Default for SkylinePacker {
    fn default() -> Self {
        Self::new(SkylineFitRule::MinWaste)
    }
}

/// Width reserved on the contour by a piece starting at `x`.
///
/// The kerf to the right of the piece is reserved too, unless the piece ends
/// at the sheet edge.
fn reserved_width(x: f64, width: f64, kerf: f64, sheet_width: f64) -> f64 {
    (width + kerf).min(sheet_width - x)
}

/// Landing height and trapped area for a piece whose left edge sits on
/// `nodes[index]`, or `None` if it does not fit.
fn landing(
    nodes: &[SkylineNode],
    index: usize,
    width: f64,
    height: f64,
    kerf: f64,
    sheet: &Sheet,
) -> Option<(f64, f64)> {
    let x = nodes[index].x;
    if x + width > sheet.width + EPSILON {
        return None;
    }

    let span = reserved_width(x, width, kerf, sheet.width);
    let mut width_left = span;
    let mut y = nodes[index].y;
    let mut j = index;
    while width_left > EPSILON {
        let node = nodes.get(j)?;
        y = y.max(node.y);
        if y + height > sheet.height + EPSILON {
            return None;
        }
        width_left -= node.width;
        j += 1;
    }

    let mut waste = 0.0;
    let mut width_left = span;
    for node in &nodes[index..j] {
        waste += (y - node.y) * width_left.min(node.width);
        width_left -= node.width;
    }

    Some((y, waste))
}

/// Raises the contour for a piece placed on `nodes[index]`.
fn add_level(nodes: &mut Vec<SkylineNode>, index: usize, node: SkylineNode) {
    nodes.insert(index, node);

    let end = node.x + node.width;
    let i = index + 1;
    while i < nodes.len() {
        if nodes[i].x >= end - EPSILON {
            break;
        }
        let shrink = end - nodes[i].x;
        nodes[i].x += shrink;
        nodes[i].width -= shrink;
        if nodes[i].width <= EPSILON {
            nodes.remove(i);
        } else {
            break;
        }
    }

    merge(nodes);
}

fn merge(nodes: &mut Vec<SkylineNode>) {
    let mut i = 0;
    while i + 1 < nodes.len() {
        if (nodes[i].y - nodes[i + 1].y).abs() <= EPSILON {
            nodes[i].width += nodes[i + 1].width;
            nodes.remove(i + 1);
        } else {
            i += 1;
        }
    }
}

impl Packer for SkylinePacker {
    fn name(&self) -> String {
        format!("Skyline ({})", self.fit.name())
    }

    fn pack(&self, pieces: &[Piece], sheet: &Sheet) -> Result<Vec<PlacedCut>> {
        let kerf = sheet.kerf;
        let mut placed = Vec::new();
        let mut nodes = vec![SkylineNode {
            x: 0.0,
            y: 0.0,
            width: sheet.width,
        }];

        for piece in pieces {
            let mut best: Option<Candidate> = None;

            for &rotated in piece.orientations() {
                let (w, h) = piece.oriented(rotated);
                for i in 0..nodes.len() {
                    let Some((y, waste)) = landing(&nodes, i, w, h, kerf, sheet) else {
                        continue;
                    };
                    let candidate = Candidate {
                        node: i,
                        y,
                        waste,
                        rotated,
                    };
                    if best.map_or(true, |b| self.better(&candidate, &b)) {
                        best = Some(candidate);
                    }
                }
            }

            let Some(choice) = best else {
                continue;
            };

            let x = nodes[choice.node].x;
            let placement = PlacedCut::new(piece.clone(), x, choice.y, choice.rotated);
            add_level(
                &mut nodes,
                choice.node,
                SkylineNode {
                    x,
                    y: choice.y + placement.height + kerf,
                    width: reserved_width(x, placement.width, kerf, sheet.width),
                },
            );

            let covered: f64 = nodes.iter().map(|n| n.width).sum();
            if (covered - sheet.width).abs() > 1e-6 {
                return Err(Error::Internal(format!(
                    "skyline covers {} of sheet width {}",
                    covered, sheet.width
                )));
            }

            placed.push(placement);
        }

        Ok(placed)
    }
}
