//! Cut list entries and the unit pieces they expand into.

use crate::{Error, Result};
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a cut in the caller's cut list.
pub type CutId = String;

/// A requested rectangular piece, possibly in several copies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cut {
    /// Unique identifier within the cut list.
    pub id: CutId,
    /// Requested width.
    pub width: f64,
    /// Requested height.
    pub height: f64,
    /// Number of copies to cut.
    pub quantity: usize,
    /// Free-form label shown to the operator.
    pub label: String,
    /// Whether the piece may be turned by 90 degrees.
    pub rotatable: bool,
}

impl Cut {
    /// Creates a cut with quantity 1 and an empty label.
    pub fn new(id: impl Into<CutId>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            quantity: 1,
            label: String::new(),
            rotatable: true,
        }
    }

    /// Sets the quantity.
    pub fn with_quantity(mut self, quantity: usize) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Allows or forbids rotation (e.g. for patterned glass with a grain).
    pub fn with_rotation(mut self, rotatable: bool) -> Self {
        self.rotatable = rotatable;
        self
    }

    /// Area of a single copy.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Validates dimensions and quantity.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::InvalidCut(format!(
                "cut '{}': width must be a positive number, got {}",
                self.id, self.width
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(Error::InvalidCut(format!(
                "cut '{}': height must be a positive number, got {}",
                self.id, self.height
            )));
        }
        if self.quantity == 0 {
            return Err(Error::InvalidCut(format!(
                "cut '{}': quantity must be at least 1",
                self.id
            )));
        }
        Ok(())
    }

    /// Expands this cut into `quantity` unit pieces.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        (0..self.quantity).map(move |i| Piece {
            id: format!("{}_{}", self.id, i),
            original_id: self.id.clone(),
            width: self.width,
            height: self.height,
            label: self.label.clone(),
            rotatable: self.rotatable,
        })
    }
}

/// A single copy of a [`Cut`], the unit handled by the packers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Piece {
    /// Unique id of this copy (`{cut_id}_{index}`).
    pub id: String,
    /// Id of the cut this copy was expanded from.
    pub original_id: CutId,
    /// Requested width (unrotated).
    pub width: f64,
    /// Requested height (unrotated).
    pub height: f64,
    /// Label of the originating cut.
    pub label: String,
    /// Whether the piece may be turned by 90 degrees.
    pub rotatable: bool,
}

impl Piece {
    /// Area of the piece.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Orientations to try, unrotated first.
    pub fn orientations(&self) -> &'static [bool] {
        if self.rotatable {
            &[false, true]
        } else {
            &[false]
        }
    }

    /// Returns the footprint for the given orientation.
    pub fn oriented(&self, rotated: bool) -> (f64, f64) {
        if rotated {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

/// Validates a cut list and expands it into unit pieces in list order.
pub fn expand_cuts(cuts: &[Cut]) -> Result<Vec<Piece>> {
    validate_cuts(cuts)?;
    Ok(cuts.iter().flat_map(Cut::pieces).collect())
}

/// Validates every cut in a list. Cut ids must be unique.
pub fn validate_cuts(cuts: &[Cut]) -> Result<()> {
    let mut seen = HashSet::with_capacity(cuts.len());
    for cut in cuts {
        cut.validate()?;
        if !seen.insert(cut.id.as_str()) {
            return Err(Error::InvalidCut(format!("duplicate cut id '{}'", cut.id)));
        }
    }
    Ok(())
}

/// Total number of unit pieces requested by a cut list.
pub fn total_quantity(cuts: &[Cut]) -> usize {
    cuts.iter().map(|c| c.quantity).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_keeps_back_reference() {
        let cuts = vec![
            Cut::new("A", 50.0, 30.0).with_quantity(2).with_label("door"),
            Cut::new("B", 10.0, 10.0),
        ];
        let pieces = expand_cuts(&cuts).unwrap();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].id, "A_0");
        assert_eq!(pieces[1].id, "A_1");
        assert_eq!(pieces[1].original_id, "A");
        assert_eq!(pieces[1].label, "door");
        assert_eq!(pieces[2].id, "B_0");
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let cuts = vec![Cut::new("A", 50.0, 30.0).with_quantity(0)];
        assert!(matches!(expand_cuts(&cuts), Err(Error::InvalidCut(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let cuts = vec![
            Cut::new("A", 30.0, 30.0).with_quantity(2),
            Cut::new("A", 50.0, 10.0),
        ];
        assert!(matches!(validate_cuts(&cuts), Err(Error::InvalidCut(_))));
        assert!(expand_cuts(&cuts).is_err());

        // similar ids expand to distinct pieces
        let cuts = vec![Cut::new("A", 10.0, 10.0), Cut::new("A_0", 10.0, 10.0)];
        let ids: Vec<_> = expand_cuts(&cuts).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["A_0", "A_0_0"]);
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        assert!(Cut::new("A", 0.0, 30.0).validate().is_err());
        assert!(Cut::new("A", 10.0, -1.0).validate().is_err());
        assert!(Cut::new("A", f64::INFINITY, 1.0).validate().is_err());
    }

    #[test]
    fn test_oriented() {
        let piece = Cut::new("A", 50.0, 30.0).pieces().next().unwrap();
        assert_eq!(piece.oriented(false), (50.0, 30.0));
        assert_eq!(piece.oriented(true), (30.0, 50.0));
        assert_eq!(piece.orientations(), &[false, true]);
    }

    #[test]
    fn test_fixed_orientation() {
        let piece = Cut::new("A", 50.0, 30.0)
            .with_rotation(false)
            .pieces()
            .next()
            .unwrap();
        assert_eq!(piece.orientations(), &[false]);
    }
}
