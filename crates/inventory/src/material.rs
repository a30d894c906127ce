//! Inventory sheets and their lifecycle.

use u_cutstock_core::{
    CuttingMethod, Error, PlacedCut, RemnantScan, Result, Sheet, MIN_REMNANT_SIZE,
};
use u_cutstock_sheet::calculate_remnants_with;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest side a leftover must have to be put back into stock.
pub const DEFAULT_REMNANT_MIN_SIDE: f64 = 200.0;

/// Stocked material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MaterialType {
    /// Float glass.
    Glass,
    /// Silvered glass.
    Mirror,
    /// Aluminium composite panel.
    Aluminum,
}

/// Where an inventory sheet came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SheetOrigin {
    /// Bought from a supplier.
    #[default]
    Purchase,
    /// Left over from an earlier cut plan.
    Remnant,
}

/// Inventory status of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SheetStatus {
    /// In stock and free to plan with.
    #[default]
    Available,
    /// Set aside for an accepted suggestion.
    Reserved,
    /// Cut.
    Used,
    /// Broken and unusable.
    Damaged,
}

impl SheetStatus {
    /// Returns true if a sheet may move from `self` to `next`.
    ///
    /// Available sheets are reserved for an order and then used. A
    /// reservation can be released, and unused sheets can break.
    pub fn can_transition_to(&self, next: SheetStatus) -> bool {
        use SheetStatus::*;
        matches!(
            (self, next),
            (Available, Reserved)
                | (Reserved, Used)
                | (Reserved, Available)
                | (Available, Damaged)
                | (Reserved, Damaged)
        )
    }
}

/// A physical sheet in stock.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaterialSheet {
    /// Inventory id.
    pub id: String,
    /// Stocked material.
    pub material_type: MaterialType,
    /// Thickness in millimetres.
    pub thickness: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Purchase or remnant.
    pub origin: SheetOrigin,
    /// Inventory status.
    pub status: SheetStatus,
    /// Purchase cost; remnants cost nothing.
    pub cost: f64,
    /// Sheet this remnant was cut from.
    pub parent_sheet_id: Option<String>,
}

impl MaterialSheet {
    /// Creates an available purchased sheet with zero cost.
    pub fn new(
        id: impl Into<String>,
        material_type: MaterialType,
        thickness: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            material_type,
            thickness,
            width,
            height,
            origin: SheetOrigin::Purchase,
            status: SheetStatus::Available,
            cost: 0.0,
            parent_sheet_id: None,
        }
    }

    /// Sets the purchase cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the origin.
    pub fn with_origin(mut self, origin: SheetOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: SheetStatus) -> Self {
        self.status = status;
        self
    }

    /// Marks the sheet as a remnant of `parent_id`.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.origin = SheetOrigin::Remnant;
        self.parent_sheet_id = Some(parent_id.into());
        self
    }

    /// Sheet area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns true if the sheet was left over from an earlier job.
    pub fn is_remnant(&self) -> bool {
        self.origin == SheetOrigin::Remnant
    }

    /// Returns true if the sheet is available and matches the material and
    /// thickness within `tolerance` mm.
    pub fn matches(&self, material_type: MaterialType, thickness: f64, tolerance: f64) -> bool {
        self.status == SheetStatus::Available
            && self.material_type == material_type
            && (self.thickness - thickness).abs() < tolerance
    }

    /// Packing sheet for this stock item.
    pub fn to_sheet(&self, kerf: f64, cutting_method: CuttingMethod) -> Sheet {
        Sheet::new(self.width, self.height)
            .with_kerf(kerf)
            .with_thickness(self.thickness)
            .with_cutting_method(cutting_method)
    }

    /// Moves the sheet to `next`, rejecting transitions the lifecycle forbids.
    pub fn transition(&mut self, next: SheetStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidInput(format!(
                "sheet '{}' cannot go from {:?} to {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    /// Validates dimensions, thickness and cost.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("thickness", self.thickness),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidSheet(format!(
                    "sheet '{}': {} must be a positive number, got {}",
                    self.id, name, value
                )));
            }
        }
        if !(self.cost.is_finite() && self.cost >= 0.0) {
            return Err(Error::InvalidSheet(format!(
                "sheet '{}': cost must be zero or positive, got {}",
                self.id, self.cost
            )));
        }
        Ok(())
    }
}

/// Turns the leftovers of an executed cut plan into new stock sheets.
///
/// Only leftovers with both sides at least `min_side` (and never below
/// [`MIN_REMNANT_SIZE`]) are kept. `id_fn` receives the index of each new
/// sheet, largest first. A malformed parent sheet or kerf is an error.
pub fn derive_remnant_sheets<F>(
    parent: &MaterialSheet,
    placed: &[PlacedCut],
    kerf: f64,
    min_side: f64,
    mut id_fn: F,
) -> Result<Vec<MaterialSheet>>
where
    F: FnMut(usize) -> String,
{
    parent.validate()?;
    let sheet = parent.to_sheet(kerf, CuttingMethod::Machine);
    let min_side = min_side.max(MIN_REMNANT_SIZE);

    let remnants = calculate_remnants_with(placed, &sheet, RemnantScan::Greedy, min_side)?;
    Ok(remnants
        .into_iter()
        .enumerate()
        .map(|(i, r)| MaterialSheet {
            id: id_fn(i),
            material_type: parent.material_type,
            thickness: parent.thickness,
            width: r.width,
            height: r.height,
            origin: SheetOrigin::Remnant,
            status: SheetStatus::Available,
            cost: 0.0,
            parent_sheet_id: Some(parent.id.clone()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_cutstock_core::Cut;

    #[test]
    fn test_lifecycle() {
        use SheetStatus::*;
        assert!(Available.can_transition_to(Reserved));
        assert!(Reserved.can_transition_to(Used));
        assert!(Reserved.can_transition_to(Available));
        assert!(Available.can_transition_to(Damaged));
        assert!(!Available.can_transition_to(Used));
        assert!(!Used.can_transition_to(Available));
        assert!(!Damaged.can_transition_to(Available));
    }

    #[test]
    fn test_transition() {
        let mut sheet = MaterialSheet::new("S1", MaterialType::Glass, 4.0, 100.0, 100.0);
        sheet.transition(SheetStatus::Reserved).unwrap();
        sheet.transition(SheetStatus::Used).unwrap();
        assert_eq!(sheet.status, SheetStatus::Used);
        assert!(sheet.transition(SheetStatus::Available).is_err());
    }

    #[test]
    fn test_matches() {
        let sheet = MaterialSheet::new("S1", MaterialType::Glass, 4.0, 100.0, 100.0);
        assert!(sheet.matches(MaterialType::Glass, 4.3, 0.5));
        assert!(!sheet.matches(MaterialType::Glass, 4.5, 0.5));
        assert!(!sheet.matches(MaterialType::Mirror, 4.0, 0.5));
        let reserved = sheet.with_status(SheetStatus::Reserved);
        assert!(!reserved.matches(MaterialType::Glass, 4.0, 0.5));
    }

    #[test]
    fn test_validate() {
        assert!(MaterialSheet::new("S", MaterialType::Glass, 4.0, 10.0, 10.0)
            .validate()
            .is_ok());
        assert!(MaterialSheet::new("S", MaterialType::Glass, 0.0, 10.0, 10.0)
            .validate()
            .is_err());
        assert!(MaterialSheet::new("S", MaterialType::Glass, 4.0, 10.0, 10.0)
            .with_cost(-1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_derive_remnant_sheets() {
        let parent =
            MaterialSheet::new("P", MaterialType::Mirror, 5.0, 1000.0, 800.0).with_cost(90.0);
        let piece = Cut::new("A", 600.0, 500.0).pieces().next().unwrap();
        let placed = vec![PlacedCut::new(piece, 0.0, 0.0, false)];

        let derived = derive_remnant_sheets(&parent, &placed, 0.0, DEFAULT_REMNANT_MIN_SIDE, |i| {
            format!("P-R{}", i)
        })
        .unwrap();

        // 400 x 800 strip on the right, 600 x 300 block on top
        assert_eq!(derived.len(), 2);
        assert_eq!(derived[0].id, "P-R0");
        assert_eq!((derived[0].width, derived[0].height), (400.0, 800.0));
        assert_eq!((derived[1].width, derived[1].height), (600.0, 300.0));
        for sheet in &derived {
            assert!(sheet.is_remnant());
            assert_eq!(sheet.status, SheetStatus::Available);
            assert_eq!(sheet.cost, 0.0);
            assert_eq!(sheet.parent_sheet_id.as_deref(), Some("P"));
            assert_eq!(sheet.material_type, MaterialType::Mirror);
        }
    }

    #[test]
    fn test_derive_drops_small_leftovers() {
        let parent = MaterialSheet::new("P", MaterialType::Glass, 4.0, 1000.0, 800.0);
        let piece = Cut::new("A", 900.0, 700.0).pieces().next().unwrap();
        let placed = vec![PlacedCut::new(piece, 0.0, 0.0, false)];
        let derived =
            derive_remnant_sheets(&parent, &placed, 0.0, 200.0, |i| i.to_string()).unwrap();
        assert!(derived.is_empty());
    }

    #[test]
    fn test_derive_rejects_malformed_input() {
        let parent = MaterialSheet::new("P", MaterialType::Glass, 4.0, -10.0, 800.0);
        assert!(matches!(
            derive_remnant_sheets(&parent, &[], 0.0, 200.0, |i| i.to_string()),
            Err(Error::InvalidSheet(_))
        ));

        let parent = MaterialSheet::new("P", MaterialType::Glass, 4.0, 1000.0, 800.0);
        assert!(derive_remnant_sheets(&parent, &[], f64::NAN, 200.0, |i| i.to_string()).is_err());
    }
}
