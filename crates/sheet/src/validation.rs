//! Minimum safe piece dimensions by material thickness and cutting method.
//!
//! Narrow strips of thick glass break when snapped by hand and chip under the
//! machine wheel. The thresholds below are in the same length unit as the
//! cut list; thickness is in millimetres.

use u_cutstock_core::{Cut, CuttingMethod, Sheet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `(max thickness, min dimension)` for hand-snapped cuts.
const MANUAL_RULES: [(f64, f64); 6] = [
    (3.0, 15.0),
    (4.0, 15.0),
    (5.0, 18.0),
    (6.0, 18.0),
    (8.0, 20.0),
    (10.0, 25.0),
];

/// `(max thickness, min dimension)` for machine cuts.
const MACHINE_RULES: [(f64, f64); 6] = [
    (3.0, 10.0),
    (4.0, 12.0),
    (5.0, 15.0),
    (6.0, 18.0),
    (8.0, 22.0),
    (10.0, 25.0),
];

/// Within this factor of the minimum a cut is flagged as risky.
const WARNING_FACTOR: f64 = 1.1;

const STANDARD_THICKNESSES: [f64; 7] = [3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 12.0];

/// Safety classification of a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValidationStatus {
    /// Comfortably above the minimum.
    Safe,
    /// Less than 10% above the minimum.
    Warning,
    /// Below the minimum.
    Danger,
}

/// Outcome of checking one cut against the minimum dimension.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CutValidation {
    /// Id of the checked cut.
    pub cut_id: String,
    /// Safety verdict.
    pub status: ValidationStatus,
    /// Operator-facing explanation.
    pub message: String,
    /// Minimum safe dimension for the sheet.
    pub min_dimension: f64,
}

/// Advice to switch a manual job to machine cutting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MethodRecommendation {
    /// Number of cuts below the manual minimum.
    pub cuts_below_minimum: usize,
    /// Manual minimum for the sheet thickness.
    pub min_dimension: f64,
    /// Operator-facing advice.
    pub message: String,
}

/// Rule table for a cutting method.
pub fn dimension_rules(method: CuttingMethod) -> &'static [(f64, f64)] {
    match method {
        CuttingMethod::Manual => &MANUAL_RULES,
        CuttingMethod::Machine => &MACHINE_RULES,
    }
}

/// Smallest safe side length for `thickness` mm material.
///
/// Thicker material than the table covers uses the last entry.
pub fn minimum_dimension(thickness: f64, method: CuttingMethod) -> f64 {
    let rules = dimension_rules(method);
    rules
        .iter()
        .find(|(max_thickness, _)| thickness <= *max_thickness)
        .or(rules.last())
        .map_or(0.0, |&(_, min)| min)
}

/// Classifies a cut for the sheet's thickness and cutting method.
pub fn validate_cut_dimensions(cut: &Cut, sheet: &Sheet) -> CutValidation {
    let min_dimension = minimum_dimension(sheet.thickness, sheet.cutting_method);
    let smallest = cut.width.min(cut.height);

    let (status, message) = if smallest < min_dimension {
        let how = match sheet.cutting_method {
            CuttingMethod::Manual => "manual cutting",
            CuttingMethod::Machine => "machine cutting",
        };
        (
            ValidationStatus::Danger,
            format!(
                "{} is too small for {}; recommended minimum is {}",
                smallest, how, min_dimension
            ),
        )
    } else if smallest < min_dimension * WARNING_FACTOR {
        (
            ValidationStatus::Warning,
            format!(
                "close to the minimum of {}; cut with care",
                min_dimension
            ),
        )
    } else {
        (ValidationStatus::Safe, "safe to cut".to_string())
    };

    CutValidation {
        cut_id: cut.id.clone(),
        status,
        message,
        min_dimension,
    }
}

/// Validates every cut of a list.
pub fn validate_cut_list(cuts: &[Cut], sheet: &Sheet) -> Vec<CutValidation> {
    cuts.iter()
        .map(|cut| validate_cut_dimensions(cut, sheet))
        .collect()
}

/// Suggests machine cutting when a manual job contains cuts below the
/// manual minimum. Returns `None` for machine sheets.
pub fn method_recommendation(cuts: &[Cut], sheet: &Sheet) -> Option<MethodRecommendation> {
    if sheet.cutting_method == CuttingMethod::Machine {
        return None;
    }

    let min_dimension = minimum_dimension(sheet.thickness, CuttingMethod::Manual);
    let cuts_below_minimum = cuts
        .iter()
        .filter(|c| c.width.min(c.height) < min_dimension)
        .count();

    (cuts_below_minimum > 0).then(|| MethodRecommendation {
        cuts_below_minimum,
        min_dimension,
        message: format!(
            "{} cut(s) are hard to snap by hand; consider machine cutting",
            cuts_below_minimum
        ),
    })
}

/// Commonly stocked glass thicknesses in millimetres.
pub fn standard_thicknesses() -> &'static [f64] {
    &STANDARD_THICKNESSES
}
