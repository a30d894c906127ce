//! Stock sheet description.

use crate::geometry::Rect;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the sheet will be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CuttingMethod {
    /// Score-and-snap by hand. Every cut must run edge to edge.
    Manual,
    /// CNC cutting table. Irregular layouts are allowed.
    #[default]
    Machine,
}

impl CuttingMethod {
    /// Returns true if layouts must be guillotine-cuttable.
    pub fn requires_guillotine(&self) -> bool {
        matches!(self, Self::Manual)
    }
}

/// A stock sheet to pack pieces onto.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sheet {
    /// Sheet width.
    pub width: f64,
    /// Sheet height.
    pub height: f64,
    /// Material removed by each cut (0 for manual snapping).
    pub kerf: f64,
    /// Material thickness in millimetres.
    pub thickness: f64,
    /// Cutting method.
    pub cutting_method: CuttingMethod,
}

impl Sheet {
    /// Creates a machine-cut sheet with no kerf and no thickness information.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            kerf: 0.0,
            thickness: 0.0,
            cutting_method: CuttingMethod::Machine,
        }
    }

    /// Sets the kerf.
    pub fn with_kerf(mut self, kerf: f64) -> Self {
        self.kerf = kerf;
        self
    }

    /// Sets the material thickness.
    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Sets the cutting method.
    pub fn with_cutting_method(mut self, method: CuttingMethod) -> Self {
        self.cutting_method = method;
        self
    }

    /// Returns a copy of this sheet with different dimensions.
    pub fn resized(&self, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..self.clone()
        }
    }

    /// Sheet area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// The whole sheet as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width, self.height)
    }

    /// Validates dimensions and kerf.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::InvalidSheet(format!(
                "width must be a positive number, got {}",
                self.width
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(Error::InvalidSheet(format!(
                "height must be a positive number, got {}",
                self.height
            )));
        }
        if !(self.kerf.is_finite() && self.kerf >= 0.0) {
            return Err(Error::InvalidSheet(format!(
                "kerf must be zero or positive, got {}",
                self.kerf
            )));
        }
        if !(self.thickness.is_finite() && self.thickness >= 0.0) {
            return Err(Error::InvalidSheet(format!(
                "thickness must be zero or positive, got {}",
                self.thickness
            )));
        }
        Ok(())
    }
}
