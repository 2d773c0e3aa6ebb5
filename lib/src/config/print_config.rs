//! Print configuration types.
//!
//! Only the settings the fill engine reads are carried here: the extrusion
//! geometry of the print and the variable-width bead limits of an object. The
//! generators borrow them read-only.

use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extrusion width used when none is configured, as a multiple of the nozzle.
const AUTO_WIDTH_FACTOR: CoordF = 1.125;

/// Print-wide settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Default layer height (mm).
    pub layer_height: CoordF,
    /// Nozzle diameter (mm).
    pub nozzle_diameter: CoordF,
    /// Sparse infill extrusion width (mm), 0 = derived from the nozzle.
    pub infill_extrusion_width: CoordF,
    /// Solid infill extrusion width (mm), 0 = derived from the nozzle.
    pub solid_infill_extrusion_width: CoordF,
}

impl PrintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nozzle_diameter(mut self, diameter: CoordF) -> Self {
        self.nozzle_diameter = diameter;
        self
    }

    pub fn infill_extrusion_width(mut self, width: CoordF) -> Self {
        self.infill_extrusion_width = width;
        self
    }

    pub fn solid_infill_extrusion_width(mut self, width: CoordF) -> Self {
        self.solid_infill_extrusion_width = width;
        self
    }

    fn width_or_auto(&self, width: CoordF) -> CoordF {
        if width > 0.0 {
            width
        } else {
            AUTO_WIDTH_FACTOR * self.nozzle_diameter
        }
    }

    /// Line spacing of sparse infill (mm).
    pub fn infill_width(&self) -> CoordF {
        self.width_or_auto(self.infill_extrusion_width)
    }

    /// Line spacing of solid infill (mm).
    pub fn solid_infill_width(&self) -> CoordF {
        self.width_or_auto(self.solid_infill_extrusion_width)
    }

    /// Check the values a fill depends on.
    pub fn validate(&self) -> Result<(), String> {
        if self.layer_height <= 0.0 {
            return Err(format!("layer height must be positive, got {}", self.layer_height));
        }
        if self.nozzle_diameter <= 0.0 {
            return Err(format!("nozzle diameter must be positive, got {}", self.nozzle_diameter));
        }
        if self.infill_extrusion_width < 0.0 || self.solid_infill_extrusion_width < 0.0 {
            return Err("extrusion widths must not be negative".into());
        }
        Ok(())
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            nozzle_diameter: 0.4,
            infill_extrusion_width: 0.45,
            solid_infill_extrusion_width: 0.42,
        }
    }
}

impl fmt::Display for PrintConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "layer {:.2}mm, nozzle {:.2}mm, infill {:.2}mm, solid {:.2}mm",
            self.layer_height,
            self.nozzle_diameter,
            self.infill_width(),
            self.solid_infill_width()
        )
    }
}

/// Per-object limits for variable-width (Arachne) paths.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintObjectConfig {
    /// Narrower beads are not printed (mm).
    pub arachne_min_bead_width: CoordF,
    /// Gaps narrower than this are left empty (mm).
    pub arachne_min_feature_size: CoordF,
    /// Length over which a bead changes width (mm).
    pub arachne_wall_transition_length: CoordF,
    /// Corners sharper than this are not widened (degrees).
    pub arachne_wall_transition_angle: CoordF,
}

impl PrintObjectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arachne_min_bead_width(mut self, width: CoordF) -> Self {
        self.arachne_min_bead_width = width;
        self
    }

    pub fn arachne_wall_transition_angle(mut self, degrees: CoordF) -> Self {
        self.arachne_wall_transition_angle = degrees;
        self
    }
}

impl Default for PrintObjectConfig {
    fn default() -> Self {
        Self {
            arachne_min_bead_width: 0.1,
            arachne_min_feature_size: 0.1,
            arachne_wall_transition_length: 0.4,
            arachne_wall_transition_angle: 10.0,
        }
    }
}

impl fmt::Display for PrintObjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min bead {:.2}mm, min feature {:.2}mm, transition {:.2}mm / {:.0}°",
            self.arachne_min_bead_width,
            self.arachne_min_feature_size,
            self.arachne_wall_transition_length,
            self.arachne_wall_transition_angle
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_fall_back_to_nozzle() {
        let config = PrintConfig::new()
            .nozzle_diameter(0.6)
            .infill_extrusion_width(0.0);
        assert!((config.infill_width() - 0.675).abs() < 1e-9);
        assert!((config.solid_infill_width() - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_validation() {
        let mut config = PrintConfig::default();
        assert!(config.validate().is_ok());

        config.layer_height = 0.0;
        assert!(config.validate().is_err());

        config.layer_height = 0.2;
        config.solid_infill_extrusion_width = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.contains("negative"), "{err}");
    }

    #[test]
    fn test_object_config_builder() {
        let config = PrintObjectConfig::new()
            .arachne_min_bead_width(0.15)
            .arachne_wall_transition_angle(20.0);
        assert!((config.arachne_min_bead_width - 0.15).abs() < 1e-6);
        assert!((config.arachne_wall_transition_angle - 20.0).abs() < 1e-6);
        assert!((config.arachne_min_feature_size - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_configs_deserialize_partial() {
        let config: PrintObjectConfig =
            serde_json::from_str(r#"{"arachne_min_bead_width": 0.2}"#).unwrap();
        assert!((config.arachne_min_bead_width - 0.2).abs() < 1e-6);
        assert!((config.arachne_wall_transition_length - 0.4).abs() < 1e-6);

        let config: PrintConfig = serde_json::from_str(r#"{"nozzle_diameter": 0.6}"#).unwrap();
        assert!((config.nozzle_diameter - 0.6).abs() < 1e-6);
        assert!((config.infill_extrusion_width - 0.45).abs() < 1e-6);
    }
}
