//! Per-invocation fill parameters.

use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Parameters of a single fill call.
///
/// A plain `Copy` value: built by the caller for each region, never mutated by the
/// generators, and freely shared between worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillParams {
    /// Fill density, fraction in [0, 1].
    pub density: CoordF,

    /// Length of an infill anchor along the perimeter (mm).
    pub anchor_length: CoordF,

    /// Upper bound for `anchor_length` (mm). Below 0.05 the lines are not connected.
    pub anchor_length_max: CoordF,

    /// G-code resolution (mm). Curved patterns are simplified to this tolerance.
    pub resolution: CoordF,

    /// Don't adjust spacing to fill the space evenly.
    pub dont_adjust: bool,

    /// Monotonic infill: every path advances in the same scan direction.
    pub monotonic: bool,

    /// Complete each loop on its own instead of joining paths (honeycomb).
    pub complete: bool,

    /// Concentric infill through the variable-width path generator.
    pub use_arachne: bool,

    /// Layer height (mm), only read with `use_arachne`.
    pub layer_height: CoordF,

    /// Print closed loops clockwise.
    pub prefer_clockwise: bool,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            density: 0.0,
            // Roughly the longest line that fits into 32-bit coordinates.
            anchor_length: 1000.0,
            anchor_length_max: 1000.0,
            resolution: 0.0125,
            dont_adjust: true,
            monotonic: false,
            complete: false,
            use_arachne: false,
            layer_height: 0.0,
            prefer_clockwise: false,
        }
    }
}

impl FillParams {
    /// Parameters with the given density and defaults elsewhere.
    pub fn with_density(density: CoordF) -> Self {
        Self {
            density,
            ..Default::default()
        }
    }

    /// Solid infill: lines tile the region exactly instead of being spread by density.
    #[inline]
    pub fn full_infill(&self) -> bool {
        self.density > 0.9999
    }

    /// Don't connect the fill lines around the inner perimeter.
    #[inline]
    pub fn dont_connect(&self) -> bool {
        self.anchor_length_max < 0.05
    }

    /// Effective anchor length in mm, capped by `anchor_length_max`.
    #[inline]
    pub fn effective_anchor_length(&self) -> CoordF {
        self.anchor_length.min(self.anchor_length_max).max(0.0)
    }

    pub fn anchors(mut self, length: CoordF, max: CoordF) -> Self {
        self.anchor_length = length;
        self.anchor_length_max = max;
        self
    }

    pub fn adjust(mut self, adjust: bool) -> Self {
        self.dont_adjust = !adjust;
        self
    }

    pub fn monotonic(mut self, monotonic: bool) -> Self {
        self.monotonic = monotonic;
        self
    }

    pub fn complete(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }

    pub fn arachne(mut self, layer_height: CoordF) -> Self {
        self.use_arachne = true;
        self.layer_height = layer_height;
        self
    }

    pub fn clockwise(mut self, prefer_clockwise: bool) -> Self {
        self.prefer_clockwise = prefer_clockwise;
        self
    }

    pub fn resolution(mut self, resolution: CoordF) -> Self {
        self.resolution = resolution;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = FillParams::default();
        assert_eq!(p.density, 0.0);
        assert_eq!(p.anchor_length, 1000.0);
        assert_eq!(p.anchor_length_max, 1000.0);
        assert!((p.resolution - 0.0125).abs() < 1e-12);
        assert!(p.dont_adjust);
        assert!(!p.monotonic && !p.complete && !p.use_arachne && !p.prefer_clockwise);
        assert!(!p.dont_connect());
    }

    #[test]
    fn test_full_infill_threshold() {
        assert!(!FillParams::with_density(0.9999).full_infill());
        assert!(FillParams::with_density(0.99995).full_infill());
        assert!(FillParams::with_density(1.0).full_infill());
        assert!(!FillParams::with_density(0.2).full_infill());
    }

    #[test]
    fn test_dont_connect_threshold() {
        assert!(FillParams::default().anchors(0.0, 0.02).dont_connect());
        assert!(!FillParams::default().anchors(0.0, 0.05).dont_connect());
    }

    #[test]
    fn test_effective_anchor_length() {
        let p = FillParams::default().anchors(3.0, 1.5);
        assert_eq!(p.effective_anchor_length(), 1.5);
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let p: FillParams = serde_json::from_str(r#"{"density": 0.4, "monotonic": true}"#).unwrap();
        assert_eq!(p.density, 0.4);
        assert!(p.monotonic);
        assert!(p.dont_adjust);
        assert_eq!(p.anchor_length_max, 1000.0);
    }
}
