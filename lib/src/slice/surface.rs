//! Classified layer regions.
//!
//! The fill engine only reads the geometry, the layer span used for combined
//! sparse infill and the bridge angle. The classification travels with the
//! region so that callers can pick a pattern and density per surface.

use crate::geometry::ExPolygon;
use crate::{CoordF, SCALING_FACTOR};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a surface sits within its layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    Top,
    Bottom,
    /// Bottom surface printed over air.
    BottomBridge,
    #[default]
    InternalSolid,
    /// Sparse infill.
    Internal,
    InternalBridge,
}

impl SurfaceType {
    pub fn is_bridge(&self) -> bool {
        matches!(self, SurfaceType::BottomBridge | SurfaceType::InternalBridge)
    }

    /// Everything but sparse infill is printed solid.
    pub fn is_solid(&self) -> bool {
        !matches!(self, SurfaceType::Internal)
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurfaceType::Top => "top",
            SurfaceType::Bottom => "bottom",
            SurfaceType::BottomBridge => "bottom bridge",
            SurfaceType::InternalSolid => "internal solid",
            SurfaceType::Internal => "internal",
            SurfaceType::InternalBridge => "internal bridge",
        };
        f.write_str(name)
    }
}

/// A region of one layer to be filled.
#[derive(Clone, Serialize, Deserialize)]
pub struct Surface {
    pub expolygon: ExPolygon,
    #[serde(default)]
    pub surface_type: SurfaceType,
    /// Layers covered when sparse infill of several layers is combined; the
    /// layer angle advances once per span.
    #[serde(default = "one_layer")]
    pub thickness_layers: usize,
    /// Fill angle (radians) replacing the per-layer angle.
    #[serde(default)]
    pub bridge_angle: Option<CoordF>,
}

fn one_layer() -> usize {
    1
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(ExPolygon::default(), SurfaceType::default())
    }
}

impl Surface {
    pub fn new(expolygon: ExPolygon, surface_type: SurfaceType) -> Self {
        Self {
            expolygon,
            surface_type,
            thickness_layers: 1,
            bridge_angle: None,
        }
    }

    pub fn internal(expolygon: ExPolygon) -> Self {
        Self::new(expolygon, SurfaceType::Internal)
    }

    pub fn internal_solid(expolygon: ExPolygon) -> Self {
        Self::new(expolygon, SurfaceType::InternalSolid)
    }

    /// Bridge over air, filled along `angle` when one is known.
    pub fn bridge(expolygon: ExPolygon, angle: Option<CoordF>) -> Self {
        Self {
            bridge_angle: angle,
            ..Self::new(expolygon, SurfaceType::BottomBridge)
        }
    }

    /// Area in scaled units squared.
    #[inline]
    pub fn area(&self) -> CoordF {
        self.expolygon.area()
    }

    pub fn is_bridge(&self) -> bool {
        self.surface_type.is_bridge()
    }

    pub fn is_solid(&self) -> bool {
        self.surface_type.is_solid()
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Surface({}, {:.2}mm², {} holes)",
            self.surface_type,
            self.area() / (SCALING_FACTOR * SCALING_FACTOR),
            self.expolygon.holes.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn unit_square() -> ExPolygon {
        ExPolygon::rectangle(Point::new(0, 0), Point::new(1_000_000, 1_000_000))
    }

    #[test]
    fn test_classification() {
        assert!(SurfaceType::Top.is_solid());
        assert!(SurfaceType::InternalBridge.is_bridge());
        assert!(!SurfaceType::Internal.is_solid());
        assert!(!SurfaceType::InternalSolid.is_bridge());
    }

    #[test]
    fn test_bridge_surface() {
        let bridge = Surface::bridge(unit_square(), Some(0.5));
        assert!(bridge.is_bridge());
        assert!(bridge.is_solid());
        assert_eq!(bridge.bridge_angle, Some(0.5));
        assert_eq!(bridge.thickness_layers, 1);
        assert!((bridge.area() - 1e12).abs() < 1.0);
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"expolygon": {"contour": {"points": [
            {"x": 0, "y": 0}, {"x": 1000, "y": 0}, {"x": 1000, "y": 1000}
        ]}}}"#;
        let surface: Surface = serde_json::from_str(json).unwrap();
        assert_eq!(surface.surface_type, SurfaceType::InternalSolid);
        assert_eq!(surface.thickness_layers, 1);
        assert_eq!(surface.bridge_angle, None);
        assert!(surface.expolygon.holes.is_empty());
    }

    #[test]
    fn test_debug_output() {
        let surface = Surface::internal(unit_square());
        assert_eq!(format!("{surface:?}"), "Surface(internal, 1.00mm², 0 holes)");
    }
}
