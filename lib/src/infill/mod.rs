//! Infill pattern generation module.
//!
//! This module turns one region of a layer into infill toolpaths:
//! - [`Fill`] - A generator instance: pattern, per-object state and borrowed references
//! - [`FillParams`] - The immutable per-call parameters
//! - [`InfillPattern`] - The closed set of supported patterns
//!
//! # Overview
//!
//! 1. The region is inset by half a line width (plus the configured overlap)
//! 2. A direction (angle and origin) is chosen for the layer
//! 3. The pattern generator emits raw lines for every island of the inset region
//! 4. Unless disabled, the connector joins consecutive lines along the boundary
//!
//! Line-family patterns (rectilinear, grid, triangles, stars, cubic, monotonic,
//! support base) share one scan-line engine in [`rectilinear`].

pub mod adaptive;
mod base;
pub mod concentric;
pub mod connect;
pub mod honeycomb;
pub mod lightning;
mod params;
pub mod rectilinear;
mod spacing;

pub use adaptive::{Cube, CubeProperties, Octree, Vec3d};
pub use base::{Fill, FillContext, FillPattern, FillRefs, FillState, InfillDirection};
pub use connect::{chain_polylines, connect_base_support, connect_infill, connect_infill_polygons};
pub use params::FillParams;
pub use spacing::adjust_solid_spacing;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Infill pattern types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfillPattern {
    /// Inward offset loops.
    Concentric,
    /// Parallel lines, alternating direction per layer.
    #[default]
    Rectilinear,
    /// Two crossing line families at 90°.
    Grid,
    /// Three crossing line families at 60°.
    Triangles,
    /// Triangles with one family shifted so the lines form stars.
    Stars,
    /// Three line families whose phase follows z, forming cubes.
    Cubic,
    /// Hexagonal zig-zag columns.
    Honeycomb,
    /// Cubic lines read from a precomputed octree, denser near surfaces.
    #[serde(rename = "adaptivecubic")]
    AdaptiveCubic,
    /// Base layers of support material.
    #[serde(rename = "supportbase")]
    SupportBase,
    /// Tree-like branches holding up the surfaces above.
    Lightning,
    /// Rectilinear lines all printed in one sweep direction.
    Monotonic,
}

impl InfillPattern {
    /// Every pattern, in id order.
    pub const ALL: [InfillPattern; 11] = [
        InfillPattern::Concentric,
        InfillPattern::Rectilinear,
        InfillPattern::Grid,
        InfillPattern::Triangles,
        InfillPattern::Stars,
        InfillPattern::Cubic,
        InfillPattern::Honeycomb,
        InfillPattern::AdaptiveCubic,
        InfillPattern::SupportBase,
        InfillPattern::Lightning,
        InfillPattern::Monotonic,
    ];

    /// Configuration id of the pattern.
    pub fn name(&self) -> &'static str {
        match self {
            InfillPattern::Concentric => "concentric",
            InfillPattern::Rectilinear => "rectilinear",
            InfillPattern::Grid => "grid",
            InfillPattern::Triangles => "triangles",
            InfillPattern::Stars => "stars",
            InfillPattern::Cubic => "cubic",
            InfillPattern::Honeycomb => "honeycomb",
            InfillPattern::AdaptiveCubic => "adaptivecubic",
            InfillPattern::SupportBase => "supportbase",
            InfillPattern::Lightning => "lightning",
            InfillPattern::Monotonic => "monotonic",
        }
    }

    /// Sparse patterns whose lines are printed with bridging flow.
    pub fn uses_bridge_flow(&self) -> bool {
        matches!(self, InfillPattern::Lightning)
    }

    /// Check if this pattern reads the adaptive octree.
    pub fn needs_octree(&self) -> bool {
        matches!(self, InfillPattern::AdaptiveCubic)
    }
}

impl fmt::Display for InfillPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InfillPattern {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InfillPattern::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| crate::Error::Config(format!("unknown infill pattern '{s}'")))
    }
}
