//! # Slicer Fill
//!
//! Infill toolpath generation for layered 3D printing.
//!
//! Given one classified region of a layer (an outer contour with holes), this
//! library produces the toolpaths that fill it at a target density:
//! - Pattern generators (rectilinear, grid, triangles, stars, cubic, honeycomb,
//!   concentric, adaptive cubic, support base, lightning, monotonic)
//! - Per-layer direction selection so consecutive layers cross
//! - Solid spacing adjustment for gapless full infill
//! - A boundary-aware connector stitching raw lines into long paths
//! - Variable-width (Arachne) concentric paths
//!
//! ## Example
//!
//! ```rust,ignore
//! use slicer_fill::{ExPolygon, Fill, FillParams, InfillPattern, Point, Surface};
//!
//! let square = ExPolygon::rectangle(Point::new_scale(0.0, 0.0), Point::new_scale(10.0, 10.0));
//! let mut fill = Fill::new_from_type(InfillPattern::Rectilinear);
//! fill.state.spacing = 0.45;
//! fill.state.angle = Some(0.0);
//! let polylines = fill.fill_surface(&Surface::internal(square), &FillParams::with_density(0.2))?;
//! ```

// Core modules
pub mod arachne;
pub mod batch;
pub mod clipper;
pub mod config;
pub mod geometry;
pub mod infill;
pub mod slice;

// Re-export commonly used types
pub use config::{PrintConfig, PrintObjectConfig};
pub use geometry::{
    BoundingBox, ExPolygon, Line, Point, PointF, Polygon, Polyline, Polylines, ThickPolyline,
    ThickPolylines,
};
pub use slice::{Surface, SurfaceType};

// Re-export clipper operations
pub use clipper::{
    grow, intersection_pl, offset2, offset_expolygon, offset_expolygons, shrink, OffsetJoinType,
};

// Re-export infill generation
pub use infill::{
    adjust_solid_spacing, connect_base_support, connect_infill, connect_infill_polygons, Cube,
    CubeProperties, Fill, FillContext, FillParams, FillPattern, FillRefs, FillState,
    InfillDirection, InfillPattern, Octree, Vec3d,
};

// Re-export variable-width generation
pub use arachne::{ArachneParams, VariableWidthLoop};

// Re-export batch helpers
pub use batch::{fill_surfaces_parallel, FillJob};

/// Coordinate type used throughout the slicer.
/// Using i64 for integer coordinates (scaled by SCALING_FACTOR) to avoid floating-point issues.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 nanometer, so 1mm = 1_000_000 units.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Scale a floating-point coordinate to integer.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Scale a floating-point coordinate to integer (same as scale, for compatibility).
#[inline]
pub fn scaled(v: CoordF) -> Coord {
    scale(v)
}

/// Unscale an integer coordinate to floating-point (same as unscale, for compatibility).
#[inline]
pub fn unscaled(v: Coord) -> CoordF {
    unscale(v)
}

/// Result type used throughout the slicer.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fill operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    /// A generator produced nothing for a region that has area. Valid input never
    /// gets here, so this points at a degenerate region that slipped through.
    #[error("Infill failed: {0}")]
    InfillFailed(String),
}

impl Error {
    /// True for internal failures, as opposed to bad configuration or I/O.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::InfillFailed(_))
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
