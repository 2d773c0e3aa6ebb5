//! Generator instance and dispatch.
//!
//! A [`Fill`] owns the per-object [`FillState`] (layer, spacing, angle, ...) and a
//! boxed [`FillPattern`] picked from [`InfillPattern`]. Read-only data shared by all
//! layers of an object (adaptive octree, print configuration) is borrowed through
//! [`FillRefs`] and must outlive the instance.

use super::adaptive::{AdaptiveCubic, Octree};
use super::concentric::Concentric;
use super::honeycomb::Honeycomb;
use super::lightning::Lightning;
use super::rectilinear::{Cubic, Grid, Monotonic, Rectilinear, Stars, SupportBase, Triangles};
use super::{FillParams, InfillPattern};
use crate::clipper::{offset_expolygon, OffsetJoinType};
use crate::config::{PrintConfig, PrintObjectConfig};
use crate::geometry::{BoundingBox, ExPolygon, Point, Polylines, ThickPolyline, ThickPolylines};
use crate::slice::Surface;
use crate::{scale, Coord, CoordF, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// Mutable state of a generator, kept across the layers of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillState {
    /// Index of the layer being filled. Drives the per-layer angle.
    pub layer_id: Option<usize>,
    /// Z of the layer (mm).
    pub z: CoordF,
    /// Line spacing (mm). Full infill may overwrite it with the adjusted value.
    pub spacing: CoordF,
    /// Overlap of the infill with the perimeters (mm).
    pub overlap: CoordF,
    /// Base infill angle (radians).
    pub angle: Option<CoordF>,
    /// Per-layer angles (degrees) cycled instead of the pattern's own alternation.
    pub layer_angles: Vec<CoordF>,
    /// Longest boundary link between two lines, 0 = unlimited.
    pub link_max_length: Coord,
    /// Length cut off the end of closed loops.
    pub loop_clipping: Coord,
    /// Bounding box of the whole object; undefined when not known.
    pub bounding_box: BoundingBox,
}

impl Default for FillState {
    fn default() -> Self {
        Self {
            layer_id: None,
            z: 0.0,
            spacing: 0.0,
            overlap: 0.0,
            angle: None,
            layer_angles: Vec::new(),
            link_max_length: 0,
            loop_clipping: 0,
            bounding_box: BoundingBox::new(),
        }
    }
}

/// Borrowed read-only references shared by all fills of an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillRefs<'a> {
    /// Octree for adaptive cubic infill.
    pub adapt_fill_octree: Option<&'a Octree>,
    /// Print-wide settings, read by the Arachne path only.
    pub print_config: Option<&'a PrintConfig>,
    /// Object settings, read by the Arachne path only.
    pub print_object_config: Option<&'a PrintObjectConfig>,
}

/// Angle and origin of the pattern for one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfillDirection {
    /// Angle in radians.
    pub angle: CoordF,
    /// Point the pattern phase is anchored to.
    pub origin: Point,
}

/// Everything a pattern sees while filling one island.
pub struct FillContext<'s, 'a> {
    pub state: &'s mut FillState,
    pub refs: FillRefs<'a>,
    pub params: FillParams,
    pub thickness_layers: usize,
    pub direction: InfillDirection,
}

impl FillContext<'_, '_> {
    /// Effective distance between neighbouring lines, `spacing / density`, scaled.
    pub fn line_pitch(&self) -> Coord {
        (scale(self.state.spacing) as CoordF / self.params.density).round() as Coord
    }
}

/// A pattern generator.
///
/// Implementations are stateless; everything that varies per layer lives in the
/// [`FillContext`].
pub trait FillPattern: fmt::Debug + Send + Sync {
    /// Which pattern this is.
    fn pattern(&self) -> InfillPattern;

    /// Boxed copy, used by [`Fill::duplicate`].
    fn clone_box(&self) -> Box<dyn FillPattern>;

    /// The output may legitimately touch or cross itself.
    fn is_self_crossing(&self) -> bool;

    /// The same region gives congruent output whatever the layer.
    fn has_consistent_pattern(&self) -> bool {
        false
    }

    /// The output order is final and must not be re-sorted.
    fn no_sort(&self) -> bool {
        false
    }

    /// Angle added to the base angle on the layer with index `idx`.
    fn layer_angle(&self, idx: usize) -> CoordF {
        if idx & 1 == 1 {
            FRAC_PI_2
        } else {
            0.0
        }
    }

    /// Fill one island of an already inset region.
    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines>;

    /// Fill one island with width-annotated paths. Patterns without a
    /// variable-width variant return their regular lines at the nominal width.
    fn fill_surface_single_arachne(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<ThickPolylines> {
        let polylines = self.fill_surface_single(ctx, expolygon)?;
        let width = scale(ctx.state.spacing);
        Ok(polylines
            .into_iter()
            .map(|pl| ThickPolyline::from_polyline(pl, width))
            .collect())
    }
}

/// A generator instance: one pattern plus the state it carries across layers.
#[derive(Debug)]
pub struct Fill<'a> {
    pub state: FillState,
    pattern: Box<dyn FillPattern>,
    refs: FillRefs<'a>,
}

impl<'a> Fill<'a> {
    /// Create a generator for `pattern`.
    pub fn new_from_type(pattern: InfillPattern) -> Self {
        let pattern: Box<dyn FillPattern> = match pattern {
            InfillPattern::Concentric => Box::new(Concentric),
            InfillPattern::Rectilinear => Box::new(Rectilinear),
            InfillPattern::Grid => Box::new(Grid),
            InfillPattern::Triangles => Box::new(Triangles),
            InfillPattern::Stars => Box::new(Stars),
            InfillPattern::Cubic => Box::new(Cubic),
            InfillPattern::Honeycomb => Box::new(Honeycomb),
            InfillPattern::AdaptiveCubic => Box::new(AdaptiveCubic),
            InfillPattern::SupportBase => Box::new(SupportBase),
            InfillPattern::Lightning => Box::new(Lightning),
            InfillPattern::Monotonic => Box::new(Monotonic),
        };
        Self {
            state: FillState::default(),
            pattern,
            refs: FillRefs::default(),
        }
    }

    /// Create a generator from a configuration id.
    ///
    /// # Panics
    /// When `name` is not a known pattern id. Ids are validated while the
    /// configuration is parsed, so an unknown one here is a bug in the caller.
    pub fn new_from_name(name: &str) -> Self {
        match name.parse::<InfillPattern>() {
            Ok(pattern) => Self::new_from_type(pattern),
            Err(err) => panic!("{err}"),
        }
    }

    /// Independent copy with the same state, for handing work to another thread.
    pub fn duplicate(&self) -> Self {
        Self {
            state: self.state.clone(),
            pattern: self.pattern.clone_box(),
            refs: self.refs,
        }
    }

    /// Whether `pattern` is printed with bridging flow.
    pub fn use_bridge_flow(pattern: InfillPattern) -> bool {
        pattern.uses_bridge_flow()
    }

    pub fn with_octree(mut self, octree: &'a Octree) -> Self {
        self.refs.adapt_fill_octree = Some(octree);
        self
    }

    pub fn with_print_config(mut self, config: &'a PrintConfig) -> Self {
        self.refs.print_config = Some(config);
        self
    }

    pub fn with_print_object_config(mut self, config: &'a PrintObjectConfig) -> Self {
        self.refs.print_object_config = Some(config);
        self
    }

    pub fn pattern(&self) -> InfillPattern {
        self.pattern.pattern()
    }

    pub fn refs(&self) -> FillRefs<'a> {
        self.refs
    }

    pub fn is_self_crossing(&self) -> bool {
        self.pattern.is_self_crossing()
    }

    pub fn has_consistent_pattern(&self) -> bool {
        self.pattern.has_consistent_pattern()
    }

    pub fn no_sort(&self) -> bool {
        self.pattern.no_sort()
    }

    /// Angle and origin of the pattern for `surface` on the current layer.
    ///
    /// A bridge angle replaces the base angle. Otherwise the layer angle of
    /// `layer_id / thickness_layers` is added to it. The origin is the center of
    /// the object bounding box, or of the surface when that box is unset.
    pub fn infill_direction(&self, surface: &Surface) -> InfillDirection {
        let mut angle = match self.state.angle {
            Some(angle) => angle,
            None => {
                warn!("Using undefined infill angle");
                0.0
            }
        };

        let origin = if self.state.bounding_box.is_defined() {
            self.state.bounding_box.center()
        } else {
            surface.expolygon.contour.bounding_box().center()
        };

        if let Some(bridge_angle) = surface.bridge_angle {
            angle = bridge_angle;
        } else {
            if surface.is_bridge() {
                debug!("Bridge surface without a bridge angle, using the layer angle");
            }
            if let Some(layer_id) = self.state.layer_id {
                let idx = layer_id / surface.thickness_layers.max(1);
                angle += self.layer_angle(idx);
            }
        }

        InfillDirection {
            angle: angle + FRAC_PI_2,
            origin,
        }
    }

    fn layer_angle(&self, idx: usize) -> CoordF {
        if self.state.layer_angles.is_empty() {
            self.pattern.layer_angle(idx)
        } else {
            let n = self.state.layer_angles.len();
            self.state.layer_angles[idx % n].to_radians()
        }
    }

    /// Inset `surface` by half a line (minus the overlap) and return the islands.
    fn prepare(&self, surface: &Surface, params: &FillParams) -> Option<Vec<ExPolygon>> {
        if params.density <= 0.0 || surface.area() <= 0.0 {
            return None;
        }
        assert!(
            self.state.spacing > 0.0,
            "fill spacing must be set before filling"
        );
        let delta = self.state.overlap - 0.5 * self.state.spacing;
        Some(offset_expolygon(&surface.expolygon, delta, OffsetJoinType::Miter))
    }

    /// Fill a surface with toolpaths.
    ///
    /// A surface without area, or a zero density, gives an empty result.
    ///
    /// # Errors
    /// [`Error::InfillFailed`](crate::Error::InfillFailed) when the pattern produced
    /// nothing for a region with area, [`Error::Config`](crate::Error::Config) when a
    /// reference the pattern needs is missing.
    ///
    /// # Panics
    /// When `state.spacing` is not positive.
    pub fn fill_surface(&mut self, surface: &Surface, params: &FillParams) -> Result<Polylines> {
        let Some(islands) = self.prepare(surface, params) else {
            return Ok(Vec::new());
        };
        let direction = self.infill_direction(surface);

        let mut polylines = Vec::new();
        for island in islands {
            let mut ctx = FillContext {
                state: &mut self.state,
                refs: self.refs,
                params: *params,
                thickness_layers: surface.thickness_layers,
                direction,
            };
            polylines.extend(self.pattern.fill_surface_single(&mut ctx, island)?);
        }

        debug!(
            "{} fill: {} paths, layer {:?}, density {:.3}",
            self.pattern.pattern(),
            polylines.len(),
            self.state.layer_id,
            params.density
        );
        Ok(polylines)
    }

    /// Fill a surface with width-annotated toolpaths.
    ///
    /// Same contract as [`Fill::fill_surface`].
    pub fn fill_surface_arachne(
        &mut self,
        surface: &Surface,
        params: &FillParams,
    ) -> Result<ThickPolylines> {
        let Some(islands) = self.prepare(surface, params) else {
            return Ok(Vec::new());
        };
        let direction = self.infill_direction(surface);

        let mut polylines = Vec::new();
        for island in islands {
            let mut ctx = FillContext {
                state: &mut self.state,
                refs: self.refs,
                params: *params,
                thickness_layers: surface.thickness_layers,
                direction,
            };
            polylines.extend(self.pattern.fill_surface_single_arachne(&mut ctx, island)?);
        }

        debug!(
            "{} variable-width fill: {} paths, layer {:?}",
            self.pattern.pattern(),
            polylines.len(),
            self.state.layer_id
        );
        Ok(polylines)
    }
}

impl Clone for Fill<'_> {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}
