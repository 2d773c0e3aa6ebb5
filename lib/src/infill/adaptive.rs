//! Adaptive cubic infill.
//!
//! Infill lines are read from an octree of cubes standing on one corner. Every
//! cube cut by the layer plane contributes the three walls that split it into
//! its children, so regions where the octree is subdivided further get denser
//! lines. The octree itself is computed elsewhere (usually from the mesh
//! surface) and only borrowed here; [`Octree::build_with`] and [`Octree::dense`]
//! cover synthetic trees.
//!
//! # Algorithm
//!
//! 1. For each of the three wall directions, walk the octree in the order the
//!    walls are met along that direction
//! 2. Emit the wall of every cube cut by the plane at `z`, extending the previous
//!    segment when it continues it
//! 3. Clip the segments to the region, drop short stubs and connect

use super::connect::{chain_polylines, connect_infill};
use super::{FillContext, FillPattern, InfillPattern};
use crate::clipper::intersection_pl;
use crate::geometry::{ExPolygon, Point, Polyline, Polylines};
use crate::{scale, Coord, CoordF, Error, Result};
use log::debug;
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

/// Offsets (in half edges) of the eight children of a cube, octree frame.
const CHILD_CENTERS: [[CoordF; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// Children in the order their walls are met along each line direction. The
/// first four share one wall plane, the last four the other.
const CHILD_TRAVERSAL_ORDER: [[usize; 8]; 3] = [
    [2, 3, 0, 1, 6, 7, 4, 5],
    [4, 0, 6, 2, 5, 1, 7, 3],
    [1, 5, 0, 4, 3, 7, 2, 6],
];

/// Rotation of the wall direction in the XY plane.
const DIRECTION_ANGLES: [CoordF; 3] = [0.0, 2.0 * PI / 3.0, -2.0 * PI / 3.0];

/// Rotation from the octree frame to the world, around X, Y then Z. Puts the
/// cube diagonal upright.
const OCTREE_ROT: [CoordF; 3] = [5.0 * PI / 4.0, 3.757_072_362_260_180_5, PI / 6.0];

/// Endpoints closer than this continue the previous segment.
const JOIN_EPSILON: Coord = 1000;

// ============================================================================
// Vectors
// ============================================================================

/// 3D vector in mm.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3d {
    pub x: CoordF,
    pub y: CoordF,
    pub z: CoordF,
}

impl Vec3d {
    pub const fn new(x: CoordF, y: CoordF, z: CoordF) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> CoordF {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> CoordF {
        self.dot(self).sqrt()
    }

    fn rotate_x(self, angle: CoordF) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(self.x, c * self.y - s * self.z, s * self.y + c * self.z)
    }

    fn rotate_y(self, angle: CoordF) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c * self.x + s * self.z, self.y, -s * self.x + c * self.z)
    }

    fn rotate_z(self, angle: CoordF) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c * self.x - s * self.y, s * self.x + c * self.y, self.z)
    }

    /// Map a vector of the octree frame to the world.
    pub fn octree_to_world(self) -> Self {
        self.rotate_x(OCTREE_ROT[0])
            .rotate_y(OCTREE_ROT[1])
            .rotate_z(OCTREE_ROT[2])
    }
}

impl Add for Vec3d {
    type Output = Vec3d;

    fn add(self, rhs: Vec3d) -> Vec3d {
        Vec3d::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3d {
    type Output = Vec3d;

    fn sub(self, rhs: Vec3d) -> Vec3d {
        Vec3d::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<CoordF> for Vec3d {
    type Output = Vec3d;

    fn mul(self, s: CoordF) -> Vec3d {
        Vec3d::new(self.x * s, self.y * s, self.z * s)
    }
}

// ============================================================================
// Octree
// ============================================================================

/// Dimensions of the cubes of one octree level (mm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeProperties {
    pub edge_length: CoordF,
    /// Vertical extent of the cube standing on its corner.
    pub height: CoordF,
    /// Length of a face diagonal.
    pub diagonal_length: CoordF,
    /// Half the vertical extent of the splitting walls.
    pub line_z_distance: CoordF,
    /// Horizontal distance of a wall from the cube center at the center height.
    pub line_xy_distance: CoordF,
}

impl CubeProperties {
    pub fn new(edge_length: CoordF) -> Self {
        Self {
            edge_length,
            height: edge_length * 3f64.sqrt(),
            diagonal_length: edge_length * 2f64.sqrt(),
            line_z_distance: edge_length / 3f64.sqrt(),
            line_xy_distance: edge_length / 6f64.sqrt(),
        }
    }

    /// Properties of every level, finest first: the finest cube spans two
    /// lines, the coarsest covers `max_edge_length`.
    pub fn levels(max_edge_length: CoordF, line_spacing: CoordF) -> Vec<CubeProperties> {
        let mut levels = Vec::new();
        if line_spacing <= 0.0 {
            return levels;
        }
        let mut edge_length = 2.0 * line_spacing;
        loop {
            levels.push(CubeProperties::new(edge_length));
            if edge_length > max_edge_length + 1e-6 {
                break;
            }
            edge_length *= 2.0;
        }
        levels
    }
}

/// One octree node. Center in world coordinates (mm).
#[derive(Debug, Clone)]
pub struct Cube {
    pub center: Vec3d,
    pub children: [Option<Box<Cube>>; 8],
}

impl Cube {
    pub fn new(center: Vec3d) -> Self {
        Self {
            center,
            children: Default::default(),
        }
    }

    fn count(&self) -> usize {
        1 + self.children.iter().flatten().map(|c| c.count()).sum::<usize>()
    }
}

/// Read-only spatial index driving the adaptive pattern.
#[derive(Debug, Clone)]
pub struct Octree {
    pub root_cube: Option<Box<Cube>>,
    pub origin: Vec3d,
    /// Cube dimensions per level, finest first; the root is the last level.
    pub cubes_properties: Vec<CubeProperties>,
}

impl Octree {
    pub fn new(origin: Vec3d, cubes_properties: Vec<CubeProperties>) -> Self {
        Self {
            root_cube: Some(Box::new(Cube::new(origin))),
            origin,
            cubes_properties,
        }
    }

    /// Build an octree centered on `center` covering `size` mm, subdividing a
    /// cube wherever `refine(child_center, child_edge)` says so.
    ///
    /// Returns `None` when `size` fits a single finest cube.
    pub fn build_with<F>(
        center: Vec3d,
        size: CoordF,
        line_spacing: CoordF,
        mut refine: F,
    ) -> Option<Self>
    where
        F: FnMut(Vec3d, CoordF) -> bool,
    {
        let levels = CubeProperties::levels(size, line_spacing);
        if levels.len() <= 1 {
            return None;
        }
        let mut octree = Octree::new(center, levels);
        let depth = octree.cubes_properties.len() - 1;
        if let Some(root) = octree.root_cube.as_deref_mut() {
            subdivide(root, depth, &octree.cubes_properties, &mut refine);
        }
        debug!(
            "adaptive octree: {} levels, {} cubes",
            octree.cubes_properties.len(),
            octree.cube_count()
        );
        Some(octree)
    }

    /// Fully subdivided octree, the equivalent of cubic infill at `line_spacing`.
    ///
    /// The number of cubes grows with the cube of `size / line_spacing`.
    pub fn dense(center: Vec3d, size: CoordF, line_spacing: CoordF) -> Option<Self> {
        Self::build_with(center, size, line_spacing, |_, _| true)
    }

    pub fn cube_count(&self) -> usize {
        self.root_cube.as_ref().map_or(0, |root| root.count())
    }

    /// Wall segments cut by the plane at `z` (mm), unclipped.
    pub fn generate_lines(&self, z: CoordF) -> Polylines {
        let Some(root) = self.root_cube.as_deref() else {
            return Vec::new();
        };
        let Some(depth) = self.cubes_properties.len().checked_sub(1) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for direction in 0..3 {
            let mut walker = LineWalker::new(self, z, direction);
            walker.walk(root, 0, depth);
            out.extend(
                walker
                    .output
                    .into_iter()
                    .chain(walker.open.into_iter().flatten())
                    .map(|(a, b)| Polyline::from_points(vec![a, b])),
            );
        }
        out
    }
}

fn subdivide<F>(cube: &mut Cube, depth: usize, levels: &[CubeProperties], refine: &mut F)
where
    F: FnMut(Vec3d, CoordF) -> bool,
{
    if depth == 0 {
        return;
    }
    let child_depth = depth - 1;
    let edge = levels[child_depth].edge_length;
    for (slot, offset) in cube.children.iter_mut().zip(CHILD_CENTERS.iter()) {
        let dir = Vec3d::new(offset[0], offset[1], offset[2]).octree_to_world();
        let center = cube.center + dir * (0.5 * edge);
        if !refine(center, edge) {
            continue;
        }
        let child = slot.insert(Box::new(Cube::new(center)));
        subdivide(child, child_depth, levels, refine);
    }
}

/// Collects the walls of one direction.
struct LineWalker<'o> {
    levels: &'o [CubeProperties],
    z: CoordF,
    traversal: [usize; 8],
    cos_a: CoordF,
    sin_a: CoordF,
    /// Segment still being extended, per tree address.
    open: Vec<Option<(Point, Point)>>,
    output: Vec<(Point, Point)>,
}

impl<'o> LineWalker<'o> {
    fn new(octree: &'o Octree, z: CoordF, direction: usize) -> Self {
        let (sin_a, cos_a) = DIRECTION_ANGLES[direction].sin_cos();
        let addresses = (1usize << (octree.cubes_properties.len() + 1)) - 1;
        Self {
            levels: &octree.cubes_properties,
            z,
            traversal: CHILD_TRAVERSAL_ORDER[direction],
            cos_a,
            sin_a,
            open: vec![None; addresses],
            output: Vec::new(),
        }
    }

    fn to_world(&self, x: CoordF, y: CoordF, center: &Vec3d) -> Point {
        Point::new_scale(
            x * self.cos_a - y * self.sin_a + center.x,
            x * self.sin_a + y * self.cos_a + center.y,
        )
    }

    fn walk(&mut self, cube: &Cube, address: usize, depth: usize) {
        let props = self.levels[depth];
        let z_diff = self.z - cube.center.z;
        let z_diff_abs = z_diff.abs();
        if z_diff_abs > 0.5 * props.height {
            return;
        }

        if z_diff_abs < props.line_z_distance {
            let zdist = props.line_z_distance;
            let x = 0.5 * props.diagonal_length * (zdist - z_diff_abs) / zdist;
            let y = props.line_xy_distance - (zdist + z_diff) / 2f64.sqrt();
            let from = self.to_world(x, y, &cube.center);
            let to = self.to_world(-x, y, &cube.center);
            self.push(address, from, to);
        }

        // the finest cubes have no walls of their own
        if depth <= 1 {
            return;
        }
        let left = 2 * address + 1;
        let traversal = self.traversal;
        for (i, idx) in traversal.iter().enumerate() {
            if let Some(child) = cube.children[*idx].as_deref() {
                self.walk(child, if i < 4 { left } else { left + 1 }, depth - 1);
            }
        }
    }

    fn push(&mut self, address: usize, from: Point, to: Point) {
        let slot = &mut self.open[address];
        if let Some(open) = slot {
            let gap = (from.x - open.1.x).abs().max((from.y - open.1.y).abs());
            if gap > JOIN_EPSILON {
                self.output.push(*open);
                open.0 = from;
            }
            open.1 = to;
        } else {
            *slot = Some((from, to));
        }
    }
}

// ============================================================================
// Pattern
// ============================================================================

/// Cubic lines read from a precomputed octree.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveCubic;

impl FillPattern for AdaptiveCubic {
    fn pattern(&self) -> InfillPattern {
        InfillPattern::AdaptiveCubic
    }

    fn clone_box(&self) -> Box<dyn FillPattern> {
        Box::new(*self)
    }

    fn is_self_crossing(&self) -> bool {
        true
    }

    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines> {
        let octree = ctx
            .refs
            .adapt_fill_octree
            .ok_or_else(|| Error::Config("adaptive cubic infill needs an octree".into()))?;

        let raw = octree.generate_lines(ctx.state.z);
        let mut lines = intersection_pl(&raw, std::slice::from_ref(&expolygon));
        let min_length = scale(ctx.state.spacing) as CoordF;
        lines.retain(|pl| pl.length() >= min_length);
        debug!(
            "adaptive cubic: {} walls at z={:.3}, {} kept after clipping",
            raw.len(),
            ctx.state.z,
            lines.len()
        );

        if ctx.params.dont_connect() || lines.len() <= 1 {
            return Ok(chain_polylines(lines));
        }
        Ok(connect_infill(
            lines,
            &expolygon,
            ctx.state.spacing,
            ctx.state.link_max_length,
            &ctx.params,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::total_length;
    use crate::infill::{Fill, FillParams};
    use crate::slice::Surface;

    const CENTER: Vec3d = Vec3d::new(10.0, 10.0, 10.0);

    fn square(size: CoordF) -> Surface {
        Surface::internal(ExPolygon::rectangle(
            Point::new_scale(0.0, 0.0),
            Point::new_scale(size, size),
        ))
    }

    #[test]
    fn test_cube_levels() {
        let levels = CubeProperties::levels(20.0, 2.0);
        let edges: Vec<_> = levels.iter().map(|l| l.edge_length).collect();
        assert_eq!(edges, vec![4.0, 8.0, 16.0, 32.0]);
        assert!((levels[0].height - 4.0 * 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_octree_diagonal_is_upright() {
        let diagonal = Vec3d::new(1.0, 1.0, 1.0).octree_to_world();
        assert!(diagonal.x.abs() < 1e-6 && diagonal.y.abs() < 1e-6);
        assert!((diagonal.norm() - 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_dense_octree_size() {
        let octree = Octree::dense(CENTER, 20.0, 2.0).unwrap();
        assert_eq!(octree.cube_count(), 1 + 8 + 64 + 512);
        assert!(Octree::dense(CENTER, 1.0, 2.0).is_none());
    }

    #[test]
    fn test_walls_run_in_three_directions() {
        let octree = Octree::dense(CENTER, 20.0, 2.0).unwrap();
        let lines = octree.generate_lines(10.0);
        assert!(!lines.is_empty());
        let mut seen = [false; 3];
        for line in lines.iter().filter(|l| l.length() > scale(0.1) as CoordF) {
            let (a, b) = (line.first_point(), line.last_point());
            let angle = ((b.y - a.y) as CoordF).atan2((b.x - a.x) as CoordF).to_degrees();
            let angle = angle.rem_euclid(180.0);
            let slot = [0.0, 60.0, 120.0, 180.0]
                .iter()
                .position(|d| (angle - d).abs() < 0.5)
                .unwrap_or_else(|| panic!("unexpected wall angle {angle}"));
            seen[slot % 3] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_no_walls_outside_the_tree() {
        let octree = Octree::dense(CENTER, 20.0, 2.0).unwrap();
        assert!(octree.generate_lines(200.0).is_empty());
    }

    #[test]
    fn test_refinement_adds_lines() {
        let dense = Octree::dense(CENTER, 20.0, 2.0).unwrap();
        // only refine the corner around the origin
        let sparse = Octree::build_with(CENTER, 20.0, 2.0, |c, _| c.x < 8.0 && c.y < 8.0).unwrap();
        assert!(sparse.cube_count() < dense.cube_count());
        let dense_len = total_length(&dense.generate_lines(10.0));
        let sparse_len = total_length(&sparse.generate_lines(10.0));
        assert!(sparse_len < dense_len);
    }

    #[test]
    fn test_missing_octree_is_config_error() {
        let mut fill = Fill::new_from_type(InfillPattern::AdaptiveCubic);
        fill.state.spacing = 0.45;
        fill.state.z = 10.0;
        let err = fill
            .fill_surface(&square(20.0), &FillParams::with_density(0.2))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_fill_from_octree() {
        let octree = Octree::dense(CENTER, 20.0, 2.0).unwrap();
        let mut fill = Fill::new_from_type(InfillPattern::AdaptiveCubic).with_octree(&octree);
        fill.state.spacing = 0.45;
        fill.state.z = 10.0;
        fill.state.angle = Some(0.0);
        let surface = square(20.0);
        let out = fill
            .fill_surface(&surface, &FillParams::with_density(0.2).anchors(0.0, 0.0))
            .unwrap();
        assert!(!out.is_empty());
        let bbox = surface.expolygon.bounding_box().expanded(1);
        assert!(out.iter().flat_map(|pl| pl.points()).all(|p| bbox.contains_point(p)));
        assert!(out.iter().all(|pl| pl.length() >= scale(0.45) as CoordF));
    }
}
