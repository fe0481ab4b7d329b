//! Blend-mesh construction.
//!
//! [`create_mesh`] turns three quads (outer projection boundary, inner
//! fully-overlapped boundary, texture region) and a [`BlendMask`] into a
//! fixed 16-vertex / 54-index triangle mesh. Per-vertex colors carry the
//! blend weights in their first two channels; the fragment shader reads them
//! as the blend curve's input alpha.

use core::ops::{BitOr, BitOrAssign};

use crate::geom::{line_intersection, Quad, Vec2};

// ── blend mask ────────────────────────────────────────────────────────────

/// Edges of the projection that participate in blending.
///
/// A set bit means brightness ramps toward that edge (weight 0 at the edge,
/// shaded by the blend curve); a clear bit pins the weight to 1, forcing
/// full opacity along it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BlendMask(u8);

impl BlendMask {
    pub const NONE: Self = Self(0);
    pub const LEFT: Self = Self(1 << 0);
    pub const RIGHT: Self = Self(1 << 1);
    pub const TOP: Self = Self(1 << 2);
    pub const BOTTOM: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for BlendMask {
    type Output = BlendMask;
    #[inline]
    fn bitor(self, rhs: BlendMask) -> BlendMask {
        BlendMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for BlendMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: BlendMask) {
        self.0 |= rhs.0;
    }
}

// ── mesh ──────────────────────────────────────────────────────────────────

/// Primitive topology of a [`BlendMesh`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Primitive {
    TriangleList,
}

/// The blend mesh: parallel vertex attribute arrays plus an index list.
///
/// Always 16 vertices and 54 indices (18 triangles covering the 3×3 cells
/// of a 4×4 vertex grid).
/// Positions are logical pixels with z fixed to 0; colors carry the blend
/// weights in `r`/`g`, with `b = 0` and `a = 1`. Produced fresh by each
/// build call and owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendMesh {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
    pub primitive: Primitive,
}

impl BlendMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.positions.iter().flatten().all(|v| v.is_finite())
            && self.texcoords.iter().flatten().all(|v| v.is_finite())
    }
}

// ── builder ───────────────────────────────────────────────────────────────

/// Builds the blend mesh for one projector.
///
/// `outer` is the full projection boundary, `inner` the region overlapped by
/// every neighbor, `texture_uv` the quad the outer boundary maps to in
/// texture space. The 16 vertices are laid out in reading order, 4 rows of
/// 4: outer corners at the grid corners, inner corners in the middle, and
/// the 12 outer-edge × inner-edge line crossings between them. The index
/// pattern below assumes exactly this order.
///
/// UVs come from remapping each vertex through `outer`'s bilinear patch onto
/// `texture_uv`; out-of-range remaps are kept deliberately, since crossing
/// points can fall outside the outer quad for strongly keystoned setups.
pub fn create_mesh(outer: Quad, inner: Quad, texture_uv: Quad, mask: BlendMask) -> BlendMesh {
    let grid: [Vec2; 16] = [
        outer.lt,
        line_intersection(outer.lt, outer.rt, inner.lt, inner.lb),
        line_intersection(outer.rt, outer.lt, inner.rt, inner.rb),
        outer.rt,
        line_intersection(outer.lt, outer.lb, inner.lt, inner.rt),
        inner.lt,
        inner.rt,
        line_intersection(outer.rt, outer.rb, inner.lt, inner.rt),
        line_intersection(outer.lb, outer.lt, inner.lb, inner.rb),
        inner.lb,
        inner.rb,
        line_intersection(outer.rb, outer.rt, inner.lb, inner.rb),
        outer.lb,
        line_intersection(outer.lb, outer.rb, inner.lt, inner.lb),
        line_intersection(outer.rb, outer.lb, inner.rt, inner.rb),
        outer.rb,
    ];

    let positions = grid.iter().map(|p| [p.x, p.y, 0.0]).collect();
    let texcoords = grid
        .iter()
        .map(|p| {
            let uv = outer.remap_to(texture_uv, *p).point;
            [uv.x, uv.y]
        })
        .collect();

    // Weight 0 marks a blend-affected edge; a cleared mask bit pins the
    // whole column/row to 1. Interior vertices are always 1.
    let wl = if mask.contains(BlendMask::LEFT) { 0.0 } else { 1.0 };
    let wr = if mask.contains(BlendMask::RIGHT) { 0.0 } else { 1.0 };
    let wt = if mask.contains(BlendMask::TOP) { 0.0 } else { 1.0 };
    let wb = if mask.contains(BlendMask::BOTTOM) { 0.0 } else { 1.0 };
    let w1 = 1.0;
    let weights: [[f32; 2]; 16] = [
        [wl, wt], [w1, wt], [w1, wt], [wr, wt],
        [wl, w1], [w1, w1], [w1, w1], [wr, w1],
        [wl, w1], [w1, w1], [w1, w1], [wr, w1],
        [wl, wb], [w1, wb], [w1, wb], [wr, wb],
    ];
    let colors = weights.iter().map(|w| [w[0], w[1], 0.0, 1.0]).collect();

    // 6 indices per cell, replicated across 3 columns (stride 1), then the
    // whole row across 3 bands (stride 4).
    let indices = repeat_indices(3, 4, &repeat_indices(3, 1, &[0, 4, 1, 1, 4, 5]));

    BlendMesh {
        positions,
        texcoords,
        colors,
        indices,
        primitive: Primitive::TriangleList,
    }
}

/// [`create_mesh`] with texture coordinates given relative to a projector
/// frame instead of directly in UV space.
///
/// Each outer corner is remapped from `frame` space into
/// `texture_uv_for_frame` space to derive the effective texture quad.
pub fn create_mesh_in_frame(
    outer: Quad,
    inner: Quad,
    frame: Quad,
    texture_uv_for_frame: Quad,
    mask: BlendMask,
) -> BlendMesh {
    let mut texture_uv = Quad::default();
    for i in 0..4 {
        texture_uv[i] = frame.remap_to(texture_uv_for_frame, outer[i]).point;
    }
    create_mesh(outer, inner, texture_uv, mask)
}

fn repeat_indices(iterations: u32, stride: u32, base: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(base.len() * iterations as usize);
    for i in 0..iterations {
        out.extend(base.iter().map(|b| b + stride * i));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    /// Outer 100×100 at the origin, inner scaled to 80% and pushed 10px in.
    fn scenario() -> (Quad, Quad) {
        let outer = Quad::from_size(100.0, 100.0);
        let inner = outer.scaled(v(0.8, 0.8)).translated(v(10.0, 10.0));
        (outer, inner)
    }

    fn assert_close3(a: [f32; 3], b: [f32; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    fn assert_close2(a: [f32; 2], b: [f32; 2]) {
        for i in 0..2 {
            assert!((a[i] - b[i]).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    // ── mask ──────────────────────────────────────────────────────────────

    #[test]
    fn mask_bit_ops() {
        let m = BlendMask::LEFT | BlendMask::TOP;
        assert!(m.contains(BlendMask::LEFT));
        assert!(m.contains(BlendMask::TOP));
        assert!(!m.contains(BlendMask::RIGHT));
        assert!(BlendMask::ALL.contains(m));
        assert!(!BlendMask::NONE.contains(BlendMask::LEFT));

        let mut m = BlendMask::NONE;
        m |= BlendMask::BOTTOM;
        assert_eq!(m, BlendMask::BOTTOM);
    }

    // ── topology ──────────────────────────────────────────────────────────

    #[test]
    fn mesh_has_fixed_topology() {
        let (outer, inner) = scenario();
        let mesh = create_mesh(outer, inner, Quad::default(), BlendMask::ALL);
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.texcoords.len(), 16);
        assert_eq!(mesh.colors.len(), 16);
        assert_eq!(mesh.indices.len(), 54);
        assert!(mesh.indices.iter().all(|&i| i < 16));
        assert_eq!(mesh.primitive, Primitive::TriangleList);
    }

    #[test]
    fn index_pattern_is_nested_repeat() {
        let (outer, inner) = scenario();
        let mesh = create_mesh(outer, inner, Quad::default(), BlendMask::ALL);
        #[rustfmt::skip]
        let expected: [u32; 54] = [
            0, 4, 1,  1, 4, 5,   1, 5, 2,   2, 5, 6,    2, 6,  3,   3, 6,  7,
            4, 8, 5,  5, 8, 9,   5, 9, 6,   6, 9, 10,   6, 10, 7,   7, 10, 11,
            8, 12, 9, 9, 12, 13, 9, 13, 10, 10, 13, 14, 10, 14, 11, 11, 14, 15,
        ];
        assert_eq!(mesh.indices, expected);
    }

    #[test]
    fn degenerate_inner_still_produces_full_topology() {
        // Zero-area inner: the crossing lines through its coincident corners
        // are degenerate, so every intersection takes the first-point
        // fallback. Geometry collapses but counts stay fixed.
        let outer = Quad::from_size(100.0, 100.0);
        let center = Quad::new(v(50.0, 50.0), v(50.0, 50.0), v(50.0, 50.0), v(50.0, 50.0));
        let mesh = create_mesh(outer, center, Quad::default(), BlendMask::ALL);
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.indices.len(), 54);
        assert!(mesh.is_finite());
        // Vertex 1's crossing degenerated to the outer top-left corner.
        assert_close3(mesh.positions[1], [0.0, 0.0, 0.0]);
    }

    // ── vertex placement ──────────────────────────────────────────────────

    #[test]
    fn scenario_vertex_positions() {
        let (outer, inner) = scenario();
        let mesh = create_mesh(outer, inner, Quad::default(), BlendMask::ALL);

        // Row 0: outer top corners with crossings between.
        assert_close3(mesh.positions[0], [0.0, 0.0, 0.0]);
        assert_close3(mesh.positions[1], [10.0, 0.0, 0.0]);
        assert_close3(mesh.positions[2], [90.0, 0.0, 0.0]);
        assert_close3(mesh.positions[3], [100.0, 0.0, 0.0]);
        // Rows 1 and 2: inner corners.
        assert_close3(mesh.positions[5], [10.0, 10.0, 0.0]);
        assert_close3(mesh.positions[6], [90.0, 10.0, 0.0]);
        assert_close3(mesh.positions[9], [10.0, 90.0, 0.0]);
        assert_close3(mesh.positions[10], [90.0, 90.0, 0.0]);
        // Row 3 mirrors row 0.
        assert_close3(mesh.positions[12], [0.0, 100.0, 0.0]);
        assert_close3(mesh.positions[13], [10.0, 100.0, 0.0]);
        assert_close3(mesh.positions[15], [100.0, 100.0, 0.0]);
        // Left/right column crossings.
        assert_close3(mesh.positions[4], [0.0, 10.0, 0.0]);
        assert_close3(mesh.positions[7], [100.0, 10.0, 0.0]);
        assert_close3(mesh.positions[8], [0.0, 90.0, 0.0]);
    }

    #[test]
    fn scenario_texcoords_follow_outer_fraction() {
        let (outer, inner) = scenario();
        let mesh = create_mesh(outer, inner, Quad::default(), BlendMask::ALL);
        assert_close2(mesh.texcoords[0], [0.0, 0.0]);
        assert_close2(mesh.texcoords[1], [0.1, 0.0]);
        assert_close2(mesh.texcoords[5], [0.1, 0.1]);
        assert_close2(mesh.texcoords[10], [0.9, 0.9]);
        assert_close2(mesh.texcoords[15], [1.0, 1.0]);
    }

    // ── blend weights ─────────────────────────────────────────────────────

    #[test]
    fn blend_all_zeroes_edge_weights() {
        let (outer, inner) = scenario();
        let mesh = create_mesh(outer, inner, Quad::default(), BlendMask::ALL);
        // Corner vertex: both axes on blend-affected edges.
        assert_eq!(mesh.colors[0], [0.0, 0.0, 0.0, 1.0]);
        // Inner vertex: fully opaque on both axes.
        assert_eq!(mesh.colors[5], [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(mesh.colors[15], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn blend_none_pins_everything_to_one() {
        let (outer, inner) = scenario();
        let mesh = create_mesh(outer, inner, Quad::default(), BlendMask::NONE);
        for c in &mesh.colors {
            assert_eq!(*c, [1.0, 1.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn each_mask_bit_touches_only_its_edge() {
        let (outer, inner) = scenario();
        let left_col = [0usize, 4, 8, 12];
        let right_col = [3usize, 7, 11, 15];
        let top_row = [0usize, 1, 2, 3];
        let bottom_row = [12usize, 13, 14, 15];

        let cases: [(BlendMask, &[usize], usize); 4] = [
            (BlendMask::LEFT, &left_col, 0),
            (BlendMask::RIGHT, &right_col, 0),
            (BlendMask::TOP, &top_row, 1),
            (BlendMask::BOTTOM, &bottom_row, 1),
        ];
        for (mask, vertices, channel) in cases {
            let mesh = create_mesh(outer, inner, Quad::default(), mask);
            for i in 0..16 {
                let expected = if vertices.contains(&i) { 0.0 } else { 1.0 };
                assert_eq!(
                    mesh.colors[i][channel], expected,
                    "mask {mask:?}, vertex {i}, channel {channel}"
                );
                // The other weight channel stays pinned to 1.
                assert_eq!(mesh.colors[i][1 - channel], 1.0);
            }
        }
    }

    // ── frame overload ────────────────────────────────────────────────────

    #[test]
    fn frame_overload_matches_direct_uv_when_frame_is_outer() {
        let (outer, inner) = scenario();
        let direct = create_mesh(outer, inner, Quad::default(), BlendMask::ALL);
        let framed = create_mesh_in_frame(outer, inner, outer, Quad::default(), BlendMask::ALL);
        assert_eq!(framed, direct);
    }

    #[test]
    fn frame_overload_offsets_uv_window() {
        // Outer covers the right half of a 200px frame mapped to [0,1]²,
        // so its derived UV window is x ∈ [0.5, 1].
        let outer = Quad::from_size(100.0, 100.0).translated(v(100.0, 0.0));
        let inner = outer.scaled(v(0.8, 0.8)).translated(v(10.0, 10.0));
        let frame = Quad::new(v(0.0, 0.0), v(200.0, 0.0), v(0.0, 100.0), v(200.0, 100.0));
        let mesh = create_mesh_in_frame(outer, inner, frame, Quad::default(), BlendMask::ALL);
        assert_close2(mesh.texcoords[0], [0.5, 0.0]);
        assert_close2(mesh.texcoords[15], [1.0, 1.0]);
    }
}
