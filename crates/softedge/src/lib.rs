//! Soft-edge blending for multi-projector setups.
//!
//! Overlapping projectors must ramp their brightness down toward the shared
//! seam so the overlap region sums back to full intensity. This crate owns
//! the pieces that make that work:
//!
//! - [`geom`]: quadrilateral geometry (bilinear inverse/forward mapping,
//!   line intersection, point-in-quad).
//! - [`mesh`]: builds the 16-vertex blend mesh with per-vertex weights and
//!   texture coordinates from outer/inner/texture quads.
//! - [`render`]: a wgpu pipeline that draws the mesh, attenuating brightness
//!   near overlap edges with a gamma-corrected power curve.

pub mod geom;
pub mod mesh;
pub mod render;

pub mod logging;
