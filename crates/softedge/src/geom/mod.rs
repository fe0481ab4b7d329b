//! Geometry types for quad-based projection mapping.
//!
//! Canonical CPU space:
//! - Logical pixels (or projector-native pixels)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Quad corners are stored in the fixed order `lt, rt, lb, rb`; every
//! algorithm in this module depends on that order.

mod quad;
mod rect;
mod vec2;
mod viewport;

pub use quad::{line_intersection, MapResult, Quad};
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
