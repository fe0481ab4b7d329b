//! GPU rendering of blend meshes.
//!
//! The renderer consumes a [`BlendMesh`](crate::mesh::BlendMesh) and issues
//! wgpu commands through a minimal context; the surrounding framework owns
//! the device, surface, and frame loop.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - The vertex shader converts to NDC using a viewport uniform.
//! - All calls must happen on the thread that owns the GPU context.

mod blend;
mod ctx;

pub use blend::{BlendParams, BlendScreenRenderer};
pub use ctx::{RenderCtx, RenderTarget};
