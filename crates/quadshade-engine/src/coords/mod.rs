//! Coordinate and transform types shared by the runtime and quad renderers.
//!
//! Canonical CPU space:
//! - world units map 1:1 to logical pixels
//! - origin top-left
//! - +X right, +Y down
//!
//! Quad geometry is produced in world space on the CPU and converted to NDC by
//! the `globals.projection` matrix in the vertex stage.

mod affine;
mod vec2;
mod viewport;

pub use affine::Affine2;
pub use vec2::Vec2;
pub use viewport::Viewport;
