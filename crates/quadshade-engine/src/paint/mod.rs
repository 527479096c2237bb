//! Paint model shared between the runtime and quad renderers.
//!
//! Scope:
//! - color representation (linear premultiplied alpha)
//! - packed `0xRRGGBB` tints
//! - blend modes selectable per object

pub mod blend;
pub mod color;

pub use blend::BlendMode;
pub use color::{hex_to_rgb, Color};
