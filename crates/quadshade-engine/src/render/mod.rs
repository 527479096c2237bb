//! Custom-shaded quad rendering.
//!
//! A shader plugin ([`QuadRenderSession`]) draws one textured quad per object
//! with a user-supplied WGSL shader pair. Plugins talk to the GPU only through
//! [`RenderBackend`]; [`WgpuBackend`] is the production implementation.
//!
//! Convention:
//! - quad geometry is computed on the CPU in logical pixels (top-left origin,
//!   +Y down)
//! - the vertex stage converts to NDC with `globals.projection`

mod backend;
mod error;
mod geometry;
mod object;
mod registry;
mod session;
mod shader;
mod uniforms;
mod wgpu_backend;

#[cfg(test)]
mod testing;

pub use backend::{DrawMode, RenderBackend, ShaderProgram};
pub use error::{
    ContextInitError, DrawError, RegistryError, RenderError, ShaderCompileError, ShaderStage,
    UniformError,
};
pub use geometry::{evaluate_quad, QuadGeometry, QUAD_INDEX_COUNT, QUAD_INDICES, QUAD_UVS};
pub use object::{PluginObject, ShaderSprite, Transform};
pub use registry::{FallbackRenderer, PluginHandle, PluginRegistry};
pub use session::{create_shader_plugin, ObjectRenderer, QuadRenderSession, TINT_ALPHA_UNIFORM};
pub use shader::{ShaderSources, DEFAULT_VERTEX_SOURCE, FRAGMENT_ENTRY, PRELUDE, VERTEX_ENTRY};
pub use uniforms::{UniformKind, UniformLayout, UniformSet, UniformSlot, UniformTable, UniformValue};
pub use wgpu_backend::{FrameTarget, WgpuBackend, WgpuProgram, WgpuQuad};
