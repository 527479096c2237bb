//! Host collaboration points consumed by shader plugins.
//!
//! A backend owns the graphics context; programs and quads it creates are owned
//! by the plugin and handed back on every call. Calls are expected to be
//! serialized by the host (single-threaded, `&mut self`).

use crate::paint::BlendMode;

use super::error::{DrawError, ShaderCompileError};
use super::geometry::QuadGeometry;
use super::shader::ShaderSources;
use super::uniforms::UniformTable;

/// Primitive assembly for [`RenderBackend::draw`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawMode {
    Triangles,
}

/// A linked shader program with its live uniform table.
pub trait ShaderProgram {
    fn uniforms(&self) -> &UniformTable;
    fn uniforms_mut(&mut self) -> &mut UniformTable;
}

pub trait RenderBackend {
    type Program: ShaderProgram;
    /// Vertex array: a dynamic position buffer, static UVs and indices.
    type Quad;

    /// Compiles and links `sources`. The returned program's uniform table
    /// matches the block the sources declare, zero-initialized.
    fn compile_program(&mut self, sources: &ShaderSources)
    -> Result<Self::Program, ShaderCompileError>;

    fn bind_program(&mut self, program: &Self::Program);

    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Allocates a quad whose attribute layout matches `program`.
    fn create_quad(&mut self, program: &Self::Program) -> Self::Quad;

    fn bind_quad(&mut self, quad: &Self::Quad);

    fn upload_quad(&mut self, quad: &mut Self::Quad, geometry: &QuadGeometry);

    /// Draws `count` indices starting at `start` from the bound quad, using the
    /// current contents of `program`'s uniform table.
    fn draw(
        &mut self,
        program: &Self::Program,
        quad: &Self::Quad,
        mode: DrawMode,
        count: u32,
        start: u32,
    ) -> Result<(), DrawError>;
}
