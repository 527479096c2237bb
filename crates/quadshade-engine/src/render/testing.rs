//! Backend double that records calls instead of touching a GPU.

use crate::paint::BlendMode;

use super::backend::{DrawMode, RenderBackend, ShaderProgram};
use super::error::{DrawError, ShaderCompileError};
use super::geometry::QuadGeometry;
use super::shader::ShaderSources;
use super::uniforms::{UniformLayout, UniformTable, UniformValue};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Compile,
    BindProgram,
    SetBlendMode(BlendMode),
    CreateQuad,
    BindQuad,
    Upload([f32; 8]),
    Draw {
        mode: DrawMode,
        count: u32,
        start: u32,
        uniforms: Vec<(String, UniformValue)>,
    },
}

pub struct RecordingProgram {
    uniforms: UniformTable,
}

impl ShaderProgram for RecordingProgram {
    fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    fn uniforms_mut(&mut self) -> &mut UniformTable {
        &mut self.uniforms
    }
}

pub struct RecordingQuad {
    pub vertices: QuadGeometry,
}

/// Every compiled program gets `layout`.
pub struct RecordingBackend {
    pub layout: UniformLayout,
    pub calls: Vec<Call>,
    pub fail_compile: Option<ShaderCompileError>,
    pub programs_compiled: usize,
}

impl RecordingBackend {
    pub fn new(layout: UniformLayout) -> Self {
        Self {
            layout,
            calls: Vec::new(),
            fail_compile: None,
            programs_compiled: 0,
        }
    }

    /// Value of `name` as seen by the most recent draw.
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Draw { uniforms, .. } => uniforms
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v),
            _ => None,
        })
    }
}

impl RenderBackend for RecordingBackend {
    type Program = RecordingProgram;
    type Quad = RecordingQuad;

    fn compile_program(
        &mut self,
        _sources: &ShaderSources,
    ) -> Result<RecordingProgram, ShaderCompileError> {
        self.calls.push(Call::Compile);
        if let Some(err) = self.fail_compile.clone() {
            return Err(err);
        }
        self.programs_compiled += 1;
        Ok(RecordingProgram {
            uniforms: UniformTable::new(self.layout.clone()),
        })
    }

    fn bind_program(&mut self, _program: &RecordingProgram) {
        self.calls.push(Call::BindProgram);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.calls.push(Call::SetBlendMode(mode));
    }

    fn create_quad(&mut self, _program: &RecordingProgram) -> RecordingQuad {
        self.calls.push(Call::CreateQuad);
        RecordingQuad {
            vertices: QuadGeometry::default(),
        }
    }

    fn bind_quad(&mut self, _quad: &RecordingQuad) {
        self.calls.push(Call::BindQuad);
    }

    fn upload_quad(&mut self, quad: &mut RecordingQuad, geometry: &QuadGeometry) {
        quad.vertices = *geometry;
        self.calls.push(Call::Upload(geometry.0));
    }

    fn draw(
        &mut self,
        program: &RecordingProgram,
        _quad: &RecordingQuad,
        mode: DrawMode,
        count: u32,
        start: u32,
    ) -> Result<(), DrawError> {
        let table = program.uniforms();
        let uniforms = table
            .layout()
            .slots()
            .iter()
            .filter_map(|s| table.get(&s.name).map(|v| (s.name.clone(), v)))
            .collect();
        self.calls.push(Call::Draw {
            mode,
            count,
            start,
            uniforms,
        });
        Ok(())
    }
}
