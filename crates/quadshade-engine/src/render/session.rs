//! Per-object render routine for custom-shaded quads.

use crate::paint::hex_to_rgb;

use super::backend::{DrawMode, RenderBackend, ShaderProgram};
use super::error::{ContextInitError, RegistryError, RenderError};
use super::geometry::{evaluate_quad, QUAD_INDEX_COUNT};
use super::object::PluginObject;
use super::registry::{PluginHandle, PluginRegistry};
use super::shader::ShaderSources;
use super::uniforms::{UniformSet, UniformValue};

/// Name of the uniform that receives the premultiplied tint and world alpha.
pub const TINT_ALPHA_UNIFORM: &str = "uTintAlpha";

/// Renderer contract the host drives.
///
/// `start`/`flush` bracket a run of `render` calls for the same renderer;
/// renderers that do not batch leave them empty.
pub trait ObjectRenderer<B: RenderBackend> {
    fn name(&self) -> &str;

    /// Called whenever the graphics context becomes (re)usable. Rebuilds every
    /// GPU resource the renderer owns.
    fn on_context_init(&mut self, backend: &mut B) -> Result<(), ContextInitError>;

    fn start(&mut self, backend: &mut B) {
        let _ = backend;
    }

    fn flush(&mut self, backend: &mut B) {
        let _ = backend;
    }

    fn render(&mut self, backend: &mut B, object: &mut dyn PluginObject)
    -> Result<(), RenderError>;
}

/// Builds a shader plugin.
///
/// `vertex = None` selects the default projection-only vertex stage. `defaults`
/// are written into the program's uniform table on every context init.
pub fn create_shader_plugin<B: RenderBackend>(
    name: impl Into<String>,
    vertex: Option<&str>,
    fragment: &str,
    defaults: UniformSet,
) -> QuadRenderSession<B> {
    QuadRenderSession::new(name, ShaderSources::new(vertex, fragment), defaults)
}

/// GPU state that lives exactly as long as one graphics context.
struct ContextState<B: RenderBackend> {
    program: B::Program,
    quad: B::Quad,
    tint_alpha: [f32; 4],
}

/// Draws one textured quad per [`render`](ObjectRenderer::render) call with a
/// custom shader pair.
pub struct QuadRenderSession<B: RenderBackend> {
    name: String,
    sources: ShaderSources,
    uniform_defaults: UniformSet,
    context: Option<ContextState<B>>,
    warned_no_tint: bool,
}

impl<B: RenderBackend> QuadRenderSession<B> {
    pub fn new(name: impl Into<String>, sources: ShaderSources, defaults: UniformSet) -> Self {
        Self {
            name: name.into(),
            sources,
            uniform_defaults: defaults,
            context: None,
            warned_no_tint: false,
        }
    }

    #[inline]
    pub fn sources(&self) -> &ShaderSources {
        &self.sources
    }

    #[inline]
    pub fn uniform_defaults(&self) -> &UniformSet {
        &self.uniform_defaults
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    /// Live uniform value of the current program, if initialized.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.context
            .as_ref()
            .and_then(|ctx| ctx.program.uniforms().get(name))
    }

    /// Registers this plugin with `registry` under its name.
    pub fn register(self, registry: &mut PluginRegistry<B>) -> Result<PluginHandle, RegistryError>
    where
        B: 'static,
    {
        registry.register(Box::new(self))
    }
}

impl<B: RenderBackend> ObjectRenderer<B> for QuadRenderSession<B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_context_init(&mut self, backend: &mut B) -> Result<(), ContextInitError> {
        // Anything from a previous context is stale.
        self.context = None;

        let mut program =
            backend
                .compile_program(&self.sources)
                .map_err(|source| ContextInitError::Compile {
                    plugin: self.name.clone(),
                    source,
                })?;

        if !self.uniform_defaults.is_empty() {
            backend.bind_program(&program);
            program
                .uniforms_mut()
                .apply(&self.uniform_defaults)
                .map_err(|source| ContextInitError::Defaults {
                    plugin: self.name.clone(),
                    source,
                })?;
        }

        let quad = backend.create_quad(&program);

        log::debug!(
            "shader plugin `{}` initialized ({} uniforms, {} defaults)",
            self.name,
            program.uniforms().layout().slots().len(),
            self.uniform_defaults.len()
        );

        self.context = Some(ContextState {
            program,
            quad,
            tint_alpha: [0.0; 4],
        });
        Ok(())
    }

    fn render(
        &mut self,
        backend: &mut B,
        object: &mut dyn PluginObject,
    ) -> Result<(), RenderError> {
        let Some(ctx) = self.context.as_mut() else {
            return Err(RenderError::NotInitialized(self.name.clone()));
        };

        backend.bind_program(&ctx.program);
        backend.set_blend_mode(object.blend_mode());
        backend.bind_quad(&ctx.quad);

        let transform = *object.transform();
        object.set_transform_id(transform.world_id);

        let geometry = evaluate_quad(&transform.world, object.plugin_size(), object.anchor());
        backend.upload_quad(&mut ctx.quad, &geometry);

        let alpha = object.world_alpha();
        let [r, g, b] = hex_to_rgb(object.tint());
        ctx.tint_alpha = [r * alpha, g * alpha, b * alpha, alpha];

        let uniforms = ctx.program.uniforms_mut();
        if uniforms.contains(TINT_ALPHA_UNIFORM) {
            uniforms.set(TINT_ALPHA_UNIFORM, UniformValue::Vec4(ctx.tint_alpha))?;
        } else if !self.warned_no_tint {
            log::debug!(
                "shader plugin `{}` declares no `{TINT_ALPHA_UNIFORM}`; tint and alpha are not applied",
                self.name
            );
            self.warned_no_tint = true;
        }

        // Object overrides are written last, so they win over the computed tint.
        if let Some(overrides) = object.plugin_uniforms() {
            uniforms.apply(overrides)?;
        }

        backend.draw(&ctx.program, &ctx.quad, DrawMode::Triangles, QUAD_INDEX_COUNT, 0)?;
        Ok(())
    }
}
