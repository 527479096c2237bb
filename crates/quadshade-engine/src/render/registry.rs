//! Named plugin tables and the renderer-switching protocol.
//!
//! Registration is explicit: the composition root builds plugins and registers
//! them, receiving a [`PluginHandle`] per plugin. Every registration also
//! records a non-GPU fallback under the same name.

use super::backend::RenderBackend;
use super::error::{ContextInitError, RegistryError, RenderError};
use super::object::PluginObject;
use super::session::ObjectRenderer;

/// Index of a registered plugin.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PluginHandle(usize);

impl PluginHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Renderer used for a plugin's objects when no GPU context is available.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FallbackRenderer {
    /// Draw the object as a plain sprite, ignoring the custom shader.
    Sprite,
}

pub struct PluginRegistry<B: RenderBackend> {
    gpu: Vec<Box<dyn ObjectRenderer<B>>>,
    fallback: Vec<(String, FallbackRenderer)>,
    /// Renderer that has been started and not yet flushed.
    active: Option<PluginHandle>,
}

impl<B: RenderBackend> Default for PluginRegistry<B> {
    fn default() -> Self {
        Self {
            gpu: Vec::new(),
            fallback: Vec::new(),
            active: None,
        }
    }
}

impl<B: RenderBackend> PluginRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `renderer` under its name in both the GPU and fallback tables.
    pub fn register(
        &mut self,
        renderer: Box<dyn ObjectRenderer<B>>,
    ) -> Result<PluginHandle, RegistryError> {
        let name = renderer.name().to_string();
        if self.handle(&name).is_some() {
            return Err(RegistryError::DuplicateName(name));
        }

        let handle = PluginHandle(self.gpu.len());
        self.gpu.push(renderer);
        self.fallback.push((name.clone(), FallbackRenderer::Sprite));

        log::debug!("registered plugin `{name}` as #{}", handle.0);
        Ok(handle)
    }

    pub fn handle(&self, name: &str) -> Option<PluginHandle> {
        self.gpu
            .iter()
            .position(|r| r.name() == name)
            .map(PluginHandle)
    }

    pub fn fallback(&self, name: &str) -> Option<FallbackRenderer> {
        self.fallback
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| *f)
    }

    pub fn get_mut(&mut self, handle: PluginHandle) -> Option<&mut (dyn ObjectRenderer<B> + 'static)> {
        self.gpu.get_mut(handle.0).map(|r| r.as_mut())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.gpu.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gpu.is_empty()
    }

    /// Re-initializes every plugin for a new graphics context, in registration order.
    ///
    /// Stops at the first failure; plugins after it keep their previous state
    /// (none, on a fresh context).
    pub fn on_context_init(&mut self, backend: &mut B) -> Result<(), ContextInitError> {
        self.active = None;
        for renderer in &mut self.gpu {
            renderer.on_context_init(backend)?;
        }
        log::info!("initialized {} shader plugin(s)", self.gpu.len());
        Ok(())
    }

    /// Renders `object` with the plugin behind `handle`.
    ///
    /// Switching plugins flushes the active one and starts the new one.
    pub fn render(
        &mut self,
        handle: PluginHandle,
        backend: &mut B,
        object: &mut dyn PluginObject,
    ) -> Result<(), RenderError> {
        if handle.0 >= self.gpu.len() {
            return Err(RenderError::UnknownPlugin(handle.0));
        }

        if self.active != Some(handle) {
            self.flush(backend);
            self.gpu[handle.0].start(backend);
            self.active = Some(handle);
        }

        self.gpu[handle.0].render(backend, object)
    }

    /// Flushes the active plugin, if any. Call at the end of a frame.
    pub fn flush(&mut self, backend: &mut B) {
        if let Some(active) = self.active.take() {
            self.gpu[active.0].flush(backend);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::render::object::ShaderSprite;
    use crate::render::session::create_shader_plugin;
    use crate::render::testing::{Call, RecordingBackend};
    use crate::render::uniforms::{UniformLayout, UniformSet};

    /// Counts lifecycle hooks; renders nothing.
    struct Tracer {
        name: &'static str,
        log: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl ObjectRenderer<RecordingBackend> for Tracer {
        fn name(&self) -> &str {
            self.name
        }

        fn on_context_init(&mut self, _: &mut RecordingBackend) -> Result<(), ContextInitError> {
            self.log.borrow_mut().push(format!("{}:init", self.name));
            Ok(())
        }

        fn start(&mut self, _: &mut RecordingBackend) {
            self.log.borrow_mut().push(format!("{}:start", self.name));
        }

        fn flush(&mut self, _: &mut RecordingBackend) {
            self.log.borrow_mut().push(format!("{}:flush", self.name));
        }

        fn render(
            &mut self,
            _: &mut RecordingBackend,
            _: &mut dyn PluginObject,
        ) -> Result<(), RenderError> {
            self.log.borrow_mut().push(format!("{}:render", self.name));
            Ok(())
        }
    }

    fn tracers() -> (
        PluginRegistry<RecordingBackend>,
        std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    ) {
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut reg = PluginRegistry::new();
        for name in ["a", "b"] {
            reg.register(Box::new(Tracer {
                name,
                log: log.clone(),
            }))
            .unwrap();
        }
        (reg, log)
    }

    #[test]
    fn register_fills_both_tables() {
        let mut reg = PluginRegistry::<RecordingBackend>::new();
        let plugin = create_shader_plugin("glow", None, "frag", UniformSet::new());
        let handle = plugin.register(&mut reg).unwrap();

        assert_eq!(reg.handle("glow"), Some(handle));
        assert_eq!(reg.fallback("glow"), Some(FallbackRenderer::Sprite));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut reg = PluginRegistry::<RecordingBackend>::new();
        create_shader_plugin("glow", None, "frag", UniformSet::new())
            .register(&mut reg)
            .unwrap();
        let err = create_shader_plugin("glow", None, "other", UniformSet::new())
            .register(&mut reg)
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("glow".into()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn switching_flushes_previous_and_starts_next() {
        let (mut reg, log) = tracers();
        let mut backend = RecordingBackend::new(UniformLayout::default());
        let (a, b) = (reg.handle("a").unwrap(), reg.handle("b").unwrap());
        let mut s = ShaderSprite::new(Vec2::splat(1.0));

        reg.render(a, &mut backend, &mut s).unwrap();
        reg.render(a, &mut backend, &mut s).unwrap();
        reg.render(b, &mut backend, &mut s).unwrap();
        reg.flush(&mut backend);

        assert_eq!(
            *log.borrow(),
            [
                "a:start", "a:render", "a:render", "a:flush", "b:start", "b:render", "b:flush"
            ]
        );
    }

    #[test]
    fn context_init_reaches_every_plugin() {
        let (mut reg, log) = tracers();
        let mut backend = RecordingBackend::new(UniformLayout::default());
        reg.on_context_init(&mut backend).unwrap();
        assert_eq!(*log.borrow(), ["a:init", "b:init"]);
    }

    #[test]
    fn unknown_handle_is_an_error() {
        let mut reg = PluginRegistry::<RecordingBackend>::new();
        let mut backend = RecordingBackend::new(UniformLayout::default());
        let err = reg
            .render(PluginHandle(3), &mut backend, &mut ShaderSprite::default())
            .unwrap_err();
        assert_eq!(err, RenderError::UnknownPlugin(3));
    }

    #[test]
    fn shader_plugin_renders_through_registry() {
        let mut reg = PluginRegistry::<RecordingBackend>::new();
        let handle = create_shader_plugin("plain", None, "frag", UniformSet::new())
            .register(&mut reg)
            .unwrap();
        let mut backend = RecordingBackend::new(UniformLayout::default());
        reg.on_context_init(&mut backend).unwrap();

        reg.render(handle, &mut backend, &mut ShaderSprite::new(Vec2::splat(4.0)))
            .unwrap();
        reg.flush(&mut backend);

        assert!(matches!(backend.calls.last(), Some(Call::Draw { count: 6, .. })));
    }
}
