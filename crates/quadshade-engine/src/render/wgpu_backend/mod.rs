//! wgpu implementation of [`RenderBackend`](crate::render::RenderBackend).
//!
//! Shader sources are validated and reflected with naga before any wgpu object
//! is created, so malformed plugin shaders surface as [`ShaderCompileError`]
//! instead of a device error.
//!
//! Inside a frame every upload goes through a [`StagingBelt`] copy recorded in
//! the frame's command encoder, so consecutive draws each see their own
//! vertices and uniforms even though they share buffers. The belt's chunks are
//! recycled once the frame is submitted.
//!
//! [`StagingBelt`]: wgpu::util::StagingBelt
//!
//! [`ShaderCompileError`]: crate::render::ShaderCompileError

mod program;
mod quad;
mod reflect;

use std::sync::Arc;

use wgpu::util::StagingBelt;

use crate::coords::Viewport;
use crate::paint::BlendMode;
use crate::render::backend::{DrawMode, RenderBackend, ShaderProgram};
use crate::render::error::{DrawError, ShaderCompileError, ShaderStage};
use crate::render::geometry::QuadGeometry;
use crate::render::shader::{ShaderSources, FRAGMENT_ENTRY, VERTEX_ENTRY};
use crate::render::uniforms::UniformTable;

use program::{GlobalsUniform, ProgramGpu};
use quad::QuadGpu;

pub use program::WgpuProgram;
pub use quad::WgpuQuad;

/// Staging chunk size. Holds a few hundred quad uploads.
const STAGING_CHUNK_SIZE: wgpu::BufferAddress = 64 * 1024;

/// Encoder and color target of the frame being recorded.
pub struct FrameTarget {
    pub encoder: wgpu::CommandEncoder,
    pub view: wgpu::TextureView,
}

/// Shader-plugin backend over a wgpu device.
///
/// Lives as long as the device. Rebuild it (and re-run plugin context init)
/// whenever the device is recreated.
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface_format: wgpu::TextureFormat,
    viewport: Viewport,

    frame: Option<FrameTarget>,
    belt: StagingBelt,

    bound_program: Option<Arc<ProgramGpu>>,
    bound_quad: Option<Arc<QuadGpu>>,
    blend_mode: BlendMode,
}

impl WgpuBackend {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let belt = StagingBelt::new((*device).clone(), STAGING_CHUNK_SIZE);
        Self {
            device,
            queue,
            surface_format,
            viewport: Viewport::default(),
            frame: None,
            belt,
            bound_program: None,
            bound_quad: None,
            blend_mode: BlendMode::Normal,
        }
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Starts recording draws into `target` for a viewport in logical pixels.
    pub fn begin_frame(&mut self, target: FrameTarget, viewport: Viewport) {
        if self.frame.is_some() {
            log::warn!("begin_frame while a frame is open; previous frame discarded");
        }
        self.frame = Some(target);
        self.viewport = viewport;
    }

    /// Stops recording and hands the encoder back for submission.
    ///
    /// Call [`after_submit`](Self::after_submit) once the encoder is submitted.
    pub fn end_frame(&mut self) -> Option<FrameTarget> {
        self.bound_program = None;
        self.bound_quad = None;
        self.belt.finish();
        self.frame.take()
    }

    /// Recycles staging memory of the submitted frame.
    pub fn after_submit(&mut self) {
        self.belt.recall();
    }

    /// Copies `bytes` to the start of `target`, ordered with the frame's passes.
    ///
    /// `bytes.len()` must be a multiple of 4.
    fn write(&mut self, target: &wgpu::Buffer, bytes: &[u8]) {
        let Some(size) = wgpu::BufferSize::new(bytes.len() as u64) else {
            return;
        };
        match self.frame.as_mut() {
            Some(frame) => {
                self.belt
                    .write_buffer(&mut frame.encoder, target, 0, size)
                    .copy_from_slice(bytes);
            }
            None => self.queue.write_buffer(target, 0, bytes),
        }
    }
}

impl RenderBackend for WgpuBackend {
    type Program = WgpuProgram;
    type Quad = WgpuQuad;

    fn compile_program(&mut self, sources: &ShaderSources) -> Result<WgpuProgram, ShaderCompileError> {
        let vs = reflect::parse_stage(sources.vertex(), ShaderStage::Vertex, VERTEX_ENTRY)?;
        let fs = reflect::parse_stage(sources.fragment(), ShaderStage::Fragment, FRAGMENT_ENTRY)?;

        let block = reflect::merge_blocks(
            reflect::reflect_uniform_block(&vs)?,
            reflect::reflect_uniform_block(&fs)?,
        )?
        .unwrap_or_default();

        let gpu = ProgramGpu::new(&self.device, self.surface_format, sources, &block);

        Ok(WgpuProgram {
            uniforms: UniformTable::new(block),
            gpu: Arc::new(gpu),
        })
    }

    fn bind_program(&mut self, program: &WgpuProgram) {
        self.bound_program = Some(Arc::clone(&program.gpu));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    fn create_quad(&mut self, _program: &WgpuProgram) -> WgpuQuad {
        // Every program shares the same attribute layout.
        WgpuQuad {
            gpu: Arc::new(QuadGpu::new(&self.device)),
        }
    }

    fn bind_quad(&mut self, quad: &WgpuQuad) {
        self.bound_quad = Some(Arc::clone(&quad.gpu));
    }

    fn upload_quad(&mut self, quad: &mut WgpuQuad, geometry: &QuadGeometry) {
        let gpu = Arc::clone(&quad.gpu);
        self.write(&gpu.positions, bytemuck::cast_slice(geometry.as_slice()));
    }

    fn draw(
        &mut self,
        program: &WgpuProgram,
        _quad: &WgpuQuad,
        mode: DrawMode,
        count: u32,
        start: u32,
    ) -> Result<(), DrawError> {
        if self.frame.is_none() {
            return Err(DrawError::NoFrame);
        }
        let (Some(prog), Some(quad)) = (self.bound_program.clone(), self.bound_quad.clone()) else {
            return Err(DrawError::NothingBound);
        };
        debug_assert!(Arc::ptr_eq(&prog, &program.gpu), "drawing with an unbound program");

        // Pipelines are built as triangle lists.
        let DrawMode::Triangles = mode;

        let globals = GlobalsUniform {
            projection: self.viewport.projection(),
        };
        self.write(&prog.globals_ubo, bytemuck::bytes_of(&globals));
        if let Some(ubo) = prog.uniform_ubo.as_ref() {
            self.write(ubo, program.uniforms().as_bytes());
        }

        let Some(frame) = self.frame.as_mut() else {
            return Err(DrawError::NoFrame);
        };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("quadshade pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(prog.pipeline(self.blend_mode));
        rpass.set_bind_group(0, &prog.globals_bind_group, &[]);
        if let Some(bind_group) = prog.uniform_bind_group.as_ref() {
            rpass.set_bind_group(1, bind_group, &[]);
        }
        rpass.set_vertex_buffer(0, quad.positions.slice(..));
        rpass.set_vertex_buffer(1, quad.uvs.slice(..));
        rpass.set_index_buffer(quad.indices.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(start..start + count, 0, 0..1);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Affine2, Vec2};
    use crate::render::{create_shader_plugin, PluginRegistry, ShaderSprite, UniformSet};

    const WIDTH: u32 = 8;
    const HEIGHT: u32 = 4;
    /// `bytes_per_row` must be a multiple of 256.
    const ROW_PITCH: u32 = 256;
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    const TINT_FRAGMENT: &str = "
struct Uniforms { uTintAlpha: vec4<f32> }
@group(1) @binding(0) var<uniform> u: Uniforms;
@fragment fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> { return u.uTintAlpha; }
";

    /// `None` when the machine has no usable adapter.
    fn headless() -> Option<(Arc<wgpu::Device>, Arc<wgpu::Queue>)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())).ok()?;
        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()?;
        Some((Arc::new(device), Arc::new(queue)))
    }

    fn target(device: &wgpu::Device) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test target"),
            size: wgpu::Extent3d {
                width: WIDTH,
                height: HEIGHT,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    /// Records two draws into one frame, submits it, and reads the target back.
    fn draw_frame(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        backend: &mut WgpuBackend,
        registry: &mut PluginRegistry<WgpuBackend>,
        left: u32,
        right: u32,
    ) -> Vec<u8> {
        let texture = target(device);
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        backend.begin_frame(FrameTarget { encoder, view }, Viewport::new(WIDTH as f32, HEIGHT as f32));

        let plugin = registry.handle("tint").unwrap();
        let half = Vec2::new(WIDTH as f32 / 2.0, HEIGHT as f32);
        let mut a = ShaderSprite::new(half).with_tint(left, 1.0);
        let mut b = ShaderSprite::new(half)
            .with_tint(right, 1.0)
            .with_transform(Affine2::translation(half.x, 0.0));
        registry.render(plugin, backend, &mut a).unwrap();
        registry.render(plugin, backend, &mut b).unwrap();
        registry.flush(backend);

        let FrameTarget { mut encoder, .. } = backend.end_frame().unwrap();
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("test readback"),
            size: u64::from(ROW_PITCH * HEIGHT),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(ROW_PITCH),
                    rows_per_image: Some(HEIGHT),
                },
            },
            wgpu::Extent3d {
                width: WIDTH,
                height: HEIGHT,
                depth_or_array_layers: 1,
            },
        );
        queue.submit([encoder.finish()]);
        backend.after_submit();

        let slice = readback.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| ());
        device.poll(wgpu::PollType::wait_indefinitely()).unwrap();
        let bytes = slice.get_mapped_range().to_vec();
        bytes
    }

    fn pixel(bytes: &[u8], x: u32, y: u32) -> [u8; 4] {
        let at = (y * ROW_PITCH + x * 4) as usize;
        [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]
    }

    // ── ordering ──

    #[test]
    fn each_draw_sees_its_own_uniforms_across_frames() {
        let Some((device, queue)) = headless() else {
            eprintln!("no wgpu adapter; skipping");
            return;
        };
        let mut backend = WgpuBackend::new(Arc::clone(&device), Arc::clone(&queue), FORMAT);
        let mut registry = PluginRegistry::new();
        create_shader_plugin("tint", None, TINT_FRAGMENT, UniformSet::new())
            .register(&mut registry)
            .unwrap();
        registry.on_context_init(&mut backend).unwrap();

        // The second frame reuses recalled staging chunks.
        for (left, right) in [(0xFF0000, 0x00FF00), (0x0000FF, 0xFFFFFF)] {
            let bytes = draw_frame(&device, &queue, &mut backend, &mut registry, left, right);
            let [lr, lg, lb] = [(left >> 16) as u8, (left >> 8) as u8, left as u8];
            let [rr, rg, rb] = [(right >> 16) as u8, (right >> 8) as u8, right as u8];
            assert_eq!(pixel(&bytes, 1, 1), [lr, lg, lb, 255]);
            assert_eq!(pixel(&bytes, 6, 2), [rr, rg, rb, 255]);
        }
    }
}
