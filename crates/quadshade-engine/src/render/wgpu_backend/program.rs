use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::paint::BlendMode;
use crate::render::backend::ShaderProgram;
use crate::render::shader::{ShaderSources, FRAGMENT_ENTRY, VERTEX_ENTRY};
use crate::render::uniforms::{UniformLayout, UniformTable};

// ── globals uniform ───────────────────────────────────────────────────────

/// `QuadGlobals` from the shader prelude.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct GlobalsUniform {
    pub projection: [[f32; 4]; 3], // mat3x3<f32>, columns padded to vec4
}

fn globals_min_binding_size() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<GlobalsUniform>() as u64)
}

// ── vertex layouts ────────────────────────────────────────────────────────

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const UV_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    let stride = (2 * std::mem::size_of::<f32>()) as u64;
    [
        wgpu::VertexBufferLayout {
            array_stride: stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &UV_ATTRS,
        },
    ]
}

// ── program ───────────────────────────────────────────────────────────────

/// GPU objects of a linked program. Shared with the backend while bound.
pub(super) struct ProgramGpu {
    /// One pipeline per [`BlendMode`], indexed by [`BlendMode::index`].
    pub pipelines: Vec<wgpu::RenderPipeline>,
    pub globals_ubo: wgpu::Buffer,
    pub globals_bind_group: wgpu::BindGroup,
    pub uniform_ubo: Option<wgpu::Buffer>,
    pub uniform_bind_group: Option<wgpu::BindGroup>,
}

/// Program compiled by [`WgpuBackend`](super::WgpuBackend).
pub struct WgpuProgram {
    pub(super) uniforms: UniformTable,
    pub(super) gpu: Arc<ProgramGpu>,
}

impl ShaderProgram for WgpuProgram {
    fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    fn uniforms_mut(&mut self) -> &mut UniformTable {
        &mut self.uniforms
    }
}

impl ProgramGpu {
    /// Builds shader modules, bind groups and one pipeline per blend mode.
    ///
    /// `sources` must already have passed naga validation.
    pub(super) fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        sources: &ShaderSources,
        block: &UniformLayout,
    ) -> Self {
        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quadshade vertex shader"),
            source: wgpu::ShaderSource::Wgsl(sources.vertex().into()),
        });
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quadshade fragment shader"),
            source: wgpu::ShaderSource::Wgsl(sources.fragment().into()),
        });

        let visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quadshade globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: globals_min_binding_size(),
                },
                count: None,
            }],
        });

        let globals_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quadshade globals ubo"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quadshade globals bind group"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_ubo.as_entire_binding(),
            }],
        });

        // Plugin uniform block (group 1), only when the shaders declare one.
        let mut uniform_ubo = None;
        let mut uniform_bind_group = None;
        let mut uniform_bgl = None;
        if block.size() > 0 {
            let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("quadshade uniforms bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

            let ubo = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("quadshade uniforms ubo"),
                size: u64::from(block.size().next_multiple_of(16)),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            uniform_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("quadshade uniforms bind group"),
                layout: &bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                }],
            }));
            uniform_ubo = Some(ubo);
            uniform_bgl = Some(bgl);
        }

        let mut bind_group_layouts = vec![&globals_bgl];
        bind_group_layouts.extend(uniform_bgl.as_ref());

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quadshade pipeline layout"),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        let buffers = vertex_layouts();
        let pipelines = BlendMode::ALL
            .iter()
            .map(|mode| {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("quadshade pipeline"),
                    layout: Some(&pipeline_layout),

                    vertex: wgpu::VertexState {
                        module: &vs,
                        entry_point: Some(VERTEX_ENTRY),
                        compilation_options: Default::default(),
                        buffers: &buffers,
                    },

                    fragment: Some(wgpu::FragmentState {
                        module: &fs,
                        entry_point: Some(FRAGMENT_ENTRY),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: surface_format,
                            blend: Some(mode.blend_state()),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),

                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        // Rotation and negative scale flip the winding.
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },

                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                })
            })
            .collect();

        Self {
            pipelines,
            globals_ubo,
            globals_bind_group,
            uniform_ubo,
            uniform_bind_group,
        }
    }

    #[inline]
    pub(super) fn pipeline(&self, mode: BlendMode) -> &wgpu::RenderPipeline {
        &self.pipelines[mode.index()]
    }
}
