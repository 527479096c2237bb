use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::render::geometry::{QUAD_INDICES, QUAD_UVS};

/// Buffers of one quad vertex array.
pub(super) struct QuadGpu {
    /// 4 × `vec2<f32>` world positions, rewritten every draw.
    pub positions: wgpu::Buffer,
    pub uvs: wgpu::Buffer,
    pub indices: wgpu::Buffer,
}

/// Vertex array created by [`WgpuBackend`](super::WgpuBackend).
pub struct WgpuQuad {
    pub(super) gpu: Arc<QuadGpu>,
}

impl QuadGpu {
    pub(super) fn new(device: &wgpu::Device) -> Self {
        let positions = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quadshade quad positions"),
            size: std::mem::size_of::<[f32; 8]>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uvs = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quadshade quad uvs"),
            contents: bytemuck::cast_slice(&QUAD_UVS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // 12 bytes of u16 indices; padded to the 4-byte copy alignment.
        let mut index_data = [0u16; 8];
        index_data[..QUAD_INDICES.len()].copy_from_slice(&QUAD_INDICES);
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quadshade quad indices"),
            contents: bytemuck::cast_slice(&index_data),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            positions,
            uvs,
            indices,
        }
    }
}
