/// Represents a single acquired frame.
///
/// Holding the surface texture blocks acquisition of the next one, so finish
/// and submit promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
