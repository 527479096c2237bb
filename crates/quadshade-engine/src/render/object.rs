//! Objects a shader plugin can draw.

use crate::coords::{Affine2, Vec2};
use crate::paint::BlendMode;

use super::uniforms::UniformSet;

/// World transform as maintained by the host's scene graph.
///
/// `world_id` is bumped by the host whenever `world` changes.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Transform {
    pub world: Affine2,
    pub world_id: u32,
}

impl Transform {
    pub fn new(world: Affine2) -> Self {
        Self { world, world_id: 0 }
    }

    /// Replaces the world matrix and bumps `world_id`.
    pub fn set_world(&mut self, world: Affine2) {
        self.world = world;
        self.world_id = self.world_id.wrapping_add(1);
    }
}

/// Read access to everything a shader plugin needs from an object, plus the
/// transform-id bookkeeping the host uses for change detection.
pub trait PluginObject {
    fn transform(&self) -> &Transform;

    /// Records which world transform was last drawn.
    fn set_transform_id(&mut self, id: u32);

    /// Quad size in local units.
    fn plugin_size(&self) -> Vec2;

    /// Normalized anchor; `(0, 0)` is the top-left corner.
    fn anchor(&self) -> Vec2;

    /// Packed `0xRRGGBB`.
    fn tint(&self) -> u32;

    /// Accumulated alpha in `[0, 1]`.
    fn world_alpha(&self) -> f32;

    fn blend_mode(&self) -> BlendMode {
        BlendMode::Normal
    }

    fn plugin_uniforms(&self) -> Option<&UniformSet> {
        None
    }
}

/// Plain-data object for hosts without their own scene types.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSprite {
    pub transform: Transform,
    pub transform_id: u32,
    pub size: Vec2,
    pub anchor: Vec2,
    pub tint: u32,
    pub world_alpha: f32,
    pub blend_mode: BlendMode,
    pub uniforms: Option<UniformSet>,
}

impl Default for ShaderSprite {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            transform_id: u32::MAX,
            size: Vec2::zero(),
            anchor: Vec2::zero(),
            tint: 0xFFFFFF,
            world_alpha: 1.0,
            blend_mode: BlendMode::Normal,
            uniforms: None,
        }
    }
}

impl ShaderSprite {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_transform(mut self, world: Affine2) -> Self {
        self.transform.set_world(world);
        self
    }

    pub fn with_tint(mut self, tint: u32, alpha: f32) -> Self {
        self.tint = tint;
        self.world_alpha = alpha;
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    pub fn with_uniforms(mut self, uniforms: UniformSet) -> Self {
        self.uniforms = Some(uniforms);
        self
    }

    /// `true` when the last drawn transform is still current.
    pub fn is_transform_current(&self) -> bool {
        self.transform_id == self.transform.world_id
    }
}

impl PluginObject for ShaderSprite {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_transform_id(&mut self, id: u32) {
        self.transform_id = id;
    }

    fn plugin_size(&self) -> Vec2 {
        self.size
    }

    fn anchor(&self) -> Vec2 {
        self.anchor
    }

    fn tint(&self) -> u32 {
        self.tint
    }

    fn world_alpha(&self) -> f32 {
        self.world_alpha
    }

    fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    fn plugin_uniforms(&self) -> Option<&UniformSet> {
        self.uniforms.as_ref()
    }
}
