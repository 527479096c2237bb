//! WGSL validation and uniform-block reflection through naga.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, ResourceBinding, ScalarKind, TypeInner, VectorSize};

use crate::render::error::{ShaderCompileError, ShaderStage};
use crate::render::uniforms::{UniformKind, UniformLayout};

/// Plugin uniforms are read from this binding.
pub(crate) const UNIFORM_BLOCK_BINDING: ResourceBinding = ResourceBinding {
    group: 1,
    binding: 0,
};

/// Parses and validates one stage and checks its entry point.
pub(crate) fn parse_stage(
    source: &str,
    stage: ShaderStage,
    entry_point: &'static str,
) -> Result<naga::Module, ShaderCompileError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderCompileError::Parse {
        stage,
        message: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderCompileError::Validation {
            stage,
            message: e.as_inner().to_string(),
        })?;

    let naga_stage = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry_point && ep.stage == naga_stage);
    if !found {
        return Err(ShaderCompileError::MissingEntryPoint { stage, entry_point });
    }

    Ok(module)
}

/// Layout of the `@group(1) @binding(0)` uniform struct, if the module declares one.
pub(crate) fn reflect_uniform_block(
    module: &naga::Module,
) -> Result<Option<UniformLayout>, ShaderCompileError> {
    let Some((_, var)) = module.global_variables.iter().find(|(_, v)| {
        v.space == AddressSpace::Uniform && v.binding.as_ref() == Some(&UNIFORM_BLOCK_BINDING)
    }) else {
        return Ok(None);
    };

    let TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
        return Err(ShaderCompileError::UnsupportedUniform {
            name: var.name.clone().unwrap_or_default(),
            ty: "non-struct uniform block".to_string(),
        });
    };

    let mut layout = UniformLayout::new(*span);
    for member in members {
        let name = member.name.clone().unwrap_or_default();
        let inner = &module.types[member.ty].inner;
        let Some(kind) = uniform_kind(inner) else {
            return Err(ShaderCompileError::UnsupportedUniform {
                name,
                ty: format!("{inner:?}"),
            });
        };
        layout.push(name, member.offset, kind);
    }
    Ok(Some(layout))
}

/// Combines the blocks found in each stage. Stages that both declare the block
/// must agree on it exactly.
pub(crate) fn merge_blocks(
    vertex: Option<UniformLayout>,
    fragment: Option<UniformLayout>,
) -> Result<Option<UniformLayout>, ShaderCompileError> {
    match (vertex, fragment) {
        (Some(v), Some(f)) if v != f => Err(ShaderCompileError::UniformBlockMismatch),
        (Some(v), _) => Ok(Some(v)),
        (None, f) => Ok(f),
    }
}

fn uniform_kind(inner: &TypeInner) -> Option<UniformKind> {
    match *inner {
        TypeInner::Scalar(s) if s.width == 4 => match s.kind {
            ScalarKind::Float => Some(UniformKind::Float),
            ScalarKind::Sint => Some(UniformKind::Int),
            ScalarKind::Uint => Some(UniformKind::UInt),
            _ => None,
        },
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float && scalar.width == 4 => {
            Some(match size {
                VectorSize::Bi => UniformKind::Vec2,
                VectorSize::Tri => UniformKind::Vec3,
                VectorSize::Quad => UniformKind::Vec4,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::shader::{ShaderSources, FRAGMENT_ENTRY, VERTEX_ENTRY};

    const FRAGMENT: &str = "
struct Uniforms {
    uTintAlpha: vec4<f32>,
    uTime: f32,
    uSteps: i32,
    uCenter: vec2<f32>,
}

@group(1) @binding(0) var<uniform> u: Uniforms;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let wave = 0.5 + 0.5 * sin(u.uTime + uv.x * f32(u.uSteps));
    return u.uTintAlpha * wave + vec4<f32>(u.uCenter, 0.0, 0.0) * 0.0;
}
";

    fn fragment(source: &str) -> Result<naga::Module, ShaderCompileError> {
        let sources = ShaderSources::new(None, source);
        parse_stage(sources.fragment(), ShaderStage::Fragment, FRAGMENT_ENTRY)
    }

    #[test]
    fn default_vertex_stage_is_valid_and_has_no_block() {
        let sources = ShaderSources::new(None, FRAGMENT);
        let module = parse_stage(sources.vertex(), ShaderStage::Vertex, VERTEX_ENTRY).unwrap();
        assert_eq!(reflect_uniform_block(&module).unwrap(), None);
    }

    #[test]
    fn reflects_members_with_offsets() {
        let module = fragment(FRAGMENT).unwrap();
        let layout = reflect_uniform_block(&module).unwrap().unwrap();

        let slots: Vec<_> = layout
            .slots()
            .iter()
            .map(|s| (s.name.as_str(), s.offset, s.kind))
            .collect();
        assert_eq!(
            slots,
            [
                ("uTintAlpha", 0, UniformKind::Vec4),
                ("uTime", 16, UniformKind::Float),
                ("uSteps", 20, UniformKind::Int),
                ("uCenter", 24, UniformKind::Vec2),
            ]
        );
        assert_eq!(layout.size(), 32);
    }

    #[test]
    fn syntax_errors_are_reported_per_stage() {
        let err = fragment("@fragment fn fs_main( -> {").unwrap_err();
        assert!(matches!(
            err,
            ShaderCompileError::Parse {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let err = fragment(
            "@fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ShaderCompileError::MissingEntryPoint {
                stage: ShaderStage::Fragment,
                entry_point: FRAGMENT_ENTRY,
            }
        );
    }

    #[test]
    fn matrix_members_are_unsupported() {
        let module = fragment(
            "
struct Uniforms { m: mat2x2<f32> }
@group(1) @binding(0) var<uniform> u: Uniforms;
@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(u.m[0], 0.0, 1.0); }
",
        )
        .unwrap();
        let err = reflect_uniform_block(&module).unwrap_err();
        assert!(matches!(err, ShaderCompileError::UnsupportedUniform { ref name, .. } if name == "m"));
    }

    #[test]
    fn merge_requires_identical_blocks() {
        let a = UniformLayout::new(16).with("uTime", 0, UniformKind::Float);
        let b = UniformLayout::new(16).with("uScale", 0, UniformKind::Float);

        assert_eq!(merge_blocks(Some(a.clone()), None).unwrap(), Some(a.clone()));
        assert_eq!(merge_blocks(None, Some(b.clone())).unwrap(), Some(b.clone()));
        assert_eq!(merge_blocks(Some(a.clone()), Some(a.clone())).unwrap(), Some(a));
        assert_eq!(
            merge_blocks(Some(UniformLayout::new(16)), Some(b)).unwrap_err(),
            ShaderCompileError::UniformBlockMismatch
        );
    }
}
