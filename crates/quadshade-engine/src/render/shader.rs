//! Shader source pair handed to the backend for compilation.
//!
//! Sources are WGSL. Both stages are compiled with [`PRELUDE`] prepended, which
//! declares the shared projection binding:
//!
//! ```wgsl
//! struct QuadGlobals { projection: mat3x3<f32> }
//! @group(0) @binding(0) var<uniform> globals: QuadGlobals;
//! ```
//!
//! Plugin uniforms live in a single block at `@group(1) @binding(0)`, declared
//! by either stage (or both, with the same layout). Entry points are
//! [`VERTEX_ENTRY`] and [`FRAGMENT_ENTRY`].
//!
//! Vertex inputs: `@location(0)` world position, `@location(1)` texture coordinate.

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Fixed header prepended to both stages.
pub const PRELUDE: &str = "\
// quadshade prelude v1
struct QuadGlobals {
    projection: mat3x3<f32>,
}

@group(0) @binding(0) var<uniform> globals: QuadGlobals;
";

/// Used when a plugin supplies no vertex stage: projects the world position and
/// forwards the texture coordinate to `@location(0)`.
pub const DEFAULT_VERTEX_SOURCE: &str = "\
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip = vec4<f32>((globals.projection * vec3<f32>(in.position, 1.0)).xy, 0.0, 1.0);
    out.uv = in.uv;
    return out;
}
";

/// Vertex + fragment source, already prefixed with [`PRELUDE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    vertex: String,
    fragment: String,
}

impl ShaderSources {
    /// `vertex = None` selects [`DEFAULT_VERTEX_SOURCE`].
    pub fn new(vertex: Option<&str>, fragment: &str) -> Self {
        let vertex = vertex.unwrap_or(DEFAULT_VERTEX_SOURCE);
        Self {
            vertex: with_prelude(vertex),
            fragment: with_prelude(fragment),
        }
    }

    #[inline]
    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    #[inline]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

fn with_prelude(body: &str) -> String {
    let mut s = String::with_capacity(PRELUDE.len() + 1 + body.len());
    s.push_str(PRELUDE);
    s.push('\n');
    s.push_str(body);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vertex_source_uses_default() {
        let s = ShaderSources::new(None, "frag");
        assert!(s.vertex().starts_with(PRELUDE));
        assert!(s.vertex().ends_with(DEFAULT_VERTEX_SOURCE));
    }

    #[test]
    fn both_stages_get_the_prelude() {
        let s = ShaderSources::new(Some("vert"), "frag");
        assert_eq!(s.vertex(), format!("{PRELUDE}\nvert"));
        assert_eq!(s.fragment(), format!("{PRELUDE}\nfrag"));
    }
}
