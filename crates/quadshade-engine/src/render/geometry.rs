//! Quad geometry from an object's world transform, size and anchor.

use crate::coords::{Affine2, Vec2};

/// Triangle-list indices covering V0..V3 (two triangles).
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Number of indices drawn per quad.
pub const QUAD_INDEX_COUNT: u32 = QUAD_INDICES.len() as u32;

/// Texture coordinates, same winding as the positions.
pub const QUAD_UVS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

/// Four world-space vertices as interleaved `x, y` pairs.
///
/// Order is top-left, top-right, bottom-right, bottom-left relative to the
/// unrotated anchor frame.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct QuadGeometry(pub [f32; 8]);

impl QuadGeometry {
    #[inline]
    pub fn vertex(&self, i: usize) -> Vec2 {
        Vec2::new(self.0[i * 2], self.0[i * 2 + 1])
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Computes the quad for an object of `size` anchored at `anchor` (normalized,
/// `(0, 0)` = top-left, `(0.5, 0.5)` = center) under `transform`.
///
/// Zero or negative sizes are passed through; they produce a degenerate or
/// mirrored quad.
pub fn evaluate_quad(transform: &Affine2, size: Vec2, anchor: Vec2) -> QuadGeometry {
    let Affine2 { a, b, c, d, tx, ty } = *transform;

    let w1 = -anchor.x * size.x;
    let w0 = w1 + size.x;

    let h1 = -anchor.y * size.y;
    let h0 = h1 + size.y;

    QuadGeometry([
        a * w1 + c * h1 + tx,
        d * h1 + b * w1 + ty,
        a * w0 + c * h1 + tx,
        d * h1 + b * w0 + ty,
        a * w0 + c * h0 + tx,
        d * h0 + b * w0 + ty,
        a * w1 + c * h0 + tx,
        d * h0 + b * w1 + ty,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn identity_top_left_anchor() {
        let q = evaluate_quad(&Affine2::identity(), Vec2::new(40.0, 30.0), Vec2::zero());
        assert_eq!(q.0, [0.0, 0.0, 40.0, 0.0, 40.0, 30.0, 0.0, 30.0]);
    }

    #[test]
    fn centered_anchor_straddles_origin() {
        let q = evaluate_quad(&Affine2::identity(), Vec2::new(40.0, 30.0), Vec2::splat(0.5));
        assert_eq!(q.vertex(0), Vec2::new(-20.0, -15.0));
        assert_eq!(q.vertex(1), Vec2::new(20.0, -15.0));
        assert_eq!(q.vertex(2), Vec2::new(20.0, 15.0));
        assert_eq!(q.vertex(3), Vec2::new(-20.0, 15.0));
    }

    #[test]
    fn translation_offsets_every_vertex() {
        let t = Affine2::translation(100.0, 50.0);
        let q = evaluate_quad(&t, Vec2::new(10.0, 10.0), Vec2::zero());
        assert_eq!(q.vertex(0), Vec2::new(100.0, 50.0));
        assert_eq!(q.vertex(2), Vec2::new(110.0, 60.0));
    }

    #[test]
    fn matches_transforming_local_corners() {
        let t = Affine2::from_trs(Vec2::new(12.0, -4.0), 0.7, Vec2::new(1.5, 0.5));
        let size = Vec2::new(20.0, 8.0);
        let anchor = Vec2::new(0.25, 0.75);
        let q = evaluate_quad(&t, size, anchor);

        let x0 = -anchor.x * size.x;
        let y0 = -anchor.y * size.y;
        let corners = [
            Vec2::new(x0, y0),
            Vec2::new(x0 + size.x, y0),
            Vec2::new(x0 + size.x, y0 + size.y),
            Vec2::new(x0, y0 + size.y),
        ];
        for (i, corner) in corners.iter().enumerate() {
            assert!(approx(q.vertex(i), t.apply(*corner)), "vertex {i}");
        }
    }

    #[test]
    fn zero_size_collapses_to_anchor_point() {
        let t = Affine2::translation(5.0, 5.0);
        let q = evaluate_quad(&t, Vec2::new(0.0, 10.0), Vec2::splat(0.5));
        assert_eq!(q.vertex(0).x, q.vertex(1).x);
        assert_eq!(q.vertex(0).x, 5.0);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let t = Affine2::from_trs(Vec2::new(3.0, 4.0), 1.1, Vec2::splat(2.0));
        let a = evaluate_quad(&t, Vec2::new(7.0, 9.0), Vec2::splat(0.5));
        let b = evaluate_quad(&t, Vec2::new(7.0, 9.0), Vec2::splat(0.5));
        assert_eq!(a, b);
    }

    #[test]
    fn index_pattern_covers_all_vertices() {
        let mut seen = [false; 4];
        for i in QUAD_INDICES {
            seen[i as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(QUAD_INDEX_COUNT, 6);
    }
}
