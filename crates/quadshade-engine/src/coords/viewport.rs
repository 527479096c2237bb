/// Viewport size in logical pixels.
///
/// The quad vertex stage receives [`Viewport::projection`] as `globals.projection`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// World (top-left origin, +Y down) to NDC as a column-major `mat3x3<f32>`.
    ///
    /// Each column is padded to 16 bytes to match the WGSL uniform layout.
    /// Zero-sized viewports are clamped to 1 px to keep the matrix finite.
    pub fn projection(self) -> [[f32; 4]; 3] {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        [
            [2.0 / w, 0.0, 0.0, 0.0],
            [0.0, -2.0 / h, 0.0, 0.0],
            [-1.0, 1.0, 1.0, 0.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(m: [[f32; 4]; 3], x: f32, y: f32) -> (f32, f32) {
        (
            m[0][0] * x + m[1][0] * y + m[2][0],
            m[0][1] * x + m[1][1] * y + m[2][1],
        )
    }

    #[test]
    fn projection_maps_corners_to_ndc() {
        let m = Viewport::new(800.0, 600.0).projection();
        assert_eq!(project(m, 0.0, 0.0), (-1.0, 1.0));
        assert_eq!(project(m, 800.0, 600.0), (1.0, -1.0));
        assert_eq!(project(m, 400.0, 300.0), (0.0, 0.0));
    }

    #[test]
    fn projection_of_empty_viewport_is_finite() {
        let m = Viewport::new(0.0, 0.0).projection();
        assert!(m.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn is_valid_rejects_zero_and_nan() {
        assert!(Viewport::new(1.0, 1.0).is_valid());
        assert!(!Viewport::new(0.0, 1.0).is_valid());
        assert!(!Viewport::new(f32::NAN, 1.0).is_valid());
    }
}
