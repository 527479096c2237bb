/// Per-object blend mode.
///
/// All modes assume premultiplied-alpha fragment output.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Multiply,
    Screen,
}

impl BlendMode {
    pub const ALL: [BlendMode; 4] = [
        BlendMode::Normal,
        BlendMode::Add,
        BlendMode::Multiply,
        BlendMode::Screen,
    ];

    /// Dense index into per-mode tables (e.g. one pipeline per mode).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            BlendMode::Normal => 0,
            BlendMode::Add => 1,
            BlendMode::Multiply => 2,
            BlendMode::Screen => 3,
        }
    }

    pub fn blend_state(self) -> wgpu::BlendState {
        use wgpu::BlendFactor as F;

        let (src_factor, dst_factor) = match self {
            BlendMode::Normal => (F::One, F::OneMinusSrcAlpha),
            BlendMode::Add => (F::One, F::DstAlpha),
            BlendMode::Multiply => (F::Dst, F::OneMinusSrcAlpha),
            BlendMode::Screen => (F::One, F::OneMinusSrc),
        };
        let component = wgpu::BlendComponent {
            src_factor,
            dst_factor,
            operation: wgpu::BlendOperation::Add,
        };

        wgpu::BlendState {
            color: component,
            alpha: component,
        }
    }
}
