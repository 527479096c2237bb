use anyhow::Result;
use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
pub trait App {
    /// A graphics context was created for `window_id`. Rebuild every GPU
    /// resource here; anything from an earlier context is invalid.
    ///
    /// An error closes the application.
    fn on_context_init(&mut self, window_id: WindowId, gpu: &Gpu<'_>) -> Result<()>;

    /// The context of `window_id` is gone (suspend or window close).
    fn on_context_lost(&mut self, window_id: WindowId) {
        let _ = window_id;
    }

    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per rendered frame per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
