//! Window + runtime loop.
//!
//! Owns the `winit` event loop and windows, creates one GPU context per
//! window and tells the app when contexts appear and disappear.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
pub use winit::event::WindowEvent;
pub use winit::window::WindowId;
