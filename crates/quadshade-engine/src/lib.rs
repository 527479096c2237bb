//! quadshade engine crate.
//!
//! Custom-shaded quad plugins ([`render`]) plus the platform and GPU runtime
//! that hosts them.

pub mod core;
pub mod device;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
