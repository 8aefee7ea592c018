//! Display module
//!
//! This module turns countdown values into text for the terminal host.

pub mod render;

// Re-export main types
pub use render::{OutputFormat, Renderer, TickEvent};
