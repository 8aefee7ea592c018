//! Utility functions module
//!
//! This module contains utility functions used by the terminal host.

pub mod signals;

// Re-export main functions
pub use signals::shutdown_signal;
