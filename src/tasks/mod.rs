//! Background tasks module
//!
//! This module contains the async loops that back host tick sources.

pub mod ticker;

// Re-export main functions
pub use ticker::ticker_task;
