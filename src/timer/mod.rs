//! Countdown timer module
//!
//! This module contains the countdown itself, its observer registry and the
//! state snapshot it reports.

pub mod countdown;
pub mod observers;
pub mod state;

// Re-export main types
pub use countdown::{CountdownTimer, TICK_INTERVAL};
pub use observers::{Observer, Subscription};
pub use state::CountdownState;
