//! Countdown state snapshot

use serde::{Deserialize, Serialize};

/// Point-in-time view of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    /// Value supplied at construction
    pub initial_value: i64,
    /// Current countdown value, may be negative
    pub remaining: i64,
    /// Whether a tick source is active
    pub running: bool,
    /// Ticks applied since construction
    pub elapsed_ticks: u64,
}

impl CountdownState {
    /// Check if the countdown has reached or passed zero
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0
    }
}
