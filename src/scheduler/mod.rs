//! Timer facility module
//!
//! The countdown never talks to a clock directly. It asks a [`Scheduler`]
//! for a repeating tick source and cancels it through the same scheduler.

pub mod manual;
pub mod runtime;

use std::time::Duration;

// Re-export main types
pub use manual::{ManualHandle, ManualScheduler};
pub use runtime::{TickHandle, TokioScheduler};

/// Callback fired once per tick
pub type TickCallback = Box<dyn FnMut()>;

/// A host facility able to fire a callback at a fixed cadence
pub trait Scheduler {
    /// Handle identifying one scheduled tick source
    type Handle;

    /// Register `callback` to fire every `interval` until cancelled
    fn schedule_repeating(
        &self,
        callback: TickCallback,
        interval: Duration,
    ) -> Result<Self::Handle, String>;

    /// Cancel a tick source. Once this returns the callback never fires again.
    fn cancel(&self, handle: Self::Handle);
}
