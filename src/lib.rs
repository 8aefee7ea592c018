//! Countdown Timer - a single-subject countdown with observer notifications
//!
//! A [`CountdownTimer`] owns one integer counter, decrements it once per
//! second on a tick source supplied by a [`Scheduler`], and notifies its
//! observers of every new value. Ticking is single-threaded: the Tokio
//! scheduler queues tick sources as local tasks on its own
//! `tokio::task::LocalSet`, which the host drives with
//! [`TokioScheduler::run_until`].

pub mod config;
pub mod display;
pub mod scheduler;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use display::{OutputFormat, Renderer};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use timer::{CountdownState, CountdownTimer, Subscription, TICK_INTERVAL};
pub use utils::signals::shutdown_signal;
