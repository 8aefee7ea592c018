//! Ticker background task

use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::scheduler::TickCallback;

/// Background task that fires `on_tick` every `period`, starting one full
/// period from now
pub async fn ticker_task(period: Duration, mut on_tick: TickCallback) {
    debug!("Starting ticker task with period {:?}", period);

    let mut interval = interval_at(Instant::now() + period, period);
    // Late ticks are caught up so elapsed intervals and ticks stay equal
    interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        interval.tick().await;
        on_tick();
    }
}
