//! Countdown Timer - terminal host for a single countdown
//!
//! This is the main entry point for the countdown-timer application.

use std::{io, rc::Rc};
use tokio::sync::Notify;
use tracing::{info, warn};

use countdown_timer::{
    config::Config,
    display::Renderer,
    scheduler::TokioScheduler,
    timer::CountdownTimer,
    utils::shutdown_signal,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so rendered values own stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={}", config.log_level()))
        .with_writer(io::stderr)
        .init();

    info!("Starting countdown-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: duration={}, format={:?}, exit_at_zero={}",
          config.duration, config.format, config.exit_at_zero);

    let scheduler = TokioScheduler::new();
    let timer = CountdownTimer::with_scheduler(config.duration, scheduler.clone());

    scheduler.run_until(run(config, &timer)).await
}

/// Attach the countdown to the terminal and run it until shutdown
async fn run(config: Config, timer: &CountdownTimer) -> anyhow::Result<()> {
    let renderer = Renderer::new(config.format);
    let halt = Rc::new(Notify::new());

    renderer.write_line(&mut io::stdout().lock(), timer.current_value())?;
    if config.exit_at_zero && timer.current_value() <= 0 {
        info!("Countdown already at zero");
        return Ok(());
    }

    let exit_at_zero = config.exit_at_zero;
    let wake = Rc::clone(&halt);
    let _display = timer.subscribe(move |remaining| {
        if let Err(e) = renderer.write_line(&mut io::stdout().lock(), remaining) {
            warn!("Failed to write countdown value: {}", e);
            wake.notify_one();
        } else if exit_at_zero && remaining <= 0 {
            info!("Countdown reached zero");
            wake.notify_one();
        }
    });

    timer.start().map_err(anyhow::Error::msg)?;

    // Early returns still stop the timer when it is dropped
    tokio::select! {
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received");
        }
        _ = halt.notified() => {}
    }

    timer.stop();
    info!("Countdown finished: {:?}", timer.snapshot());
    Ok(())
}
