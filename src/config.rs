//! Configuration and CLI argument handling

use clap::Parser;

use crate::display::OutputFormat;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "countdown-timer")]
#[command(about = "Count down from a starting value once per second")]
#[command(version)]
pub struct Config {
    /// Starting value of the countdown, in seconds
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(i64).range(0..))]
    pub duration: i64,

    /// Output format for rendered values
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Stop and exit once the countdown reaches zero
    #[arg(long)]
    pub exit_at_zero: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
