//! Rendering of countdown values

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How rendered values are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The bare integer
    #[default]
    Plain,
    /// Minutes and seconds, `MM:SS`
    Clock,
    /// One JSON object per line
    Json,
}

/// JSON line emitted for every rendered value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickEvent {
    pub remaining: i64,
    pub expired: bool,
    pub timestamp: DateTime<Utc>,
}

impl TickEvent {
    /// Create an event stamped with the current time
    pub fn new(remaining: i64) -> Self {
        Self {
            remaining,
            expired: remaining <= 0,
            timestamp: Utc::now(),
        }
    }
}

/// Formats countdown values in the configured [`OutputFormat`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    format: OutputFormat,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a single value
    pub fn render(&self, remaining: i64) -> String {
        match self.format {
            OutputFormat::Plain => remaining.to_string(),
            OutputFormat::Clock => format_clock(remaining),
            OutputFormat::Json => serde_json::to_string(&TickEvent::new(remaining))
                .unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e)),
        }
    }

    /// Render a value as one line of `out`
    ///
    /// Write errors such as a closed pipe are returned to the caller.
    pub fn write_line<W: Write>(&self, out: &mut W, remaining: i64) -> io::Result<()> {
        writeln!(out, "{}", self.render(remaining))?;
        out.flush()
    }
}

fn format_clock(remaining: i64) -> String {
    let sign = if remaining < 0 { "-" } else { "" };
    let seconds = remaining.unsigned_abs();
    format!("{}{:02}:{:02}", sign, seconds / 60, seconds % 60)
}
