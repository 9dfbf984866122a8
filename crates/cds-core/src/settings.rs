use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::error::{CdsError, Result};

// ── OutputFormat ───────────────────────────────────────────────────────────────

/// How the finished report is written to stdout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable sections with top-N rankings.
    #[default]
    Text,
    /// The report model and its summary as JSON.
    Json,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Statistics report for JVM class-data-sharing logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cds-report",
    about = "Statistics report for JVM class-data-sharing logs (-Xlog:cds*,scc*::tags)",
    version
)]
pub struct Settings {
    /// Tagged CDS log file to analyse
    #[arg(env = "CDS_REPORT_LOG")]
    pub log_file: PathBuf,

    /// Number of classes listed in each top-N ranking (1-1000)
    #[arg(long, env = "CDS_REPORT_TOP", default_value = "10", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub top: u32,

    /// Output format
    #[arg(long, env = "CDS_REPORT_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply `--debug`.
    pub fn load() -> Self {
        Self::parse().resolve()
    }

    /// Same as [`Settings::load`] but from an explicit argument list.
    pub fn try_load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
            .map(Self::resolve)
            .map_err(|e| CdsError::Config(e.to_string()))
    }

    /// Number of ranked classes as a `usize`, for slicing.
    pub fn top_n(&self) -> usize {
        self.top as usize
    }

    /// `--debug` overrides the log level.
    fn resolve(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
