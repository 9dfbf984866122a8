//! Top-level analysis pipeline for the CDS report.
//!
//! Parses one log file and wraps the resulting [`CdsReport`] with metadata
//! about the run, ready for the rendering layer.

use std::path::Path;

use cds_core::error::Result;
use cds_core::models::CdsReport;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::parser::CategoryCounts;
use crate::reader::parse_log_file;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// The log file that was analysed.
    pub source: String,
    /// Every line read, blank ones included.
    pub lines_read: usize,
    pub blank_lines: usize,
    /// Lines routed to each handler category.
    pub categories: CategoryCounts,
    /// Wall-clock seconds spent parsing.
    pub parse_time_seconds: f64,
}

/// The complete output of [`analyze_log`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub report: CdsReport,
    pub metadata: AnalysisMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Parse the log at `path` and build an [`AnalysisResult`].
pub fn analyze_log(path: &Path) -> Result<AnalysisResult> {
    info!("Analysing {}", path.display());

    let parse_start = std::time::Instant::now();
    let (report, stats) = parse_log_file(path)?;
    let parse_time = parse_start.elapsed().as_secs_f64();

    let anomalies = report.errors_heap_objects().len() + report.errors_vtables().len();
    if anomalies > 0 {
        warn!("{} correlation anomalies found in {}", anomalies, path.display());
    }
    if stats.categories.total() > 0 && stats.categories.total() == stats.categories.unclassified {
        warn!(
            "No CDS or SCC lines recognised in {}; was the log written with -Xlog:cds*,scc*::tags?",
            path.display()
        );
    }

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source: path.display().to_string(),
        lines_read: stats.lines_read,
        blank_lines: stats.blank_lines,
        categories: stats.categories,
        parse_time_seconds: parse_time,
    };

    info!(
        "Parsed {} lines in {:.3}s",
        metadata.lines_read, metadata.parse_time_seconds
    );

    Ok(AnalysisResult { report, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
