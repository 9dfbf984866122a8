//! Streaming engine: tokenize, classify, correlate, remember.

use cds_core::error::{CdsError, Result};
use cds_core::models::CdsReport;
use serde::Serialize;

use crate::category::Category;
use crate::correlation::CorrelationState;
use crate::line::LogLine;
use crate::lookback::LookbackBuffer;

// ── ParseStats ────────────────────────────────────────────────────────────────

/// Lines routed to each category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub vtables: usize,
    pub heap: usize,
    pub mirror: usize,
    pub unshareable: usize,
    pub scc_init: usize,
    pub scc: usize,
    pub unclassified: usize,
}

impl CategoryCounts {
    fn record(&mut self, category: Category) {
        let slot = match category {
            Category::Vtables => &mut self.vtables,
            Category::Heap => &mut self.heap,
            Category::Mirror => &mut self.mirror,
            Category::Unshareable => &mut self.unshareable,
            Category::SccInit => &mut self.scc_init,
            Category::Scc => &mut self.scc,
            Category::Unclassified => &mut self.unclassified,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.vtables
            + self.heap
            + self.mirror
            + self.unshareable
            + self.scc_init
            + self.scc
            + self.unclassified
    }
}

/// Line counters gathered alongside the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Every line read, blank ones included.
    pub lines_read: usize,
    pub blank_lines: usize,
    pub categories: CategoryCounts,
}

// ── CdsLogParser ──────────────────────────────────────────────────────────────

/// Single-pass parser over the lines of one log.
///
/// Each run needs a fresh instance. [`CdsLogParser::finish`] consumes the
/// parser, so no line can be accepted once the report exists.
#[derive(Debug, Default)]
pub struct CdsLogParser {
    state: CorrelationState,
    lookback: LookbackBuffer,
    stats: ParseStats,
}

impl CdsLogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one raw line. `line_number` is 1-based and only used for
    /// error reporting.
    ///
    /// Blank lines are skipped without touching the lookback buffer. A line
    /// with no tag group is fatal.
    pub fn accept(&mut self, line_number: usize, raw: &str) -> Result<()> {
        self.stats.lines_read += 1;
        if raw.trim().is_empty() {
            self.stats.blank_lines += 1;
            return Ok(());
        }

        let line = LogLine::parse(raw)
            .map_err(|_| CdsError::missing_tag_delimiter(line_number, raw))?;
        let category = Category::classify(&line);

        self.state.apply(category, &line.message, &self.lookback);
        self.stats.categories.record(category);
        self.lookback.push(line.message);

        Ok(())
    }

    /// Recent messages, newest first.
    pub fn lookback(&self) -> &LookbackBuffer {
        &self.lookback
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Freeze the accumulated state into the final report.
    pub fn finish(self) -> (CdsReport, ParseStats) {
        (CdsReport::freeze(self.state.into_parts()), self.stats)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
