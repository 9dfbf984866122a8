//! Log loading for the CDS report.
//!
//! Reads a tagged JVM log line by line and folds every line into a fresh
//! [`CdsLogParser`]. Nothing is kept in memory besides the parser itself.

use std::io::BufRead;
use std::path::Path;

use cds_core::error::{CdsError, Result};
use cds_core::models::CdsReport;
use tracing::debug;

use crate::parser::{CdsLogParser, ParseStats};

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse every line produced by `reader` into a report.
///
/// The first fatal error aborts the pass and no partial report is returned.
pub fn parse_lines<R: BufRead>(reader: R) -> Result<(CdsReport, ParseStats)> {
    let parser = reader.lines().enumerate().try_fold(
        CdsLogParser::new(),
        |mut parser, (index, line)| {
            parser.accept(index + 1, &line?)?;
            Ok::<_, CdsError>(parser)
        },
    )?;
    Ok(parser.finish())
}

/// Parse an in-memory log.
pub fn parse_log_str(content: &str) -> Result<(CdsReport, ParseStats)> {
    parse_lines(content.as_bytes())
}

/// Parse the log at `path`.
///
/// Fails with [`CdsError::LogNotFound`] before reading anything when the file
/// does not exist.
pub fn parse_log_file(path: &Path) -> Result<(CdsReport, ParseStats)> {
    if !path.exists() {
        return Err(CdsError::LogNotFound(path.to_path_buf()));
    }

    let file = std::fs::File::open(path).map_err(|source| CdsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let (report, stats) =
        parse_lines(std::io::BufReader::new(file)).map_err(|err| match err {
            CdsError::Io(source) => CdsError::FileRead {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

    debug!(
        "File {}: {} lines read, {} blank, {} unclassified",
        path.display(),
        stats.lines_read,
        stats.blank_lines,
        stats.categories.unclassified,
    );

    Ok((report, stats))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
