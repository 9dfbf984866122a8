use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a CDS log parse.
///
/// Correlation anomalies are never represented here: they are recorded in the
/// report's error logs and parsing continues.
#[derive(Error, Debug)]
pub enum CdsError {
    /// The input log does not exist. Checked before any line is read.
    #[error("Log file not found: {0}")]
    LogNotFound(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line carried no resolvable `[tag,...]` group.
    #[error("No tag delimiter found on line {line_number}: {line}")]
    MissingTagDelimiter { line_number: usize, line: String },

    /// The report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CdsError {
    /// Attach a 1-based line number to a tokenizer failure.
    pub fn missing_tag_delimiter(line_number: usize, line: impl Into<String>) -> Self {
        CdsError::MissingTagDelimiter {
            line_number,
            line: line.into(),
        }
    }
}

/// Convenience alias used throughout the cds crates.
pub type Result<T> = std::result::Result<T, CdsError>;
