//! Log ingestion layer for the CDS report.
//!
//! Tokenizes tagged JVM log lines, classifies them by tag set, correlates
//! events across categories with a small lookback window and freezes the
//! result into a [`cds_core::models::CdsReport`].

pub mod analysis;
pub mod anomaly;
pub mod category;
pub mod correlation;
pub mod line;
pub mod lookback;
pub mod parser;
pub mod reader;

pub use cds_core as core;
