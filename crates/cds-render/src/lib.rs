//! Rendering layer for the CDS report.
//!
//! [`summary`] derives rankings and totals from a finished report and
//! [`printer`] lays them out as plain text.

pub mod printer;
pub mod summary;

pub use cds_core as core;
