//! Shared types for the CDS log report.
//!
//! Holds the immutable report model, the fatal error type, command-line
//! settings and the number formatting helpers used by the renderer.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
