//! Soft correlation anomalies recorded in the report's error logs.

use cds_core::models::Root;
use thiserror::Error;

/// Which of the report's two error logs an anomaly belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLog {
    HeapObjects,
    Vtables,
}

/// A cross-referential inconsistency. Never aborts the parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    #[error("Repeated vtables message for '{class_name}': recorded {previous} entries, now {current}")]
    RepeatedVtable {
        class_name: String,
        previous: u32,
        current: u32,
    },

    #[error("Duplicated root clearing '{root_id}': already registered as {previous}, now className '{class_name}' and pointer '{pointer}'")]
    DuplicateRoot {
        root_id: String,
        previous: Root,
        class_name: String,
        pointer: String,
    },

    #[error("Missing restored root for '{class_name}': no root was cleared for it, current pointer is '{pointer}'")]
    MissingRestoredRoot { class_name: String, pointer: String },

    #[error("Mismatched pointer for '{class_name}': root had {expected}, restored at {actual}")]
    PointerMismatch {
        class_name: String,
        expected: String,
        actual: String,
    },

    #[error("Out-of-order sequence for '{class_name}': got '{message}' with no previous restore attempt")]
    OutOfOrderMirror { class_name: String, message: String },
}

impl Anomaly {
    pub fn log(&self) -> ErrorLog {
        match self {
            Anomaly::RepeatedVtable { .. } => ErrorLog::Vtables,
            _ => ErrorLog::HeapObjects,
        }
    }
}
