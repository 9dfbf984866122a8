//! Plain-text layout of the CDS report.
//!
//! Sections follow the order an engineer reads them when checking archive
//! loading: class loaders, metadata methods, heap objects, nmethods and
//! vtables. Counts sit in a right-aligned column.

use std::io::{self, Write};

use cds_core::formatting::{count_column, format_count};
use cds_core::models::CdsReport;

use crate::summary::ReportSummary;

const RULE: &str =
    "--------------------------------------------------------------------------";

/// Write the text report for `report` into `out`.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &CdsReport,
    summary: &ReportSummary,
) -> io::Result<()> {
    writeln!(out, "CDS Report:")?;
    write_classes(out, summary)?;
    write_metadata(out, summary)?;
    write_heap_objects(out, report, summary)?;
    write_nmethods(out, summary)?;
    write_vtables(out, report)?;
    writeln!(out, "{RULE}")?;
    Ok(())
}

/// Render the text report into a `String`.
pub fn render_report(report: &CdsReport, summary: &ReportSummary) -> String {
    let mut buffer = Vec::new();
    write_report(&mut buffer, report, summary).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buffer).into_owned()
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn write_classes<W: Write>(out: &mut W, summary: &ReportSummary) -> io::Result<()> {
    writeln!(out, " CLASSES:")?;
    writeln!(out, "  Used class loaders:")?;
    for loader in &summary.loaders {
        writeln!(
            out,
            "{} classes loaded by '{}'",
            count_column(loader.classes as u64),
            loader.loader
        )?;
    }
    writeln!(out)
}

fn write_metadata<W: Write>(out: &mut W, summary: &ReportSummary) -> io::Result<()> {
    writeln!(out, " METADATA SPACE:")?;
    writeln!(
        out,
        "{} unique metadata methods found",
        count_column(summary.unique_metadata_methods as u64)
    )?;
    writeln!(
        out,
        "     Top {} classes with more metadata methods:",
        summary.top_n
    )?;
    for class in &summary.top_metadata_classes {
        writeln!(
            out,
            "{} metadata methods in class '{}'",
            count_column(class.count as u64),
            class.class_name
        )?;
    }
    writeln!(out)
}

fn write_heap_objects<W: Write>(
    out: &mut W,
    report: &CdsReport,
    summary: &ReportSummary,
) -> io::Result<()> {
    writeln!(out, " HEAP OBJECTS:")?;
    writeln!(
        out,
        "{} classes recreated",
        count_column(summary.recreated as u64)
    )?;
    writeln!(
        out,
        "{} classes restored",
        count_column(summary.restored as u64)
    )?;
    if summary.has_load_mirror_mismatch() {
        writeln!(
            out,
            "Warning: the number of classes loaded ({}) and mirrored ({}) don't match",
            format_count(summary.unshareable_total as u64),
            format_count(summary.mirrored_total as u64)
        )?;
    }
    write_errors(out, report.errors_heap_objects())?;
    writeln!(out)
}

fn write_nmethods<W: Write>(out: &mut W, summary: &ReportSummary) -> io::Result<()> {
    writeln!(out, " NMETHODS:")?;
    writeln!(
        out,
        "{} total entries found in the startup code cache (SCC)",
        count_column(summary.scc_total_entries)
    )?;
    writeln!(out, "     Compiled nmethods recovered by compilation level:")?;
    for tier in &summary.nmethods_by_tier {
        writeln!(
            out,
            "{} entries in compilation level '{}'",
            count_column(tier.entries as u64),
            tier.tier
        )?;
    }
    for duplicate in &summary.cross_tier_duplicates {
        writeln!(
            out,
            "        > Found {} both in levels {} and {}",
            duplicate.identifier, duplicate.lower, duplicate.higher
        )?;
    }
    writeln!(
        out,
        "{} nmethods restored across all levels ({:.2}% of declared entries)",
        count_column(summary.total_nmethods as u64),
        summary.restored_share
    )?;
    writeln!(
        out,
        "{} unique nmethods in total",
        count_column(summary.unique_nmethods as u64)
    )?;
    writeln!(
        out,
        "     From which {} classes are arrays",
        format_count(summary.array_classes as u64)
    )?;
    writeln!(
        out,
        "     Top {} classes with compiled nmethods:",
        summary.top_n
    )?;
    for class in &summary.top_nmethod_classes {
        writeln!(
            out,
            "{} nmethods in class '{}'",
            count_column(class.count as u64),
            class.class_name
        )?;
    }
    writeln!(out)
}

fn write_vtables<W: Write>(out: &mut W, report: &CdsReport) -> io::Result<()> {
    writeln!(out, " VTABLES:")?;
    for (kind, entries) in report.vtables() {
        writeln!(
            out,
            "{} vtable entries copied for {}",
            count_column(u64::from(*entries)),
            kind
        )?;
    }
    write_errors(out, report.errors_vtables())
}

fn write_errors<W: Write>(out: &mut W, errors: &[String]) -> io::Result<()> {
    writeln!(out, "{} errors found", count_column(errors.len() as u64))?;
    for error in errors {
        writeln!(out, "  {error}")?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
