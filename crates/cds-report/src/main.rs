mod bootstrap;

use std::io::{self, Write};

use anyhow::{Context, Result};
use cds_core::formatting::to_json_pretty;
use cds_core::settings::{OutputFormat, Settings};
use cds_data::analysis::analyze_log;
use cds_render::printer::write_report;
use cds_render::summary::ReportSummary;
use serde_json::json;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("CDS report v{} starting", env!("CARGO_PKG_VERSION"));

    let analysis = analyze_log(&settings.log_file)
        .with_context(|| format!("failed to analyse {}", settings.log_file.display()))?;
    let summary = ReportSummary::from_report(&analysis.report, settings.top_n());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match settings.format {
        OutputFormat::Text => write_report(&mut out, &analysis.report, &summary)?,
        OutputFormat::Json => {
            let document = json!({
                "metadata": analysis.metadata,
                "report": analysis.report,
                "summary": summary,
            });
            writeln!(out, "{}", to_json_pretty(&document)?)?;
        }
    }

    out.flush()?;
    Ok(())
}
