//! The `rigspec export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use rigspec_core::history::load_history;
use rigspec_core::report::{render_report_pdf, CalculationReport};

use crate::config::RigspecConfig;

pub fn execute(config: &RigspecConfig, id: &str, pdf: Option<PathBuf>, json: Option<PathBuf>) -> Result<()> {
    if pdf.is_none() && json.is_none() {
        anyhow::bail!("nothing to export: pass --pdf FILE and/or --json FILE");
    }

    let log = load_history(&config.history_path)
        .with_context(|| format!("failed to open history: {}", config.history_path.display()))?;
    let record = log.find(id)?;
    let report = CalculationReport::from_record(record, &config.engineer);

    if let Some(path) = json {
        std::fs::write(&path, report.to_json()?)
            .with_context(|| format!("failed to write JSON: {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    if let Some(path) = pdf {
        let bytes = render_report_pdf(&report)?;
        std::fs::write(&path, bytes).with_context(|| format!("failed to write PDF: {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
