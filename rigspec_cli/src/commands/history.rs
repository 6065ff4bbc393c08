//! The `rigspec history` commands.

use anyhow::Result;
use comfy_table::Table;

use rigspec_core::history::{load_or_default, CalculationRecord};
use rigspec_core::registry::registry;

use crate::config::RigspecConfig;

pub fn list(config: &RigspecConfig, project: Option<&str>) -> Result<()> {
    let log = load_or_default(&config.history_path)?;

    let records: Vec<&CalculationRecord> = match project {
        Some(code) => log.for_project(code).collect(),
        None => log.records().iter().collect(),
    };

    if records.is_empty() {
        println!("No saved calculations in {}", config.history_path.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Saved (UTC)", "Project", "Test", "Results"]);
    for record in records {
        table.add_row(vec![
            record.short_id(),
            record.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            record.project_code.clone(),
            record.test_name.clone(),
            summarize_results(record),
        ]);
    }
    println!("{table}");

    Ok(())
}

pub fn show(config: &RigspecConfig, id: &str, json: bool) -> Result<()> {
    let log = load_or_default(&config.history_path)?;
    let record = log.find(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("{} [{}]", record.test_name, record.id);
    println!(
        "Project {} saved {}",
        record.project_code,
        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );

    match registry().get(&record.test_name) {
        Ok(definition) => {
            println!("{}", super::inputs_table(definition, &record.input_values));
            println!("{}", super::results_table(definition, &record.result_values));
        }
        Err(_) => {
            tracing::warn!(test = %record.test_name, "test no longer registered, showing raw values");
            println!("{}", serde_json::to_string_pretty(&record.input_values)?);
            println!("{}", serde_json::to_string_pretty(&record.result_values)?);
        }
    }

    Ok(())
}

/// `label=value` pairs using output precision where the test is known.
fn summarize_results(record: &CalculationRecord) -> String {
    let definition = registry().get(&record.test_name).ok();
    record
        .result_values
        .iter()
        .map(|(label, value)| {
            let formatted = definition
                .and_then(|d| d.output(label))
                .map(|f| f.format_value(value))
                .unwrap_or_else(|| value.to_string());
            format!("{label}={formatted}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}
