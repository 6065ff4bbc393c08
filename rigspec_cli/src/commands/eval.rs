//! The `rigspec eval` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use rigspec_core::history::{append_record, CalculationRecord};
use rigspec_core::registry::{registry, TestDefinition};
use rigspec_core::report::{render_report_pdf, CalculationReport};
use rigspec_core::values::{InputValue, InputValues, ResultValues};

use crate::config::RigspecConfig;

pub struct EvalArgs {
    pub test: String,
    pub set: Vec<String>,
    pub inputs: Option<PathBuf>,
    pub defaults: bool,
    pub json: bool,
    pub save: bool,
    pub project: Option<String>,
    pub pdf: Option<PathBuf>,
}

#[derive(Serialize)]
struct EvalOutput<'a> {
    test_name: &'a str,
    inputs: &'a InputValues,
    results: &'a ResultValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    record_id: Option<String>,
}

pub fn execute(config: &RigspecConfig, args: EvalArgs) -> Result<()> {
    let definition = registry().get(&args.test)?;
    let inputs = collect_inputs(definition, &args)?;

    // Validated form: canonical choices, extra labels dropped
    let bound = definition.validate(&inputs)?;
    let results = definition.evaluate(&bound)?;
    tracing::debug!(test = %definition.name, "evaluated");

    let project = args.project.as_deref().unwrap_or(&config.default_project);

    let record_id = if args.save {
        let record = CalculationRecord::new(project, &definition.name, bound.clone(), results.clone());
        let id = append_record(&config.history_path, record, &config.lock_user)?;
        Some(id.to_string())
    } else {
        None
    };

    if let Some(path) = &args.pdf {
        let report = CalculationReport::from_evaluation(definition, &bound, &results, project, &config.engineer);
        let bytes = render_report_pdf(&report)?;
        std::fs::write(path, bytes).with_context(|| format!("failed to write PDF: {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote PDF report");
    }

    if args.json {
        let output = EvalOutput {
            test_name: &definition.name,
            inputs: &bound,
            results: &results,
            record_id,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", definition.name);
    println!("{}", super::inputs_table(definition, &bound));
    println!("{}", super::results_table(definition, &results));
    if let Some(id) = record_id {
        println!("Saved as {id} (project {project})");
    }

    Ok(())
}

/// Defaults, then the inputs file, then `--set` pairs; later sources win.
fn collect_inputs(definition: &TestDefinition, args: &EvalArgs) -> Result<InputValues> {
    let mut inputs = if args.defaults {
        definition.default_inputs()
    } else {
        InputValues::new()
    };

    if let Some(path) = &args.inputs {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read inputs: {}", path.display()))?;
        let from_file: InputValues = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse inputs: {}", path.display()))?;
        inputs = inputs.merged_with(&from_file);
    }

    for assignment in &args.set {
        let (label, value) = parse_assignment(assignment)?;
        inputs.insert(label, value);
    }

    Ok(inputs)
}

/// Parse `label=value`. Values that read as numbers become numbers.
pub fn parse_assignment(assignment: &str) -> Result<(String, InputValue)> {
    let (label, raw) = assignment
        .split_once('=')
        .with_context(|| format!("expected LABEL=VALUE, got '{assignment}'"))?;
    let label = label.trim();
    if label.is_empty() {
        anyhow::bail!("empty label in '{assignment}'");
    }
    Ok((label.to_string(), parse_value(raw)))
}

pub fn parse_value(raw: &str) -> InputValue {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(n) => InputValue::Number(n),
        Err(_) => InputValue::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_parsing() {
        let (label, value) = parse_assignment("vehicleMass=250").unwrap();
        assert_eq!(label, "vehicleMass");
        assert_eq!(value, InputValue::Number(250.0));

        let (_, value) = parse_assignment("material = Aluminum").unwrap();
        assert_eq!(value, InputValue::Text("Aluminum".to_string()));

        let (_, value) = parse_assignment("minLoadKgf=-200").unwrap();
        assert_eq!(value, InputValue::Number(-200.0));

        assert!(parse_assignment("vehicleMass").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn later_sources_override_defaults() {
        let definition = registry().get("Panic Brake Fatigue").unwrap();
        let args = EvalArgs {
            test: definition.name.clone(),
            set: vec!["vehicleMass=250".to_string()],
            inputs: None,
            defaults: true,
            json: false,
            save: false,
            project: None,
            pdf: None,
        };
        let inputs = collect_inputs(definition, &args).unwrap();
        assert_eq!(inputs.len(), definition.inputs.len());
        assert_eq!(inputs.number("vehicleMass"), Some(250.0));
        assert_eq!(inputs.number("maxDeceleration"), Some(1.0));
    }
}
