//! The `rigspec show` command.

use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Table};

use rigspec_core::registry::{registry, FieldKind};

pub fn execute(test_name: &str, json: bool) -> Result<()> {
    let definition = registry().get(test_name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&definition.schema())?);
        return Ok(());
    }

    println!("{}", definition.name);
    println!("{}", definition.description);
    println!();

    let mut inputs = Table::new();
    inputs.set_header(vec!["Label", "Field", "Unit", "Default", "Allowed"]);
    for field in &definition.inputs {
        let allowed = match &field.kind {
            FieldKind::Numeric { min, max, .. } => match (min, max) {
                (Some(lo), Some(hi)) => format!("{lo} to {hi}"),
                (Some(lo), None) => format!(">= {lo}"),
                (None, Some(hi)) => format!("<= {hi}"),
                (None, None) => "any".to_string(),
            },
            FieldKind::Choice { allowed, .. } => allowed.join(", "),
        };
        inputs.add_row(vec![
            Cell::new(&field.label),
            Cell::new(&field.display_name),
            Cell::new(&field.unit),
            Cell::new(field.format_value(&field.default_value())).set_alignment(CellAlignment::Right),
            Cell::new(allowed),
        ]);
    }
    println!("{inputs}");

    let mut outputs = Table::new();
    outputs.set_header(vec!["Label", "Result", "Unit"]);
    for field in &definition.outputs {
        outputs.add_row(vec![&field.label, &field.display_name, &field.unit]);
    }
    println!("{outputs}");

    Ok(())
}
