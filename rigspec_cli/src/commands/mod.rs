//! Subcommand implementations.

pub mod eval;
pub mod export;
pub mod history;
pub mod interactive;
pub mod list;
pub mod show;

use comfy_table::{Cell, CellAlignment, Table};

use rigspec_core::registry::TestDefinition;
use rigspec_core::values::{InputValues, ResultValues};

/// Inputs as Parameter / Value / Unit rows in schema order.
pub fn inputs_table(definition: &TestDefinition, inputs: &InputValues) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Parameter", "Value", "Unit"]);
    for field in &definition.inputs {
        if let Some(value) = inputs.get(&field.label) {
            table.add_row(vec![
                Cell::new(&field.display_name),
                Cell::new(field.format_value(value)).set_alignment(CellAlignment::Right),
                Cell::new(&field.unit),
            ]);
        }
    }
    table
}

/// Results as Result / Value / Unit rows in schema order.
pub fn results_table(definition: &TestDefinition, results: &ResultValues) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Result", "Value", "Unit"]);
    for field in &definition.outputs {
        if let Some(value) = results.get(&field.label) {
            table.add_row(vec![
                Cell::new(&field.display_name),
                Cell::new(field.format_value(value)).set_alignment(CellAlignment::Right),
                Cell::new(&field.unit),
            ]);
        }
    }
    table
}
