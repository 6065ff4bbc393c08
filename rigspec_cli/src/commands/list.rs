//! The `rigspec list` command.

use anyhow::Result;
use comfy_table::Table;

use rigspec_core::registry::registry;

pub fn execute(json: bool) -> Result<()> {
    let tests = registry().list_tests();

    if json {
        println!("{}", serde_json::to_string_pretty(&tests)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Test", "Inputs", "Outputs", "Description"]);
    for test in &tests {
        table.add_row(vec![
            test.name.clone(),
            test.inputs.len().to_string(),
            test.outputs.len().to_string(),
            test.description.clone(),
        ]);
    }
    println!("{table}");

    Ok(())
}
