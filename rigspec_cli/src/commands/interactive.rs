//! The `rigspec interactive` command.
//!
//! Prompts for a test and each of its inputs, calculates, and offers to
//! save. Values entered for a test become the defaults the next time that
//! test is chosen in the same session.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use anyhow::Result;

use rigspec_core::history::{append_record, CalculationRecord};
use rigspec_core::registry::{registry, FieldKind, InputFieldSpec, TestDefinition, TestId};
use rigspec_core::values::{InputValue, InputValues};

use super::eval::parse_value;
use crate::config::RigspecConfig;

/// Per-run state: the last inputs entered for each test.
#[derive(Debug, Default)]
pub struct Session {
    last_inputs: HashMap<TestId, InputValues>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous value for a field, else the field default
    pub fn default_for(&self, test: TestId, field: &InputFieldSpec) -> InputValue {
        self.last_inputs
            .get(&test)
            .and_then(|inputs| inputs.get(&field.label))
            .cloned()
            .unwrap_or_else(|| field.default_value())
    }

    pub fn remember(&mut self, test: TestId, inputs: InputValues) {
        self.last_inputs.insert(test, inputs);
    }
}

pub fn execute(config: &RigspecConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut session = Session::new();
    run(config, &mut session, &mut stdin.lock(), &mut io::stdout())
}

/// Drive the prompt loop until `q` or end of input.
pub fn run<R: BufRead, W: Write>(
    config: &RigspecConfig,
    session: &mut Session,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "rigspec - Rig Test Specification")?;
    writeln!(out, "================================")?;

    let definitions = registry().definitions();
    loop {
        writeln!(out)?;
        for (i, definition) in definitions.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, definition.name)?;
        }

        let Some(choice) = prompt(input, out, "Select test (q to quit) [1]: ")? else {
            break;
        };
        if choice.eq_ignore_ascii_case("q") {
            break;
        }

        let definition = if choice.is_empty() {
            &definitions[0]
        } else {
            match select_test(&choice) {
                Some(definition) => definition,
                None => {
                    writeln!(out, "Unknown test: {choice}")?;
                    continue;
                }
            }
        };

        let Some(inputs) = read_inputs(session, definition, input, out)? else {
            break;
        };
        session.remember(definition.id, inputs.clone());

        match definition.evaluate(&inputs) {
            Ok(results) => {
                writeln!(out, "{}", super::results_table(definition, &results))?;

                let answer = prompt(input, out, "Save to history? [y/N]: ")?.unwrap_or_default();
                if answer.eq_ignore_ascii_case("y") {
                    let bound = definition.validate(&inputs)?;
                    let record =
                        CalculationRecord::new(&config.default_project, &definition.name, bound, results);
                    match append_record(&config.history_path, record, &config.lock_user) {
                        Ok(id) => writeln!(out, "Saved as {id}")?,
                        Err(e) => writeln!(out, "Error: {e}")?,
                    }
                }
            }
            Err(e) => writeln!(out, "Error: {e}")?,
        }
    }

    Ok(())
}

/// Resolve a menu number or a test name.
fn select_test(choice: &str) -> Option<&'static TestDefinition> {
    let definitions = registry().definitions();
    match choice.parse::<usize>() {
        Ok(n) if (1..=definitions.len()).contains(&n) => Some(&definitions[n - 1]),
        Ok(_) => None,
        Err(_) => registry().get(choice).ok(),
    }
}

/// Prompt for every field. Returns `None` at end of input.
fn read_inputs<R: BufRead, W: Write>(
    session: &Session,
    definition: &TestDefinition,
    input: &mut R,
    out: &mut W,
) -> Result<Option<InputValues>> {
    writeln!(out)?;
    writeln!(out, "{}", definition.name)?;

    let mut values = InputValues::new();
    for field in &definition.inputs {
        let default = session.default_for(definition.id, field);
        let hint = match &field.kind {
            FieldKind::Choice { allowed, .. } => format!(" ({})", allowed.join("/")),
            FieldKind::Numeric { .. } => String::new(),
        };
        let text = format!("{}{} [{}]: ", field.display_name, hint, field.format_value(&default));

        let Some(entered) = prompt(input, out, &text)? else {
            return Ok(None);
        };
        let value = if entered.is_empty() { default } else { parse_value(&entered) };
        values.insert(field.label.clone(), value);
    }

    Ok(Some(values))
}

/// Print `text` and read one trimmed line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_script(session: &mut Session, script: &str) -> String {
        let config = RigspecConfig::default();
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run(&config, session, &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn panic_brake_session() {
        let mut session = Session::new();
        let out = run_script(&mut session, "1\n9.8\n250\n0.3\n0.5\n100000\n100\nn\nq\n");

        assert!(out.contains("Required Load (kg)"));
        assert!(out.contains("149.847"));
        assert!(out.contains("1000.0"));
    }

    #[test]
    fn previous_values_become_defaults() {
        let mut session = Session::new();
        run_script(&mut session, "1\n9.8\n250\n0.3\n0.5\n100000\n100\nn\nq\n");

        let definition = TestId::PanicBrakeFatigue.definition();
        let mass = definition.input("vehicleMass").unwrap();
        assert_eq!(session.default_for(TestId::PanicBrakeFatigue, mass), InputValue::Number(250.0));

        // Accept every remembered value
        let out = run_script(&mut session, "1\n\n\n\n\n\n\nn\nq\n");
        assert!(out.contains("Mass of the Vehicle (kg) [250]: "));
        assert!(out.contains("149.847"));
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let mut session = Session::new();
        let out = run_script(&mut session, "1\n9.8\n250\n0.3\n0\n100000\n100\nq\n");
        assert!(out.contains("Error: "));
        assert!(out.contains("Select test (q to quit)"));
    }

    #[test]
    fn select_by_name_and_unknown() {
        assert_eq!(select_test("2").map(|d| d.id), Some(TestId::FrontForkFatigue));
        assert_eq!(select_test("front fork fatigue").map(|d| d.id), Some(TestId::FrontForkFatigue));
        assert!(select_test("7").is_none());
        assert!(select_test("seat post").is_none());
    }

    #[test]
    fn end_of_input_stops_cleanly() {
        let mut session = Session::new();
        let out = run_script(&mut session, "2\n");
        assert!(out.contains("Front Fork Fatigue"));
    }
}
