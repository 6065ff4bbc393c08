//! # Calculation Reports
//!
//! A [`CalculationReport`] is the presentation view of one evaluation:
//! every input and result with its caption, formatted value and unit. It
//! exports as JSON or renders to PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected by placeholder replacement before compilation
//! - Fonts come from `typst-assets`, so no files are read at runtime
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use rigspec_core::registry::TestId;
//! use rigspec_core::report::{render_report_pdf, CalculationReport};
//!
//! let definition = TestId::FrontForkFatigue.definition();
//! let inputs = definition.default_inputs();
//! let results = definition.evaluate(&inputs).unwrap();
//!
//! let report = CalculationReport::from_evaluation(definition, &inputs, &results, "PRJ-001", "A. Engineer");
//! let pdf_bytes = render_report_pdf(&report).unwrap();
//! std::fs::write("front_fork.pdf", pdf_bytes).unwrap();
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{CalcError, CalcResult};
use crate::history::CalculationRecord;
use crate::registry::{registry, TestDefinition};
use crate::values::{InputValues, ResultValues};

// ============================================================================
// Report Model
// ============================================================================

/// One line of a report table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub display_name: String,
    /// Value formatted with the field's precision
    pub value: String,
    pub unit: String,
}

/// Presentation view of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationReport {
    pub test_name: String,
    pub project_code: String,
    pub engineer: String,
    /// When the calculation was performed
    pub calculated_at: DateTime<Utc>,
    pub inputs: Vec<ReportRow>,
    pub results: Vec<ReportRow>,
}

impl CalculationReport {
    /// Build a report for a fresh evaluation, in schema order.
    pub fn from_evaluation(
        definition: &TestDefinition,
        inputs: &InputValues,
        results: &ResultValues,
        project_code: &str,
        engineer: &str,
    ) -> Self {
        let input_rows = definition
            .inputs
            .iter()
            .filter_map(|field| {
                inputs.get(&field.label).map(|value| ReportRow {
                    label: field.label.clone(),
                    display_name: field.display_name.clone(),
                    value: field.format_value(value),
                    unit: field.unit.clone(),
                })
            })
            .collect();

        let result_rows = definition
            .outputs
            .iter()
            .filter_map(|field| {
                results.get(&field.label).map(|value| ReportRow {
                    label: field.label.clone(),
                    display_name: field.display_name.clone(),
                    value: field.format_value(value),
                    unit: field.unit.clone(),
                })
            })
            .collect();

        CalculationReport {
            test_name: definition.name.clone(),
            project_code: project_code.to_string(),
            engineer: engineer.to_string(),
            calculated_at: Utc::now(),
            inputs: input_rows,
            results: result_rows,
        }
    }

    /// Build a report from a saved record.
    ///
    /// Records of tests no longer in the catalog are shown with raw labels.
    pub fn from_record(record: &CalculationRecord, engineer: &str) -> Self {
        let mut report = match registry().get(&record.test_name) {
            Ok(definition) => CalculationReport::from_evaluation(
                definition,
                &record.input_values,
                &record.result_values,
                &record.project_code,
                engineer,
            ),
            Err(_) => CalculationReport {
                test_name: record.test_name.clone(),
                project_code: record.project_code.clone(),
                engineer: engineer.to_string(),
                calculated_at: record.timestamp,
                inputs: record
                    .input_values
                    .iter()
                    .map(|(label, value)| raw_row(label, value.to_string()))
                    .collect(),
                results: record
                    .result_values
                    .iter()
                    .map(|(label, value)| raw_row(label, value.to_string()))
                    .collect(),
            },
        };
        report.calculated_at = record.timestamp;
        report
    }

    pub fn to_json(&self) -> CalcResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CalcError::serialization(e.to_string()))
    }
}

fn raw_row(label: &str, value: String) -> ReportRow {
    ReportRow {
        label: label.to_string(),
        display_name: label.to_string(),
        value,
        unit: String::new(),
    }
}

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world holding one detached source and the bundled fonts.
struct ReportWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
    today: DateTime<Utc>,
}

impl ReportWorld {
    fn new(source: String, today: DateTime<Utc>) -> Self {
        let fonts: Vec<Font> = typst_assets::fonts()
            .flat_map(|data| Font::iter(Bytes::new(data.to_vec())))
            .collect();
        let book = FontBook::from_fonts(&fonts);

        ReportWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
            today,
        }
    }
}

impl World for ReportWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let date = self.today.date_naive();
        Datetime::from_ymd(
            chrono::Datelike::year(&date),
            chrono::Datelike::month(&date) as u8,
            chrono::Datelike::day(&date) as u8,
        )
    }
}

// ============================================================================
// PDF Template
// ============================================================================

const REPORT_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 25mm, bottom: 25mm, left: 20mm, right: 20mm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[Rig Test Specification]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[Project: {{PROJECT}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 11pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[{{TEST_NAME}}]
  ]
]

#v(12pt)

#table(
  columns: (auto, 1fr),
  stroke: none,
  row-gutter: 4pt,
  [Project:], [{{PROJECT}}],
  [Engineer:], [{{ENGINEER}}],
  [Calculated:], [{{TIMESTAMP}}],
)

#v(12pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

== Inputs

#table(
  columns: (1fr, auto, auto),
  inset: 8pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Parameter*], [*Value*], [*Unit*]),
{{INPUT_ROWS}}
)

#v(12pt)

== Results

#table(
  columns: (1fr, auto, auto),
  inset: 8pt,
  stroke: 0.5pt,
  align: (left, right, left),
  fill: (_, row) => if row > 0 { rgb("#e8f5e9") },
  table.header([*Result*], [*Value*], [*Unit*]),
{{RESULT_ROWS}}
)
"##;

/// Render a report to PDF bytes.
///
/// # Errors
///
/// * `CalcError::Internal` - Typst compilation or PDF export failed
pub fn render_report_pdf(report: &CalculationReport) -> CalcResult<Vec<u8>> {
    let source = REPORT_TEMPLATE
        .replace("{{TEST_NAME}}", &escape_typst(&report.test_name))
        .replace("{{PROJECT}}", &escape_typst(&report.project_code))
        .replace("{{ENGINEER}}", &escape_typst(&report.engineer))
        .replace("{{DATE}}", &report.calculated_at.format("%Y-%m-%d").to_string())
        .replace(
            "{{TIMESTAMP}}",
            &report.calculated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        )
        .replace("{{INPUT_ROWS}}", &table_rows(&report.inputs))
        .replace("{{RESULT_ROWS}}", &table_rows(&report.results));

    let world = ReportWorld::new(source, report.calculated_at);

    let document = typst::compile(&world).output.map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("Typst compilation failed: {}", messages.join("; ")),
        }
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("PDF rendering failed: {}", messages.join("; ")),
        }
    })?;

    tracing::debug!(test = %report.test_name, bytes = pdf_bytes.len(), "rendered report");
    Ok(pdf_bytes)
}

fn table_rows(rows: &[ReportRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "  [{}], [{}], [{}],",
                escape_typst(&row.display_name),
                escape_typst(&row.value),
                escape_typst(&row.unit)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape Typst markup characters in user-provided text
fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '^' | '/' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TestId;

    fn front_fork_report() -> CalculationReport {
        let definition = TestId::FrontForkFatigue.definition();
        let inputs = definition.default_inputs();
        let results = definition.evaluate(&inputs).unwrap();
        CalculationReport::from_evaluation(definition, &inputs, &results, "PRJ-7", "Test Engineer")
    }

    #[test]
    fn test_rows_follow_schema_order() {
        let report = front_fork_report();
        let labels: Vec<&str> = report.inputs.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels[0], "targetDamage");
        assert_eq!(labels[6], "material");
        assert_eq!(report.inputs.len(), 8);

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].display_name, "Total Number of cycles");
        assert_eq!(report.results[0].unit, "cycles");
    }

    #[test]
    fn test_values_use_field_precision() {
        let report = front_fork_report();
        let factor = report.inputs.iter().find(|r| r.label == "calibrationFactor").unwrap();
        assert_eq!(factor.value, "0.00680");
        let material = report.inputs.iter().find(|r| r.label == "material").unwrap();
        assert_eq!(material.value, "Steel");
    }

    #[test]
    fn test_json_export() {
        let json = front_fork_report().to_json().unwrap();
        assert!(json.contains("\"project_code\": \"PRJ-7\""));
        assert!(json.contains("Total Number of cycles"));
        assert!(json.contains("\"unit\": \"mm\""));
    }

    #[test]
    fn test_from_record_keeps_timestamp() {
        let definition = TestId::PanicBrakeFatigue.definition();
        let inputs = definition.default_inputs();
        let results = definition.evaluate(&inputs).unwrap();
        let record = CalculationRecord::new("PRJ-1", &definition.name, inputs, results);

        let report = CalculationReport::from_record(&record, "Reviewer");
        assert_eq!(report.calculated_at, record.timestamp);
        assert_eq!(report.results[0].display_name, "Required Load (kg)");
        assert_eq!(report.engineer, "Reviewer");
    }

    #[test]
    fn test_from_record_of_unknown_test() {
        let record = CalculationRecord::new(
            "PRJ-1",
            "Seat Post Fatigue",
            InputValues::new().with("postLength", 300.0),
            ResultValues::from([("cycles", 12.0)]),
        );
        let report = CalculationReport::from_record(&record, "");
        assert_eq!(report.inputs[0].display_name, "postLength");
        assert_eq!(report.results[0].value, "12");
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("m/s^2"), "m\\/s\\^2");
        assert_eq!(escape_typst("#1 *bold*"), "\\#1 \\*bold\\*");
        assert_eq!(escape_typst("plain"), "plain");
    }

    #[test]
    fn test_pdf_generation() {
        let pdf = render_report_pdf(&front_fork_report());
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }
}
