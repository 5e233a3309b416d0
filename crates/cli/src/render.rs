use serde_json::{json, Value};

use speechgrade_core::fluency::domain::fluency_report::FluencyReport;
use speechgrade_core::pipeline::analyze_speech_use_case::{AnalysisFailure, AnalysisReport};
use speechgrade_core::rubric::domain::criterion_registry::CriterionRegistry;

/// Two-column table with a header row and a rule under it.
fn table(headers: (&str, &str), rows: &[(String, String)]) -> String {
    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .chain(std::iter::once(headers.0.chars().count()))
        .max()
        .unwrap_or(0);

    let mut lines = vec![
        format!("{:width$}  {}", headers.0, headers.1),
        format!("{}  {}", "-".repeat(width), "-".repeat(headers.1.chars().count().max(5))),
    ];
    for (label, value) in rows {
        lines.push(format!("{label:width$}  {value}"));
    }
    lines.join("\n")
}

pub fn fluency_table(report: &FluencyReport) -> String {
    let rows: Vec<(String, String)> = report
        .rows()
        .into_iter()
        .map(|(label, value)| (label.to_string(), value))
        .collect();
    let mut out = table(("Metric", "Value"), &rows);
    if report.is_low_confidence() {
        out.push_str("\n(no word timings returned; metrics are low confidence)");
    }
    out
}

pub fn report_tables(report: &AnalysisReport) -> String {
    format!(
        "Transcript\n----------\n{}\n\n{}\n\n{}",
        report.transcript.text(),
        fluency_table(&report.fluency),
        table(("Criterion", "Score"), &report.scoring.rows()),
    )
}

pub fn report_json(report: &AnalysisReport) -> Value {
    json!({
        "transcript": report.transcript.text(),
        "fluency": report.fluency.to_json(),
        "scoring": report.scoring,
        "rubric_version": report.rubric_version,
    })
}

/// JSON for a failed run; `fluency` is null when the run stopped before it.
pub fn failure_json(failure: &AnalysisFailure) -> Value {
    json!({
        "error": failure.error.to_string(),
        "stage": failure.error.stage().as_str(),
        "fluency": failure.fluency.as_ref().map(FluencyReport::to_json),
    })
}

/// Criteria with 1-based positions, as accepted by `rubric remove`.
pub fn rubric_table(rubric: &CriterionRegistry) -> String {
    if rubric.is_empty() {
        return "(rubric is empty)".to_string();
    }
    let rows: Vec<(String, String)> = rubric
        .iter()
        .enumerate()
        .map(|(i, c)| (format!("{}. {}", i + 1, c.name), c.description.clone()))
        .collect();
    table(("Criterion", "Description"), &rows)
}
