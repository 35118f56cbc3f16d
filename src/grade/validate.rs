//! Structural check of a serialized report.

use serde_json::Value;

use super::report::GradeReport;

/// Top-level keys every report must carry.
pub const REQUIRED_REPORT_FIELDS: [&str; 10] = [
    "assignment",
    "module",
    "total_points",
    "possible_points",
    "percentage",
    "letter_grade",
    "timestamp",
    "performance_summary",
    "professional_context",
    "detailed_breakdown",
];

/// Keys required inside `performance_summary`.
const SUMMARY_FIELDS: [&str; 3] = ["components_passing", "total_components", "implementation_rate"];

/// Keys required inside `professional_context`.
const CONTEXT_FIELDS: [&str; 3] = ["skills_assessed", "industry_relevance", "career_preparation"];

/// Returns the dotted paths of missing fields in a JSON report.
pub fn missing_fields(report: &Value) -> Vec<String> {
    let mut missing: Vec<String> = REQUIRED_REPORT_FIELDS
        .iter()
        .filter(|key| report.get(**key).is_none())
        .map(|key| key.to_string())
        .collect();

    for (section, keys) in [
        ("performance_summary", SUMMARY_FIELDS.as_slice()),
        ("professional_context", CONTEXT_FIELDS.as_slice()),
    ] {
        let Some(object) = report.get(section) else {
            continue;
        };
        missing.extend(
            keys.iter()
                .filter(|key| object.get(**key).is_none())
                .map(|key| format!("{section}.{key}")),
        );
    }

    missing
}

/// Checks `report` against the standardized shape.
///
/// Missing fields are logged as warnings and returned; they never fail the
/// run.
pub fn validate_report(report: &GradeReport) -> Vec<String> {
    let value = match serde_json::to_value(report) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Could not serialize report for validation: {e}");
            return REQUIRED_REPORT_FIELDS.iter().map(|key| key.to_string()).collect();
        }
    };

    let missing = missing_fields(&value);
    for field in &missing {
        tracing::warn!("Report is missing field `{field}`");
    }
    missing
}
