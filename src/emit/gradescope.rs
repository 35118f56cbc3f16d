//! Gradescope `results.json` projection of a grade report.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::grade::{ComponentStatus, GradeReport};

/// Represents output format settings for Gradescope submissions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradescopeOutputFormat {
    /// Plain text format.
    Text,
    /// HTML format.
    Html,
    /// Markdown format.
    Md,
}

/// Represents visibility settings for Gradescope submissions and test cases.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradescopeVisibility {
    /// Hidden from students.
    Hidden,
    /// Visible after the due date of the assignment.
    AfterDueDate,
    /// Visible after the grades are published.
    AfterPublished,
    /// Always visible to students.
    Visible,
}

/// Represents the status of a test case in Gradescope submissions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradescopeStatus {
    /// Indicates the test case passed successfully.
    Passed,
    /// Indicates the test case failed.
    Failed,
}

/// Represents the overall submission data.
#[derive(Serialize, Deserialize, Debug, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
pub struct GradescopeSubmission {
    /// Overall score. Overrides total of test cases if specified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Text relevant to the entire submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Default output format for test case outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_output_format: Option<GradescopeOutputFormat>,

    /// Default output format for test case names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_name_format: Option<GradescopeOutputFormat>,

    /// Visibility setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<GradescopeVisibility>,

    /// Extra data to be stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<serde_json::Value>,

    /// Test cases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<GradescopeTestCase>>,
}

/// Represents an individual test case.
#[derive(Serialize, Deserialize, Debug, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
pub struct GradescopeTestCase {
    /// Score for the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Maximum score for the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,

    /// Status of the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GradescopeStatus>,

    /// Name of the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Number for the test case; the component id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    /// Detailed output for the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Tags associated with the test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Projects a grade report onto Gradescope's results schema.
pub fn submission_from_report(report: &GradeReport) -> GradescopeSubmission {
    let tests: Vec<GradescopeTestCase> = report
        .detailed_breakdown
        .iter()
        .map(|(id, entry)| {
            GradescopeTestCase::builder()
                .name(entry.component_name.clone())
                .number(id.clone())
                .score(entry.points_earned)
                .max_score(entry.points_possible)
                .status(if entry.status == ComponentStatus::Passed {
                    GradescopeStatus::Passed
                } else {
                    GradescopeStatus::Failed
                })
                .output(entry.feedback.clone())
                .tags(entry.concepts_tested.clone())
                .build()
        })
        .collect();

    let mut output = format!(
        "**{}**: {}/{} ({}%, {})",
        report.assignment,
        report.total_points,
        report.possible_points,
        report.display_percentage(),
        report.letter_grade
    );
    for recommendation in &report.improvement_recommendations {
        output.push_str(&format!("\n- {recommendation}"));
    }

    GradescopeSubmission::builder()
        .score(report.total_points)
        .output(output)
        .tests(tests)
        .test_output_format(GradescopeOutputFormat::Md)
        .test_name_format(GradescopeOutputFormat::Text)
        .visibility(GradescopeVisibility::Visible)
        .extra_data(serde_json::json!({
            "letter_grade": report.letter_grade,
            "percentage": report.percentage,
            "performance_summary": report.performance_summary,
        }))
        .build()
}

/// Writes `results.json` for Gradescope.
pub fn write_results(report: &GradeReport, path: &Path) -> Result<()> {
    let submission = submission_from_report(report);
    let json = serde_json::to_string_pretty(&submission)
        .context("Could not serialize Gradescope results")?;
    fs::write(path, json)
        .with_context(|| format!("Could not write Gradescope results to {}", path.display()))?;
    tracing::info!("Gradescope results written to {}", path.display());
    Ok(())
}
