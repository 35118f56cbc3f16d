#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Publishing a finished report.
//!
//! Nothing here touches the process environment. Signals come back as a
//! map and the caller decides where they go (an env file, stdout, CI).

/// Console summary.
pub mod console;
/// Gradescope `results.json` projection.
pub mod gradescope;

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};

use crate::grade::GradeReport;

/// Flat CI signals mirroring the top-level report fields.
pub fn signals(report: &GradeReport) -> BTreeMap<&'static str, String> {
    let summary = &report.performance_summary;
    BTreeMap::from([
        ("ASSIGNMENT_SCORE", report.total_points.to_string()),
        ("POSSIBLE_POINTS", report.possible_points.to_string()),
        ("GRADE_PERCENTAGE", report.display_percentage()),
        ("LETTER_GRADE", report.letter_grade.to_string()),
        ("TESTS_PASSED", summary.components_passing.to_string()),
        ("TESTS_TOTAL", summary.total_components.to_string()),
        ("IMPLEMENTATION_RATE", summary.implementation_rate.to_string()),
        ("PASS_RATE", summary.pass_rate.to_string()),
        ("ASSIGNMENT_NAME", report.assignment.clone()),
        ("MODULE_NAME", report.module.clone()),
    ])
}

/// Renders signals as `KEY=VALUE` lines. Newlines in values are flattened.
pub fn env_lines(signals: &BTreeMap<&'static str, String>) -> String {
    signals
        .iter()
        .map(|(key, value)| format!("{key}={}\n", value.replace(['\r', '\n'], " ")))
        .collect()
}

/// Appends signals to an env file such as `$GITHUB_ENV`.
pub fn append_env_file(signals: &BTreeMap<&'static str, String>, path: &Path) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open env file {}", path.display()))?;
    file.write_all(env_lines(signals).as_bytes())
        .with_context(|| format!("Could not write env file {}", path.display()))?;
    Ok(())
}

/// Writes the report as pretty JSON, creating parent directories.
pub fn write_report(report: &GradeReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }

    let json = report.to_json().context("Could not serialize grade report")?;
    fs::write(path, json)
        .with_context(|| format!("Could not write grade report to {}", path.display()))?;
    tracing::info!("Grade report written to {}", path.display());
    Ok(())
}
