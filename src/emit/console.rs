//! Console summary of a grade report, written to stderr.

use colored::Colorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use crate::{
    grade::{GradeReport, engine::status_counts, feedback::summarize_error},
    registry::format_points,
};

/// One table row per component.
#[derive(Tabled)]
struct SummaryRow {
    /// Component label.
    #[tabled(rename = "Component")]
    component: String,
    /// Status with icon.
    #[tabled(rename = "Status")]
    status:    String,
    /// Earned over possible.
    #[tabled(rename = "Points")]
    points:    String,
    /// Feedback text.
    #[tabled(rename = "Feedback")]
    feedback:  String,
}

/// Breakdown table with a header and a total footer.
pub fn summary_table(report: &GradeReport) -> String {
    let rows = report.detailed_breakdown.values().map(|entry| SummaryRow {
        component: entry.component_name.clone(),
        status:    format!("{} {}", entry.status.icon(), entry.status),
        points:    format!(
            "{}/{}",
            format_points(entry.points_earned),
            format_points(entry.points_possible)
        ),
        feedback:  table_feedback(&entry.feedback),
    });

    Table::new(rows)
        .with(Panel::header(format!("{}: Grading Overview", report.assignment)))
        .with(Panel::footer(format!(
            "Total: {}/{}",
            format_points(report.total_points),
            format_points(report.possible_points)
        )))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(40).keep_words(true)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(
            Modify::new(Rows::last())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}

/// Feedback with the raw diagnostic cut down to its most telling line.
pub fn table_feedback(feedback: &str) -> String {
    let Some((head, rest)) = feedback.split_once(" | Error: ") else {
        return feedback.to_string();
    };
    let (raw, concepts) = match rest.rsplit_once(" | 🔍 ") {
        Some((raw, concepts)) => (raw, Some(concepts)),
        None => (rest, None),
    };

    let mut line = format!("{head} | Error: {}", summarize_error(raw));
    if let Some(concepts) = concepts {
        line.push_str(" | 🔍 ");
        line.push_str(concepts);
    }
    line
}

/// One plain line per component.
pub fn component_lines(report: &GradeReport) -> Vec<String> {
    report
        .detailed_breakdown
        .iter()
        .map(|(id, entry)| {
            format!(
                "{} {id}: {} ({}/{})",
                entry.status.icon(),
                entry.status,
                format_points(entry.points_earned),
                format_points(entry.points_possible)
            )
        })
        .collect()
}

/// Count of components per status, eg. `✅ 2 passed, ⚠️ 1 implemented_with_errors`.
pub fn status_line(report: &GradeReport) -> String {
    status_counts(report)
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| format!("{} {count} {status}", status.icon()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The final grade line, uncolored.
pub fn grade_line(report: &GradeReport) -> String {
    format!(
        "Final grade: {}/{} ({}%) {}",
        format_points(report.total_points),
        format_points(report.possible_points),
        report.display_percentage(),
        report.letter_grade
    )
}

/// Prints the summary to stderr.
///
/// The per-component lines and the grade line are always printed; `quiet`
/// only drops the table and recommendations.
pub fn print_summary(report: &GradeReport, quiet: bool) {
    if !quiet {
        eprintln!("{}", summary_table(report));
        if !report.improvement_recommendations.is_empty() {
            eprintln!("{}", "Recommendations:".bold());
            for recommendation in &report.improvement_recommendations {
                eprintln!("  - {recommendation}");
            }
        }
    }

    for line in component_lines(report) {
        eprintln!("{line}");
    }
    if !quiet {
        eprintln!("{}", status_line(report));
    }

    let line = grade_line(report);
    if report.is_passing() {
        eprintln!("{}", line.green().bold());
    } else {
        eprintln!("{}", line.red().bold());
    }
}
