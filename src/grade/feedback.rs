//! Student-facing feedback text.
//!
//! Breakdown feedback carries the raw test diagnostic verbatim; only the
//! console table shortens it, through `summarize_error`.

use itertools::Itertools;

use super::{
    outcome::{ComponentStatus, TestOutcome},
    report::PerformanceSummary,
};
use crate::registry::{ComponentRegistry, ComponentSpec};

/// Feedback line for one component.
pub fn component_feedback(spec: &ComponentSpec, outcome: &TestOutcome) -> String {
    let mut parts = Vec::new();

    match outcome.status() {
        ComponentStatus::Passed => {
            return format!("✅ Excellent implementation of {}", spec.name);
        }
        ComponentStatus::NotImplemented => {
            parts.push(format!("❌ {} function not found or not properly defined", spec.name));
            if !spec.description.is_empty() {
                parts.push(format!("💡 Implement: {}", spec.description));
            }
        }
        ComponentStatus::ImplementedWithErrors => {
            parts.push(format!("⚠️ {} implemented but has issues", spec.name));
            if let Some(error) = outcome.error.as_deref() {
                parts.push(format!("Error: {}", error.trim_end()));
            }
        }
    }

    if !spec.concepts.is_empty() {
        parts.push(format!("🔍 Review concepts: {}", spec.concepts.join(", ")));
    }

    parts.join(" | ")
}

/// Ordered recommendations: one per failing component in registry order,
/// then general advice by pass-rate band.
pub fn recommendations<'a>(
    registry: &ComponentRegistry,
    outcome_of: impl Fn(&str) -> Option<&'a TestOutcome>,
    summary: &PerformanceSummary,
) -> Vec<String> {
    let mut out = Vec::new();

    for spec in registry {
        let Some(outcome) = outcome_of(&spec.id) else {
            continue;
        };
        match outcome.status() {
            ComponentStatus::Passed => {}
            ComponentStatus::NotImplemented => {
                out.push(with_description("Implement", spec));
            }
            ComponentStatus::ImplementedWithErrors if spec.concepts.is_empty() => {
                out.push(with_description("Fix", spec));
            }
            ComponentStatus::ImplementedWithErrors => {
                let focus = spec.concepts.iter().take(3).join(", ");
                out.push(format!("Fix {} - focus on: {focus}", spec.name));
            }
        }
    }

    if summary.pass_rate < 50.0 {
        out.push("Review assignment instructions and examples carefully".to_string());
        out.push("Test functions individually before running full test suite".to_string());
    } else if summary.pass_rate < 80.0 {
        out.push("Focus on edge cases and error handling in your implementations".to_string());
    }

    out
}

/// `"{verb} {name}: {description}"`, without the colon when there is no
/// description.
fn with_description(verb: &str, spec: &ComponentSpec) -> String {
    if spec.description.is_empty() {
        format!("{verb} {}", spec.name)
    } else {
        format!("{verb} {}: {}", spec.name, spec.description)
    }
}

/// Longest diagnostic excerpt carried into feedback, in characters.
const MAX_ERROR_CHARS: usize = 200;

/// Picks the most telling line of a diagnostic.
///
/// Prefers pytest's `E ` assertion lines, then the first non-empty line.
pub fn summarize_error(text: &str) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("E ").map(str::trim))
        .or_else(|| text.lines().map(str::trim).find(|line| !line.is_empty()))
        .unwrap_or_default();

    if line.chars().count() > MAX_ERROR_CHARS {
        let cut: String = line.chars().take(MAX_ERROR_CHARS).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}
