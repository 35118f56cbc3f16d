//! Scoring, aggregation and the grade report.

/// The grading orchestrator and its run stages.
pub mod engine;
/// Student-facing feedback and recommendations.
pub mod feedback;
/// Per-component outcomes and statuses.
pub mod outcome;
/// Partial credit policy.
pub mod policy;
/// Static source-quality check.
pub mod quality;
/// Report schema, letter grades and the pass threshold.
pub mod report;
/// Report shape validation.
pub mod validate;

pub use engine::{GradingEngine, Stage};
pub use outcome::{ComponentStatus, TestOutcome};
pub use policy::PartialCredit;
pub use quality::SourceQuality;
pub use report::{
    Breakdown, BreakdownEntry, ExecutionSummary, GradeReport, LetterGrade, PASS_THRESHOLD,
    PerformanceSummary,
};
