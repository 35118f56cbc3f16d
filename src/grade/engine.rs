#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The grading orchestrator.

use std::{
    collections::HashMap,
    path::PathBuf,
    time::{Duration, Instant},
};

use bon::Builder;

use super::{
    feedback::{component_feedback, recommendations},
    outcome::{
        ComponentStatus, MISSING_RESULT_DIAGNOSTIC, STUB_PASSED_DIAGNOSTIC, TestOutcome,
    },
    policy::PartialCredit,
    report::{
        Breakdown, BreakdownEntry, ExecutionSummary, GradeReport, LetterGrade, PerformanceSummary,
    },
    validate::validate_report,
};
use crate::{
    config,
    context::ProfessionalContextProvider,
    detect::ImplementationDetector,
    error::{ConfigError, GradingError},
    paths::SubmissionPaths,
    registry::{ComponentCheck, ComponentRegistry, ComponentSpec},
    runner::{ScopedTestResult, TIMEOUT_DIAGNOSTIC, TestRunner},
};

/// Default slack given to a runner beyond the per-test budget before the
/// engine abandons it.
pub const RUNNER_GRACE: Duration = Duration::from_secs(5);

/// Stages of one grading run, in the only order they may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Configuration checked, nothing run yet.
    Init,
    /// Every component has an outcome.
    TestsRun,
    /// Scores, grade and feedback are computed.
    Aggregated,
    /// The report shape has been checked.
    Validated,
    /// The report has been handed back.
    Done,
}

impl Stage {
    /// The stage that must follow this one.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Init => Some(Stage::TestsRun),
            Stage::TestsRun => Some(Stage::Aggregated),
            Stage::Aggregated => Some(Stage::Validated),
            Stage::Validated => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    /// Moves to `to`, refusing to skip or repeat a stage.
    pub fn advance(self, to: Stage) -> Result<Stage, GradingError> {
        if self.next() == Some(to) {
            tracing::debug!("Grading stage {self:?} -> {to:?}");
            Ok(to)
        } else {
            Err(GradingError::Stage { from: self, to })
        }
    }
}

/// Grades one submission against a registry.
///
/// The three capabilities are injected so the engine never knows how tests
/// are launched, how stubs are recognised, or where the context comes from.
#[derive(Builder)]
#[builder(on(String, into))]
pub struct GradingEngine<R, D, P>
where
    R: TestRunner,
    D: ImplementationDetector,
    P: ProfessionalContextProvider,
{
    /// Assignment name.
    assignment:     String,
    /// Course module name.
    module:         String,
    /// Components to grade.
    registry:       ComponentRegistry,
    /// Launches scoped tests.
    runner:         R,
    /// Classifies function bodies.
    detector:       D,
    /// Supplies the professional context block.
    context:        P,
    /// Submission layout.
    #[builder(default)]
    paths:          SubmissionPaths,
    /// Credit for implemented-but-failing components.
    #[builder(default)]
    policy:         PartialCredit,
    /// Budget for each scoped test.
    #[builder(default = config::test_timeout())]
    timeout:        Duration,
    /// Extra time a runner gets past `timeout` before it is abandoned.
    #[builder(default = RUNNER_GRACE)]
    runner_grace:   Duration,
    /// Files that must exist, relative to the submission root.
    #[builder(default)]
    required_files: Vec<PathBuf>,
}

impl<R, D, P> GradingEngine<R, D, P>
where
    R: TestRunner,
    D: ImplementationDetector,
    P: ProfessionalContextProvider,
{
    /// The registry being graded.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// The injected test runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The submission layout.
    pub fn paths(&self) -> &SubmissionPaths {
        &self.paths
    }

    /// Fails when a required submission file is absent.
    pub fn check_required_files(&self) -> Result<(), ConfigError> {
        for file in &self.required_files {
            let path = self.paths.resolve(file);
            if !path.is_file() {
                return Err(ConfigError::MissingRequiredFile(path));
            }
        }
        Ok(())
    }

    /// Runs every component in registry order and builds the report.
    ///
    /// Only configuration problems are returned as errors; failing, crashing
    /// or hanging tests are scored.
    pub async fn run(&self) -> Result<GradeReport, GradingError> {
        let started = Instant::now();
        let mut stage = Stage::Init;
        self.policy.validate()?;
        self.check_required_files()?;

        tracing::info!(
            "Grading {} ({} components, {} points)",
            self.assignment,
            self.registry.len(),
            self.registry.possible_points()
        );

        let mut results = HashMap::with_capacity(self.registry.len());
        for spec in &self.registry {
            let outcome = self.grade_component(spec).await;
            results.insert(spec.id.clone(), outcome);
        }
        stage = stage.advance(Stage::TestsRun)?;

        let mut report = self.aggregate(results)?;
        report.execution_summary.grading_time = started.elapsed().as_secs_f64();
        stage = stage.advance(Stage::Aggregated)?;

        let missing = validate_report(&report);
        if !missing.is_empty() {
            tracing::warn!("Report is missing {} expected field(s)", missing.len());
        }
        stage = stage.advance(Stage::Validated)?;

        stage.advance(Stage::Done)?;
        tracing::info!(
            "{}: {}/{} ({}%, {})",
            report.assignment,
            report.total_points,
            report.possible_points,
            report.display_percentage(),
            report.letter_grade
        );
        Ok(report)
    }

    /// Grades one component. Never fails.
    ///
    /// A runner that overruns its budget by more than the grace period is
    /// dropped and the component is scored as timed out.
    pub async fn grade_component(&self, spec: &ComponentSpec) -> TestOutcome {
        let outcome = match &spec.check {
            ComponentCheck::Test { selector } => {
                let started = Instant::now();
                let run = self
                    .runner
                    .run_scoped_test(selector, self.paths.root_dir(), self.timeout);
                let budget = self.timeout + self.runner_grace;
                let result = match tokio::time::timeout(budget, run).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!("{} overran {budget:?}; abandoning the runner", spec.id);
                        ScopedTestResult::fail(TIMEOUT_DIAGNOSTIC)
                    }
                };
                let detected = self.detected(spec);
                TestOutcome::from_test(
                    spec.points,
                    result.passed,
                    detected,
                    result.diagnostic,
                    &self.policy,
                    started.elapsed(),
                )
            }
            ComponentCheck::SourceQuality(quality) => quality.assess(spec.points, &self.paths),
        };

        tracing::debug!(
            "{} -> {} in {:.2}s",
            spec.id,
            outcome.status(),
            outcome.execution_time
        );
        if !outcome.passed {
            tracing::warn!("{} did not pass ({})", spec.id, outcome.status());
        }
        outcome
    }

    /// Builds the report from per-component outcomes.
    ///
    /// Ids missing from `results` are scored as not implemented; ids that
    /// are not registered are a configuration error. `grading_time` covers
    /// aggregation only; `run` replaces it with the whole run.
    pub fn aggregate(
        &self,
        mut results: HashMap<String, TestOutcome>,
    ) -> Result<GradeReport, GradingError> {
        let started = Instant::now();
        let mut unknown: Vec<&String> = results
            .keys()
            .filter(|id| !self.registry.contains(id))
            .collect();
        unknown.sort();
        if let Some(id) = unknown.first() {
            return Err(ConfigError::UnknownComponent((*id).clone()).into());
        }

        for spec in &self.registry {
            let outcome = results
                .entry(spec.id.clone())
                .or_insert_with(TestOutcome::missing);
            normalize(outcome, spec.points);
        }

        let possible_points = self.registry.possible_points();
        let total_points: f64 = self
            .registry
            .iter()
            .filter_map(|spec| results.get(&spec.id))
            .map(|outcome| outcome.score)
            .sum();
        let percentage = total_points / possible_points * 100.0;

        let passing = results.values().filter(|o| o.passed).count();
        let implemented = results
            .values()
            .filter(|o| o.implementation_detected)
            .count();
        let performance_summary =
            PerformanceSummary::from_counts(passing, implemented, self.registry.len());

        let detailed_breakdown: Breakdown = self
            .registry
            .iter()
            .filter_map(|spec| {
                let outcome = results.get(&spec.id)?;
                Some((spec.id.clone(), BreakdownEntry {
                    component_name:     spec.name.clone(),
                    status:             outcome.status(),
                    points_earned:      outcome.score,
                    points_possible:    spec.points,
                    feedback:           component_feedback(spec, outcome),
                    concepts_tested:    spec.concepts.clone(),
                    professional_skill: spec.professional_skill.clone(),
                }))
            })
            .collect();

        let improvement_recommendations =
            recommendations(&self.registry, |id| results.get(id), &performance_summary);

        let timestamp = chrono::Local::now().to_rfc3339();

        Ok(GradeReport {
            assignment: self.assignment.clone(),
            module: self.module.clone(),
            timestamp,
            total_points,
            possible_points,
            percentage,
            letter_grade: LetterGrade::from_percentage(percentage),
            performance_summary,
            detailed_breakdown,
            improvement_recommendations,
            professional_context: self.context.professional_context(),
            execution_summary: ExecutionSummary {
                grading_time:           started.elapsed().as_secs_f64(),
                grading_engine_version: env!("CARGO_PKG_VERSION").to_string(),
                standardized_output:    true,
            },
        })
    }

    /// Detector verdict for the component's function; true when none is named.
    fn detected(&self, spec: &ComponentSpec) -> bool {
        spec.function
            .as_deref()
            .is_none_or(|function| self.detector.is_implemented(function))
    }
}

/// Keeps externally supplied outcomes within `0 <= score <= points`, with
/// full credit for a pass and nothing for an undetected implementation.
fn normalize(outcome: &mut TestOutcome, points: f64) {
    if outcome.passed && !outcome.implementation_detected {
        outcome.passed = false;
        outcome.error = Some(STUB_PASSED_DIAGNOSTIC.to_string());
    }

    if outcome.passed {
        outcome.score = points;
        outcome.error = None;
    } else {
        outcome.score = if outcome.implementation_detected && outcome.score.is_finite() {
            outcome.score.clamp(0.0, points)
        } else {
            0.0
        };
        outcome
            .error
            .get_or_insert_with(|| MISSING_RESULT_DIAGNOSTIC.to_string());
    }
}

/// Counts components per status, in a fixed order.
pub fn status_counts(report: &GradeReport) -> [(ComponentStatus, usize); 3] {
    [
        ComponentStatus::Passed,
        ComponentStatus::ImplementedWithErrors,
        ComponentStatus::NotImplemented,
    ]
    .map(|status| {
        let count = report
            .detailed_breakdown
            .values()
            .filter(|entry| entry.status == status)
            .count();
        (status, count)
    })
}
