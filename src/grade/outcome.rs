#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Per-component results of a grading run.

use std::{fmt::Display, time::Duration};

use serde::{Deserialize, Serialize};

use super::policy::PartialCredit;

/// Diagnostic used when a passing test exercised a stub.
pub const STUB_PASSED_DIAGNOSTIC: &str =
    "test passed, but the function body looks like a placeholder; replace the stub with a real \
     implementation";

/// Diagnostic used for a component that produced no result.
pub const MISSING_RESULT_DIAGNOSTIC: &str = "no result was recorded for this component";

/// Diagnostic used when a failing test printed nothing.
const SILENT_FAILURE_DIAGNOSTIC: &str = "test failed without producing any output";

/// Standardized status of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Test passed, full credit.
    Passed,
    /// Real code that fails its test.
    ImplementedWithErrors,
    /// Missing or stub function.
    NotImplemented,
}

impl ComponentStatus {
    /// Returns the string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentStatus::Passed => "passed",
            ComponentStatus::ImplementedWithErrors => "implemented_with_errors",
            ComponentStatus::NotImplemented => "not_implemented",
        }
    }

    /// Console icon for the status.
    pub fn icon(self) -> &'static str {
        match self {
            ComponentStatus::Passed => "✅",
            ComponentStatus::ImplementedWithErrors => "⚠️",
            ComponentStatus::NotImplemented => "❌",
        }
    }
}

impl Display for ComponentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result for one component in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Whether the component's check passed.
    pub passed:                  bool,
    /// Points earned, `0 <= score <= points`.
    pub score:                   f64,
    /// Diagnostic text, present iff not passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:                   Option<String>,
    /// Heuristic signal from the implementation detector.
    pub implementation_detected: bool,
    /// Seconds spent on this component; informational only.
    pub execution_time:          f64,
}

impl TestOutcome {
    /// Applies the scoring rule to a finished test.
    ///
    /// * passed and implemented: full credit
    /// * passed but a stub: no credit, treated as not implemented
    /// * failed but implemented: whatever `policy` awards
    /// * failed and a stub: no credit
    pub fn from_test(
        points: f64,
        passed: bool,
        implementation_detected: bool,
        diagnostic: String,
        policy: &PartialCredit,
        elapsed: Duration,
    ) -> Self {
        let execution_time = elapsed.as_secs_f64();
        let diagnostic = if diagnostic.trim().is_empty() {
            SILENT_FAILURE_DIAGNOSTIC.to_string()
        } else {
            diagnostic
        };

        match (passed, implementation_detected) {
            (true, true) => Self {
                passed: true,
                score: points,
                error: None,
                implementation_detected,
                execution_time,
            },
            (true, false) => Self {
                passed: false,
                score: 0.0,
                error: Some(STUB_PASSED_DIAGNOSTIC.to_string()),
                implementation_detected,
                execution_time,
            },
            (false, true) => Self {
                passed: false,
                score: policy.award(points),
                error: Some(diagnostic),
                implementation_detected,
                execution_time,
            },
            (false, false) => Self {
                passed: false,
                score: 0.0,
                error: Some(diagnostic),
                implementation_detected,
                execution_time,
            },
        }
    }

    /// Outcome synthesized for a component whose result never arrived.
    pub fn missing() -> Self {
        Self {
            passed:                  false,
            score:                   0.0,
            error:                   Some(MISSING_RESULT_DIAGNOSTIC.to_string()),
            implementation_detected: false,
            execution_time:          0.0,
        }
    }

    /// Derives the standardized status.
    pub fn status(&self) -> ComponentStatus {
        if self.passed {
            ComponentStatus::Passed
        } else if self.implementation_detected {
            ComponentStatus::ImplementedWithErrors
        } else {
            ComponentStatus::NotImplemented
        }
    }
}
