//! # autograde
//!
//! A rule-based grader for student programming submissions. Each assignment
//! declares weighted components; every component runs one scoped test (or a
//! static quality check), a text heuristic tells stubs apart from buggy code,
//! and the results are folded into a standardized report with a percentage,
//! a letter grade, feedback and CI signals.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Assignment configuration files
pub mod assignment;
/// Runtime configuration from the environment
pub mod config;
/// The professional-context capability
pub mod context;
/// Stub detection for Python functions
pub mod detect;
/// Report files, CI signals and console output
pub mod emit;
/// Error types
pub mod error;
/// Scoring, aggregation and the grade report
pub mod grade;
/// Submission paths
pub mod paths;
/// Subprocess plumbing
pub mod process;
/// The component registry
pub mod registry;
/// Scoped test runners
pub mod runner;
/// Utility functions for convenience
pub mod util;

pub use assignment::AssignmentConfig;
pub use context::ProfessionalContextProvider;
pub use detect::{ImplementationDetector, SourceDirDetector};
pub use error::{ConfigError, GradingError};
pub use grade::{GradeReport, GradingEngine, LetterGrade, PartialCredit, TestOutcome};
pub use registry::{ComponentCheck, ComponentRegistry, ComponentSpec};
pub use runner::{CommandRunner, ScopedTestResult, TestRunner};
