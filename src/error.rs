#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Error taxonomy for the grading pipeline.
//!
//! Configuration problems surface as `ConfigError` and abort a run before any
//! score is produced. Per-component failures never show up here; they are
//! folded into that component's `TestOutcome` instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::grade::engine::Stage;

/// Problems with the assignment setup (registry, files, policy).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Two components share an id.
    #[error("component id `{0}` is declared more than once")]
    DuplicateComponent(String),

    /// A component carries negative or non-finite points.
    #[error("component `{id}` has invalid points ({points}); points must be finite and >= 0")]
    InvalidPoints {
        /// Component id.
        id:     String,
        /// Offending point value.
        points: f64,
    },

    /// The registry sums to zero possible points.
    #[error("assignment has no possible points; declare at least one component with points > 0")]
    NoPossiblePoints,

    /// The declared total disagrees with the component sum.
    #[error("declared total of {declared} points does not match the component sum of {actual}")]
    TotalMismatch {
        /// Total stated by the assignment.
        declared: f64,
        /// Sum of component points.
        actual:   f64,
    },

    /// A result was reported for an id the registry does not know.
    #[error("result reported for unknown component `{0}`")]
    UnknownComponent(String),

    /// A file the submission must contain is absent.
    #[error("required submission file not found: {}", .0.display())]
    MissingRequiredFile(PathBuf),

    /// The assignment file could not be read.
    #[error("could not read assignment file {}: {source}", path.display())]
    Read {
        /// File that was being read.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The assignment file could not be parsed.
    #[error("could not parse assignment file {}: {message}", path.display())]
    Parse {
        /// File that was being parsed.
        path:    PathBuf,
        /// Parser message.
        message: String,
    },

    /// Partial-credit parameters are out of range.
    #[error("invalid partial credit policy: {0}")]
    InvalidPolicy(String),
}

/// Errors that stop a grading run.
#[derive(Error, Debug)]
pub enum GradingError {
    /// Setup failure, reported distinctly from a grade.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run tried to skip or repeat a stage.
    #[error("grading run cannot move from {from:?} to {to:?}")]
    Stage {
        /// Stage the run was in.
        from: Stage,
        /// Stage that was requested.
        to:   Stage,
    },
}
