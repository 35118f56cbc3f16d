#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Assignment configuration files.
//!
//! An assignment is declared in TOML (or JSON, chosen by extension):
//!
//! ```toml
//! name = "Pandas Basics"
//! module = "Module 2"
//! total_points = 10
//! test_file = "tests/test_pandas_basics.py"
//!
//! [[components]]
//! id = "load_and_explore"
//! name = "Load and Explore Data"
//! points = 2
//! function = "load_and_explore_data"
//! check = { kind = "test", selector = "TestLoadAndExploreData" }
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config,
    detect::ImplementationDetector,
    error::ConfigError,
    grade::{GradingEngine, PartialCredit},
    paths::{SubmissionPaths, submission_paths},
    registry::{ComponentRegistry, ComponentSpec},
    runner::TestRunner,
};

/// Everything the engine needs to know about one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentConfig {
    /// Assignment name.
    pub name:                 String,
    /// Course module name.
    #[serde(default)]
    pub module:               String,
    /// Declared total; must equal the component sum when present.
    #[serde(default)]
    pub total_points:         Option<f64>,
    /// Per-test budget; falls back to `AUTOGRADE_TEST_TIMEOUT_SECS`.
    #[serde(default)]
    pub timeout_secs:         Option<u64>,
    /// Test module that bare selectors refer to.
    #[serde(default)]
    pub test_file:            Option<PathBuf>,
    /// Student source directory, relative to the submission root.
    #[serde(default)]
    pub source_dir:           Option<PathBuf>,
    /// Test directory, relative to the submission root.
    #[serde(default)]
    pub tests_dir:            Option<PathBuf>,
    /// Files that must exist before grading starts.
    #[serde(default)]
    pub required_files:       Vec<PathBuf>,
    /// Credit for implemented-but-failing components.
    #[serde(default)]
    pub partial_credit:       PartialCredit,
    /// Opaque block copied into every report.
    #[serde(default = "empty_context")]
    pub professional_context: Value,
    /// Components in grading order.
    pub components:           Vec<ComponentSpec>,
}

/// An empty JSON object.
fn empty_context() -> Value {
    Value::Object(serde_json::Map::new())
}

impl AssignmentConfig {
    /// Reads and parses an assignment file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parses `text`; `path` selects the format and labels errors.
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(text).map_err(|e| e.to_string())
        } else {
            toml::from_str(text).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Validates the components into a registry.
    pub fn registry(&self) -> Result<ComponentRegistry, ConfigError> {
        self.partial_credit.validate()?;
        ComponentRegistry::new(self.components.clone(), self.total_points)
    }

    /// Submission layout rooted at `root_dir`.
    pub fn paths(&self, root_dir: &Path, report_path: Option<PathBuf>) -> SubmissionPaths {
        submission_paths()
            .root_dir(root_dir)
            .maybe_source_dir(self.source_dir.clone())
            .maybe_test_dir(self.tests_dir.clone())
            .maybe_report_path(report_path)
            .build()
    }

    /// Test module that bare selectors are scoped to, relative to the
    /// submission root.
    ///
    /// A bare file name is looked up in `tests_dir` (default `tests`).
    pub fn test_file_path(&self) -> Option<PathBuf> {
        let file = self.test_file.as_ref()?;
        let is_bare = file
            .parent()
            .is_none_or(|parent| parent.as_os_str().is_empty());
        if is_bare && !file.is_absolute() {
            let dir = self
                .tests_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("tests"));
            Some(dir.join(file))
        } else {
            Some(file.clone())
        }
    }

    /// Per-test time budget.
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(config::test_timeout)
    }

    /// Builds an engine for this assignment.
    pub fn engine<R, D>(
        &self,
        runner: R,
        detector: D,
        paths: SubmissionPaths,
    ) -> Result<GradingEngine<R, D, Value>, ConfigError>
    where
        R: TestRunner,
        D: ImplementationDetector,
    {
        Ok(GradingEngine::builder()
            .assignment(self.name.clone())
            .module(self.module.clone())
            .registry(self.registry()?)
            .runner(runner)
            .detector(detector)
            .context(self.professional_context.clone())
            .paths(paths)
            .policy(self.partial_credit)
            .timeout(self.timeout())
            .required_files(self.required_files.clone())
            .build())
    }
}
