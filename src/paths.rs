#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Submission workspace path configuration.

use std::path::{Path, PathBuf};

use bon::builder;
use serde::{Deserialize, Serialize};

use crate::config;

/// Standard paths for one student submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionPaths {
    /// Root directory of the submission; tests run from here.
    root_dir:    PathBuf,
    /// Directory holding the student's source files.
    source_dir:  PathBuf,
    /// Directory holding the scoped tests.
    test_dir:    PathBuf,
    /// Where the JSON grade report is written.
    report_path: PathBuf,
}

impl SubmissionPaths {
    /// Creates a new set of submission paths rooted at `root_dir`.
    pub fn new(root_dir: PathBuf) -> Self {
        Self::build_with_defaults(root_dir, None, None, None)
    }

    /// Construct paths from optional overrides. Relative overrides are
    /// resolved against `root_dir`.
    pub fn from_parts(
        root_dir: PathBuf,
        source_dir: Option<PathBuf>,
        test_dir: Option<PathBuf>,
        report_path: Option<PathBuf>,
    ) -> Self {
        Self::build_with_defaults(root_dir, source_dir, test_dir, report_path)
    }

    /// Root directory for the submission.
    pub fn root_dir(&self) -> &Path {
        self.root_dir.as_path()
    }

    /// Source directory scanned by the implementation detector.
    pub fn source_dir(&self) -> &Path {
        self.source_dir.as_path()
    }

    /// Test directory for the submission.
    pub fn test_dir(&self) -> &Path {
        self.test_dir.as_path()
    }

    /// Destination of the JSON grade report.
    pub fn report_path(&self) -> &Path {
        self.report_path.as_path()
    }

    /// Resolves a submission-relative path against the root.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.root_dir.join(relative)
        }
    }

    /// Returns a copy of these paths with a different report destination.
    pub fn with_report_path(mut self, report_path: impl Into<PathBuf>) -> Self {
        self.report_path = self.resolve(report_path.into());
        self
    }
}

impl Default for SubmissionPaths {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl SubmissionPaths {
    /// Centralized constructor that applies standard defaults when overrides
    /// are absent.
    fn build_with_defaults(
        root_dir: PathBuf,
        source_dir: Option<PathBuf>,
        test_dir: Option<PathBuf>,
        report_path: Option<PathBuf>,
    ) -> Self {
        let anchor = |p: PathBuf| {
            if p.is_absolute() {
                p
            } else {
                root_dir.join(p)
            }
        };
        let source_dir = anchor(source_dir.unwrap_or_else(|| PathBuf::from("src")));
        let test_dir = anchor(test_dir.unwrap_or_else(|| PathBuf::from("tests")));
        let report_path =
            anchor(report_path.unwrap_or_else(|| PathBuf::from(config::report_file())));

        Self {
            root_dir,
            source_dir,
            test_dir,
            report_path,
        }
    }
}

/// Builder-friendly constructor for `SubmissionPaths` with optional overrides.
#[builder(finish_fn = build)]
pub fn submission_paths(
    #[builder(into)] root_dir: PathBuf,
    #[builder(into)] source_dir: Option<PathBuf>,
    #[builder(into)] test_dir: Option<PathBuf>,
    #[builder(into)] report_path: Option<PathBuf>,
) -> SubmissionPaths {
    SubmissionPaths::build_with_defaults(root_dir, source_dir, test_dir, report_path)
}
