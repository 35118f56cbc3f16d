#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Scoped test execution.
//!
//! A runner launches one test unit (a function or a class) and reports
//! pass/fail with the captured output. Runners never fail: spawn errors and
//! timeouts come back as failing results.

use std::{
    ffi::OsString,
    future::Future,
    path::Path,
    time::Duration,
};

use bon::Builder;

use crate::{
    process::{ProcessError, run_collect},
    util::{python_module_command, python_path_env},
};

/// Diagnostic reported when a test exceeds its time budget.
pub const TIMEOUT_DIAGNOSTIC: &str = "execution timed out";

/// Extra arguments passed to pytest for every selector.
const PYTEST_ARGS: [&str; 3] = ["-v", "--tb=short", "--no-header"];

/// Pass/fail plus diagnostic for one scoped test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedTestResult {
    /// Whether the test process exited successfully.
    pub passed:     bool,
    /// Combined output when failing, empty otherwise.
    pub diagnostic: String,
}

impl ScopedTestResult {
    /// A passing result.
    pub fn pass() -> Self {
        Self {
            passed:     true,
            diagnostic: String::new(),
        }
    }

    /// A failing result with `diagnostic`.
    pub fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            passed:     false,
            diagnostic: diagnostic.into(),
        }
    }

    /// Whether this result came from a timeout.
    pub fn timed_out(&self) -> bool {
        !self.passed && self.diagnostic == TIMEOUT_DIAGNOSTIC
    }
}

/// Runs one scoped test in a working directory with a time budget.
pub trait TestRunner {
    /// Runs the test unit named by `selector`.
    fn run_scoped_test(
        &self,
        selector: &str,
        working_dir: &Path,
        timeout: Duration,
    ) -> impl Future<Output = ScopedTestResult> + Send;
}

/// Subprocess runner: `program args... <prefix><selector>`.
#[derive(Debug, Clone, Builder)]
pub struct CommandRunner {
    /// Executable to launch.
    #[builder(into)]
    program:         OsString,
    /// Arguments placed before the selector.
    #[builder(default)]
    args:            Vec<OsString>,
    /// Prepended to selectors that do not already name a file.
    #[builder(default, into)]
    selector_prefix: String,
    /// Extra environment for the child.
    #[builder(default)]
    env:             Vec<(OsString, OsString)>,
}

impl CommandRunner {
    /// Runner for `python -m pytest`, optionally scoped to `test_file`.
    ///
    /// With a test file, selectors such as `TestJoinStationData` become
    /// `tests/test_pandas_basics.py::TestJoinStationData`; selectors that
    /// already contain `::` are passed through. `root_dir` is prepended to
    /// `PYTHONPATH` so `src.*` imports resolve.
    ///
    /// When no interpreter can be found the runner still launches `python3`,
    /// so every component fails with the spawn error instead of aborting the
    /// run.
    pub fn pytest(test_file: Option<&Path>, root_dir: &Path) -> Self {
        let (program, args) = python_module_command("pytest", &PYTEST_ARGS).unwrap_or_else(|e| {
            tracing::warn!("{e:#}");
            let mut args: Vec<OsString> = vec!["-m".into(), "pytest".into()];
            args.extend(PYTEST_ARGS.iter().map(OsString::from));
            (OsString::from("python3"), args)
        });
        let selector_prefix = test_file
            .map(|file| format!("{}::", file.display()))
            .unwrap_or_default();

        Self::builder()
            .program(program)
            .args(args)
            .selector_prefix(selector_prefix)
            .env(vec![("PYTHONPATH".into(), python_path_env(root_dir))])
            .build()
    }

    /// The final argument for `selector`.
    pub fn selector_arg(&self, selector: &str) -> String {
        if self.selector_prefix.is_empty() || selector.contains("::") {
            selector.to_string()
        } else {
            format!("{}{selector}", self.selector_prefix)
        }
    }

}

impl TestRunner for CommandRunner {
    async fn run_scoped_test(
        &self,
        selector: &str,
        working_dir: &Path,
        timeout: Duration,
    ) -> ScopedTestResult {
        let mut args = self.args.clone();
        args.push(self.selector_arg(selector).into());

        let collected = run_collect(
            &self.program,
            &args,
            Some(working_dir),
            &self.env,
            Some(timeout),
        )
        .await;

        match collected {
            Ok(output) if output.status.success() => ScopedTestResult::pass(),
            Ok(output) => ScopedTestResult::fail(output.combined_output()),
            Err(ProcessError::Timeout(limit)) => {
                tracing::warn!("`{selector}` exceeded {limit:?} and was killed");
                ScopedTestResult::fail(TIMEOUT_DIAGNOSTIC)
            }
            Err(e) => {
                tracing::warn!("Could not run `{selector}`: {e}");
                ScopedTestResult::fail(e.to_string())
            }
        }
    }
}
