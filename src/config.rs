#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runtime configuration sourced from the environment.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

/// Default wall-clock budget for one scoped test run.
pub const DEFAULT_TEST_TIMEOUT_SECS: u64 = 60;

/// Default file name for the JSON grade report.
pub const DEFAULT_REPORT_FILE: &str = "grade-report.json";

/// Runtime settings shared across the crate.
#[derive(Debug)]
pub struct ConfigState {
    /// Wall-clock budget for one scoped test run.
    test_timeout: Duration,
    /// Explicit interpreter override, if any.
    python:       Option<PathBuf>,
    /// Whether `uv` should be preferred when it is on PATH.
    use_uv:       bool,
    /// File name for the JSON grade report.
    report_file:  String,
}

impl ConfigState {
    /// Construct a new configuration instance by reading the environment.
    fn new() -> Self {
        let python = std::env::var("AUTOGRADE_PYTHON")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let use_uv = std::env::var("AUTOGRADE_USE_UV")
            .map(|value| parse_flag(&value))
            .unwrap_or(true);

        let report_file = std::env::var("AUTOGRADE_REPORT_FILE")
            .map(|value| value.trim().to_owned())
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_REPORT_FILE.to_string());

        Self {
            test_timeout: read_timeout_secs("AUTOGRADE_TEST_TIMEOUT_SECS", DEFAULT_TEST_TIMEOUT_SECS),
            python,
            use_uv,
            report_file,
        }
    }

    /// Returns the per-selector timeout.
    pub fn test_timeout(&self) -> Duration {
        self.test_timeout
    }

    /// Returns the interpreter override, if configured.
    pub fn python(&self) -> Option<&PathBuf> {
        self.python.as_ref()
    }

    /// Returns whether `uv` should be preferred.
    pub fn use_uv(&self) -> bool {
        self.use_uv
    }

    /// Returns the report file name.
    pub fn report_file(&self) -> &str {
        &self.report_file
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone, Debug)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Returns the active configuration, initializing it on demand.
pub fn get() -> ConfigHandle {
    let mut guard = slot()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(cfg) = guard.as_ref() {
        return ConfigHandle(Arc::clone(cfg));
    }

    let cfg = Arc::new(ConfigState::new());
    *guard = Some(Arc::clone(&cfg));
    ConfigHandle(cfg)
}

/// Returns the configured per-selector timeout.
pub fn test_timeout() -> Duration {
    get().test_timeout()
}

/// Returns the configured interpreter override.
pub fn python_override() -> Option<PathBuf> {
    get().python().cloned()
}

/// Returns whether `uv` is preferred.
pub fn use_uv() -> bool {
    get().use_uv()
}

/// Returns the configured report file name.
pub fn report_file() -> String {
    get().report_file().to_string()
}

/// Interprets common truthy/falsy spellings; anything unrecognised is true.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
