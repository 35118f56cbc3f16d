#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Static code-quality check over one submission file.

use std::{path::PathBuf, time::Instant};

use serde::{Deserialize, Serialize};

use super::outcome::TestOutcome;
use crate::{detect::has_definition, paths::SubmissionPaths};

/// Share of the score for required imports, in tenths.
const IMPORT_TENTHS: u32 = 3;
/// Share of the score for required function definitions, in tenths.
const FUNCTION_TENTHS: u32 = 4;
/// Share of the score for comments or docstrings, in tenths.
const DOCS_TENTHS: u32 = 3;

/// Parameters of a `source_quality` check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceQuality {
    /// File to inspect, relative to the submission root.
    pub file:               PathBuf,
    /// Files smaller than this earn nothing.
    #[serde(default = "default_min_bytes")]
    pub min_bytes:          u64,
    /// Modules that must be imported (`import X` or `from X`).
    #[serde(default)]
    pub required_imports:   Vec<String>,
    /// Functions that must be defined.
    #[serde(default)]
    pub required_functions: Vec<String>,
    /// How many of `required_functions` must be present; all when unset.
    #[serde(default)]
    pub min_functions:      Option<usize>,
    /// Fewer functions that still earn half the function share.
    #[serde(default)]
    pub partial_functions:  Option<usize>,
}

/// Default minimum file size for a plausible implementation.
fn default_min_bytes() -> u64 {
    500
}

impl SourceQuality {
    /// Creates a check for `file` with default thresholds.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file:               file.into(),
            min_bytes:          default_min_bytes(),
            required_imports:   Vec::new(),
            required_functions: Vec::new(),
            min_functions:      None,
            partial_functions:  None,
        }
    }

    /// Inspects the file and scores it out of `points`.
    pub fn assess(&self, points: f64, paths: &SubmissionPaths) -> TestOutcome {
        let started = Instant::now();
        let path = paths.resolve(&self.file);

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Could not read {}: {e}", path.display());
                return TestOutcome {
                    passed:                  false,
                    score:                   0.0,
                    error:                   Some(format!("❌ {} file not found", self.file.display())),
                    implementation_detected: false,
                    execution_time:          started.elapsed().as_secs_f64(),
                };
            }
        };

        let (tenths, notes) = self.grade_text(&bytes);
        let passed = tenths == IMPORT_TENTHS + FUNCTION_TENTHS + DOCS_TENTHS;
        let score = (points * f64::from(tenths) / 10.0).min(points);

        TestOutcome {
            passed,
            score: if passed { points } else { score },
            error: (!passed).then(|| notes.join(" | ")),
            implementation_detected: true,
            execution_time: started.elapsed().as_secs_f64(),
        }
    }

    /// Scores file contents in tenths of the component and explains why.
    pub fn grade_text(&self, bytes: &[u8]) -> (u32, Vec<String>) {
        let mut notes = Vec::new();

        if (bytes.len() as u64) < self.min_bytes {
            notes.push("❌ Implementation appears incomplete (file too small)".to_string());
            return (0, notes);
        }

        let content = String::from_utf8_lossy(bytes);
        let mut tenths = 0;

        let missing_imports: Vec<&str> = self
            .required_imports
            .iter()
            .map(String::as_str)
            .filter(|module| {
                !content.contains(&format!("import {module}"))
                    && !content.contains(&format!("from {module}"))
            })
            .collect();
        if missing_imports.is_empty() {
            tenths += IMPORT_TENTHS;
            if !self.required_imports.is_empty() {
                notes.push(format!("✅ Found imports: {}", self.required_imports.join(", ")));
            }
        } else {
            notes.push(format!("❌ Missing imports: {}", missing_imports.join(", ")));
        }

        let total = self.required_functions.len();
        let found = self
            .required_functions
            .iter()
            .filter(|function| has_definition(function, &content))
            .count();
        let needed = self.min_functions.unwrap_or(total).min(total);
        if found >= needed {
            tenths += FUNCTION_TENTHS;
            if total > 0 {
                notes.push(format!("✅ Found {found}/{total} required functions"));
            }
        } else if self.partial_functions.is_some_and(|partial| found >= partial) {
            tenths += FUNCTION_TENTHS / 2;
            notes.push(format!("⚠️ Found {found}/{total} required functions"));
        } else {
            notes.push(format!("❌ Only found {found}/{total} required functions"));
        }

        if content.contains('#') || content.contains("\"\"\"") || content.contains("'''") {
            tenths += DOCS_TENTHS;
            notes.push("✅ Code includes comments/documentation".to_string());
        } else {
            notes.push("❌ Code lacks comments/documentation".to_string());
        }

        (tenths, notes)
    }
}
