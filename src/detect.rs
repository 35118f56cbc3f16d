#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Text heuristic that decides whether a Python function is a stub.
//!
//! This is a classifier, not a proof: unusual formatting can produce false
//! positives and false negatives. Scoring only uses it to choose between
//! `not_implemented` and `implemented_with_errors`, and to refuse credit to
//! a stub whose test passes anyway.

use std::path::{Path, PathBuf};

use crate::util::find_files;

/// Answers "does this function look implemented?" for the grading engine.
pub trait ImplementationDetector {
    /// Returns true when `function_name` has a non-stub body.
    fn is_implemented(&self, function_name: &str) -> bool;
}

/// Tokens whose presence marks a line as real logic.
const INDICATOR_WORDS: [&str; 6] = ["return", "if", "for", "while", "try", "with"];

/// Tokens whose presence marks a line as a placeholder.
const PLACEHOLDER_WORDS: [&str; 2] = ["pass", "None"];

/// Returns true when `source_text` holds a header for `function_name`.
pub fn has_definition(function_name: &str, source_text: &str) -> bool {
    source_text
        .lines()
        .any(|line| is_header(line, function_name))
}

/// Classifies the first definition of `function_name` in `source_text`.
///
/// * a missing definition is not implemented
/// * a body with more than two meaningful lines is implemented
/// * otherwise at least one line must carry an assignment or control-flow
///   keyword without being a `pass`/`None` placeholder
pub fn is_implemented(function_name: &str, source_text: &str) -> bool {
    let lines: Vec<&str> = source_text.lines().collect();
    let Some(start) = lines.iter().position(|line| is_header(line, function_name)) else {
        return false;
    };

    let body = meaningful_lines(&function_body(&lines, start));
    if body.len() > 2 {
        return true;
    }

    body.iter()
        .any(|line| has_indicator(line) && !is_placeholder(line))
}

/// Detector backed by the Python files of one source directory, read once.
#[derive(Debug, Clone, Default)]
pub struct SourceDirDetector {
    /// Path and contents of every readable file, in sorted path order.
    sources: Vec<(PathBuf, String)>,
}

impl SourceDirDetector {
    /// Reads every `*.py` file directly inside `source_dir`.
    ///
    /// Unreadable files are logged and skipped; functions that only exist in
    /// them will be reported as not implemented.
    pub fn load(source_dir: &Path) -> Self {
        let files = match find_files("py", 0, source_dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("Could not scan {}: {e:#}", source_dir.display());
                Vec::new()
            }
        };
        Self::from_files(files)
    }

    /// Reads the given files in order.
    pub fn from_files(files: impl IntoIterator<Item = PathBuf>) -> Self {
        let sources = files
            .into_iter()
            .filter_map(|path| match std::fs::read_to_string(&path) {
                Ok(text) => Some((path, text)),
                Err(e) => {
                    tracing::warn!("Error analyzing {}: {e}", path.display());
                    None
                }
            })
            .collect();
        Self { sources }
    }

    /// Returns the file that defines `function_name`, if any.
    pub fn defining_file(&self, function_name: &str) -> Option<&Path> {
        self.sources
            .iter()
            .find(|(_, text)| has_definition(function_name, text))
            .map(|(path, _)| path.as_path())
    }

    /// Number of files that were read successfully.
    pub fn file_count(&self) -> usize {
        self.sources.len()
    }
}

impl ImplementationDetector for SourceDirDetector {
    fn is_implemented(&self, function_name: &str) -> bool {
        // first defining file wins
        self.sources
            .iter()
            .find(|(_, text)| has_definition(function_name, text))
            .is_some_and(|(_, text)| is_implemented(function_name, text))
    }
}

/// Returns true when `line` opens a definition of `function_name`.
fn is_header(line: &str, function_name: &str) -> bool {
    let trimmed = line.trim_start();
    let trimmed = trimmed.strip_prefix("async ").unwrap_or(trimmed);
    trimmed
        .strip_prefix("def ")
        .and_then(|rest| rest.strip_prefix(function_name))
        .is_some_and(|rest| rest.trim_start().starts_with('('))
}

/// Width of the leading whitespace, with tabs counted as one column each.
fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Returns the body lines of the definition whose header is at `start`.
///
/// The signature may wrap across lines; it ends at the first `:` outside any
/// brackets. Code after that colon (`def f(): return 1`) counts as body. The
/// indented block ends at the first non-blank line indented at or below the
/// header.
fn function_body<'a>(lines: &[&'a str], start: usize) -> Vec<&'a str> {
    let header_indent = indent_width(lines[start]);
    let mut body = Vec::new();
    let mut depth = 0usize;
    let mut idx = start;

    'signature: while idx < lines.len() {
        let code = strip_comment(lines[idx]);
        for (pos, ch) in code.char_indices() {
            match ch {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                ':' if depth == 0 => {
                    let inline = code[pos + 1..].trim();
                    if !inline.is_empty() {
                        body.push(inline);
                    }
                    break 'signature;
                }
                _ => {}
            }
        }
        idx += 1;
    }

    if idx >= lines.len() {
        return body;
    }

    for line in &lines[idx + 1..] {
        if !line.trim().is_empty() && indent_width(line) <= header_indent {
            break;
        }
        body.push(*line);
    }
    body
}

/// Drops blank lines, comment lines, and docstring blocks; trims the rest.
fn meaningful_lines<'a>(body: &[&'a str]) -> Vec<&'a str> {
    let mut kept = Vec::new();
    let mut open_docstring: Option<&'static str> = None;

    for raw in body {
        let line = raw.trim();

        if let Some(delim) = open_docstring {
            if line.contains(delim) {
                open_docstring = None;
            }
            continue;
        }

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(delim) = docstring_delimiter(line) {
            let rest = &line[line.find(delim).map_or(0, |i| i + delim.len())..];
            if !rest.contains(delim) {
                open_docstring = Some(delim);
            }
            continue;
        }

        let code = strip_comment(line).trim();
        if !code.is_empty() {
            kept.push(code);
        }
    }

    kept
}

/// Returns the triple-quote delimiter if `line` starts a bare string literal.
fn docstring_delimiter(line: &str) -> Option<&'static str> {
    let unprefixed = line.trim_start_matches(['r', 'R', 'u', 'U', 'b', 'B', 'f', 'F']);
    if unprefixed.len() + 2 < line.len() {
        return None;
    }
    ["\"\"\"", "'''"]
        .into_iter()
        .find(|delim| unprefixed.starts_with(delim))
}

/// Removes a trailing `#` comment that is not inside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(ch),
            (None, '#') => return &line[..idx],
            _ => {}
        }
    }
    line
}

/// Splits a line into identifier-like words.
fn words(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
}

/// True when the line assigns something or uses a control-flow keyword.
fn has_indicator(line: &str) -> bool {
    line.contains('=') || words(line).any(|word| INDICATOR_WORDS.contains(&word))
}

/// True when the line is a `pass`, an ellipsis, or mentions `None`.
fn is_placeholder(line: &str) -> bool {
    line == "..." || words(line).any(|word| PLACEHOLDER_WORDS.contains(&word))
}
