#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Toolchain discovery and filesystem helpers.
//!
//! Tests are launched through `uv run -- python -m pytest` when `uv` is on
//! PATH (and not disabled), otherwise through `python3 -m pytest`.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use glob::glob;
use which::which;

use crate::config;

/// Finds and returns the path to `uv`.
pub fn uv_path() -> Result<PathBuf> {
    which("uv").context("Cannot find uv on path")
}

/// Finds and returns the Python interpreter, honouring `AUTOGRADE_PYTHON`.
pub fn python_path() -> Result<PathBuf> {
    if let Some(python) = config::python_override() {
        return Ok(python);
    }

    which("python3")
        .or_else(|_| which("python"))
        .map_err(|_| anyhow!("Could not find a Python interpreter on path (python3/python)"))
}

/// Returns the command and arguments to run a Python module.
///
/// Uses `uv run -- python -m <module>` when `uv` is available and preferred,
/// otherwise `python -m <module>`.
pub fn python_module_command(
    module: &str,
    extra_args: &[&str],
) -> Result<(OsString, Vec<OsString>)> {
    if config::use_uv()
        && config::python_override().is_none()
        && let Ok(uv) = uv_path()
    {
        let mut args: Vec<OsString> = vec![
            "run".into(),
            "--".into(),
            "python".into(),
            "-m".into(),
            module.into(),
        ];
        args.extend(extra_args.iter().map(OsString::from));
        return Ok((uv.into_os_string(), args));
    }

    let python = python_path()?;
    let mut args: Vec<OsString> = vec!["-m".into(), module.into()];
    args.extend(extra_args.iter().map(OsString::from));
    Ok((python.into_os_string(), args))
}

/// Builds a `PYTHONPATH` value with `root_dir` prepended to any existing
/// value, so `src.module` imports resolve from the submission root.
pub fn python_path_env(root_dir: &Path) -> OsString {
    let sep = if cfg!(windows) { ";" } else { ":" };
    let mut python_path = OsString::from(root_dir.as_os_str());

    if let Some(existing) = std::env::var_os("PYTHONPATH")
        && !existing.is_empty()
    {
        python_path.push(sep);
        python_path.push(existing);
    }

    python_path
}

/// A glob utility function to find paths to files with certain extension
///
/// * `extension`: the file extension to find paths for
/// * `search_depth`: how many folders deep to search for
/// * `root_dir`: the root directory where search starts
///
/// Results are sorted so that scans are reproducible.
pub fn find_files(extension: &str, search_depth: i8, root_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pattern = root_dir.to_path_buf();

    for _ in 0..search_depth {
        pattern.push("**");
    }

    pattern.push(format!("*.{extension}"));
    let pattern = pattern
        .to_str()
        .context("Could not convert root_dir to string")?
        .to_string();

    let mut files: Vec<PathBuf> = glob(&pattern)
        .context("Could not create glob")?
        .filter_map(Result::ok)
        .collect();
    files.sort();
    Ok(files)
}
