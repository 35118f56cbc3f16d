#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Subprocess plumbing shared by the test runners.

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::Stdio,
    time::Duration,
};

use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, BufReader},
    process::{Child, Command},
    task::JoinError,
    time::timeout,
};

/// Errors raised while driving a child process.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started at all.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// Underlying I/O error.
        source:  std::io::Error,
    },
    /// A stdio pipe that was requested is missing.
    #[error("missing {0} pipe")]
    MissingPipe(&'static str),
    /// Reading output or waiting on the child failed.
    #[error("failed to {action}: {source}")]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A reader task panicked or was cancelled.
    #[error("{0} task join error: {1}")]
    Join(&'static str, JoinError),
    /// The deadline elapsed; the child has been killed.
    #[error("subprocess timed out after {0:?}")]
    Timeout(Duration),
}

/// Drop guard that terminates a spawned child process if callers forget to
/// await it, or if the wait is abandoned on timeout.
struct ChildDropGuard(Option<Child>);

impl ChildDropGuard {
    /// Wraps the provided child process with the drop guard.
    fn new(child: Child) -> Self {
        Self(Some(child))
    }

    /// Returns a mutable reference to the underlying child process.
    fn child_mut(&mut self) -> Result<&mut Child, ProcessError> {
        self.0.as_mut().ok_or(ProcessError::MissingPipe("child"))
    }

    /// Prevents the guard from killing the process on drop.
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for ChildDropGuard {
    fn drop(&mut self) {
        if let Some(child) = self.0.as_mut() {
            let _ = child.start_kill();
        }
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct Collected {
    /// Exit status returned by the process.
    pub status: std::process::ExitStatus,
    /// Contents written to stdout.
    pub stdout: Vec<u8>,
    /// Contents written to stderr.
    pub stderr: Vec<u8>,
}

impl Collected {
    /// Returns stdout followed by stderr as lossy UTF-8.
    pub fn combined_output(&self) -> String {
        let stdout = String::from_utf8_lossy(&self.stdout);
        let stderr = String::from_utf8_lossy(&self.stderr);
        format!("{stdout}{stderr}")
    }
}

/// Spawns a command with stdin closed and collects stdout/stderr.
///
/// When `deadline` elapses the child is killed and `ProcessError::Timeout` is
/// returned.
pub async fn run_collect(
    program: impl AsRef<OsStr>,
    args: &[OsString],
    cwd: Option<&Path>,
    env: &[(OsString, OsString)],
    deadline: Option<Duration>,
) -> Result<Collected, ProcessError> {
    let program = program.as_ref();
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }

    let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;
    let mut guard = ChildDropGuard::new(child);
    let stdout = guard
        .child_mut()?
        .stdout
        .take()
        .ok_or(ProcessError::MissingPipe("stdout"))?;
    let stderr = guard
        .child_mut()?
        .stderr
        .take()
        .ok_or(ProcessError::MissingPipe("stderr"))?;

    let out_task = tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|source| ProcessError::Io {
                action: "read stdout",
                source,
            })?;
        Ok::<Vec<u8>, ProcessError>(buf)
    });

    let err_task = tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|source| ProcessError::Io {
                action: "read stderr",
                source,
            })?;
        Ok::<Vec<u8>, ProcessError>(buf)
    });

    let readers = [out_task.abort_handle(), err_task.abort_handle()];

    let wait_future = async move {
        let mut guard = guard;
        let status = guard
            .child_mut()?
            .wait()
            .await
            .map_err(|source| ProcessError::Io {
                action: "wait on process",
                source,
            })?;
        let stdout = out_task
            .await
            .map_err(|e| ProcessError::Join("stdout", e))??;
        let stderr = err_task
            .await
            .map_err(|e| ProcessError::Join("stderr", e))??;
        guard.disarm();
        Ok(Collected {
            status,
            stdout,
            stderr,
        })
    };

    match deadline {
        Some(limit) => match timeout(limit, wait_future).await {
            Ok(collected) => collected,
            Err(_) => {
                // a grandchild may still hold the pipes open
                for reader in readers {
                    reader.abort();
                }
                Err(ProcessError::Timeout(limit))
            }
        },
        None => wait_future.await,
    }
}
