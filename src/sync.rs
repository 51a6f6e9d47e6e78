//! Publish the CSV report with git.
//!
//! Runs `git add`, `git commit` and `git push` in the output directory. The
//! commit message carries the local time as `AutoUpdate_<MMDD_HHMM>`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;

/// Prefix of automatic commit messages.
pub const COMMIT_PREFIX: &str = "AutoUpdate_";

/// Errors raised while publishing the report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// `git` could not be started.
    #[error("Failed to run git in {dir}: {source}")]
    Spawn {
        /// Working directory
        dir: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A git step exited with a failure status.
    #[error("git {step} failed ({status}): {stderr}")]
    Failed {
        /// Subcommand that failed
        step: &'static str,
        /// Exit status as printed by the OS
        status: String,
        /// Trimmed stderr of the command
        stderr: String,
    },
}

/// Commit message for a given moment.
#[must_use]
pub fn commit_message<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{COMMIT_PREFIX}{}", now.format("%m%d_%H%M"))
}

/// Stage `file`, commit and push from `dir`.
///
/// # Errors
///
/// Returns [`SyncError`] on the first git step that fails.
pub fn push_report(dir: &Path, file: &Path) -> Result<(), SyncError> {
    let message = commit_message(&Local::now());
    let file = file.strip_prefix(dir).unwrap_or(file);

    run_git(dir, "add", &[OsStr::new("add"), file.as_os_str()])?;
    run_git(
        dir,
        "commit",
        &[OsStr::new("commit"), OsStr::new("-m"), OsStr::new(&message)],
    )?;
    run_git(dir, "push", &[OsStr::new("push")])?;

    log::info!("Pushed {} ({})", file.display(), message);
    Ok(())
}

fn run_git(dir: &Path, step: &'static str, args: &[&OsStr]) -> Result<(), SyncError> {
    log::debug!("git {} in {}", step, dir.display());
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| SyncError::Spawn {
            dir: dir.to_path_buf(),
            source,
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(SyncError::Failed {
            step,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
