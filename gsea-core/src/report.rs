use crate::action::{Action, Algorithm};
use crate::codec::FileStats;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Result of one work item, or the aggregate of a directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failed(String),
    /// The worker died (panicked) or exited without reporting.
    Abnormal(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("ok"),
            Outcome::Failed(r) => write!(f, "failed: {r}"),
            Outcome::Abnormal(r) => write!(f, "terminated abnormally: {r}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    pub reason: String,
    pub abnormal: bool,
}

/// Counters for a subtree. Children's reports are merged into their parent's
/// once the parent's join barrier has observed them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeReport {
    pub files_ok: u64,
    pub files_failed: u64,
    /// Directories whose whole subtree succeeded.
    pub dirs_ok: u64,
    /// Directories that could not be processed or had a failed entry below.
    pub dirs_failed: u64,
    /// Entries that could not be classified (symlinks, sockets, vanished).
    pub skipped: u64,
    pub abnormal: u64,
    /// Work items run in the caller because no worker permit was free.
    pub inline_fallbacks: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub failures: Vec<Failure>,
}

impl TreeReport {
    pub fn merge(&mut self, other: TreeReport) {
        self.files_ok += other.files_ok;
        self.files_failed += other.files_failed;
        self.dirs_ok += other.dirs_ok;
        self.dirs_failed += other.dirs_failed;
        self.skipped += other.skipped;
        self.abnormal += other.abnormal;
        self.inline_fallbacks += other.inline_fallbacks;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
        self.failures.extend(other.failures);
    }

    pub fn record_failure(&mut self, path: &Path, reason: impl Into<String>) {
        self.failures.push(Failure {
            path: path.to_path_buf(),
            reason: reason.into(),
            abnormal: false,
        });
    }

    pub fn failed_entries(&self) -> usize {
        self.failures.len()
    }
}

/// Outcome and counters produced by one worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkResult {
    pub outcome: Outcome,
    pub report: TreeReport,
}

impl WorkResult {
    pub fn file_ok(stats: FileStats) -> Self {
        Self {
            outcome: Outcome::Success,
            report: TreeReport {
                files_ok: 1,
                bytes_in: stats.bytes_in,
                bytes_out: stats.bytes_out,
                ..Default::default()
            },
        }
    }

    pub fn file_failed(path: &Path, reason: String) -> Self {
        let mut report = TreeReport {
            files_failed: 1,
            ..Default::default()
        };
        report.record_failure(path, reason.clone());
        Self {
            outcome: Outcome::Failed(reason),
            report,
        }
    }

    pub fn dir_failed(path: &Path, reason: String) -> Self {
        let mut report = TreeReport {
            dirs_failed: 1,
            ..Default::default()
        };
        report.record_failure(path, reason.clone());
        Self {
            outcome: Outcome::Failed(reason),
            report,
        }
    }

    pub fn abnormal(path: &Path, reason: String) -> Self {
        Self {
            outcome: Outcome::Abnormal(reason.clone()),
            report: TreeReport {
                abnormal: 1,
                failures: vec![Failure {
                    path: path.to_path_buf(),
                    reason,
                    abnormal: true,
                }],
                ..Default::default()
            },
        }
    }
}

/// Everything a caller needs to print a summary and pick an exit status.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub action: Action,
    pub algorithm: Algorithm,
    pub outcome: Outcome,
    pub report: TreeReport,
}

impl RunReport {
    /// True only if the root succeeded and nothing anywhere below it failed.
    pub fn is_success(&self) -> bool {
        self.outcome.is_success() && self.report.failures.is_empty()
    }
}
