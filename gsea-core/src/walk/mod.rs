//! Concurrent directory walker.
//!
//! Each directory call moves through [`Stage`]s: it opens the input
//! directory, creates the mirrored output directory, enumerates and names the
//! entries, spawns one worker per entry, waits for all of them, and folds
//! their results into its own. The output directory always exists before the
//! first child is spawned. A failing entry never stops its siblings.

mod worker;

pub use worker::{ItemKind, PathPair, Permit, Permits, WorkItem, WorkerHandle, WorkerId};

use crate::action::Action;
use crate::classify::{EntryKind, classify};
use crate::codec::{Codec, transform_file};
use crate::naming::{NameClaims, OutputName};
use crate::options::TransformOptions;
use crate::report::{Outcome, TreeReport, WorkResult};
use std::fs::{self, ReadDir};
use std::io::ErrorKind;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Opening,
    CreatingOutputDir,
    Enumerating,
    Dispatching,
    Awaiting,
    Reporting,
    Done,
    OpenFailed,
    MkdirFailed,
}

pub struct Walker<'a> {
    codec: &'a dyn Codec,
    action: Action,
    tag: &'a str,
    overwrite: bool,
    parallel: bool,
    permits: Permits,
    next_id: AtomicU64,
}

impl<'a> Walker<'a> {
    /// `tag` is appended to every directory name (`sub` becomes `sub_<tag>`).
    pub fn new(codec: &'a dyn Codec, action: Action, tag: &'a str, options: &TransformOptions) -> Self {
        Self {
            codec,
            action,
            tag,
            overwrite: options.overwrite,
            parallel: true,
            permits: Permits::new(options.max_in_flight),
            next_id: AtomicU64::new(0),
        }
    }

    /// Runs every work item in the caller, with no thread pool involved.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Processes the directory `pair.input` into `pair.output`, recursively.
    ///
    /// When called from inside a rayon pool the children run on that pool;
    /// otherwise they run on rayon's global pool.
    pub fn walk(&self, pair: PathPair) -> WorkResult {
        let dir = &pair.input;
        debug!(path = %dir.display(), stage = ?Stage::Opening);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(path = %dir.display(), stage = ?Stage::OpenFailed);
                warn!(path = %dir.display(), error = %e, "cannot open directory");
                return WorkResult::dir_failed(dir, format!("open failed: {e}"));
            }
        };

        debug!(path = %pair.output.display(), stage = ?Stage::CreatingOutputDir);
        if let Err(e) = self.create_output_dir(&pair) {
            debug!(path = %pair.output.display(), stage = ?Stage::MkdirFailed);
            warn!(path = %pair.output.display(), error = %e, "cannot create output directory");
            return WorkResult::dir_failed(dir, format!("mkdir {} failed: {e}", pair.output.display()));
        }
        info!(input = %dir.display(), output = %pair.output.display(), "processing directory");

        let mut report = TreeReport::default();

        debug!(path = %dir.display(), stage = ?Stage::Enumerating);
        let items = self.enumerate(entries, &pair, &mut report);
        let mut failed = report.failed_entries();
        let total = items.len() + failed;

        debug!(path = %dir.display(), stage = ?Stage::Dispatching, workers = items.len());
        let handles = self.fan_out(items);

        debug!(path = %dir.display(), stage = ?Stage::Awaiting);
        let results: Vec<_> = handles
            .into_iter()
            .map(|h| (h.id(), h.input().clone(), h.ran_inline(), h.join()))
            .collect();

        debug!(path = %dir.display(), stage = ?Stage::Reporting);
        for (id, input, inline, result) in results {
            match &result.outcome {
                Outcome::Success => info!(worker = id.0, path = %input.display(), "worker finished"),
                Outcome::Failed(reason) => {
                    failed += 1;
                    warn!(worker = id.0, path = %input.display(), %reason, "worker failed");
                }
                Outcome::Abnormal(reason) => {
                    failed += 1;
                    warn!(worker = id.0, path = %input.display(), %reason, "worker terminated abnormally");
                }
            }
            if inline {
                report.inline_fallbacks += 1;
            }
            report.merge(result.report);
        }

        info!(path = %dir.display(), entries = total, failed, "directory complete");
        debug!(path = %dir.display(), stage = ?Stage::Done);
        // A directory counts as ok only if its whole subtree succeeded.
        let outcome = if failed == 0 {
            report.dirs_ok += 1;
            Outcome::Success
        } else {
            report.dirs_failed += 1;
            Outcome::Failed(format!("{failed} of {total} entries failed"))
        };
        WorkResult { outcome, report }
    }

    fn create_output_dir(&self, pair: &PathPair) -> std::io::Result<()> {
        match fs::create_dir(&pair.output) {
            Err(e) if e.kind() == ErrorKind::AlreadyExists && self.overwrite && pair.output.is_dir() => Ok(()),
            other => other,
        }
    }

    /// Classifies and names every entry. Entries that cannot be read or
    /// classified are recorded in `report` and not dispatched.
    fn enumerate(&self, entries: ReadDir, pair: &PathPair, report: &mut TreeReport) -> Vec<WorkItem> {
        let mut found = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => found.push(entry.path()),
                Err(e) => {
                    report.skipped += 1;
                    report.record_failure(&pair.input, format!("unreadable directory entry: {e}"));
                }
            }
        }
        // Sorted so collision numbering does not depend on readdir order.
        found.sort();

        let mut claims = NameClaims::default();
        let mut items = Vec::with_capacity(found.len());
        for input in found {
            let base = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let (kind, name) = match classify(&input) {
                EntryKind::File => (ItemKind::File, OutputName::for_file(&base, self.action)),
                EntryKind::Directory => (ItemKind::Directory, OutputName::for_dir(&base, self.tag)),
                EntryKind::Error(reason) => {
                    warn!(path = %input.display(), %reason, "skipping entry");
                    report.skipped += 1;
                    report.record_failure(&input, reason);
                    continue;
                }
            };
            let output = pair.output.join(claims.claim(&name));
            items.push(WorkItem {
                pair: PathPair { input, output },
                kind,
            });
        }
        items
    }

    fn fan_out(&self, items: Vec<WorkItem>) -> Vec<WorkerHandle> {
        if !self.parallel {
            return items.into_iter().map(|item| self.run_inline(item)).collect();
        }
        // The scope is the join barrier: it returns once every spawned worker
        // has finished, and the waiting thread keeps executing queued work.
        rayon::in_place_scope(|scope| {
            items
                .into_iter()
                .map(|item| match self.permits.try_acquire() {
                    Some(permit) => self.spawn(scope, item, permit),
                    None => {
                        debug!(path = %item.pair.input.display(), "worker budget exhausted, running inline");
                        self.run_inline(item)
                    }
                })
                .collect()
        })
    }

    fn spawn<'s>(&'s self, scope: &rayon::Scope<'s>, item: WorkItem, permit: Permit<'s>) -> WorkerHandle {
        let id = self.next_worker_id();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let handle = WorkerHandle::new(id, item.pair.input.clone(), false, rx);
        scope.spawn(move |_| {
            let _permit = permit;
            // The receiver outlives the scope; a send cannot fail here.
            let _ = tx.send(self.execute(item));
        });
        handle
    }

    fn run_inline(&self, item: WorkItem) -> WorkerHandle {
        let id = self.next_worker_id();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let handle = WorkerHandle::new(id, item.pair.input.clone(), true, rx);
        let _ = tx.send(self.execute(item));
        handle
    }

    /// Runs one item, turning a panic into an abnormal outcome.
    fn execute(&self, item: WorkItem) -> WorkResult {
        let input = item.pair.input.clone();
        catch_unwind(AssertUnwindSafe(|| self.run_item(item)))
            .unwrap_or_else(|payload| WorkResult::abnormal(&input, worker::panic_message(payload)))
    }

    fn run_item(&self, item: WorkItem) -> WorkResult {
        match item.kind {
            ItemKind::Directory => self.walk(item.pair),
            ItemKind::File => self.transform(&item.pair),
        }
    }

    fn transform(&self, pair: &PathPair) -> WorkResult {
        match transform_file(self.codec, self.action, &pair.input, &pair.output, self.overwrite) {
            Ok(stats) => WorkResult::file_ok(stats),
            Err(e) => WorkResult::file_failed(&pair.input, e.to_string()),
        }
    }

    fn next_worker_id(&self) -> WorkerId {
        WorkerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}
