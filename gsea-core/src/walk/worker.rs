use crate::report::WorkResult;
use crossbeam_channel::Receiver;
use std::any::Any;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// (input, output) for one entry. The output is always derived, never
/// supplied, below the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPair {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Directory,
}

/// One directory entry's unit of work, owned by the worker it is sent to.
#[derive(Clone, Debug)]
pub struct WorkItem {
    pub pair: PathPair,
    pub kind: ItemKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u64);

/// A spawned (or inline-executed) worker and the write-once channel its
/// result arrives on.
pub struct WorkerHandle {
    id: WorkerId,
    input: PathBuf,
    inline: bool,
    rx: Receiver<WorkResult>,
}

impl WorkerHandle {
    pub(crate) fn new(id: WorkerId, input: PathBuf, inline: bool, rx: Receiver<WorkResult>) -> Self {
        Self { id, input, inline, rx }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn input(&self) -> &PathBuf {
        &self.input
    }

    pub fn ran_inline(&self) -> bool {
        self.inline
    }

    /// Waits for the worker's result. A worker that dropped its sender
    /// without reporting is treated as having terminated abnormally.
    pub fn join(self) -> WorkResult {
        match self.rx.recv() {
            Ok(result) => result,
            Err(_) => WorkResult::abnormal(&self.input, "worker exited without reporting".into()),
        }
    }
}

/// Counting limiter for in-flight workers.
pub struct Permits {
    limit: usize,
    in_flight: AtomicUsize,
}

impl Permits {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < self.limit).then_some(n + 1))
            .ok()
            .map(|_| Permit { permits: self })
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Released on drop, including when the worker holding it panics.
pub struct Permit<'a> {
    permits: &'a Permits,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.permits.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
