use crate::action::{Action, Algorithm};
use crate::classify::{EntryKind, classify};
use crate::codec::{self, transform_file};
use crate::crypto::key::KeyMaterial;
use crate::error::{GseaError, Result};
use crate::naming::{root_output_dir, root_output_file};
use crate::options::TransformOptions;
use crate::report::{Outcome, RunReport, TreeReport, WorkResult};
use crate::walk::{PathPair, Walker};
use std::path::PathBuf;
use tracing::{info, warn};

/// One invocation: what to transform, how, and where the result goes.
#[derive(Debug)]
pub struct RunRequest {
    pub input: PathBuf,
    /// File name for a single-file run; tag appended to every directory name
    /// for a tree run.
    pub output_name: String,
    pub action: Action,
    /// `None` picks the default for the action's category.
    pub algorithm: Option<Algorithm>,
    pub key: Option<KeyMaterial>,
    pub options: TransformOptions,
}

/// Validates the request, resolves the codec once and transforms the root.
///
/// Only configuration problems and an unclassifiable root are returned as
/// errors. Failures inside the tree are reported in the [`RunReport`].
pub fn run(req: &RunRequest) -> Result<RunReport> {
    let output_name = req.output_name.as_str();
    if output_name.is_empty() || output_name == "." || output_name == ".." {
        return Err(GseaError::config(format!("invalid output name {output_name:?}")));
    }
    if output_name.contains(['/', std::path::MAIN_SEPARATOR]) {
        return Err(GseaError::config(format!(
            "output name {output_name:?} must not contain a path separator"
        )));
    }

    let algorithm = req.algorithm.unwrap_or_else(|| Algorithm::default_for(req.action));
    let codec = codec::resolve(req.action, algorithm, req.key.as_ref())?;

    let (output, result) = match classify(&req.input) {
        EntryKind::File => {
            let output = root_output_file(&req.input, output_name);
            info!(input = %req.input.display(), output = %output.display(), %algorithm, "transforming file");
            let result = match transform_file(
                codec.as_ref(),
                req.action,
                &req.input,
                &output,
                req.options.overwrite,
            ) {
                Ok(stats) => WorkResult::file_ok(stats),
                Err(e) => {
                    warn!(path = %req.input.display(), error = %e, "transform failed");
                    WorkResult::file_failed(&req.input, e.to_string())
                }
            };
            (output, result)
        }
        EntryKind::Directory => {
            let output = root_output_dir(&req.input, output_name)?;
            let pair = PathPair {
                input: req.input.clone(),
                output: output.clone(),
            };
            let walker = Walker::new(codec.as_ref(), req.action, output_name, &req.options);
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(req.options.threads)
                .thread_name(|i| format!("gsea-worker-{i}"))
                .build();
            let result = match pool {
                Ok(pool) => pool.install(|| walker.walk(pair)),
                Err(e) => {
                    warn!(error = %e, "thread pool unavailable, running sequentially");
                    walker.sequential().walk(pair)
                }
            };
            (output, result)
        }
        EntryKind::Error(reason) => return Err(GseaError::path(&req.input, reason)),
    };

    let WorkResult { outcome, report } = result;
    log_summary(&outcome, &report);
    Ok(RunReport {
        input: req.input.clone(),
        output,
        action: req.action,
        algorithm,
        outcome,
        report,
    })
}

fn log_summary(outcome: &Outcome, report: &TreeReport) {
    let failed = report.failed_entries();
    if failed == 0 && outcome.is_success() {
        info!(
            files = report.files_ok,
            dirs = report.dirs_ok,
            bytes_in = report.bytes_in,
            bytes_out = report.bytes_out,
            "run complete"
        );
    } else {
        warn!(failed, abnormal = report.abnormal, "run finished with failures");
    }
}
