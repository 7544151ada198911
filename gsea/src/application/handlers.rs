use std::fmt::Write as _;

use gsea_core::error::Result;
use gsea_core::{Action, Category, KeyMaterial, RunReport, RunRequest, TransformOptions, run};
use tracing::{error, warn};

use crate::presentation::cli::Cli;

fn key_from_args(key: Option<String>, key_hex: Option<String>) -> Result<Option<KeyMaterial>> {
    match (key_hex, key) {
        (Some(hex), _) => KeyMaterial::from_hex(&hex).map(Some),
        (None, Some(pass)) => KeyMaterial::from_passphrase(&pass).map(Some),
        (None, None) => Ok(None),
    }
}

pub fn handle_transform(action: Action, cli: Cli) -> Result<bool> {
    let key = key_from_args(cli.key, cli.key_hex)?;
    if key.is_some() && action.category() == Category::Compression {
        warn!("a key was given but {action} does not use one; ignoring it");
    }

    let request = RunRequest {
        input: cli.input,
        output_name: cli.output,
        action,
        algorithm: cli.comp_alg.or(cli.enc_alg),
        key,
        options: TransformOptions {
            threads: cli.threads,
            max_in_flight: cli.max_in_flight,
            overwrite: cli.overwrite,
        },
    };

    let report = run(&request)?;
    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "cannot encode report as JSON");
                return Ok(false);
            }
        }
    } else {
        print!("{}", summary(&report));
    }
    Ok(report.is_success())
}

/// Human-readable run summary, one fact per line.
pub fn summary(r: &RunReport) -> String {
    let t = &r.report;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}): {} -> {}",
        r.action,
        r.algorithm,
        r.input.display(),
        r.output.display()
    );
    let _ = writeln!(out, "files:       {} ok, {} failed", t.files_ok, t.files_failed);
    let _ = writeln!(out, "directories: {} ok, {} failed", t.dirs_ok, t.dirs_failed);
    if t.skipped > 0 || t.abnormal > 0 {
        let _ = writeln!(out, "skipped:     {}, abnormal: {}", t.skipped, t.abnormal);
    }
    if t.inline_fallbacks > 0 {
        let _ = writeln!(out, "inline:      {}", t.inline_fallbacks);
    }
    let _ = writeln!(out, "bytes:       {} -> {}", t.bytes_in, t.bytes_out);
    for f in &t.failures {
        let kind = if f.abnormal { "ABNORMAL" } else { "FAILED" };
        let _ = writeln!(out, "{kind} {}: {}", f.path.display(), f.reason);
    }
    if r.is_success() {
        let _ = writeln!(out, "status: ok");
    } else {
        let _ = writeln!(out, "status: {} failed entries", t.failed_entries());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsea_core::{Algorithm, Outcome, TreeReport};
    use std::path::PathBuf;

    fn report(failures: bool) -> RunReport {
        let mut t = TreeReport {
            files_ok: 2,
            dirs_ok: 1,
            bytes_in: 10,
            bytes_out: 6,
            ..Default::default()
        };
        let outcome = if failures {
            t.files_failed = 1;
            t.record_failure(&PathBuf::from("docs/bad"), "corrupt input");
            Outcome::Failed("1 of 3 entries failed".into())
        } else {
            Outcome::Success
        };
        RunReport {
            input: PathBuf::from("docs"),
            output: PathBuf::from("docs_out"),
            action: Action::Compress,
            algorithm: Algorithm::Rle,
            outcome,
            report: t,
        }
    }

    #[test]
    fn summary_of_clean_run() {
        let s = summary(&report(false));
        assert!(s.starts_with("compress (rle): docs -> docs_out\n"));
        assert!(s.contains("files:       2 ok, 0 failed"));
        assert!(s.ends_with("status: ok\n"));
    }

    #[test]
    fn summary_lists_failures() {
        let s = summary(&report(true));
        assert!(s.contains("FAILED docs/bad: corrupt input"));
        assert!(s.ends_with("status: 1 failed entries\n"));
    }

    #[test]
    fn hex_key_wins_over_passphrase() {
        let key = key_from_args(Some("pass".into()), Some("0a0b".into())).unwrap().unwrap();
        assert_eq!(key.as_bytes(), &[0x0a, 0x0b]);
        assert!(key_from_args(None, None).unwrap().is_none());
        assert!(key_from_args(Some(String::new()), None).is_err());
    }
}
