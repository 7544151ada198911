use super::Codec;
use crate::action::Action;
use crate::error::{CodecContext, GseaError, IoContext, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Byte counts for one transformed file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Reads `input` whole, runs the codec, and writes `output`.
///
/// The result is staged in a temporary file next to `output` and only
/// persisted once fully written, so a failure leaves no output file behind.
/// Unless `overwrite` is set an existing `output` is an error.
pub fn transform_file(
    codec: &dyn Codec,
    action: Action,
    input: &Path,
    output: &Path,
    overwrite: bool,
) -> Result<FileStats> {
    let data = fs::read(input).at(input)?;
    let transformed = codec.apply(action, &data).at(input)?;

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(parent).at(parent)?;
    staged.write_all(&transformed).at(staged.path())?;
    staged.as_file().sync_all().at(staged.path())?;

    let persisted = if overwrite {
        staged.persist(output)
    } else {
        staged.persist_noclobber(output)
    };
    persisted.map_err(|e| GseaError::Io {
        path: output.to_path_buf(),
        source: e.error,
    })?;

    Ok(FileStats {
        bytes_in: data.len() as u64,
        bytes_out: transformed.len() as u64,
    })
}
