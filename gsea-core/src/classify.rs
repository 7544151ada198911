use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Anything else, or a failed metadata query. Carries the reason.
    Error(String),
}

/// Classifies `path` with a single, uncached metadata query. Symlinks are
/// not followed and count as errors, like sockets, FIFOs and devices.
pub fn classify(path: &Path) -> EntryKind {
    match fs::symlink_metadata(path) {
        Ok(md) => {
            let ft = md.file_type();
            if ft.is_file() {
                EntryKind::File
            } else if ft.is_dir() {
                EntryKind::Directory
            } else if ft.is_symlink() {
                EntryKind::Error("symbolic links are not transformed".into())
            } else {
                EntryKind::Error("not a regular file or directory".into())
            }
        }
        Err(e) => EntryKind::Error(e.to_string()),
    }
}
