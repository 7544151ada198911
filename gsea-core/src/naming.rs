//! Output naming. Everything here is pure: no filesystem access except in
//! [`root_output_dir`], which may canonicalize a root given as `.` or `..`.

use crate::action::Action;
use crate::error::{GseaError, IoContext, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub fn suffix(action: Action) -> &'static str {
    match action {
        Action::Compress => "Comprimido.dat",
        Action::Decompress => "_Descomprimido.desconocido",
        Action::Encrypt => "_Cifrado.enc",
        Action::Decrypt => "_Descifrado.dec",
    }
}

/// Splits at the first '.': `"a.tar.gz"` gives `("a", Some("tar.gz"))`.
pub fn split_stem(base_name: &str) -> (&str, Option<&str>) {
    match base_name.split_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (base_name, None),
    }
}

/// An output name kept as stem + tail so collisions can be resolved by
/// inserting a counter between the two.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputName {
    stem: String,
    tail: String,
}

impl OutputName {
    pub fn for_file(base_name: &str, action: Action) -> Self {
        let (stem, _ext) = split_stem(base_name);
        Self {
            stem: stem.to_string(),
            tail: suffix(action).to_string(),
        }
    }

    pub fn for_dir(base_name: &str, tag: &str) -> Self {
        Self {
            stem: base_name.to_string(),
            tail: format!("_{tag}"),
        }
    }

    pub fn render(&self) -> String {
        format!("{}{}", self.stem, self.tail)
    }

    fn render_numbered(&self, n: usize) -> String {
        format!("{}~{n}{}", self.stem, self.tail)
    }
}

pub fn derive_output_name(base_name: &str, action: Action) -> String {
    OutputName::for_file(base_name, action).render()
}

pub fn derive_dir_name(base_name: &str, tag: &str) -> String {
    OutputName::for_dir(base_name, tag).render()
}

/// Names already handed out inside one output directory.
#[derive(Default)]
pub struct NameClaims {
    taken: HashSet<String>,
}

impl NameClaims {
    /// Returns the plain name if free, otherwise the first free `stem~N tail`.
    pub fn claim(&mut self, name: &OutputName) -> String {
        let mut candidate = name.render();
        let mut n = 0;
        while self.taken.contains(&candidate) {
            n += 1;
            candidate = name.render_numbered(n);
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

fn named_root(path: &Path) -> Result<(PathBuf, String)> {
    let resolved = match path.file_name() {
        Some(_) => path.to_path_buf(),
        None => path.canonicalize().at(path)?,
    };
    let name = resolved
        .file_name()
        .ok_or_else(|| GseaError::path(path, "path has no final component to rename"))?
        .to_string_lossy()
        .into_owned();
    let parent = resolved.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((parent, name))
}

/// Output root for a directory run: `<parent>/<name>_<tag>`, a sibling of
/// the input directory.
pub fn root_output_dir(input_dir: &Path, tag: &str) -> Result<PathBuf> {
    let (parent, name) = named_root(input_dir)?;
    Ok(parent.join(derive_dir_name(&name, tag)))
}

/// Output path for a single-file run: `output_name` placed beside the input.
pub fn root_output_file(input_file: &Path, output_name: &str) -> PathBuf {
    match input_file.parent() {
        Some(parent) => parent.join(output_name),
        None => PathBuf::from(output_name),
    }
}
