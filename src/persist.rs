//! Pair persistence
//!
//! Layout: `<root>/<output_dir>/<name>/{prev_method.<ext>, updated_method.<ext>}`.
//! Directories are created with `create_dir`, never `create_dir_all`: an
//! existing output directory or a second pair with the same name fails the
//! run, and whatever was written before the failure stays on disk.

use crate::config::RevisionLayout;
use crate::error::{PairError, Result};
use crate::extractors::MethodPair;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub struct PairPersister {
    output_dir: PathBuf,
    previous_artifact: String,
    updated_artifact: String,
}

impl PairPersister {
    pub fn new(root: &Path, layout: &RevisionLayout) -> Self {
        let (previous_artifact, updated_artifact) = layout.artifact_names();
        Self {
            output_dir: layout.output_path(root),
            previous_artifact,
            updated_artifact,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every pair; returns the pair directories in write order.
    ///
    /// An empty slice creates nothing at all.
    pub fn persist(&self, pairs: &[MethodPair]) -> Result<Vec<PathBuf>> {
        if pairs.is_empty() {
            debug!("No method pairs; not creating {}", self.output_dir.display());
            return Ok(Vec::new());
        }

        fs::create_dir(&self.output_dir).map_err(|source| PairError::OutputExists {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(pairs.len());
        for pair in pairs {
            written.push(self.persist_pair(pair)?);
        }
        debug!(
            "Wrote {} method pairs under {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }

    fn persist_pair(&self, pair: &MethodPair) -> Result<PathBuf> {
        if !is_plain_file_name(&pair.name) {
            return Err(PairError::UnsafePairName(pair.name.clone()));
        }

        let dir = self.output_dir.join(&pair.name);
        fs::create_dir(&dir).map_err(|source| match source.kind() {
            ErrorKind::AlreadyExists => PairError::OutputCollision {
                name: pair.name.clone(),
                path: dir.clone(),
            },
            _ => PairError::Write {
                path: dir.clone(),
                source,
            },
        })?;

        write_artifact(&dir.join(&self.previous_artifact), &pair.previous_text)?;
        write_artifact(&dir.join(&self.updated_artifact), &pair.updated_text)?;
        Ok(dir)
    }
}

fn write_artifact(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|source| PairError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Exactly one normal path component, no separators of either platform
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(|c: char| matches!(c, '/' | '\\' | '\0')) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
