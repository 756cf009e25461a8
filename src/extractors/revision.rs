use crate::error::{PairError, Result};
use crate::tree::parser::StructuralParser;
use crate::tree::SyntaxTree;
use std::fs;
use std::path::{Path, PathBuf};

/// One side of a revision pair: the file, its full text, and its tree
#[derive(Debug, Clone)]
pub struct Revision {
    pub path: PathBuf,
    pub text: String,
    pub tree: SyntaxTree,
}

impl Revision {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>, tree: SyntaxTree) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            tree,
        }
    }

    /// Parse already-read text
    pub fn parse<P>(path: &Path, text: String, parser: &P) -> Result<Self>
    where
        P: StructuralParser + ?Sized,
    {
        let tree = parser.parse(path, &text)?;
        Ok(Self::new(path, text, tree))
    }
}

/// Read a revision file as UTF-8 text
pub fn read_revision_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| PairError::Read {
        path: path.to_path_buf(),
        source,
    })
}
