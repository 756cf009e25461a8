// Error types for method pair extraction
//
// Name-resolution anomalies are NOT errors: they surface as diagnostics on the
// extraction result. Everything here aborts the run for the current root.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PairError>;

#[derive(Debug, Error)]
pub enum PairError {
    #[error("failed to read revision file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported language for {path}: {reason}")]
    UnsupportedLanguage { path: PathBuf, reason: String },

    #[error("failed to set parser language for {language}: {reason}")]
    ParserSetup { language: String, reason: String },

    #[error("tree-sitter produced no tree for {path}")]
    Parse { path: PathBuf },

    #[error("syntax error in {path} at line {line}, column {column}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("malformed syntax tree: {0}")]
    MalformedTree(String),

    #[error("tree matching failed: {0}")]
    Matcher(String),

    #[error("node span {start}..{end} is not a valid slice of a {len}-byte text")]
    InvalidSpan { start: usize, end: usize, len: usize },

    #[error("output directory {path} could not be created: {source}")]
    OutputExists {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("method pair '{name}' collides with an existing directory at {path}")]
    OutputCollision { name: String, path: PathBuf },

    #[error("method name '{0}' is not usable as a directory name")]
    UnsafePairName(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("failed to discover revision roots: {0}")]
    Discovery(String),
}
