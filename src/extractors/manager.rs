//! PairExtractor - Public API for method pair extraction
//!
//! Owns a structural parser, a tree matcher and the extraction config, and runs
//! the single-root pipeline: read, parse, match, walk, extract, and (for `run`)
//! persist.

use super::diagnostics::{Diagnostic, Diagnostics};
use super::method_pair::{extract_pair, node_text, MethodPair, Span};
use super::revision::{read_revision_text, Revision};
use super::walker::corresponding_methods;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::matching::{GreedyMatcher, TreeMatcher};
use crate::persist::PairPersister;
use crate::tree::parser::{StructuralParser, TreeSitterParser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pairs found in one root, plus the non-fatal anomalies met on the way
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    pub pairs: Vec<MethodPair>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One persisted pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    pub name: String,
    pub directory: PathBuf,
    pub previous_span: Span,
    pub updated_span: Span,
    /// blake3 hex digest of the previous artifact
    pub previous_hash: String,
    /// blake3 hex digest of the updated artifact
    pub updated_hash: String,
    pub unchanged: bool,
}

/// What `run` did for one root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub root: PathBuf,
    /// `None` when no pair was found and nothing was created
    pub output_dir: Option<PathBuf>,
    pub pairs: Vec<PairRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct PairExtractor<P = TreeSitterParser, M = GreedyMatcher> {
    parser: P,
    matcher: M,
    config: ExtractionConfig,
}

impl Default for PairExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl PairExtractor {
    /// tree-sitter parser and greedy matcher, both configured from `config`
    pub fn new(config: ExtractionConfig) -> Self {
        let mut parser = TreeSitterParser::new().allow_syntax_errors(config.allow_syntax_errors);
        if let Some(language) = &config.language {
            parser = parser.with_language(language.clone());
        }
        let matcher = GreedyMatcher::new(config.matcher.clone());
        Self::with_components(parser, matcher, config)
    }
}

impl<P, M> PairExtractor<P, M>
where
    P: StructuralParser,
    M: TreeMatcher,
{
    pub fn with_components(parser: P, matcher: M, config: ExtractionConfig) -> Self {
        Self {
            parser,
            matcher,
            config,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract the method pairs of one root without writing anything
    pub fn extract(&self, root: &Path) -> Result<Extraction> {
        let layout = &self.config.layout;
        let previous_path = layout.previous_path(root);
        let updated_path = layout.updated_path(root);

        // Both reads happen before any parsing
        let previous_text = read_revision_text(&previous_path)?;
        let updated_text = read_revision_text(&updated_path)?;

        let previous = Revision::parse(&previous_path, previous_text, &self.parser)?;
        let updated = Revision::parse(&updated_path, updated_text, &self.parser)?;
        debug!(
            "Parsed {} ({} nodes) and {} ({} nodes)",
            previous.path.display(),
            previous.tree.len(),
            updated.path.display(),
            updated.tree.len()
        );

        self.extract_revisions(&previous, &updated)
    }

    /// Match two already-parsed revisions and cut out corresponding methods
    pub fn extract_revisions(&self, previous: &Revision, updated: &Revision) -> Result<Extraction> {
        let store = self.matcher.match_trees(&previous.tree, &updated.tree)?;
        let candidates = corresponding_methods(&previous.tree, &updated.tree, &store);
        debug!("Found {} corresponding method declarations", candidates.len());

        let mut diagnostics = Diagnostics::new();
        let mut pairs = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            // Dropped before name resolution so skipped pairs leave no diagnostics
            if self.config.skip_unchanged {
                let (previous_text, _) =
                    node_text(&previous.text, &previous.tree, candidate.previous)?;
                let (updated_text, _) =
                    node_text(&updated.text, &updated.tree, candidate.updated)?;
                if previous_text == updated_text {
                    debug!("Skipping unchanged method at node {}", candidate.previous);
                    continue;
                }
            }
            pairs.push(extract_pair(candidate, previous, updated, &mut diagnostics)?);
        }

        Ok(Extraction {
            pairs,
            diagnostics: diagnostics.into_records(),
        })
    }

    /// Extract and persist under `<root>/<output_dir>`
    pub fn run(&self, root: &Path) -> Result<ExtractionReport> {
        let extraction = self.extract(root)?;
        let persister = PairPersister::new(root, &self.config.layout);
        let directories = persister.persist(&extraction.pairs)?;

        let pairs: Vec<PairRecord> = extraction
            .pairs
            .iter()
            .zip(directories)
            .map(|(pair, directory)| PairRecord {
                name: pair.name.clone(),
                directory,
                previous_span: pair.previous_span,
                updated_span: pair.updated_span,
                previous_hash: hash_content(&pair.previous_text),
                updated_hash: hash_content(&pair.updated_text),
                unchanged: pair.is_unchanged(),
            })
            .collect();

        info!(
            "{}: {} method pairs, {} diagnostics",
            root.display(),
            pairs.len(),
            extraction.diagnostics.len()
        );

        Ok(ExtractionReport {
            root: root.to_path_buf(),
            output_dir: (!pairs.is_empty()).then(|| persister.output_dir().to_path_buf()),
            pairs,
            diagnostics: extraction.diagnostics,
        })
    }
}

fn hash_content(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}
