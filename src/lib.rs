// Method Pairs - correspondence-driven extraction of before/after method text
//
// Parses two revisions of a source file into structural trees, aligns them with
// a tree matcher, and writes the previous and updated text of every method
// declaration the alignment pairs up.

pub mod batch;
pub mod config;
pub mod error;
pub mod extractors;
pub mod language;
pub mod matching;
pub mod persist;
pub mod tree;
pub mod utils;

// PyO3 bindings layer
#[cfg(feature = "python")]
mod bindings;

pub use batch::{discover_roots, run_corpus, CorpusSummary, RootOutcome};
pub use config::{ExtractionConfig, RevisionLayout};
pub use error::{PairError, Result};
pub use extractors::{
    Diagnostic, DiagnosticKind, Extraction, ExtractionReport, MethodPair, PairExtractor,
    PairRecord, Span,
};
pub use language::{detect_language_from_extension, supported_languages};
pub use matching::{Correspondence, GreedyMatcher, MappingStore, MatcherConfig, TreeMatcher};
pub use persist::PairPersister;
pub use tree::parser::{StructuralParser, TreeSitterParser};
pub use tree::{NodeCategory, NodeId, SyntaxNode, SyntaxTree};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Method Pairs Python module
///
/// Exposes single-root and corpus extraction to Python callers.
#[cfg(feature = "python")]
#[pymodule]
fn method_pairs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    m.add_function(wrap_pyfunction!(bindings::extract_method_pairs, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::extract_corpus, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::supported_languages, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::hash_content, m)?)?;

    Ok(())
}
