//! Method pair extraction
//!
//! Pipeline for one root: read both revisions, parse them into structural
//! trees, match the trees, walk the correspondence for method declarations,
//! and cut each corresponding declaration out of its source text.

pub mod diagnostics;
pub mod manager;
pub mod method_pair;
pub mod revision;
pub mod walker;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Side};
pub use manager::{Extraction, ExtractionReport, PairExtractor, PairRecord};
pub use method_pair::{
    extract_pair, node_text, resolve_method_name, MethodPair, NameResolution, Span,
    MISSING_NAME_PREFIX,
};
pub use revision::{read_revision_text, Revision};
pub use walker::{corresponding_methods, CandidatePair};
