// API Functions - PyO3-exposed functions for Python
//
// Reports cross the boundary as JSON strings; Python callers json.loads them.

use crate::batch::run_corpus;
use crate::config::{ExtractionConfig, RevisionLayout};
use crate::extractors::PairExtractor;
use crate::language;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::path::Path;

fn extractor_for(extension: Option<&str>) -> PairExtractor {
    let layout = match extension {
        Some(extension) => RevisionLayout::for_extension(extension.trim_start_matches('.')),
        None => RevisionLayout::default(),
    };
    PairExtractor::new(ExtractionConfig {
        layout,
        ..ExtractionConfig::default()
    })
}

/// Extract and persist the method pairs of one root
///
/// Args:
///     root (str): Directory holding prev.<ext> and updated.<ext>
///     extension (str | None): Revision file extension, "java" if omitted
///
/// Returns:
///     str: JSON extraction report (pairs, written directories, diagnostics)
///
/// Raises:
///     ValueError: If reading, parsing, matching or writing fails
#[pyfunction]
#[pyo3(signature = (root, extension=None))]
pub fn extract_method_pairs(py: Python<'_>, root: &str, extension: Option<&str>) -> PyResult<String> {
    let extractor = extractor_for(extension);
    let root = Path::new(root);

    // Release GIL while parsing and writing
    let report = py
        .detach(|| extractor.run(root))
        .map_err(|e| PyValueError::new_err(format!("Extraction failed: {}", e)))?;

    serde_json::to_string(&report)
        .map_err(|e| PyValueError::new_err(format!("Report serialization failed: {}", e)))
}

/// Extract method pairs from every root under a dataset directory, in parallel
///
/// Per-root failures are recorded in the summary instead of raising.
///
/// Returns:
///     str: JSON corpus summary
#[pyfunction]
#[pyo3(signature = (dataset, extension=None))]
pub fn extract_corpus(py: Python<'_>, dataset: &str, extension: Option<&str>) -> PyResult<String> {
    let extractor = extractor_for(extension);
    let dataset = Path::new(dataset);

    let summary = py
        .detach(|| run_corpus(&extractor, dataset))
        .map_err(|e| PyValueError::new_err(format!("Corpus extraction failed: {}", e)))?;

    serde_json::to_string(&summary)
        .map_err(|e| PyValueError::new_err(format!("Summary serialization failed: {}", e)))
}

/// Get list of languages with method extraction support
#[pyfunction]
pub fn supported_languages() -> PyResult<Vec<String>> {
    Ok(language::supported_languages()
        .iter()
        .map(|&s| s.to_string())
        .collect())
}

/// blake3 hex digest, the same one extraction reports use for artifacts
#[pyfunction]
pub fn hash_content(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}
