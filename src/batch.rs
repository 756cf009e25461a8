//! Corpus runner
//!
//! A dataset is a directory tree with one root per change (for Defects4J-style
//! corpora, one per bug). Roots are discovered by their previous revision file
//! and processed in parallel; each root runs the ordinary sequential pipeline.

use crate::config::RevisionLayout;
use crate::error::{PairError, Result};
use crate::extractors::{ExtractionReport, PairExtractor};
use crate::matching::TreeMatcher;
use crate::tree::parser::StructuralParser;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result for one root: a report, or the error that stopped it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootOutcome {
    pub root: PathBuf,
    pub report: Option<ExtractionReport>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub dataset: PathBuf,
    pub roots: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pairs: usize,
    pub diagnostics: usize,
    /// In discovery order
    pub results: Vec<RootOutcome>,
}

/// Every directory under `dataset` (itself included) that holds both revision files
pub fn discover_roots(dataset: &Path, layout: &RevisionLayout) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/{}",
        glob::Pattern::escape(&dataset.to_string_lossy()),
        glob::Pattern::escape(&layout.previous_file)
    );

    let entries =
        glob::glob(&pattern).map_err(|e| PairError::Discovery(format!("{}: {}", pattern, e)))?;

    let mut roots = Vec::new();
    for entry in entries {
        let previous = entry.map_err(|e| PairError::Discovery(e.to_string()))?;
        let Some(root) = previous.parent() else {
            continue;
        };
        if layout.updated_path(root).is_file() {
            roots.push(root.to_path_buf());
        } else {
            debug!(
                "Skipping {}: no {} next to {}",
                root.display(),
                layout.updated_file,
                layout.previous_file
            );
        }
    }
    roots.sort();
    roots.dedup();
    Ok(roots)
}

/// Run `extractor` on every root of `dataset`
///
/// Failures are recorded per root; only discovery errors fail the whole call.
pub fn run_corpus<P, M>(extractor: &PairExtractor<P, M>, dataset: &Path) -> Result<CorpusSummary>
where
    P: StructuralParser + Sync,
    M: TreeMatcher + Sync,
{
    let roots = discover_roots(dataset, &extractor.config().layout)?;
    info!("Discovered {} roots under {}", roots.len(), dataset.display());

    let results: Vec<RootOutcome> = roots
        .par_iter()
        .map(|root| match extractor.run(root) {
            Ok(report) => RootOutcome {
                root: root.clone(),
                report: Some(report),
                error: None,
            },
            Err(e) => {
                warn!("Failed to extract method pairs from {}: {}", root.display(), e);
                RootOutcome {
                    root: root.clone(),
                    report: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    let reports = results.iter().filter_map(|r| r.report.as_ref());
    let succeeded = reports.clone().count();
    let pairs = reports.clone().map(|r| r.pairs.len()).sum();
    let diagnostics = reports.map(|r| r.diagnostics.len()).sum();

    Ok(CorpusSummary {
        dataset: dataset.to_path_buf(),
        roots: results.len(),
        succeeded,
        failed: results.len() - succeeded,
        pairs,
        diagnostics,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_root(dir: &Path, previous: Option<&str>, updated: Option<&str>) {
        fs::create_dir_all(dir).unwrap();
        if let Some(text) = previous {
            fs::write(dir.join("prev.java"), text).unwrap();
        }
        if let Some(text) = updated {
            fs::write(dir.join("updated.java"), text).unwrap();
        }
    }

    #[test]
    fn test_discovery_requires_both_revisions() {
        let temp_dir = TempDir::new().unwrap();
        let dataset = temp_dir.path();
        write_root(&dataset.join("Lang/1"), Some("class A {}"), Some("class A {}"));
        write_root(&dataset.join("Lang/2"), Some("class A {}"), None);
        write_root(&dataset.join("Math/10"), Some("class A {}"), Some("class A {}"));
        write_root(&dataset.join("Math/11"), None, Some("class A {}"));

        let roots = discover_roots(dataset, &RevisionLayout::default()).unwrap();

        assert_eq!(roots, vec![dataset.join("Lang/1"), dataset.join("Math/10")]);
    }

    #[test]
    fn test_dataset_itself_can_be_a_root() {
        let temp_dir = TempDir::new().unwrap();
        write_root(temp_dir.path(), Some("class A {}"), Some("class A {}"));

        let roots = discover_roots(temp_dir.path(), &RevisionLayout::default()).unwrap();

        assert_eq!(roots, vec![temp_dir.path().to_path_buf()]);
    }

    #[test]
    fn test_failing_root_does_not_stop_siblings() {
        let temp_dir = TempDir::new().unwrap();
        let dataset = temp_dir.path();
        write_root(
            &dataset.join("bug-1"),
            Some("class A {\n  void run() { a(); }\n}\n"),
            Some("class A {\n  void run() { a(); b(); }\n}\n"),
        );
        write_root(
            &dataset.join("bug-2"),
            Some("class A {\n  void run() { a(); }\n}\n"),
            Some("class A {\n  void run( { a(); \n"),
        );
        write_root(
            &dataset.join("bug-3"),
            Some("class B {\n  int get() { return 1; }\n}\n"),
            Some("class B {\n  int get() { return 2; }\n}\n"),
        );

        let summary = run_corpus(&PairExtractor::default(), dataset).unwrap();

        assert_eq!(summary.roots, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pairs, 2);
        assert!(summary.results[1].error.is_some());
        assert!(summary.results[1].report.is_none());
        assert!(dataset.join("bug-1/method_pairs/run").is_dir());
        assert!(dataset.join("bug-3/method_pairs/get").is_dir());
        assert!(!dataset.join("bug-2/method_pairs").exists());
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let temp_dir = TempDir::new().unwrap();
        let summary = run_corpus(&PairExtractor::default(), temp_dir.path()).unwrap();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["roots"], 0);
        assert_eq!(json["results"], serde_json::json!([]));
    }
}
