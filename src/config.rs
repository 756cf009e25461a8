//! Extraction configuration
//!
//! Everything has a default matching the Defects4J-style layout
//! (`prev.java`, `updated.java`, `method_pairs/`). A JSON file can override any
//! subset of fields; CLI flags override the file.

use crate::error::{PairError, Result};
use crate::matching::MatcherConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names inside one root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionLayout {
    pub previous_file: String,
    pub updated_file: String,
    /// Directory created under the root when at least one pair is found
    pub output_dir: String,
    /// Artifact stem for previous method text; the revision extension is appended
    pub previous_artifact: String,
    pub updated_artifact: String,
}

impl Default for RevisionLayout {
    fn default() -> Self {
        Self::for_extension("java")
    }
}

impl RevisionLayout {
    /// `prev.<ext>` / `updated.<ext>` with the default output names
    pub fn for_extension(extension: &str) -> Self {
        Self {
            previous_file: with_extension("prev", extension),
            updated_file: with_extension("updated", extension),
            output_dir: "method_pairs".to_string(),
            previous_artifact: "prev_method".to_string(),
            updated_artifact: "updated_method".to_string(),
        }
    }

    pub fn previous_path(&self, root: &Path) -> PathBuf {
        root.join(&self.previous_file)
    }

    pub fn updated_path(&self, root: &Path) -> PathBuf {
        root.join(&self.updated_file)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    /// Extension of the revision files, if any
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.previous_file)
            .extension()
            .and_then(|ext| ext.to_str())
    }

    /// `(previous, updated)` artifact file names, e.g. `prev_method.java`
    pub fn artifact_names(&self) -> (String, String) {
        let extension = self.extension().unwrap_or("");
        (
            with_extension(&self.previous_artifact, extension),
            with_extension(&self.updated_artifact, extension),
        )
    }
}

fn with_extension(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, extension)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub layout: RevisionLayout,
    pub matcher: MatcherConfig,
    /// Force a grammar instead of detecting it from the file extension
    pub language: Option<String>,
    /// Drop pairs whose previous and updated text are byte-identical
    pub skip_unchanged: bool,
    /// Keep going when a revision parses with ERROR/MISSING nodes
    pub allow_syntax_errors: bool,
}

impl ExtractionConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PairError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| PairError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout_matches_java_corpus() {
        let layout = RevisionLayout::default();
        let root = Path::new("/data/bug-1");

        assert_eq!(layout.previous_path(root), root.join("prev.java"));
        assert_eq!(layout.updated_path(root), root.join("updated.java"));
        assert_eq!(layout.output_path(root), root.join("method_pairs"));
        assert_eq!(
            layout.artifact_names(),
            ("prev_method.java".to_string(), "updated_method.java".to_string())
        );
    }

    #[test]
    fn test_extensionless_layout() {
        let layout = RevisionLayout {
            previous_file: "prev".to_string(),
            updated_file: "updated".to_string(),
            ..RevisionLayout::default()
        };
        assert_eq!(layout.extension(), None);
        assert_eq!(
            layout.artifact_names(),
            ("prev_method".to_string(), "updated_method".to_string())
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "skip_unchanged": true, "layout": { "previous_file": "prev.py", "updated_file": "updated.py" }, "matcher": { "min_dice": 0.6 } }"#,
        )
        .unwrap();

        let config = ExtractionConfig::from_json_file(&path).unwrap();

        assert!(config.skip_unchanged);
        assert!(!config.allow_syntax_errors);
        assert_eq!(config.layout.previous_file, "prev.py");
        assert_eq!(config.layout.output_dir, "method_pairs");
        assert_eq!(config.matcher.min_dice, 0.6);
        assert_eq!(config.matcher.min_height, 2);
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ExtractionConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, PairError::Config { .. }));
    }
}
