//! Structured, non-fatal anomaly records
//!
//! Every diagnostic is also emitted as a `tracing` warning, but callers (and
//! tests) read them from the extraction result rather than from log output.

use crate::tree::NodeId;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A method declaration had no simple-name child; a name was synthesized
    MissingName,
    /// More than one simple-name child; the first was taken
    AmbiguousName,
    /// The two revisions of a pair resolved to different names
    NameMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Node in the previous tree the anomaly concerns, if any
    pub previous_node: Option<NodeId>,
    /// Node in the updated tree the anomaly concerns, if any
    pub updated_node: Option<NodeId>,
}

/// Which revision a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Previous,
    Updated,
}

impl Side {
    fn describe(self) -> &'static str {
        match self {
            Side::Previous => "previous",
            Side::Updated => "updated",
        }
    }
}

/// Collector handed through one extraction run
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing_name(&mut self, side: Side, node: NodeId, synthesized: &str) {
        self.report(
            DiagnosticKind::MissingName,
            format!(
                "No method name found for {} node {}; using '{}'",
                side.describe(),
                node,
                synthesized
            ),
            side,
            node,
        );
    }

    pub fn ambiguous_name(&mut self, side: Side, node: NodeId, candidates: &[String]) {
        self.report(
            DiagnosticKind::AmbiguousName,
            format!(
                "More than one method name found for {} node {}: {}; taking '{}'",
                side.describe(),
                node,
                candidates.join(", "),
                candidates.first().map(String::as_str).unwrap_or_default()
            ),
            side,
            node,
        );
    }

    pub fn name_mismatch(
        &mut self,
        previous: NodeId,
        previous_name: &str,
        updated: NodeId,
        updated_name: &str,
    ) {
        let message = format!(
            "Method name '{}' in previous code does not equal '{}' in updated code",
            previous_name, updated_name
        );
        warn!("{}", message);
        self.records.push(Diagnostic {
            kind: DiagnosticKind::NameMismatch,
            message,
            previous_node: Some(previous),
            updated_node: Some(updated),
        });
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn report(&mut self, kind: DiagnosticKind, message: String, side: Side, node: NodeId) {
        warn!("{}", message);
        let (previous_node, updated_node) = match side {
            Side::Previous => (Some(node), None),
            Side::Updated => (None, Some(node)),
        };
        self.records.push(Diagnostic {
            kind,
            message,
            previous_node,
            updated_node,
        });
    }
}
