//! Span & name extraction
//!
//! Turns a [`CandidatePair`] into a [`MethodPair`]: the exact source text of
//! both declarations plus one identifying name. Name anomalies degrade to a
//! diagnostic and a best-effort name; only a span that does not fit the source
//! text is an error, since that breaks the parser contract.

use super::diagnostics::{Diagnostics, Side};
use super::revision::Revision;
use super::walker::CandidatePair;
use crate::error::{PairError, Result};
use crate::tree::{NodeCategory, NodeId, SyntaxTree};
use serde::{Deserialize, Serialize};

/// Prefix of names synthesized for declarations without a simple name
pub const MISSING_NAME_PREFIX: &str = "NoMethodNameFound_";

/// Half-open byte range into a revision's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Before/after text of one corresponding method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodPair {
    /// Resolved from the previous revision
    pub name: String,
    pub previous_text: String,
    pub updated_text: String,
    pub previous_span: Span,
    pub updated_span: Span,
}

impl MethodPair {
    pub fn is_unchanged(&self) -> bool {
        self.previous_text == self.updated_text
    }
}

/// Outcome of looking for a declaration's name among its direct children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution {
    Unique(String),
    /// Several simple names; the first (in child order) wins
    Ambiguous(Vec<String>),
    /// No simple name; the name is synthesized from the node id
    Missing(String),
}

impl NameResolution {
    pub fn name(&self) -> &str {
        match self {
            NameResolution::Unique(name) | NameResolution::Missing(name) => name,
            NameResolution::Ambiguous(candidates) => candidates.first().map_or("", String::as_str),
        }
    }
}

/// Collect the labels of `method`'s direct simple-name children
pub fn resolve_method_name(tree: &SyntaxTree, method: NodeId) -> NameResolution {
    let mut names: Vec<String> = tree
        .node(method)
        .children
        .iter()
        .map(|child| tree.node(*child))
        .filter(|child| child.category == NodeCategory::SimpleName)
        .filter_map(|child| child.label.clone())
        .collect();

    match names.len() {
        0 => NameResolution::Missing(format!("{}{}", MISSING_NAME_PREFIX, method)),
        1 => NameResolution::Unique(names.remove(0)),
        _ => NameResolution::Ambiguous(names),
    }
}

/// Exact text of a node, verbatim
pub fn node_text<'t>(text: &'t str, tree: &SyntaxTree, id: NodeId) -> Result<(&'t str, Span)> {
    let node = tree.node(id);
    let span = Span {
        start: node.start_byte,
        end: node.end_byte,
    };
    let slice = text.get(span.start..span.end).ok_or(PairError::InvalidSpan {
        start: span.start,
        end: span.end,
        len: text.len(),
    })?;
    Ok((slice, span))
}

/// Build the [`MethodPair`] for one candidate, recording name anomalies
pub fn extract_pair(
    candidate: CandidatePair,
    previous: &Revision,
    updated: &Revision,
    diagnostics: &mut Diagnostics,
) -> Result<MethodPair> {
    let (previous_text, previous_span) =
        node_text(&previous.text, &previous.tree, candidate.previous)?;
    let (updated_text, updated_span) = node_text(&updated.text, &updated.tree, candidate.updated)?;

    let name = reported_name(&previous.tree, candidate.previous, Side::Previous, diagnostics);
    let updated_name = reported_name(&updated.tree, candidate.updated, Side::Updated, diagnostics);
    if updated_name != name {
        diagnostics.name_mismatch(candidate.previous, &name, candidate.updated, &updated_name);
    }

    Ok(MethodPair {
        name,
        previous_text: previous_text.to_string(),
        updated_text: updated_text.to_string(),
        previous_span,
        updated_span,
    })
}

fn reported_name(
    tree: &SyntaxTree,
    method: NodeId,
    side: Side,
    diagnostics: &mut Diagnostics,
) -> String {
    let resolution = resolve_method_name(tree, method);
    match &resolution {
        NameResolution::Unique(_) => {}
        NameResolution::Ambiguous(candidates) => diagnostics.ambiguous_name(side, method, candidates),
        NameResolution::Missing(synthesized) => diagnostics.missing_name(side, method, synthesized),
    }
    resolution.name().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::diagnostics::DiagnosticKind;
    use crate::tree::TreeBuilder;

    /// A one-method tree over `text` whose declaration has the given simple names
    fn method_tree(text: &str, names: &[&str]) -> (SyntaxTree, NodeId) {
        let mut b = TreeBuilder::new();
        b.open("program", NodeCategory::Other, 0, text.len());
        let method = b.open(
            "method_declaration",
            NodeCategory::MethodDeclaration,
            0,
            text.len(),
        );
        b.leaf("void_type", NodeCategory::Other, 0, 4, "void");
        for name in names {
            b.leaf("identifier", NodeCategory::SimpleName, 5, 5 + name.len(), *name);
        }
        b.close();
        b.close();
        (b.finish().unwrap(), method)
    }

    fn revision(text: &str, names: &[&str]) -> (Revision, NodeId) {
        let (tree, method) = method_tree(text, names);
        (Revision::new("A.java", text, tree), method)
    }

    #[test]
    fn test_single_name_resolves() {
        let (tree, method) = method_tree("void foo() {}", &["foo"]);
        assert_eq!(
            resolve_method_name(&tree, method),
            NameResolution::Unique("foo".to_string())
        );
    }

    #[test]
    fn test_missing_name_is_synthesized_from_node_id() {
        let (tree, method) = method_tree("void () {}", &[]);
        let resolution = resolve_method_name(&tree, method);
        assert_eq!(resolution.name(), "NoMethodNameFound_1");
        assert!(matches!(resolution, NameResolution::Missing(_)));
    }

    #[test]
    fn test_first_of_several_names_wins() {
        let (tree, method) = method_tree("void a b() {}", &["a", "b"]);
        let resolution = resolve_method_name(&tree, method);
        assert_eq!(resolution.name(), "a");
        assert_eq!(
            resolution,
            NameResolution::Ambiguous(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_empty_ambiguous_resolution_has_empty_name() {
        assert_eq!(NameResolution::Ambiguous(Vec::new()).name(), "");
    }

    #[test]
    fn test_only_direct_children_count() {
        // void f() { g(); }
        let mut b = TreeBuilder::new();
        let method = b.open("method_declaration", NodeCategory::MethodDeclaration, 0, 17);
        b.open("block", NodeCategory::Other, 9, 17);
        b.leaf("identifier", NodeCategory::SimpleName, 11, 12, "g");
        b.close();
        b.close();
        let tree = b.finish().unwrap();

        assert!(matches!(
            resolve_method_name(&tree, method),
            NameResolution::Missing(_)
        ));
    }

    #[test]
    fn test_extract_pair_slices_verbatim() {
        let (previous, p) = revision("void run(){ a(); }", &["run"]);
        let (updated, u) = revision("void run(){ a(); b(); }", &["run"]);
        let mut diagnostics = Diagnostics::new();

        let pair = extract_pair(
            CandidatePair {
                previous: p,
                updated: u,
            },
            &previous,
            &updated,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(pair.name, "run");
        assert_eq!(pair.previous_text, "void run(){ a(); }");
        assert_eq!(pair.updated_text, "void run(){ a(); b(); }");
        assert_eq!(
            &previous.text[pair.previous_span.start..pair.previous_span.end],
            pair.previous_text
        );
        assert!(!pair.is_unchanged());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_and_ambiguous_names_are_reported() {
        let (previous, p) = revision("void () {}", &[]);
        let (updated, u) = revision("void a b() {}", &["a", "b"]);
        let mut diagnostics = Diagnostics::new();

        let pair = extract_pair(
            CandidatePair {
                previous: p,
                updated: u,
            },
            &previous,
            &updated,
            &mut diagnostics,
        )
        .unwrap();

        assert!(pair.name.starts_with(MISSING_NAME_PREFIX));
        let kinds: Vec<DiagnosticKind> = diagnostics.records().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::MissingName,
                DiagnosticKind::AmbiguousName,
                DiagnosticKind::NameMismatch
            ]
        );
    }

    #[test]
    fn test_name_mismatch_keeps_previous_name() {
        let (previous, p) = revision("void foo() {}", &["foo"]);
        let (updated, u) = revision("void bar() {}", &["bar"]);
        let mut diagnostics = Diagnostics::new();

        let pair = extract_pair(
            CandidatePair {
                previous: p,
                updated: u,
            },
            &previous,
            &updated,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(pair.name, "foo");
        assert_eq!(diagnostics.len(), 1);
        let record = &diagnostics.records()[0];
        assert_eq!(record.kind, DiagnosticKind::NameMismatch);
        assert_eq!(record.previous_node, Some(p));
        assert_eq!(record.updated_node, Some(u));
    }

    #[test]
    fn test_span_outside_text_is_an_error() {
        let (tree, method) = method_tree("void foo() {}", &["foo"]);
        let short = Revision::new("A.java", "void", tree);
        let err = node_text(&short.text, &short.tree, method).unwrap_err();
        assert!(matches!(err, PairError::InvalidSpan { .. }));
    }
}
