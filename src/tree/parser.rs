//! Structural parsing front end
//!
//! Turns source text into a [`SyntaxTree`]. Only named tree-sitter nodes are
//! kept; punctuation and keywords are anonymous tokens and carry no structure
//! the matcher or the extractor care about.

use super::{NodeCategory, SyntaxTree, TreeBuilder};
use crate::error::{PairError, Result};
use crate::language;
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

/// Source text → structural tree
///
/// Implementations must be deterministic for identical input, report byte
/// spans into `text`, and keep children in source order.
pub trait StructuralParser {
    fn parse(&self, path: &Path, text: &str) -> Result<SyntaxTree>;
}

/// tree-sitter backed parser; the grammar is picked from the file extension
/// unless a language is forced.
#[derive(Debug, Clone, Default)]
pub struct TreeSitterParser {
    language: Option<String>,
    allow_syntax_errors: bool,
}

impl TreeSitterParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every file with `language`, ignoring extensions
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Keep trees that contain ERROR or MISSING nodes instead of failing
    pub fn allow_syntax_errors(mut self, allow: bool) -> Self {
        self.allow_syntax_errors = allow;
        self
    }

    fn resolve_language(&self, path: &Path) -> Result<String> {
        if let Some(language) = &self.language {
            return Ok(language.clone());
        }
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        language::detect_language_from_extension(extension)
            .map(str::to_string)
            .ok_or_else(|| PairError::UnsupportedLanguage {
                path: path.to_path_buf(),
                reason: format!("unknown file extension '{}'", extension),
            })
    }
}

impl StructuralParser for TreeSitterParser {
    fn parse(&self, path: &Path, text: &str) -> Result<SyntaxTree> {
        let language_name = self.resolve_language(path)?;
        let grammar = language::get_tree_sitter_language(&language_name).ok_or_else(|| {
            PairError::UnsupportedLanguage {
                path: path.to_path_buf(),
                reason: format!("no grammar for '{}'", language_name),
            }
        })?;

        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| PairError::ParserSetup {
                language: language_name.clone(),
                reason: e.to_string(),
            })?;

        let tree = parser.parse(text, None).ok_or_else(|| PairError::Parse {
            path: path.to_path_buf(),
        })?;

        let root = tree.root_node();
        if root.has_error() && !self.allow_syntax_errors {
            let at = first_error_node(root).unwrap_or(root).start_position();
            return Err(PairError::Syntax {
                path: path.to_path_buf(),
                line: at.row + 1,
                column: at.column + 1,
            });
        }

        let kinds = NodeKinds {
            methods: language::get_method_declaration_kinds(&language_name),
            names: language::get_simple_name_kinds(&language_name),
        };
        let mut builder = TreeBuilder::new();
        convert(&tree, text, &kinds, &mut builder)?;
        let structural = builder.finish()?;

        debug!(
            "Parsed {} as {}: {} structural nodes",
            path.display(),
            language_name,
            structural.len()
        );
        Ok(structural)
    }
}

struct NodeKinds {
    methods: &'static [&'static str],
    names: &'static [&'static str],
}

impl NodeKinds {
    fn categorize(&self, kind: &str, parent_is_method: bool, field: Option<&str>) -> NodeCategory {
        if self.methods.contains(&kind) {
            NodeCategory::MethodDeclaration
        } else if self.names.contains(&kind) {
            // Under a declaration, only the `name` field (or no field) names it
            match (parent_is_method, field) {
                (true, Some(field)) if field != "name" => NodeCategory::Other,
                _ => NodeCategory::SimpleName,
            }
        } else {
            NodeCategory::Other
        }
    }
}

/// Copy every named node of `tree` into `builder`, in pre-order.
///
/// Iterative: nesting depth is bounded by the input, not by the call stack.
/// Only named nodes with named children are descended into, so every
/// `goto_parent` leaves a node that was opened and must be closed.
fn convert(tree: &Tree, text: &str, kinds: &NodeKinds, builder: &mut TreeBuilder) -> Result<()> {
    let mut cursor = tree.walk();
    // One entry per open inner node: is it a method declaration?
    let mut open_methods: Vec<bool> = Vec::new();

    loop {
        let node = cursor.node();
        if node.is_named() {
            let parent_is_method = open_methods.last().copied().unwrap_or(false);
            let category = kinds.categorize(node.kind(), parent_is_method, cursor.field_name());
            let (start, end) = (node.start_byte(), node.end_byte());

            if node.named_child_count() == 0 {
                let label = text.get(start..end).ok_or(PairError::InvalidSpan {
                    start,
                    end,
                    len: text.len(),
                })?;
                builder.leaf(node.kind(), category, start, end, label);
            } else {
                builder.open(node.kind(), category, start, end);
                open_methods.push(category == NodeCategory::MethodDeclaration);
                if cursor.goto_first_child() {
                    continue;
                }
                builder.close();
                open_methods.pop();
            }
        }

        // Next sibling, closing every node we climb out of
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Ok(());
            }
            builder.close();
            open_methods.pop();
        }
    }
}

/// First ERROR or MISSING node in pre-order, descending only into subtrees
/// that contain one
fn first_error_node(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}
