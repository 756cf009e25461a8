//! Structural trees
//!
//! An owned, immutable, pre-order arena of syntax nodes. Trees are produced by
//! a [`StructuralParser`](parser::StructuralParser) (or assembled by hand with
//! [`TreeBuilder`]) and are only read afterwards.
//!
//! Node ids are pre-order indices, so:
//! - a parent always has a smaller id than its children,
//! - every subtree occupies the contiguous id range `id..id + subtree_size`.
//!
//! The matcher relies on both properties.

pub mod parser;

use crate::error::{PairError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pre-order index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Syntactic category the extraction pipeline reasons about.
///
/// Grammar kinds vary per language; the parser folds them into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    MethodDeclaration,
    SimpleName,
    Other,
}

/// One node of a structural tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Grammar kind as reported by the front end (e.g. "method_declaration")
    pub kind: String,
    pub category: NodeCategory,
    /// Start byte offset in the owning file's text
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Literal text, present on leaves
    pub label: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Number of nodes in this subtree, including itself
    subtree_size: usize,
}

impl SyntaxNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Immutable structural tree, single-rooted at `NodeId(0)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in pre-order
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    pub fn subtree_size(&self, id: NodeId) -> usize {
        self.node(id).subtree_size
    }

    /// Ids of the strict descendants of `id`, in pre-order
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> {
        let first = id.index() + 1;
        let end = id.index() + self.subtree_size(id);
        (first..end).map(NodeId::from_index)
    }

    /// True if `other` lies strictly below `ancestor`
    pub fn is_descendant(&self, ancestor: NodeId, other: NodeId) -> bool {
        other > ancestor && other.index() < ancestor.index() + self.subtree_size(ancestor)
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).parent,
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).parent;
        Some(current)
    }
}

/// Incremental, pre-order tree construction.
///
/// ```ignore
/// let mut builder = TreeBuilder::new();
/// builder.open("class_body", NodeCategory::Other, 0, 20);
/// builder.leaf("identifier", NodeCategory::SimpleName, 5, 8, "run");
/// builder.close();
/// let tree = builder.finish()?;
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
    open: Vec<NodeId>,
    roots: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an inner node; children added until the matching `close` belong to it
    pub fn open(
        &mut self,
        kind: impl Into<String>,
        category: NodeCategory,
        start_byte: usize,
        end_byte: usize,
    ) -> NodeId {
        let id = self.push(kind.into(), category, start_byte, end_byte, None);
        self.open.push(id);
        id
    }

    /// Add a labeled leaf under the currently open node
    pub fn leaf(
        &mut self,
        kind: impl Into<String>,
        category: NodeCategory,
        start_byte: usize,
        end_byte: usize,
        label: impl Into<String>,
    ) -> NodeId {
        self.push(
            kind.into(),
            category,
            start_byte,
            end_byte,
            Some(label.into()),
        )
    }

    pub fn close(&mut self) -> Option<NodeId> {
        let id = self.open.pop()?;
        let size = self.nodes.len() - id.index();
        self.nodes[id.index()].subtree_size = size;
        Some(id)
    }

    pub fn finish(mut self) -> Result<SyntaxTree> {
        if !self.open.is_empty() {
            return Err(PairError::MalformedTree(format!(
                "{} node(s) left open",
                self.open.len()
            )));
        }
        if self.roots != 1 {
            return Err(PairError::MalformedTree(format!(
                "expected exactly one root, found {}",
                self.roots
            )));
        }
        for node in &self.nodes {
            if node.start_byte > node.end_byte {
                return Err(PairError::MalformedTree(format!(
                    "{} node spans {}..{}",
                    node.kind, node.start_byte, node.end_byte
                )));
            }
        }
        // Leaves never pass through close(); their size is fixed at push time.
        self.nodes.shrink_to_fit();
        Ok(SyntaxTree { nodes: self.nodes })
    }

    fn push(
        &mut self,
        kind: String,
        category: NodeCategory,
        start_byte: usize,
        end_byte: usize,
        label: Option<String>,
    ) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        let parent = self.open.last().copied();
        match parent {
            Some(parent_id) => self.nodes[parent_id.index()].children.push(id),
            None => self.roots += 1,
        }
        self.nodes.push(SyntaxNode {
            kind,
            category,
            start_byte,
            end_byte,
            label,
            parent,
            children: Vec::new(),
            subtree_size: 1,
        });
        id
    }
}
