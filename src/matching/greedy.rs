//! Greedy structural matcher
//!
//! Three phases over pre-order arenas:
//! 1. top-down: identical subtrees (same blake3 digest, height >= `min_height`)
//!    are mapped whole, unique pairs first, ambiguous ones afterwards;
//! 2. bottom-up: an unmatched inner node is mapped to the same-kind container
//!    sharing the largest fraction of already-matched descendants (dice);
//! 3. recovery: below every container mapped in phase 2 (and below the roots),
//!    unmatched children are paired by kind, then by label similarity.

use super::{Correspondence, MappingStore, TreeMatcher};
use crate::error::Result;
use crate::tree::{NodeId, SyntaxTree};
use crate::utils::string_similarity::normalized_similarity;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

type Digest = [u8; 32];

/// Matcher thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Smallest subtree height considered by the top-down phase
    pub min_height: usize,
    /// Minimum dice coefficient for a bottom-up container match
    pub min_dice: f64,
    /// Minimum label similarity for pairing leaves that are not unique by kind
    pub label_similarity: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_height: 2,
            min_dice: 0.5,
            label_similarity: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GreedyMatcher {
    config: MatcherConfig,
}

impl GreedyMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }
}

impl TreeMatcher for GreedyMatcher {
    fn match_trees(&self, previous: &SyntaxTree, updated: &SyntaxTree) -> Result<MappingStore> {
        let mut store = MappingStore::for_trees(previous, updated);
        if previous.is_empty() || updated.is_empty() {
            return Ok(store);
        }

        let run = MatchRun {
            config: &self.config,
            previous: TreeIndex::new(previous),
            updated: TreeIndex::new(updated),
        };
        run.match_identical_subtrees(&mut store)?;
        let identical = store.len();
        run.match_containers(&mut store)?;

        debug!(
            "Matched {} of {} previous nodes ({} in identical subtrees)",
            store.len(),
            previous.len(),
            identical
        );
        Ok(store)
    }
}

/// Per-tree data the matcher needs besides the tree itself
struct TreeIndex<'t> {
    tree: &'t SyntaxTree,
    heights: Vec<usize>,
    digests: Vec<Digest>,
}

impl<'t> TreeIndex<'t> {
    fn new(tree: &'t SyntaxTree) -> Self {
        let mut heights = vec![1; tree.len()];
        let mut digests = vec![[0u8; 32]; tree.len()];

        // Children have larger ids than their parent, so reverse order is bottom-up
        for id in tree.ids().rev() {
            let node = tree.node(id);
            let mut hasher = blake3::Hasher::new();
            hasher.update(node.kind.as_bytes());
            match &node.label {
                Some(label) => {
                    hasher.update(&[1]);
                    hasher.update(label.as_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
            let mut height = 0;
            for child in &node.children {
                hasher.update(&digests[child.index()]);
                height = height.max(heights[child.index()]);
            }
            heights[id.index()] = height + 1;
            digests[id.index()] = *hasher.finalize().as_bytes();
        }

        Self {
            tree,
            heights,
            digests,
        }
    }

    fn height(&self, id: NodeId) -> usize {
        self.heights[id.index()]
    }

    fn digest(&self, id: NodeId) -> &Digest {
        &self.digests[id.index()]
    }

    fn kind(&self, id: NodeId) -> &str {
        &self.tree.node(id).kind
    }

    fn descendant_count(&self, id: NodeId) -> usize {
        self.tree.subtree_size(id) - 1
    }

    /// Candidate subtrees for the top-down phase, grouped by digest
    fn digest_groups(&self, min_height: usize) -> HashMap<Digest, Vec<NodeId>> {
        let mut groups: HashMap<Digest, Vec<NodeId>> = HashMap::new();
        for id in self.tree.ids() {
            if self.height(id) >= min_height {
                groups.entry(*self.digest(id)).or_default().push(id);
            }
        }
        groups
    }

    fn leaf_labels(&self, id: NodeId) -> Vec<&str> {
        self.tree
            .node(id)
            .children
            .iter()
            .map(|child| self.tree.node(*child))
            .filter(|child| child.is_leaf())
            .filter_map(|child| child.label.as_deref())
            .collect()
    }
}

struct MatchRun<'a> {
    config: &'a MatcherConfig,
    previous: TreeIndex<'a>,
    updated: TreeIndex<'a>,
}

impl MatchRun<'_> {
    fn match_identical_subtrees(&self, store: &mut MappingStore) -> Result<()> {
        let previous_groups = self.previous.digest_groups(self.config.min_height);
        let updated_groups = self.updated.digest_groups(self.config.min_height);

        let mut order: Vec<NodeId> = previous_groups.values().flatten().copied().collect();
        order.sort_by_key(|id| (Reverse(self.previous.height(*id)), *id));

        let mut ambiguous = Vec::new();
        for p in order {
            if store.is_previous_mapped(p) {
                continue;
            }
            let digest = self.previous.digest(p);
            let Some(candidates) = updated_groups.get(digest) else {
                continue;
            };
            let free: Vec<NodeId> = candidates
                .iter()
                .copied()
                .filter(|u| self.subtrees_are_free(store, p, *u))
                .collect();
            let twins = previous_groups[digest]
                .iter()
                .filter(|q| !store.is_previous_mapped(**q))
                .count();

            match free.as_slice() {
                [] => {}
                [only] if twins == 1 => self.map_subtree(store, p, *only)?,
                _ => ambiguous.push(p),
            }
        }

        // Ambiguous twins: prefer the copy whose parent already corresponds
        for p in ambiguous {
            if store.is_previous_mapped(p) {
                continue;
            }
            let Some(candidates) = updated_groups.get(self.previous.digest(p)) else {
                continue;
            };
            let parent_partner = self
                .previous
                .tree
                .node(p)
                .parent
                .and_then(|parent| store.updated_of(parent));
            let free: Vec<NodeId> = candidates
                .iter()
                .copied()
                .filter(|u| self.subtrees_are_free(store, p, *u))
                .collect();
            let chosen = free
                .iter()
                .find(|u| {
                    parent_partner.is_some() && self.updated.tree.node(**u).parent == parent_partner
                })
                .or_else(|| free.first())
                .copied();
            if let Some(u) = chosen {
                self.map_subtree(store, p, u)?;
            }
        }
        Ok(())
    }

    fn subtrees_are_free(&self, store: &MappingStore, p: NodeId, u: NodeId) -> bool {
        let size = self.previous.tree.subtree_size(p);
        (0..size).all(|offset| {
            !store.is_previous_mapped(NodeId::from_index(p.index() + offset))
                && !store.is_updated_mapped(NodeId::from_index(u.index() + offset))
        })
    }

    /// Map two isomorphic subtrees node by node; their pre-order ranges line up
    fn map_subtree(&self, store: &mut MappingStore, p: NodeId, u: NodeId) -> Result<()> {
        for offset in 0..self.previous.tree.subtree_size(p) {
            store.add(
                NodeId::from_index(p.index() + offset),
                NodeId::from_index(u.index() + offset),
            )?;
        }
        Ok(())
    }

    fn match_containers(&self, store: &mut MappingStore) -> Result<()> {
        let previous_root = self.previous.tree.root();
        let updated_root = self.updated.tree.root();

        for p in self.previous.tree.ids().rev() {
            if p == previous_root
                || store.is_previous_mapped(p)
                || self.previous.tree.node(p).is_leaf()
            {
                continue;
            }
            let best = self
                .container_candidates(store, p)
                .into_iter()
                .map(|u| (u, self.dice(store, p, u)))
                .fold(None, |best: Option<(NodeId, f64)>, (u, score)| match best {
                    Some((_, best_score)) if best_score >= score => best,
                    _ => Some((u, score)),
                });
            if let Some((u, score)) = best {
                if score >= self.config.min_dice {
                    store.add(p, u)?;
                    self.recover(store, p, u)?;
                }
            }
        }

        if !store.is_previous_mapped(previous_root)
            && !store.is_updated_mapped(updated_root)
            && self.previous.kind(previous_root) == self.updated.kind(updated_root)
        {
            store.add(previous_root, updated_root)?;
        }
        if store.updated_of(previous_root) == Some(updated_root) {
            self.recover(store, previous_root, updated_root)?;
        }
        Ok(())
    }

    /// Unmatched same-kind ancestors of the partners of `p`'s matched descendants
    fn container_candidates(&self, store: &MappingStore, p: NodeId) -> BTreeSet<NodeId> {
        let kind = self.previous.kind(p);
        let mut visited = HashSet::new();
        let mut candidates = BTreeSet::new();
        for d in self.previous.tree.descendants(p) {
            let Some(partner) = store.updated_of(d) else {
                continue;
            };
            for ancestor in self.updated.tree.ancestors(partner) {
                if !visited.insert(ancestor) {
                    break;
                }
                if !store.is_updated_mapped(ancestor) && self.updated.kind(ancestor) == kind {
                    candidates.insert(ancestor);
                }
            }
        }
        candidates
    }

    fn dice(&self, store: &MappingStore, p: NodeId, u: NodeId) -> f64 {
        let total = self.previous.descendant_count(p) + self.updated.descendant_count(u);
        if total == 0 {
            return 0.0;
        }
        let common = self
            .previous
            .tree
            .descendants(p)
            .filter_map(|d| store.updated_of(d))
            .filter(|partner| self.updated.tree.is_descendant(u, *partner))
            .count();
        2.0 * common as f64 / total as f64
    }

    /// Pair leftover children below a mapped pair, descending into new pairs
    fn recover(&self, store: &mut MappingStore, p: NodeId, u: NodeId) -> Result<()> {
        let mut pending = vec![(p, u)];
        while let Some((p, u)) = pending.pop() {
            let previous_children = &self.previous.tree.node(p).children;
            let updated_children = &self.updated.tree.node(u).children;

            for &c in previous_children {
                if store.is_previous_mapped(c) {
                    continue;
                }
                let kind = self.previous.kind(c);
                let options: Vec<NodeId> = updated_children
                    .iter()
                    .copied()
                    .filter(|d| !store.is_updated_mapped(*d) && self.updated.kind(*d) == kind)
                    .collect();
                if options.is_empty() {
                    continue;
                }
                let rivals = previous_children
                    .iter()
                    .filter(|q| !store.is_previous_mapped(**q) && self.previous.kind(**q) == kind)
                    .count();

                let chosen = if options.len() == 1 && rivals == 1 {
                    Some(options[0])
                } else {
                    self.best_sibling(store, c, &options)
                };
                if let Some(d) = chosen {
                    store.add(c, d)?;
                    if !self.previous.tree.node(c).is_leaf() {
                        pending.push((c, d));
                    }
                }
            }
        }
        Ok(())
    }

    fn best_sibling(&self, store: &MappingStore, c: NodeId, options: &[NodeId]) -> Option<NodeId> {
        let node = self.previous.tree.node(c);
        let mut best: Option<(NodeId, f64)> = None;
        for &d in options {
            let score = if node.is_leaf() {
                let similarity = match (&node.label, &self.updated.tree.node(d).label) {
                    (Some(a), Some(b)) => normalized_similarity(a, b),
                    (None, None) => 1.0,
                    _ => 0.0,
                };
                if similarity < self.config.label_similarity {
                    continue;
                }
                similarity
            } else {
                let score = self.dice(store, c, d) + self.label_overlap(c, d);
                if score <= 0.0 {
                    continue;
                }
                score
            };
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((d, score));
            }
        }
        best.map(|(d, _)| d)
    }

    /// Shared fraction of direct leaf labels (names, types, modifiers)
    fn label_overlap(&self, c: NodeId, d: NodeId) -> f64 {
        let ours = self.previous.leaf_labels(c);
        let theirs = self.updated.leaf_labels(d);
        let longest = ours.len().max(theirs.len());
        if longest == 0 {
            return 0.0;
        }
        let common = ours.iter().filter(|label| theirs.contains(label)).count();
        common as f64 / longest as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parser::{StructuralParser, TreeSitterParser};
    use crate::tree::NodeCategory;
    use std::path::Path;

    fn parse(code: &str) -> SyntaxTree {
        TreeSitterParser::new()
            .parse(Path::new("A.java"), code)
            .unwrap()
    }

    fn method_named(tree: &SyntaxTree, name: &str) -> NodeId {
        tree.ids()
            .find(|id| {
                let node = tree.node(*id);
                node.category == NodeCategory::MethodDeclaration
                    && node
                        .children
                        .iter()
                        .any(|c| tree.node(*c).label.as_deref() == Some(name))
            })
            .unwrap()
    }

    #[test]
    fn test_identical_trees_map_totally() {
        let code = "class A {\n  void run() { a(); }\n  int two() { return 2; }\n}\n";
        let previous = parse(code);
        let updated = parse(code);

        let store = GreedyMatcher::default()
            .match_trees(&previous, &updated)
            .unwrap();

        assert_eq!(store.len(), previous.len());
        for id in previous.ids() {
            assert_eq!(store.updated_of(id), Some(id));
        }
    }

    #[test]
    fn test_edited_method_is_aligned() {
        let previous = parse("class A {\n  void run() { a(); }\n}\n");
        let updated = parse("class A {\n  void run() { a(); b(); }\n}\n");

        let store = GreedyMatcher::default()
            .match_trees(&previous, &updated)
            .unwrap();

        assert_eq!(
            store.updated_of(method_named(&previous, "run")),
            Some(method_named(&updated, "run"))
        );
    }

    #[test]
    fn test_sibling_methods_keep_their_partners() {
        let previous = parse(
            "class A {\n  void foo() { a(); b(); }\n  void bar() { c(); d(); }\n}\n",
        );
        let updated = parse(
            "class A {\n  void bar() { c(); y(); }\n  void foo() { a(); b(); x(); }\n}\n",
        );

        let store = GreedyMatcher::default()
            .match_trees(&previous, &updated)
            .unwrap();

        assert_eq!(
            store.updated_of(method_named(&previous, "foo")),
            Some(method_named(&updated, "foo"))
        );
        assert_eq!(
            store.updated_of(method_named(&previous, "bar")),
            Some(method_named(&updated, "bar"))
        );
    }

    #[test]
    fn test_matching_is_deterministic() {
        let previous = parse("class A {\n  void f() { x(); x(); }\n  void g() { x(); }\n}\n");
        let updated = parse("class A {\n  void g() { x(); }\n  void f() { x(); x(); y(); }\n}\n");
        let matcher = GreedyMatcher::default();

        let first = matcher.match_trees(&previous, &updated).unwrap();
        let second = matcher.match_trees(&previous, &updated).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mapping_is_injective() {
        let previous = parse("class A {\n  void f() { x(); x(); }\n}\n");
        let updated = parse("class A {\n  void f() { x(); }\n}\n");

        let store = GreedyMatcher::default()
            .match_trees(&previous, &updated)
            .unwrap();

        let mut seen = HashSet::new();
        for (_, u) in store.pairs() {
            assert!(seen.insert(u), "updated node {} mapped twice", u);
        }
    }
}
