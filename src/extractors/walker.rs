//! Correspondence walker
//!
//! Finds, in pre-order over the previous tree, every method declaration whose
//! partner in the updated tree is also a method declaration.

use crate::matching::Correspondence;
use crate::tree::{NodeCategory, NodeId, SyntaxTree};
use tracing::debug;

/// A previous/updated pair of corresponding method declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair {
    pub previous: NodeId,
    pub updated: NodeId,
}

/// Walk `previous` depth-first, pre-order, in child order.
///
/// Unmatched nodes yield nothing, but their subtrees are still visited, so
/// methods nested in a deleted or unmatched declaration remain candidates.
/// The partner is only checked for its category.
pub fn corresponding_methods<C>(
    previous: &SyntaxTree,
    updated: &SyntaxTree,
    correspondence: &C,
) -> Vec<CandidatePair>
where
    C: Correspondence + ?Sized,
{
    let mut pairs = Vec::new();
    if previous.is_empty() {
        return pairs;
    }

    let mut stack = vec![previous.root()];
    while let Some(id) = stack.pop() {
        let node = previous.node(id);
        if node.category == NodeCategory::MethodDeclaration {
            if let Some(partner) = correspondence.updated_of(id) {
                match updated.get(partner) {
                    Some(other) if other.category == NodeCategory::MethodDeclaration => {
                        pairs.push(CandidatePair {
                            previous: id,
                            updated: partner,
                        });
                    }
                    Some(other) => debug!(
                        "Method node {} corresponds to a {} node; skipping",
                        id, other.kind
                    ),
                    None => debug!(
                        "Method node {} corresponds to unknown updated node {}",
                        id, partner
                    ),
                }
            }
        }
        stack.extend(node.children.iter().rev().copied());
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MappingStore;
    use crate::tree::TreeBuilder;

    /// class { method#1 { name, block { method#2 { name } } }, method#3 { name } }
    fn nested_tree() -> (SyntaxTree, [NodeId; 3]) {
        let mut b = TreeBuilder::new();
        b.open("class_body", NodeCategory::Other, 0, 100);
        let outer = b.open("method_declaration", NodeCategory::MethodDeclaration, 0, 60);
        b.leaf("identifier", NodeCategory::SimpleName, 5, 10, "outer");
        b.open("block", NodeCategory::Other, 11, 60);
        let inner = b.open("method_declaration", NodeCategory::MethodDeclaration, 12, 50);
        b.leaf("identifier", NodeCategory::SimpleName, 17, 22, "inner");
        b.close();
        b.close();
        b.close();
        let last = b.open("method_declaration", NodeCategory::MethodDeclaration, 61, 99);
        b.leaf("identifier", NodeCategory::SimpleName, 66, 70, "last");
        b.close();
        b.close();
        (b.finish().unwrap(), [outer, inner, last])
    }

    fn identity(tree: &SyntaxTree) -> MappingStore {
        let mut store = MappingStore::for_trees(tree, tree);
        for id in tree.ids() {
            store.add(id, id).unwrap();
        }
        store
    }

    #[test]
    fn test_pairs_come_in_preorder() {
        let (tree, [outer, inner, last]) = nested_tree();
        let store = identity(&tree);

        let pairs = corresponding_methods(&tree, &tree, &store);

        let previous: Vec<NodeId> = pairs.iter().map(|p| p.previous).collect();
        assert_eq!(previous, vec![outer, inner, last]);
        assert!(pairs.iter().all(|p| p.previous == p.updated));
    }

    #[test]
    fn test_unmatched_parent_still_visits_children() {
        let (tree, [outer, inner, last]) = nested_tree();
        let mut store = MappingStore::for_trees(&tree, &tree);
        store.add(inner, inner).unwrap();
        store.add(last, last).unwrap();

        let pairs = corresponding_methods(&tree, &tree, &store);

        assert_eq!(
            pairs,
            vec![
                CandidatePair {
                    previous: inner,
                    updated: inner
                },
                CandidatePair {
                    previous: last,
                    updated: last
                },
            ]
        );
        assert!(pairs.iter().all(|p| p.previous != outer));
    }

    #[test]
    fn test_partner_of_another_category_is_skipped() {
        let (tree, [outer, _, last]) = nested_tree();
        let mut store = MappingStore::for_trees(&tree, &tree);
        // outer method ↔ class_body root
        store.add(outer, tree.root()).unwrap();
        store.add(last, last).unwrap();

        let pairs = corresponding_methods(&tree, &tree, &store);

        assert_eq!(
            pairs,
            vec![CandidatePair {
                previous: last,
                updated: last
            }]
        );
    }

    #[test]
    fn test_empty_correspondence_yields_nothing() {
        let (tree, _) = nested_tree();
        let store = MappingStore::for_trees(&tree, &tree);
        assert!(corresponding_methods(&tree, &tree, &store).is_empty());
    }
}
