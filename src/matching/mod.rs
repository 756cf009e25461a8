//! Cross-revision node correspondence
//!
//! A [`TreeMatcher`] aligns the nodes of a previous tree with the nodes of an
//! updated tree. The result is read through the [`Correspondence`] trait so the
//! walker and extractor never depend on a particular matching engine.

mod greedy;

pub use greedy::{GreedyMatcher, MatcherConfig};

use crate::error::{PairError, Result};
use crate::tree::{NodeId, SyntaxTree};

/// Partial, injective, bidirectional node lookup between two trees
pub trait Correspondence {
    /// Partner of a previous-tree node in the updated tree
    fn updated_of(&self, previous: NodeId) -> Option<NodeId>;

    /// Partner of an updated-tree node in the previous tree
    fn previous_of(&self, updated: NodeId) -> Option<NodeId>;
}

/// Two trees → correspondence
///
/// Must be deterministic for identical inputs; need not be total.
pub trait TreeMatcher {
    fn match_trees(&self, previous: &SyntaxTree, updated: &SyntaxTree) -> Result<MappingStore>;
}

/// Dense one-to-one mapping, indexed by node id on both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingStore {
    to_updated: Vec<Option<NodeId>>,
    to_previous: Vec<Option<NodeId>>,
    len: usize,
}

impl MappingStore {
    pub fn new(previous_len: usize, updated_len: usize) -> Self {
        Self {
            to_updated: vec![None; previous_len],
            to_previous: vec![None; updated_len],
            len: 0,
        }
    }

    /// Sized for the two trees being matched
    pub fn for_trees(previous: &SyntaxTree, updated: &SyntaxTree) -> Self {
        Self::new(previous.len(), updated.len())
    }

    /// Record `previous ↔ updated`. Either side already having a partner is an error.
    pub fn add(&mut self, previous: NodeId, updated: NodeId) -> Result<()> {
        let slot_previous = self.to_updated.get(previous.index()).ok_or_else(|| {
            PairError::Matcher(format!("previous node {} is out of range", previous))
        })?;
        let slot_updated = self.to_previous.get(updated.index()).ok_or_else(|| {
            PairError::Matcher(format!("updated node {} is out of range", updated))
        })?;
        if let Some(existing) = slot_previous {
            return Err(PairError::Matcher(format!(
                "previous node {} is already mapped to {}",
                previous, existing
            )));
        }
        if let Some(existing) = slot_updated {
            return Err(PairError::Matcher(format!(
                "updated node {} is already mapped to {}",
                updated, existing
            )));
        }
        self.to_updated[previous.index()] = Some(updated);
        self.to_previous[updated.index()] = Some(previous);
        self.len += 1;
        Ok(())
    }

    pub fn is_previous_mapped(&self, previous: NodeId) -> bool {
        self.updated_of(previous).is_some()
    }

    pub fn is_updated_mapped(&self, updated: NodeId) -> bool {
        self.previous_of(updated).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All pairs, ordered by previous node id
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.to_updated
            .iter()
            .enumerate()
            .filter_map(|(index, partner)| partner.map(|u| (NodeId::from_index(index), u)))
    }
}

impl Correspondence for MappingStore {
    fn updated_of(&self, previous: NodeId) -> Option<NodeId> {
        self.to_updated.get(previous.index()).copied().flatten()
    }

    fn previous_of(&self, updated: NodeId) -> Option<NodeId> {
        self.to_previous.get(updated.index()).copied().flatten()
    }
}
