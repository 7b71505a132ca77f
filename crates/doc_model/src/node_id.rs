//! Node ID management

use serde::{Deserialize, Serialize};

/// Identifier for a node in an [`XmlTree`](crate::XmlTree) arena.
///
/// Ids are plain indices into the arena. They stay valid for the lifetime of
/// the tree because nodes are never removed from the arena, only detached
/// from their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a NodeId from an arena index
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Get the arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
