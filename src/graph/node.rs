//! Node identity, kind and state flags.
//!
//! Every node in the cloud has:
//! - A dense index (`NodeId`) into the store's column arrays
//! - A kind: the single pinned root, or a mobile stack node
//! - State flags (pinned)

use std::fmt;

/// Dense node index.
///
/// Nodes are never removed individually, so the index is stable for the
/// lifetime of a simulation. The root is always `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node's index.
    pub const ROOT: NodeId = NodeId(0);

    /// Get the index as a usize for column access.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The fixed central anchor.
    Root,
    /// A technology/skill item orbiting the root.
    Stack,
}

/// Node state flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const PINNED: u8 = 0b0000_0001;

    /// Create a new default node state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the node is pinned (never moved by forces).
    #[inline]
    pub fn is_pinned(self) -> bool {
        self.flags & Self::PINNED != 0
    }

    /// Set the pinned state.
    #[inline]
    pub fn set_pinned(&mut self, pinned: bool) {
        if pinned {
            self.flags |= Self::PINNED;
        } else {
            self.flags &= !Self::PINNED;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(format!("{}", id), "Node(42)");
        assert_eq!(NodeId::ROOT.index(), 0);
    }

    #[test]
    fn test_node_state_flags() {
        let mut state = NodeState::new();
        assert!(!state.is_pinned());

        state.set_pinned(true);
        assert!(state.is_pinned());

        state.set_pinned(false);
        assert!(!state.is_pinned());
    }
}
