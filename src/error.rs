use thiserror::Error;

/// Errors reported by [`DosTree`](crate::DosTree) operations.
///
/// These are ordinary results; a failed operation never changes the tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum DosError {
    /// The requested key is not stored in the tree.
    #[error("key not found")]
    NotFound,

    /// The requested rank is outside `1..=len`.
    #[error("rank {rank} is out of range for a tree of {len} entries")]
    OutOfRange {
        /// The rank that was asked for.
        rank: usize,
        /// The number of entries in the tree at the time of the call.
        len: usize,
    },
}

/// A broken structural invariant, as reported by [`DosTree::validate`](crate::DosTree::validate).
///
/// Node positions are arena slot indices. A correct tree never produces one of these.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InvariantViolation {
    /// The root is red.
    #[error("root node {node} is red")]
    RedRoot {
        /// The root.
        node: usize,
    },

    /// The root records a parent.
    #[error("root node {node} has a parent")]
    RootHasParent {
        /// The root.
        node: usize,
    },

    /// A red node has a red child.
    #[error("red node {node} has a red child {child}")]
    RedRed {
        /// The red parent.
        node: usize,
        /// Its red child.
        child: usize,
    },

    /// The two subtrees of a node have different black-heights.
    #[error("black-height mismatch below node {node}: left {left}, right {right}")]
    BlackHeight {
        /// The node whose subtrees disagree.
        node: usize,
        /// Black-height of the left subtree.
        left: usize,
        /// Black-height of the right subtree.
        right: usize,
    },

    /// A stored subtree size differs from `1 + size(left) + size(right)`.
    #[error("size mismatch at node {node}: stored {stored}, computed {computed}")]
    Size {
        /// The node with the wrong size.
        node: usize,
        /// The size the node records.
        stored: usize,
        /// The size its children imply.
        computed: usize,
    },

    /// An in-order walk found a key smaller than its predecessor.
    #[error("keys out of order at node {node}")]
    Order {
        /// The first node out of order.
        node: usize,
    },

    /// A child's parent link does not name the node that holds it.
    #[error("node {child} does not point back to its parent {node}")]
    ParentLink {
        /// The parent.
        node: usize,
        /// The child with the wrong back link.
        child: usize,
    },

    /// The arenas hold entries the root cannot reach.
    #[error("tree holds {reachable} reachable nodes but {nodes} nodes and {values} values are allocated")]
    Length {
        /// Nodes reached from the root.
        reachable: usize,
        /// Live nodes in the node arena.
        nodes: usize,
        /// Live values in the value arena.
        values: usize,
    },

    /// The sentinel's parent slot was not reset after a delete.
    #[error("sentinel parent was left pointing at node {node}")]
    DirtySentinel {
        /// The node the sentinel still points at.
        node: usize,
    },
}
