//! Errors returned by [`Tree`][crate::Tree] operations.

use thiserror::Error;

/// Result type for fallible tree operations.
pub type AvlResult<T> = Result<T, AvlError>;

/// The ways a tree operation can be rejected. Rejected operations never modify the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AvlError {
    /// An insert was given a key that is already in the tree.
    #[error("duplicate key {0}")]
    DuplicateKey(i32),

    /// A delete (or a query requiring a present key) was given a key that isn't in the tree.
    #[error("key {0} not found")]
    KeyNotFound(i32),
}

/// A broken structural invariant found by [`Tree::check_invariants`][crate::Tree::check_invariants].
///
/// Every variant carries the key of the offending node where there is one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A key is out of order relative to one of its ancestors.
    #[error("key {key} is out of order")]
    Ordering {
        /// The misplaced key.
        key: i32,
    },

    /// A node's stored height doesn't match its children.
    #[error("node {key} has height {stored}, expected {expected}")]
    Height {
        /// The node's key.
        key: i32,
        /// The height stored on the node.
        stored: i32,
        /// The height computed from the children.
        expected: i32,
    },

    /// A node's stored balance factor doesn't match its children, or is outside `-1..=1`.
    #[error("node {key} has balance factor {stored}, expected {expected}")]
    Balance {
        /// The node's key.
        key: i32,
        /// The balance factor stored on the node.
        stored: i32,
        /// The balance factor computed from the children.
        expected: i32,
    },

    /// A node's count of `true` values doesn't match its subtree.
    #[error("node {key} counts {stored} true values, expected {expected}")]
    TrueCount {
        /// The node's key.
        key: i32,
        /// The count stored on the node.
        stored: usize,
        /// The count computed from the children.
        expected: usize,
    },

    /// A child doesn't point back at its parent.
    #[error("node {key} has an inconsistent parent link")]
    ParentLink {
        /// The child's key.
        key: i32,
    },

    /// The cached minimum or maximum is stale.
    #[error("cached {which} is stale")]
    Extreme {
        /// `"min"` or `"max"`.
        which: &'static str,
    },

    /// The stored size doesn't match the number of reachable nodes.
    #[error("tree reports {stored} nodes but {counted} are reachable")]
    Size {
        /// The size stored on the tree.
        stored: usize,
        /// The number of nodes found by walking the tree.
        counted: usize,
    },
}
