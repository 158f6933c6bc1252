//! This crate exposes an augmented AVL tree mapping integer keys to boolean values.
//!
//! ## AVL Tree
//!
//! An AVL tree is a Binary Search Tree (BST) that keeps itself balanced. Like any BST it is made
//! of `Node`s holding a key and a value, and its most important invariants are:
//!
//! 1. For every `Node`, all the `Node`s in its left subtree have a key less than its own key.
//! 2. For every `Node`, all the `Node`s in its right subtree have a key greater than its own key.
//!
//! On top of that, an AVL tree requires that for every `Node` the heights of its two subtrees
//! differ by at most one. After every insert and delete the tree walks back up to the root,
//! fixing heights and rotating any `Node` that broke this rule. That keeps the height at
//! `O(lg N)` so searching, inserting and deleting all take `O(lg N)`.
//!
//! ## Augmentation
//!
//! Every `Node` here also counts the `true` values in its subtree. With those counts, the parity
//! of the `true` values among all keys up to a given key ("prefix XOR") is found by a single
//! climb from that key to the root instead of a visit to every smaller key. See
//! [`Tree::prefix_xor`].

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod avl;
pub mod error;


pub use avl::{Iter, NodeRef, Tree};
pub use error::{AvlError, AvlResult, InvariantViolation};
