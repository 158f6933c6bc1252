//! An AVL tree mapping `i32` keys to `bool` values, augmented so that the parity of `true` values
//! up to any key can be found in `O(lg N)`.
//!
//! Nodes live in an arena and refer to each other by index. Slot `0` of the arena is a shared
//! sentinel standing in for every missing child and for the root's parent. It has height `-1`
//! (so a real leaf has height `0`), counts zero `true` values, and is never written to.
//!
//! # Examples
//!
//! ```
//! use augmented_avl::{AvlError, Tree};
//!
//! let mut tree = Tree::new();
//! assert!(tree.is_empty());
//!
//! // Insert reports how many nodes needed rebalancing, including the new one.
//! assert_eq!(tree.insert(5, true), Ok(1));
//! assert_eq!(tree.insert(3, false), Ok(2));
//! assert_eq!(tree.insert(8, true), Ok(1));
//!
//! // Keys are unique.
//! assert_eq!(tree.insert(3, true), Err(AvlError::DuplicateKey(3)));
//!
//! assert_eq!(tree.search(3), Some(false));
//! assert_eq!(tree.min(), Some(false));
//! assert_eq!(tree.max(), Some(true));
//!
//! // 3 -> false, 5 -> true: one `true` so far.
//! assert_eq!(tree.prefix_xor(5), Ok(true));
//! // ... and 8 -> true makes two.
//! assert_eq!(tree.prefix_xor(8), Ok(false));
//!
//! tree.delete(5).unwrap();
//! assert_eq!(tree.keys_to_vec(), vec![3, 8]);
//! assert_eq!(tree.delete(5), Err(AvlError::KeyNotFound(5)));
//! ```

use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, trace};

use crate::error::{AvlError, AvlResult, InvariantViolation};

/// Arena slot of the shared sentinel node.
const SENTINEL: usize = 0;

/// Height of the sentinel. Chosen so that a node with no real children has height `0`.
const SENTINEL_HEIGHT: i32 = -1;

/// Smallest absolute balance factor that requires a rotation.
const ILLEGAL_BALANCE: i32 = 2;

/// A handle to a node in a [`Tree`].
///
/// Handles stay valid across inserts and rotations. Deleting a key invalidates the handle of the
/// node that held it; using an invalidated handle gives unspecified (but memory safe) results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(usize);

#[derive(Clone)]
struct Node {
    key: i32,
    value: bool,
    height: i32,
    /// `height(left) - height(right)`.
    balance: i32,
    /// How many nodes in this subtree (including this one) hold `true`.
    true_count: usize,
    parent: usize,
    left: usize,
    right: usize,
}

impl Node {
    fn new(key: i32, value: bool) -> Self {
        Self {
            key,
            value,
            height: 0,
            balance: 0,
            true_count: usize::from(value),
            parent: SENTINEL,
            left: SENTINEL,
            right: SENTINEL,
        }
    }

    fn sentinel() -> Self {
        Self {
            key: 0,
            value: false,
            height: SENTINEL_HEIGHT,
            balance: 0,
            true_count: 0,
            parent: SENTINEL,
            left: SENTINEL,
            right: SENTINEL,
        }
    }
}

/// A self-balancing Binary Search Tree (specifically, an AVL tree) whose nodes also track how
/// many `true` values their subtree holds.
#[derive(Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    /// Arena slots freed by deletion, reused by later inserts.
    free: Vec<usize>,
    root: usize,
    min: usize,
    max: usize,
    len: usize,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len)
            .field(
                "root",
                &DebugNode {
                    tree: self,
                    index: self.root,
                },
            )
            .finish()
    }
}

struct DebugNode<'a> {
    tree: &'a Tree,
    index: usize,
}

impl fmt::Debug for DebugNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == SENTINEL {
            return f.write_str("Leaf");
        }
        let node = &self.tree.nodes[self.index];
        let child = |index| DebugNode {
            tree: self.tree,
            index,
        };
        f.debug_struct("Node")
            .field("key", &node.key)
            .field("value", &node.value)
            .field("height", &node.height)
            .field("true_count", &node.true_count)
            .field("left", &child(node.left))
            .field("right", &child(node.right))
            .finish()
    }
}

impl Tree {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel()],
            free: Vec::new(),
            root: SENTINEL,
            min: SENTINEL,
            max: SENTINEL,
            len: 0,
        }
    }

    /// Returns `true` if the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of keys in the tree.
    #[doc(alias = "size")]
    pub fn len(&self) -> usize {
        self.len
    }

    /// The height of the root. A tree with one node has height `0` and an empty tree has height
    /// `-1`.
    pub fn height(&self) -> i32 {
        self.nodes[self.root].height
    }

    /// Finds the value associated with `key`, if the key is in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use augmented_avl::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, true).unwrap();
    ///
    /// assert_eq!(tree.search(1), Some(true));
    /// assert_eq!(tree.search(42), None);
    /// ```
    pub fn search(&self, key: i32) -> Option<bool> {
        self.find(key).map(|index| self.nodes[index].value)
    }

    /// Inserts `key` with `value`.
    ///
    /// Returns the number of nodes that needed rebalancing on the way back up to the root: every
    /// ancestor whose height changed or which had to be rotated, plus the new node itself. Fails
    /// with [`AvlError::DuplicateKey`] without touching the tree if `key` is already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use augmented_avl::{AvlError, Tree};
    ///
    /// let mut tree = Tree::new();
    /// assert_eq!(tree.insert(1, true), Ok(1));
    /// assert_eq!(tree.insert(2, false), Ok(2));
    ///
    /// // This unbalances the tree at `1` which gets rotated under `2`.
    /// assert_eq!(tree.insert(3, true), Ok(3));
    /// assert_eq!(tree.height(), 1);
    ///
    /// assert_eq!(tree.insert(2, true), Err(AvlError::DuplicateKey(2)));
    /// assert_eq!(tree.search(2), Some(false));
    /// ```
    pub fn insert(&mut self, key: i32, value: bool) -> AvlResult<usize> {
        let parent = self.locate(key);
        if parent != SENTINEL && self.nodes[parent].key == key {
            debug!(key, "rejected insert of duplicate key");
            return Err(AvlError::DuplicateKey(key));
        }

        let node = self.alloc(key, value);
        self.nodes[node].parent = parent;
        if parent == SENTINEL {
            self.root = node;
            self.min = node;
            self.max = node;
        } else {
            if key < self.nodes[parent].key {
                self.nodes[parent].left = node;
            } else {
                self.nodes[parent].right = node;
            }
            if key < self.nodes[self.min].key {
                self.min = node;
            } else if key > self.nodes[self.max].key {
                self.max = node;
            }
        }
        self.len += 1;

        let count = 1 + self.rebalance_from(parent);
        trace!(key, count, "inserted");
        Ok(count)
    }

    /// Deletes `key` from the tree.
    ///
    /// Returns the number of nodes that needed rebalancing on the way back up to the root. Unlike
    /// [`insert`][Tree::insert], the removed node itself isn't counted. Fails with
    /// [`AvlError::KeyNotFound`] without touching the tree if `key` isn't present.
    ///
    /// # Examples
    ///
    /// ```
    /// use augmented_avl::{AvlError, Tree};
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, true).unwrap();
    /// tree.insert(2, false).unwrap();
    ///
    /// // Removing the leaf `2` shrinks `1` back down to height 0.
    /// assert_eq!(tree.delete(2), Ok(1));
    /// assert_eq!(tree.search(2), None);
    ///
    /// assert_eq!(tree.delete(2), Err(AvlError::KeyNotFound(2)));
    /// ```
    pub fn delete(&mut self, key: i32) -> AvlResult<usize> {
        let node = match self.find(key) {
            Some(node) => node,
            None => {
                debug!(key, "rejected delete of missing key");
                return Err(AvlError::KeyNotFound(key));
            }
        };

        // Both extremes need the old shape to find their replacements.
        if node == self.min {
            self.min = self.successor_index(node);
        }
        if node == self.max {
            self.max = self.predecessor_index(node);
        }

        let start = self.unlink(node);
        self.len -= 1;
        let count = self.rebalance_from(start);
        self.release(node);

        trace!(key, count, "deleted");
        Ok(count)
    }

    /// The value of the smallest key, or `None` if the tree is empty.
    pub fn min(&self) -> Option<bool> {
        self.min_node().map(|node| self.value(node))
    }

    /// The value of the largest key, or `None` if the tree is empty.
    pub fn max(&self) -> Option<bool> {
        self.max_node().map(|node| self.value(node))
    }

    /// The node holding the smallest key.
    pub fn min_node(&self) -> Option<NodeRef> {
        real(self.min)
    }

    /// The node holding the largest key.
    pub fn max_node(&self) -> Option<NodeRef> {
        real(self.max)
    }

    /// The root node.
    pub fn root(&self) -> Option<NodeRef> {
        real(self.root)
    }

    /// The node holding `key`.
    pub fn node(&self, key: i32) -> Option<NodeRef> {
        self.find(key).map(NodeRef)
    }

    /// The key stored at `node`.
    pub fn key(&self, node: NodeRef) -> i32 {
        self.nodes[node.0].key
    }

    /// The value stored at `node`.
    pub fn value(&self, node: NodeRef) -> bool {
        self.nodes[node.0].value
    }

    /// The left child of `node`.
    pub fn left(&self, node: NodeRef) -> Option<NodeRef> {
        real(self.nodes[node.0].left)
    }

    /// The right child of `node`.
    pub fn right(&self, node: NodeRef) -> Option<NodeRef> {
        real(self.nodes[node.0].right)
    }

    /// The parent of `node`, or `None` for the root.
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        real(self.nodes[node.0].parent)
    }

    /// The node with the smallest key in the subtree rooted at `node`.
    pub fn subtree_min(&self, node: NodeRef) -> NodeRef {
        NodeRef(self.subtree_min_index(node.0))
    }

    /// The node with the largest key in the subtree rooted at `node`.
    pub fn subtree_max(&self, node: NodeRef) -> NodeRef {
        NodeRef(self.subtree_max_index(node.0))
    }

    /// The node holding the next larger key, or `None` if `node` holds the largest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use augmented_avl::Tree;
    ///
    /// let mut tree = Tree::new();
    /// for key in [20, 10, 30] {
    ///     tree.insert(key, false).unwrap();
    /// }
    ///
    /// let ten = tree.node(10).unwrap();
    /// let twenty = tree.successor(ten).unwrap();
    /// assert_eq!(tree.key(twenty), 20);
    ///
    /// let thirty = tree.max_node().unwrap();
    /// assert_eq!(tree.successor(thirty), None);
    /// ```
    pub fn successor(&self, node: NodeRef) -> Option<NodeRef> {
        real(self.successor_index(node.0))
    }

    /// The node holding the next smaller key, or `None` if `node` holds the smallest key.
    pub fn predecessor(&self, node: NodeRef) -> Option<NodeRef> {
        real(self.predecessor_index(node.0))
    }

    /// Iterates over `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// All keys in ascending order.
    #[doc(alias = "keysToArray")]
    pub fn keys_to_vec(&self) -> Vec<i32> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// All values, ordered by their keys.
    #[doc(alias = "valuesToArray")]
    pub fn values_to_vec(&self) -> Vec<bool> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// The XOR of the values of every key `<= key`. That is, `true` if an odd number of those
    /// values are `true`.
    ///
    /// Runs in `O(lg N)` by climbing from `key`'s node to the root and, at every node reached from
    /// its right subtree, picking up the node's own value and its left subtree's `true` count.
    /// Fails with [`AvlError::KeyNotFound`] if `key` isn't in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use augmented_avl::{AvlError, Tree};
    ///
    /// let mut tree = Tree::new();
    /// for (key, value) in [(1, true), (2, true), (3, false), (4, true)] {
    ///     tree.insert(key, value).unwrap();
    /// }
    ///
    /// assert_eq!(tree.prefix_xor(1), Ok(true));
    /// assert_eq!(tree.prefix_xor(2), Ok(false));
    /// assert_eq!(tree.prefix_xor(3), Ok(false));
    /// assert_eq!(tree.prefix_xor(4), Ok(true));
    /// assert_eq!(tree.prefix_xor(5), Err(AvlError::KeyNotFound(5)));
    /// ```
    pub fn prefix_xor(&self, key: i32) -> AvlResult<bool> {
        let Some(node) = self.find(key) else {
            debug!(key, "rejected prefix query for missing key");
            return Err(AvlError::KeyNotFound(key));
        };

        let mut total = 0;
        let mut prev = SENTINEL;
        let mut curr = node;
        while curr != SENTINEL {
            let n = &self.nodes[curr];
            // Only `node` itself has `prev == SENTINEL`, so after that this means "came up from
            // the right".
            if curr == node || prev == n.right {
                total += usize::from(n.value) + self.nodes[n.left].true_count;
            }
            prev = curr;
            curr = n.parent;
        }

        Ok(total % 2 == 1)
    }

    /// Same result as [`prefix_xor`][Tree::prefix_xor] but computed in `O(N)` by walking
    /// successors up from the smallest key.
    pub fn succ_prefix_xor(&self, key: i32) -> AvlResult<bool> {
        if self.find(key).is_none() {
            debug!(key, "rejected prefix query for missing key");
            return Err(AvlError::KeyNotFound(key));
        }

        let mut total = 0;
        let mut curr = self.min;
        while curr != SENTINEL && self.nodes[curr].key <= key {
            total += usize::from(self.nodes[curr].value);
            curr = self.successor_index(curr);
        }

        Ok(total % 2 == 1)
    }

    /// Walks the whole tree checking ordering, heights, balance factors, `true` counts, parent
    /// links, the cached extremes and the size.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.root != SENTINEL && self.nodes[self.root].parent != SENTINEL {
            return Err(InvariantViolation::ParentLink {
                key: self.nodes[self.root].key,
            });
        }
        let counted = self.check_subtree(self.root, None, None)?;
        if counted != self.len {
            return Err(InvariantViolation::Size {
                stored: self.len,
                counted,
            });
        }

        let expected_min = match self.root {
            SENTINEL => SENTINEL,
            root => self.subtree_min_index(root),
        };
        if self.min != expected_min {
            return Err(InvariantViolation::Extreme { which: "min" });
        }
        let expected_max = match self.root {
            SENTINEL => SENTINEL,
            root => self.subtree_max_index(root),
        };
        if self.max != expected_max {
            return Err(InvariantViolation::Extreme { which: "max" });
        }

        Ok(())
    }

    /// Checks the subtree rooted at `index`, whose keys must lie strictly between `low` and
    /// `high`. Returns the number of nodes in it.
    fn check_subtree(
        &self,
        index: usize,
        low: Option<i32>,
        high: Option<i32>,
    ) -> Result<usize, InvariantViolation> {
        if index == SENTINEL {
            return Ok(0);
        }
        let node = &self.nodes[index];
        let key = node.key;
        if low.map_or(false, |low| key <= low) || high.map_or(false, |high| key >= high) {
            return Err(InvariantViolation::Ordering { key });
        }
        for child in [node.left, node.right] {
            if child != SENTINEL && self.nodes[child].parent != index {
                return Err(InvariantViolation::ParentLink {
                    key: self.nodes[child].key,
                });
            }
        }

        let left_count = self.check_subtree(node.left, low, Some(key))?;
        let right_count = self.check_subtree(node.right, Some(key), high)?;

        let (left, right) = (&self.nodes[node.left], &self.nodes[node.right]);
        let height = 1 + left.height.max(right.height);
        if node.height != height {
            return Err(InvariantViolation::Height {
                key,
                stored: node.height,
                expected: height,
            });
        }
        let balance = left.height - right.height;
        if node.balance != balance || balance.abs() >= ILLEGAL_BALANCE {
            return Err(InvariantViolation::Balance {
                key,
                stored: node.balance,
                expected: balance,
            });
        }
        let true_count = left.true_count + right.true_count + usize::from(node.value);
        if node.true_count != true_count {
            return Err(InvariantViolation::TrueCount {
                key,
                stored: node.true_count,
                expected: true_count,
            });
        }

        Ok(left_count + right_count + 1)
    }

    /// Returns the node holding `key`, if there is one.
    fn find(&self, key: i32) -> Option<usize> {
        let index = self.locate(key);
        (index != SENTINEL && self.nodes[index].key == key).then_some(index)
    }

    /// Returns the node holding `key` if it's present. Otherwise returns the node that would be
    /// its parent, which is the sentinel for an empty tree.
    fn locate(&self, key: i32) -> usize {
        let mut prev = SENTINEL;
        let mut curr = self.root;
        while curr != SENTINEL {
            let node = &self.nodes[curr];
            prev = curr;
            curr = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Equal => return curr,
                Ordering::Greater => node.right,
            };
        }
        prev
    }

    fn alloc(&mut self, key: i32, value: bool) -> usize {
        let node = Node::new(key, value);
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = node;
                index
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) {
        if self.len == 0 {
            self.nodes.truncate(1);
            self.free.clear();
        } else {
            self.nodes[index] = Node::sentinel();
            self.free.push(index);
        }
    }

    fn subtree_min_index(&self, mut index: usize) -> usize {
        while self.nodes[index].left != SENTINEL {
            index = self.nodes[index].left;
        }
        index
    }

    fn subtree_max_index(&self, mut index: usize) -> usize {
        while self.nodes[index].right != SENTINEL {
            index = self.nodes[index].right;
        }
        index
    }

    fn successor_index(&self, mut index: usize) -> usize {
        let right = self.nodes[index].right;
        if right != SENTINEL {
            return self.subtree_min_index(right);
        }
        let mut parent = self.nodes[index].parent;
        while parent != SENTINEL && self.nodes[parent].right == index {
            index = parent;
            parent = self.nodes[index].parent;
        }
        parent
    }

    fn predecessor_index(&self, mut index: usize) -> usize {
        let left = self.nodes[index].left;
        if left != SENTINEL {
            return self.subtree_max_index(left);
        }
        let mut parent = self.nodes[index].parent;
        while parent != SENTINEL && self.nodes[parent].left == index {
            index = parent;
            parent = self.nodes[index].parent;
        }
        parent
    }

    fn set_parent(&mut self, child: usize, parent: usize) {
        if child != SENTINEL {
            self.nodes[child].parent = parent;
        }
    }

    /// Points whichever slot of `parent` held `old` (or the root, for the sentinel) at `new`.
    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == SENTINEL {
            self.root = new;
        } else if self.nodes[parent].left == old {
            self.nodes[parent].left = new;
        } else {
            self.nodes[parent].right = new;
        }
    }

    /// Detaches `index` from the tree, keeping the remaining nodes in order. Returns the node
    /// from which heights, balance factors and counts must be fixed up.
    fn unlink(&mut self, index: usize) -> usize {
        let Node {
            parent,
            left,
            right,
            ..
        } = self.nodes[index];

        let start = match (left != SENTINEL, right != SENTINEL) {
            (false, false) => {
                self.replace_child(parent, index, SENTINEL);
                parent
            }
            (true, true) => {
                let successor = self.subtree_min_index(right);
                let successor_parent = self.nodes[successor].parent;
                // If the successor was our right child then it is the lowest node whose subtree
                // changed once it takes our place.
                let start = if successor_parent == index {
                    successor
                } else {
                    successor_parent
                };

                // The successor has no left child so this can't recurse any further.
                self.unlink(successor);

                // Re-read the children: unlinking the successor may have replaced our right child.
                let Node {
                    left: new_left,
                    right: new_right,
                    ..
                } = self.nodes[index];
                self.nodes[successor].left = new_left;
                self.set_parent(new_left, successor);
                self.nodes[successor].right = new_right;
                self.set_parent(new_right, successor);
                self.nodes[successor].parent = parent;
                self.replace_child(parent, index, successor);
                self.maintain(successor);
                start
            }
            _ => {
                let child = if left != SENTINEL { left } else { right };
                self.nodes[child].parent = parent;
                self.replace_child(parent, index, child);
                child
            }
        };

        let node = &mut self.nodes[index];
        node.parent = SENTINEL;
        node.left = SENTINEL;
        node.right = SENTINEL;
        start
    }

    /// Recomputes height, balance factor and `true` count of `index` from its children.
    fn maintain(&mut self, index: usize) {
        debug_assert_ne!(index, SENTINEL, "the sentinel is never maintained");
        let Node { left, right, .. } = self.nodes[index];
        let (left, right) = (&self.nodes[left], &self.nodes[right]);
        let height = 1 + left.height.max(right.height);
        let balance = left.height - right.height;
        let true_count = left.true_count + right.true_count;

        let node = &mut self.nodes[index];
        node.height = height;
        node.balance = balance;
        node.true_count = true_count + usize::from(node.value);
    }

    /// Walks from `index` up to the root fixing each node's fields and rotating where the
    /// balance factor became illegal. Returns how many nodes changed height or were rotated.
    fn rebalance_from(&mut self, mut index: usize) -> usize {
        let mut count = 0;
        while index != SENTINEL {
            let old_height = self.nodes[index].height;
            self.maintain(index);

            let height_changed = old_height != self.nodes[index].height;
            let illegal = self.nodes[index].balance.abs() >= ILLEGAL_BALANCE;
            if height_changed || illegal {
                count += 1;
                if illegal {
                    self.rotate(index);
                    debug_assert!(self.nodes[index].balance.abs() < ILLEGAL_BALANCE);
                }
            }

            // After a rotation this is the node that took our place, which still needs fixing.
            index = self.nodes[index].parent;
        }
        count
    }

    /// Rotates a node with a balance factor of `2` or `-2`, first rotating its heavy child if
    /// that child leans the other way.
    ///
    /// See https://en.wikipedia.org/wiki/AVL_tree#Rebalancing for terminology.
    fn rotate(&mut self, index: usize) {
        let node = &self.nodes[index];
        if node.balance == ILLEGAL_BALANCE {
            let left = node.left;
            if self.nodes[left].balance == -1 {
                self.rotate_left(left);
            }
            self.rotate_right(index);
        } else if node.balance == -ILLEGAL_BALANCE {
            let right = node.right;
            if self.nodes[right].balance == 1 {
                self.rotate_right(right);
            }
            self.rotate_left(index);
        }
    }

    /// Rotate `index` to the right. This moves the left child up vertically and `index` down
    /// vertically. Only `index`'s fields are fixed; the caller fixes the new subtree root.
    ///
    /// # Diagram
    ///
    /// ```text
    ///      parent               parent
    ///        /                    /
    ///     index                pivot
    ///     /   \                /   \
    ///  pivot   z   rotate ->  x   index
    ///  /   \                      /   \
    /// x     y                    y     z
    /// ```
    fn rotate_right(&mut self, index: usize) {
        let pivot = self.nodes[index].left;
        debug_assert_ne!(pivot, SENTINEL, "rotate right => left child");
        trace!(key = self.nodes[index].key, "rotating right");

        let inner = self.nodes[pivot].right;
        self.nodes[index].left = inner;
        self.set_parent(inner, index);

        let parent = self.nodes[index].parent;
        self.nodes[pivot].parent = parent;
        self.replace_child(parent, index, pivot);

        self.nodes[pivot].right = index;
        self.nodes[index].parent = pivot;
        self.maintain(index);
    }

    /// Mirror image of [`rotate_right`][Tree::rotate_right].
    fn rotate_left(&mut self, index: usize) {
        let pivot = self.nodes[index].right;
        debug_assert_ne!(pivot, SENTINEL, "rotate left => right child");
        trace!(key = self.nodes[index].key, "rotating left");

        let inner = self.nodes[pivot].left;
        self.nodes[index].right = inner;
        self.set_parent(inner, index);

        let parent = self.nodes[index].parent;
        self.nodes[pivot].parent = parent;
        self.replace_child(parent, index, pivot);

        self.nodes[pivot].left = index;
        self.nodes[index].parent = pivot;
        self.maintain(index);
    }
}

fn real(index: usize) -> Option<NodeRef> {
    (index != SENTINEL).then_some(NodeRef(index))
}

/// An in-order iterator over a [`Tree`]'s `(key, value)` pairs. See [`Tree::iter`].
pub struct Iter<'a> {
    tree: &'a Tree,
    /// Nodes whose left subtree is being (or has been) visited, deepest last.
    stack: Vec<usize>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::with_capacity((tree.height() + 1).max(0) as usize),
            remaining: tree.len,
        };
        iter.push_left_spine(tree.root);
        iter
    }

    fn push_left_spine(&mut self, mut index: usize) {
        while index != SENTINEL {
            self.stack.push(index);
            index = self.tree.nodes[index].left;
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = (i32, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree.nodes[index];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Tree {
    type Item = (i32, bool);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
