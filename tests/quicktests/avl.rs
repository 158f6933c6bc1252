use augmented_avl::{AvlError, Tree};

use std::collections::{HashMap, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a hashmap.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same set of keys in the map.
fn do_ops(ops: &[Op], tree: &mut Tree, map: &mut HashMap<i32, bool>) {
    for op in ops {
        match *op {
            Op::Insert(k, v) => {
                let key = i32::from(k);
                if tree.insert(key, v).is_ok() {
                    map.insert(key, v);
                }
            }
            Op::Delete(k) => {
                let key = i32::from(k);
                if tree.delete(key).is_ok() {
                    map.remove(&key);
                }
            }
        }
    }
}

fn tree_of(xs: &[i8]) -> Tree {
    let mut tree = Tree::new();
    for x in xs {
        // Duplicates are rejected, the first value wins.
        let _ = tree.insert(i32::from(*x), *x % 2 == 0);
    }
    tree
}

quickcheck::quickcheck! {
    fn fuzz_multiple_operations_i8(ops: Vec<Op>) -> bool {
        let mut tree = Tree::new();
        let mut map = HashMap::new();

        do_ops(&ops, &mut tree, &mut map);
        tree.check_invariants().is_ok()
            && tree.len() == map.len()
            && map.iter().all(|(key, value)| tree.search(*key) == Some(*value))
    }
}

quickcheck::quickcheck! {
    fn contains(xs: Vec<i8>) -> bool {
        let tree = tree_of(&xs);

        xs.iter().all(|x| tree.search(i32::from(*x)) == Some(*x % 2 == 0))
    }
}

quickcheck::quickcheck! {
    fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
        let tree = tree_of(&xs);
        let added: HashSet<_> = xs.into_iter().collect();
        let nots: HashSet<_> = nots.into_iter().collect();
        let mut nots = nots.difference(&added);

        nots.all(|x| tree.search(i32::from(*x)).is_none())
    }
}

quickcheck::quickcheck! {
    fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
        let mut tree = tree_of(&xs);
        for delete in &deletes {
            let _ = tree.delete(i32::from(*delete));
        }

        let deleted: HashSet<_> = deletes.iter().collect();
        deletes.iter().all(|x| tree.search(i32::from(*x)).is_none())
            && xs.iter().filter(|x| !deleted.contains(x)).all(|x| tree.search(i32::from(*x)).is_some())
            && tree.check_invariants().is_ok()
    }
}

quickcheck::quickcheck! {
    fn keys_are_sorted_and_sized(xs: Vec<i8>) -> bool {
        let tree = tree_of(&xs);
        let keys = tree.keys_to_vec();

        keys.windows(2).all(|w| w[0] < w[1])
            && keys.len() == tree.len()
            && tree.values_to_vec().len() == tree.len()
            && tree.iter().count() == tree.len()
    }
}

quickcheck::quickcheck! {
    fn min_and_max_match_keys(ops: Vec<Op>) -> bool {
        let mut tree = Tree::new();
        let mut map = HashMap::new();
        do_ops(&ops, &mut tree, &mut map);

        let keys = tree.keys_to_vec();
        match (keys.first(), keys.last()) {
            (Some(first), Some(last)) => {
                tree.min() == tree.search(*first)
                    && tree.max() == tree.search(*last)
                    && tree.min_node().map(|n| tree.key(n)) == Some(*first)
                    && tree.max_node().map(|n| tree.key(n)) == Some(*last)
            }
            _ => tree.min().is_none() && tree.max().is_none(),
        }
    }
}

quickcheck::quickcheck! {
    fn prefix_xor_matches_brute_force(ops: Vec<Op>) -> bool {
        let mut tree = Tree::new();
        let mut map = HashMap::new();
        do_ops(&ops, &mut tree, &mut map);

        let mut parity = false;
        tree.iter().all(|(key, value)| {
            parity ^= value;
            tree.prefix_xor(key) == Ok(parity) && tree.succ_prefix_xor(key) == Ok(parity)
        })
    }
}

quickcheck::quickcheck! {
    fn duplicate_and_missing_keys_are_rejected(xs: Vec<i8>, probe: i8) -> bool {
        let mut tree = tree_of(&xs);
        let before = tree.keys_to_vec();
        let probe = i32::from(probe);

        let rejected = if tree.search(probe).is_some() {
            tree.insert(probe, true) == Err(AvlError::DuplicateKey(probe))
        } else {
            tree.delete(probe) == Err(AvlError::KeyNotFound(probe))
                && tree.prefix_xor(probe) == Err(AvlError::KeyNotFound(probe))
        };

        rejected && tree.keys_to_vec() == before && tree.len() == before.len()
    }
}

#[test]
fn delete_root_of_balanced_tree() {
    let mut tree = Tree::new();
    for key in [4, 2, 6, 1, 3, 5, 7] {
        tree.insert(key, key > 3).unwrap();
    }
    let root = tree.root().map(|n| tree.key(n)).unwrap();
    assert_eq!(root, 4);

    tree.delete(root).unwrap();

    assert_eq!(tree.check_invariants(), Ok(()));
    assert_eq!(tree.keys_to_vec(), vec![1, 2, 3, 5, 6, 7]);
    assert_eq!(tree.len(), 6);
}

#[test]
fn large_sequential_tree_stays_logarithmic() {
    let mut tree = Tree::new();
    for key in 0..1023 {
        tree.insert(key, key % 3 == 0).unwrap();
    }
    assert_eq!(tree.height(), 9);
    assert_eq!(tree.check_invariants(), Ok(()));

    for key in (0..1023).step_by(2) {
        tree.delete(key).unwrap();
    }
    assert_eq!(tree.len(), 511);
    assert!(tree.height() <= 12);
    assert_eq!(tree.check_invariants(), Ok(()));
}
