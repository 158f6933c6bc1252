use quickcheck::{Arbitrary, Gen};

mod avl;

/// An enum for the various kinds of "things" to do to
/// a tree in a quicktest.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Op {
    /// Insert the key and value into the tree
    Insert(i8, bool),
    /// Delete the key from the tree
    Delete(i8),
}

impl Arbitrary for Op {
    /// Tells quickcheck how to randomly choose an operation
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 0, 1]).unwrap() {
            0 => Op::Insert(i8::arbitrary(g), bool::arbitrary(g)),
            1 => Op::Delete(i8::arbitrary(g)),
            _ => unreachable!(),
        }
    }
}
