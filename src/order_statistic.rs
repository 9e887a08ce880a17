/// A one-based rank into the sorted order of a tree: `Rank(1)` is the smallest entry.
///
/// # Examples
///
/// ```
/// use dos_tree::{DosTree, Rank};
///
/// let mut tree = DosTree::new();
/// tree.insert("a", 10);
/// tree.insert("b", 20);
///
/// assert_eq!(tree[Rank(1)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
