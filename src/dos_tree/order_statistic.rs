use core::borrow::Borrow;
use core::ops::{Index, IndexMut};

use super::DosTree;
use crate::{DosError, Rank};

impl<K: Ord, V> DosTree<K, V> {
    /// Returns the 1-based position of `key` in sorted order.
    ///
    /// When the key is stored more than once, the rank is that of the entry [`find`] returns.
    ///
    /// # Errors
    ///
    /// Returns [`DosError::NotFound`] if no entry has this key.
    ///
    /// # Complexity
    ///
    /// O(log n): the rank is summed from subtree sizes on the way back up to the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use dos_tree::{DosError, DosTree};
    ///
    /// let tree = DosTree::from([(10, "a"), (20, "b")]);
    ///
    /// assert_eq!(tree.rank(&10), Ok(1));
    /// assert_eq!(tree.rank(&20), Ok(2));
    /// assert_eq!(tree.rank(&15), Err(DosError::NotFound));
    /// ```
    ///
    /// [`find`]: DosTree::find
    pub fn rank<Q>(&self, key: &Q) -> Result<usize, DosError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(key).ok_or(DosError::NotFound)?;
        Ok(self.raw.rank_of_node(handle))
    }
}

impl<K, V> DosTree<K, V> {
    /// Returns the key at 1-based position `rank` in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`DosError::OutOfRange`] unless `1 <= rank <= len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use dos_tree::{DosError, DosTree};
    ///
    /// let tree = DosTree::from([("a", 10), ("c", 30), ("b", 20)]);
    ///
    /// assert_eq!(tree.select(2), Ok(&"b"));
    /// assert_eq!(tree.select(0), Err(DosError::OutOfRange { rank: 0, len: 3 }));
    /// assert_eq!(tree.select(4), Err(DosError::OutOfRange { rank: 4, len: 3 }));
    /// ```
    pub fn select(&self, rank: usize) -> Result<&K, DosError> {
        let handle = self.raw.select(rank).ok_or(DosError::OutOfRange { rank, len: self.len() })?;
        Ok(self.raw.key(handle))
    }

    /// Returns the entry at 1-based position `rank` in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`DosError::OutOfRange`] unless `1 <= rank <= len`.
    pub fn select_key_value(&self, rank: usize) -> Result<(&K, &V), DosError> {
        let handle = self.raw.select(rank).ok_or(DosError::OutOfRange { rank, len: self.len() })?;
        Ok(self.raw.key_value(handle))
    }

    /// Returns the entry at 1-based position `rank`, with a mutable value.
    ///
    /// The key is returned as a shared reference because mutating it would
    /// violate the tree's ordering invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DosError::OutOfRange`] unless `1 <= rank <= len`.
    pub fn select_mut(&mut self, rank: usize) -> Result<(&K, &mut V), DosError> {
        let handle = self.raw.select(rank).ok_or(DosError::OutOfRange { rank, len: self.len() })?;
        Ok(self.raw.key_value_mut(handle))
    }
}

/// Indexes into the tree by rank.
///
/// # Panics
///
/// Panics if `rank` is outside `1..=len`.
///
/// # Examples
///
/// ```
/// use dos_tree::{DosTree, Rank};
///
/// let tree = DosTree::from([("a", 1), ("b", 2)]);
///
/// assert_eq!(tree[Rank(1)], 1);
/// assert_eq!(tree[Rank(2)], 2);
/// ```
impl<K, V> Index<Rank> for DosTree<K, V> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.select_key_value(rank.0).map(|(_, v)| v).expect("rank out of range")
    }
}

/// Mutably indexes into the tree by rank.
///
/// # Panics
///
/// Panics if `rank` is outside `1..=len`.
///
/// # Examples
///
/// ```
/// use dos_tree::{DosTree, Rank};
///
/// let mut tree = DosTree::from([("a", 1), ("b", 2)]);
/// tree[Rank(2)] = 5;
///
/// assert_eq!(tree.find("b"), Ok(&5));
/// ```
impl<K, V> IndexMut<Rank> for DosTree<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.select_mut(rank.0).map(|(_, v)| v).expect("rank out of range")
    }
}
