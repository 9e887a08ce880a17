use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Handle, RawDosTree};
use crate::{DosError, InvariantViolation};

mod capacity;
mod order_statistic;

pub use crate::Rank;

/// An ordered multimap based on a red-black tree augmented with subtree sizes.
///
/// Given a key type with a [total order], a `DosTree` stores its entries in key order. Unlike
/// `BTreeMap`, inserting a key that is already present does not replace anything: the new
/// entry is placed after every equal key, so the tree behaves as a multiset of keys with one
/// payload per entry.
///
/// Every node records the number of entries in its subtree, which lets the tree answer
/// order-statistic queries ([`rank`](DosTree::rank) and [`select`](DosTree::select)) in
/// O(log n) without walking the entries.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering relative to
/// any other key, as determined by the [`Ord`] trait, changes while it is in the tree. The
/// behavior resulting from such a logic error is not specified, but will be encapsulated to the
/// `DosTree` that observed the logic error and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use dos_tree::{DosError, DosTree};
///
/// let mut tree = DosTree::new();
/// for key in [5, 3, 8, 1, 4, 7, 10] {
///     tree.insert(key, key * 10);
/// }
///
/// assert_eq!(tree.find(&4), Ok(&40));
/// assert_eq!(tree.select(1), Ok(&1));
/// assert_eq!(tree.select(4), Ok(&5));
/// assert_eq!(tree.rank(&8), Ok(6));
///
/// assert_eq!(tree.delete(&4), Ok((4, 40)));
/// assert_eq!(tree.find(&4), Err(DosError::NotFound));
/// assert_eq!(tree.rank(&8), Ok(5));
/// ```
///
/// Duplicate keys are kept side by side:
///
/// ```
/// use dos_tree::DosTree;
///
/// let mut tree = DosTree::new();
/// tree.insert("b", 1);
/// tree.insert("a", 2);
/// tree.insert("b", 3);
///
/// let entries: Vec<_> = tree.iter().collect();
/// assert_eq!(entries, [(&"a", &2), (&"b", &1), (&"b", &3)]);
/// ```
///
/// [total order]: https://en.wikipedia.org/wiki/Total_order
pub struct DosTree<K, V> {
    raw: RawDosTree<K, V>,
}

/// An iterator over the entries of a `DosTree`, in key order.
///
/// This `struct` is created by the [`iter`] method on [`DosTree`]. See its
/// documentation for more.
///
/// [`iter`]: DosTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    raw: &'a RawDosTree<K, V>,
    front: Handle,
    remaining: usize,
}

/// An iterator over the keys of a `DosTree`.
///
/// This `struct` is created by the [`keys`] method on [`DosTree`].
///
/// [`keys`]: DosTree::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `DosTree`.
///
/// This `struct` is created by the [`values`] method on [`DosTree`].
///
/// [`values`]: DosTree::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> DosTree<K, V> {
    /// Makes a new, empty `DosTree`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use dos_tree::DosTree;
    ///
    /// let mut tree = DosTree::new();
    /// tree.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        DosTree { raw: RawDosTree::new() }
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Complexity
    ///
    /// O(1) - read from the root's subtree size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the tree, removing all entries.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    ///
    /// The red-black invariants keep this within `2 * log2(len + 1)`.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use dos_tree::DosTree;
    ///
    /// let tree: DosTree<u32, ()> = (0..1000).map(|k| (k, ())).collect();
    /// assert!(tree.height() <= 2 * 10);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the first entry in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use dos_tree::DosTree;
    ///
    /// let mut tree = DosTree::new();
    /// assert_eq!(tree.first(), None);
    /// tree.insert(2, "b");
    /// tree.insert(1, "a");
    /// assert_eq!(tree.first(), Some((&1, &"a")));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        let handle = self.raw.minimum(self.raw.root());
        (!handle.is_nil()).then(|| self.raw.key_value(handle))
    }

    /// Returns the last entry in key order.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        let handle = self.raw.maximum(self.raw.root());
        (!handle.is_nil()).then(|| self.raw.key_value(handle))
    }

    /// Gets an iterator over the entries of the tree, sorted by key. Equal keys appear in
    /// insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            raw: &self.raw,
            front: self.raw.minimum(self.raw.root()),
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V> DosTree<K, V> {
    /// Inserts an entry. Always succeeds; an equal key already in the tree is kept and the new
    /// entry is ordered after it.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use dos_tree::DosTree;
    ///
    /// let mut tree = DosTree::new();
    /// tree.insert(37, "a");
    /// tree.insert(37, "b");
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        self.raw.insert(key, value);
    }

    /// Removes one entry with the given key and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`DosError::NotFound`] if no entry has this key; the tree is unchanged.
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
    /// let mut tree = DosTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.delete(&1), Ok((1, "a")));
    /// assert_eq!(tree.delete(&1), Err(DosError::NotFound));
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> Result<(K, V), DosError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key).ok_or(DosError::NotFound)
    }

    /// Returns a reference to the value stored with the key.
    ///
    /// # Errors
    ///
    /// Returns [`DosError::NotFound`] if no entry has this key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find<Q>(&self, key: &Q) -> Result<&V, DosError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and its value.
    ///
    /// # Errors
    ///
    /// Returns [`DosError::NotFound`] if no entry has this key.
    pub fn find_key_value<Q>(&self, key: &Q) -> Result<(&K, &V), DosError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(key).ok_or(DosError::NotFound)?;
        Ok(self.raw.key_value(handle))
    }

    /// Returns a mutable reference to the value stored with the key.
    ///
    /// # Errors
    ///
    /// Returns [`DosError::NotFound`] if no entry has this key.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Result<&mut V, DosError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(key).ok_or(DosError::NotFound)?;
        Ok(self.raw.key_value_mut(handle).1)
    }

    /// Returns `true` if the tree holds at least one entry with the key.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Replaces the value stored with the key, returning the previous value. The tree's
    /// shape is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`DosError::NotFound`] if no entry has this key.
    ///
    /// # Examples
    ///
    /// ```
    /// use dos_tree::DosTree;
    ///
    /// let mut tree = DosTree::new();
    /// tree.insert(7, 7);
    /// assert_eq!(tree.update(&7, 70), Ok(7));
    /// assert_eq!(tree.find(&7), Ok(&70));
    /// ```
    pub fn update<Q>(&mut self, key: &Q, value: V) -> Result<V, DosError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(key).ok_or(DosError::NotFound)?;
        Ok(self.raw.replace_value(handle, value))
    }

    /// Checks every structural invariant of the tree: search order, red-black coloring,
    /// black-height, subtree sizes and parent links.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found. A tree only ever mutated through this
    /// API always validates.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.raw.validate()
    }
}

impl<K, V> Default for DosTree<K, V> {
    /// Creates an empty `DosTree`.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for DosTree<K, V> {
    fn clone(&self) -> Self {
        DosTree { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for DosTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for DosTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for DosTree<K, V> {}

impl<K: Ord, V> FromIterator<(K, V)> for DosTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = DosTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for DosTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for DosTree<K, V> {
    /// Converts a `[(K, V); N]` into a `DosTree<K, V>`.
    ///
    /// ```
    /// use dos_tree::DosTree;
    ///
    /// let tree = DosTree::from([(1, 2), (3, 4)]);
    /// assert_eq!(tree.len(), 2);
    /// ```
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V> IntoIterator for &'a DosTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.front;
        self.front = self.raw.successor(handle);
        self.remaining -= 1;
        Some(self.raw.key_value(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            front: self.front,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;

    #[test]
    fn iterators_are_exact_size() {
        let tree = DosTree::from([(3, 'c'), (1, 'a'), (2, 'b')]);
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some((&1, &'a')));
        assert_eq!(iter.len(), 2);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(tree.values().copied().collect::<Vec<_>>(), ['a', 'b', 'c']);
    }

    #[test]
    fn iteration_is_fused() {
        let tree = DosTree::from([(1, ())]);
        let mut iter = tree.iter();
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn debug_lists_entries_in_order() {
        let tree = DosTree::from([(2, "b"), (1, "a")]);
        assert_eq!(format!("{tree:?}"), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn equality_compares_entries() {
        let a = DosTree::from([(1, 1), (2, 2)]);
        let b = DosTree::from([(2, 2), (1, 1)]);
        let c = DosTree::from([(1, 1), (2, 3)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn find_mut_changes_value_in_place() {
        let mut tree = DosTree::from([(1, 10), (2, 20)]);
        *tree.find_mut(&2).expect("present") += 1;
        assert_eq!(tree.find(&2), Ok(&21));
        assert_eq!(tree.find_mut(&3), Err(DosError::NotFound));
    }

    #[test]
    fn update_missing_key_reports_not_found() {
        let mut tree: DosTree<i32, i32> = DosTree::new();
        assert_eq!(tree.update(&1, 5), Err(DosError::NotFound));
        assert!(tree.is_empty());
    }

    #[test]
    fn first_and_last() {
        let tree = DosTree::from([(5, ()), (1, ()), (9, ())]);
        assert_eq!(tree.first(), Some((&1, &())));
        assert_eq!(tree.last(), Some((&9, &())));
    }

    #[test]
    fn borrowed_key_lookup() {
        let mut tree = DosTree::new();
        tree.insert(alloc::string::String::from("alpha"), 1);
        assert_eq!(tree.find("alpha"), Ok(&1));
        assert!(tree.contains("alpha"));
        assert_eq!(tree.rank("alpha"), Ok(1));
    }
}
