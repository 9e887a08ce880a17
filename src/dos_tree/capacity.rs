use super::DosTree;
use crate::raw::RawDosTree;

impl<K, V> DosTree<K, V> {
    /// Creates an empty tree with room for at least `capacity` entries before reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use dos_tree::DosTree;
    ///
    /// let tree: DosTree<i32, i32> = DosTree::with_capacity(32);
    /// assert!(tree.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        DosTree {
            raw: RawDosTree::with_capacity(capacity),
        }
    }

    /// Returns the number of entries the tree can hold without reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use dos_tree::DosTree;
    ///
    /// let tree: DosTree<i32, i32> = DosTree::with_capacity(32);
    /// assert_eq!(tree.capacity(), 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
