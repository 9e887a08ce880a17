use core::borrow::Borrow;
use core::cmp::Ordering;

use log::{debug, trace};
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Direction, Node};
use super::size::Size;
use crate::InvariantViolation;

/// The red-black core backing `DosTree`.
///
/// Every missing child, and the root's parent, is [`Handle::NIL`]. Reading the color of NIL
/// yields black and its size yields zero, so the balancing code never special-cases leaves.
/// The sentinel's parent slot is owned by the tree: transplant writes it when a NIL child
/// replaces a removed node, the delete fixup reads it, and it is reset before the operation
/// returns.
#[derive(Clone)]
pub(crate) struct RawDosTree<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Arena storing all values (separate from nodes so entries move by handle).
    values: Arena<V>,
    /// Handle to the root node, or NIL if the tree is empty.
    root: Handle,
    /// Parent slot of the per-tree sentinel.
    nil_parent: Handle,
}

impl<K, V> RawDosTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: Handle::NIL,
            nil_parent: Handle::NIL,
        }
    }

    /// Creates a new tree with the specified capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: Handle::NIL,
            nil_parent: Handle::NIL,
        }
    }

    /// Returns the number of entries, read from the root's subtree size.
    pub(crate) fn len(&self) -> usize {
        self.size(self.root)
    }

    /// Returns true if the tree contains no entries.
    pub(crate) fn is_empty(&self) -> bool {
        debug_assert_eq!(self.root.is_nil(), self.nodes.is_empty());
        self.nodes.is_empty()
    }

    /// Returns the capacity of the tree.
    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Clears all entries from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = Handle::NIL;
        self.nil_parent = Handle::NIL;
    }

    /// Returns the root handle (NIL when empty).
    pub(crate) fn root(&self) -> Handle {
        self.root
    }

    // ─── Sentinel-aware accessors ───────────────────────────────────────────

    #[inline]
    fn color(&self, handle: Handle) -> Color {
        if handle.is_nil() {
            Color::Black
        } else {
            self.nodes.get(handle).color()
        }
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        if handle.is_nil() {
            debug_assert_eq!(color, Color::Black, "the sentinel must stay black");
        } else {
            self.nodes.get_mut(handle).set_color(color);
        }
    }

    #[inline]
    fn size(&self, handle: Handle) -> usize {
        if handle.is_nil() {
            0
        } else {
            self.nodes.get(handle).size().to_usize()
        }
    }

    #[inline]
    pub(crate) fn parent(&self, handle: Handle) -> Handle {
        if handle.is_nil() {
            self.nil_parent
        } else {
            self.nodes.get(handle).parent()
        }
    }

    #[inline]
    fn set_parent(&mut self, handle: Handle, parent: Handle) {
        if handle.is_nil() {
            self.nil_parent = parent;
        } else {
            self.nodes.get_mut(handle).set_parent(parent);
        }
    }

    #[inline]
    pub(crate) fn child(&self, handle: Handle, dir: Direction) -> Handle {
        self.nodes.get(handle).child(dir)
    }

    #[inline]
    fn set_child(&mut self, handle: Handle, dir: Direction, child: Handle) {
        self.nodes.get_mut(handle).set_child(dir, child);
    }

    /// Returns which child slot of `parent` holds `child`.
    #[inline]
    fn side_of(&self, child: Handle, parent: Handle) -> Direction {
        if self.child(parent, Direction::Left) == child {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    /// Recomputes a node's size from its (already correct) children.
    #[inline]
    fn update_size(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let size = 1 + self.size(node.left()) + self.size(node.right());
        self.nodes.get_mut(handle).set_size(Size::from_usize(size));
    }

    /// Adds one to the size of every proper ancestor of `handle`.
    fn increment_sizes_above(&mut self, handle: Handle) {
        let mut current = self.parent(handle);
        while !current.is_nil() {
            let node = self.nodes.get_mut(current);
            node.set_size(node.size().increment());
            current = node.parent();
        }
    }

    /// Subtracts one from the size of every proper ancestor of `handle`.
    fn decrement_sizes_above(&mut self, handle: Handle) {
        let mut current = self.parent(handle);
        while !current.is_nil() {
            let node = self.nodes.get_mut(current);
            node.set_size(node.size().decrement());
            current = node.parent();
        }
    }

    // ─── Structural primitives ──────────────────────────────────────────────

    /// Points `parent`'s link to `old` at `new` instead, or moves the root if `parent` is NIL.
    fn replace_child(&mut self, parent: Handle, old: Handle, new: Handle) {
        if parent.is_nil() {
            self.root = new;
        } else {
            let side = self.side_of(old, parent);
            self.set_child(parent, side, new);
        }
    }

    /// Rotates the subtree rooted at `pivot` towards `dir`, returning the new subtree root.
    ///
    /// A left rotation lifts the right child; a right rotation lifts the left child. Sizes of
    /// the two rotated nodes are recomputed bottom-up; no other subtree changes membership.
    fn rotate(&mut self, pivot: Handle, dir: Direction) -> Handle {
        trace!("rotate {dir:?} at {pivot:?}");
        let lifted = self.child(pivot, !dir);
        debug_assert!(!lifted.is_nil(), "`rotate()` - nothing to lift at {pivot:?}");

        let middle = self.child(lifted, dir);
        self.set_child(pivot, !dir, middle);
        if !middle.is_nil() {
            self.set_parent(middle, pivot);
        }

        let parent = self.parent(pivot);
        self.replace_child(parent, pivot, lifted);
        self.set_parent(lifted, parent);

        self.set_child(lifted, dir, pivot);
        self.set_parent(pivot, lifted);

        self.update_size(pivot);
        self.update_size(lifted);
        lifted
    }

    /// Puts the subtree `replacement` where `target` was. `replacement` may be NIL, in which
    /// case the sentinel's parent records the splice point.
    fn transplant(&mut self, target: Handle, replacement: Handle) {
        let parent = self.parent(target);
        self.replace_child(parent, target, replacement);
        self.set_parent(replacement, parent);
    }

    /// Returns the leftmost node of the subtree rooted at `handle`.
    pub(crate) fn minimum(&self, mut handle: Handle) -> Handle {
        while !handle.is_nil() {
            let left = self.child(handle, Direction::Left);
            if left.is_nil() {
                break;
            }
            handle = left;
        }
        handle
    }

    /// Returns the rightmost node of the subtree rooted at `handle`.
    pub(crate) fn maximum(&self, mut handle: Handle) -> Handle {
        while !handle.is_nil() {
            let right = self.child(handle, Direction::Right);
            if right.is_nil() {
                break;
            }
            handle = right;
        }
        handle
    }

    /// Returns the in-order successor of `handle`, or NIL after the last node.
    pub(crate) fn successor(&self, handle: Handle) -> Handle {
        let right = self.child(handle, Direction::Right);
        if !right.is_nil() {
            return self.minimum(right);
        }

        let mut current = handle;
        let mut parent = self.parent(current);
        while !parent.is_nil() && self.child(parent, Direction::Right) == current {
            current = parent;
            parent = self.parent(parent);
        }
        parent
    }

    // ─── Entry access ───────────────────────────────────────────────────────

    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    pub(crate) fn key_value(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get(node.value()))
    }

    pub(crate) fn key_value_mut(&mut self, handle: Handle) -> (&K, &mut V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get_mut(node.value()))
    }

    /// Replaces the payload stored at `handle`, returning the previous one.
    pub(crate) fn replace_value(&mut self, handle: Handle, value: V) -> V {
        let value_handle = self.nodes.get(handle).value();
        core::mem::replace(self.values.get_mut(value_handle), value)
    }

    // ─── Order statistics ───────────────────────────────────────────────────

    /// Returns the 1-based in-order position of `handle`.
    ///
    /// Climbs to the root, adding the left subtree plus the parent for every step taken out of
    /// a right child.
    pub(crate) fn rank_of_node(&self, handle: Handle) -> usize {
        let mut rank = self.size(self.child(handle, Direction::Left)) + 1;
        let mut current = handle;

        while current != self.root {
            let parent = self.parent(current);
            if self.child(parent, Direction::Right) == current {
                rank += self.size(self.child(parent, Direction::Left)) + 1;
            }
            current = parent;
        }

        rank
    }

    /// Returns the node at 1-based position `rank`, or `None` outside `1..=len`.
    pub(crate) fn select(&self, rank: usize) -> Option<Handle> {
        if rank == 0 || rank > self.len() {
            return None;
        }

        let mut current = self.root;
        let mut remaining = rank;

        loop {
            let node = self.nodes.get(current);
            let here = self.size(node.left()) + 1;
            current = match remaining.cmp(&here) {
                Ordering::Equal => return Some(current),
                Ordering::Less => node.left(),
                Ordering::Greater => {
                    remaining -= here;
                    node.right()
                }
            };
            debug_assert!(!current.is_nil(), "select: size invariant violated - rank {rank} not found");
        }
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: SmallVec<[(Handle, usize); 64]> = SmallVec::new();
        if !self.root.is_nil() {
            stack.push((self.root, 1));
        }

        while let Some((handle, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.nodes.get(handle);
            for child in [node.left(), node.right()] {
                if !child.is_nil() {
                    stack.push((child, depth + 1));
                }
            }
        }

        height
    }

    // ─── Rebalancing ────────────────────────────────────────────────────────

    /// Restores the red-black invariants after `node` was attached as a red leaf.
    fn insert_fixup(&mut self, mut node: Handle) {
        loop {
            let parent = self.parent(node);
            if self.color(parent) == Color::Black {
                break;
            }

            // A red parent is never the root, so the grandparent exists.
            let grandparent = self.parent(parent);
            let side = self.side_of(parent, grandparent);
            let uncle = self.child(grandparent, !side);

            if self.color(uncle) == Color::Red {
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            let mut parent = parent;
            if node == self.child(parent, !side) {
                // Inner grandchild: turn it into an outer one first.
                self.rotate(parent, side);
                parent = node;
            }
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, !side);
            break;
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Unlinks `target` and frees one node, returning the entry that was stored at `target`.
    ///
    /// A node with two children is not spliced itself: its in-order successor (which has no
    /// left child) is spliced out of its own position and its entry moves into `target`.
    fn remove_node(&mut self, target: Handle) -> (K, V) {
        let node = self.nodes.get(target);
        let spliced = if node.left().is_nil() || node.right().is_nil() {
            target
        } else {
            self.minimum(node.right())
        };

        // Sizes go first: the fixup's rotations recompute from children, so every ancestor
        // must already count the removal before the first rotation runs.
        self.decrement_sizes_above(spliced);

        let spliced_node = self.nodes.get(spliced);
        let replacement = if spliced_node.left().is_nil() {
            spliced_node.right()
        } else {
            spliced_node.left()
        };
        let spliced_color = spliced_node.color();

        self.transplant(spliced, replacement);
        let (mut key, mut value) = self.nodes.take(spliced).into_entry();
        if spliced != target {
            (key, value) = self.nodes.get_mut(target).replace_entry(key, value);
        }

        if spliced_color == Color::Black {
            self.remove_fixup(replacement);
        }
        self.nil_parent = Handle::NIL;

        (key, self.values.take(value))
    }

    /// Repays the black-height deficit left at `node` after a black node was spliced out.
    fn remove_fixup(&mut self, mut node: Handle) {
        while node != self.root && self.color(node) == Color::Black {
            let parent = self.parent(node);
            let side = self.side_of(node, parent);
            let mut sibling = self.child(parent, !side);
            debug_assert!(!sibling.is_nil(), "`remove_fixup()` - deficit side has no sibling");

            if self.color(sibling) == Color::Red {
                trace!("remove_fixup: red sibling {sibling:?}");
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.child(parent, !side);
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, !side);
            if self.color(near) == Color::Black && self.color(far) == Color::Black {
                self.set_color(sibling, Color::Red);
                node = parent;
                continue;
            }

            if self.color(far) == Color::Black {
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, !side);
                sibling = self.child(parent, !side);
            }

            let parent_color = self.color(parent);
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            let far = self.child(sibling, !side);
            self.set_color(far, Color::Black);
            self.rotate(parent, side);
            node = self.root;
        }

        self.set_color(node, Color::Black);
    }

    /// Cheap checks run after every mutation.
    #[inline]
    fn debug_check(&self)
    where
        K: Ord,
    {
        debug_assert_eq!(self.color(self.root), Color::Black, "root must be black");
        debug_assert_eq!(self.len(), self.nodes.len(), "root size must match the node count");
        debug_assert!(self.nil_parent.is_nil(), "sentinel parent must be reset");

        #[cfg(feature = "check-invariants")]
        if let Err(violation) = self.validate() {
            panic!("tree invariant violated: {violation}");
        }
    }
}

impl<K: Ord, V> RawDosTree<K, V> {
    /// Searches for a key and returns the first node on the search path that holds it.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;

        while !current.is_nil() {
            let node = self.nodes.get(current);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left(),
                Ordering::Equal => return Some(current),
                Ordering::Greater => node.right(),
            };
        }

        None
    }

    /// Inserts an entry. Equal keys descend right, so duplicates keep insertion order among
    /// themselves. Returns the handle of the new node.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Handle {
        let mut parent = Handle::NIL;
        let mut dir = Direction::Left;
        let mut current = self.root;

        while !current.is_nil() {
            let node = self.nodes.get(current);
            parent = current;
            dir = if key < *node.key() {
                Direction::Left
            } else {
                Direction::Right
            };
            current = node.child(dir);
        }

        let value = self.values.alloc(value);
        let node = self.nodes.alloc(Node::new(key, value, parent));
        if parent.is_nil() {
            self.root = node;
        } else {
            self.set_child(parent, dir, node);
        }

        self.increment_sizes_above(node);
        self.insert_fixup(node);
        self.debug_check();
        node
    }

    /// Removes one entry with the given key.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(target) = self.search(key) else {
            debug!("remove: key not present, tree unchanged");
            return None;
        };

        let entry = self.remove_node(target);
        self.debug_check();
        Some(entry)
    }

    /// Checks every structural invariant, returning the first violation found.
    pub(crate) fn validate(&self) -> Result<(), InvariantViolation> {
        if !self.nil_parent.is_nil() {
            return Err(InvariantViolation::DirtySentinel {
                node: self.nil_parent.to_index(),
            });
        }

        if self.color(self.root) == Color::Red {
            return Err(InvariantViolation::RedRoot {
                node: self.root.to_index(),
            });
        }

        let mut previous = None;
        let mut reachable = 0;
        self.validate_subtree(self.root, Handle::NIL, &mut previous, &mut reachable)?;

        if reachable != self.nodes.len() || reachable != self.values.len() {
            return Err(InvariantViolation::Length {
                reachable,
                nodes: self.nodes.len(),
                values: self.values.len(),
            });
        }

        Ok(())
    }

    /// Validates the subtree at `handle` in order, returning its black-height (NIL counts one).
    fn validate_subtree<'a>(
        &'a self,
        handle: Handle,
        parent: Handle,
        previous: &mut Option<&'a K>,
        reachable: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        if handle.is_nil() {
            return Ok(1);
        }

        let node = self.nodes.get(handle);
        let index = handle.to_index();

        if node.parent() != parent {
            return Err(if parent.is_nil() {
                InvariantViolation::RootHasParent { node: index }
            } else {
                InvariantViolation::ParentLink {
                    node: parent.to_index(),
                    child: index,
                }
            });
        }

        if node.color() == Color::Red {
            for child in [node.left(), node.right()] {
                if self.color(child) == Color::Red {
                    return Err(InvariantViolation::RedRed {
                        node: index,
                        child: child.to_index(),
                    });
                }
            }
        }

        let left = self.validate_subtree(node.left(), handle, previous, reachable)?;

        if let Some(prev) = *previous
            && prev > node.key()
        {
            return Err(InvariantViolation::Order { node: index });
        }
        *previous = Some(node.key());
        *reachable += 1;

        let right = self.validate_subtree(node.right(), handle, previous, reachable)?;

        if left != right {
            return Err(InvariantViolation::BlackHeight { node: index, left, right });
        }

        let computed = 1 + self.size(node.left()) + self.size(node.right());
        let stored = node.size().to_usize();
        if stored != computed {
            return Err(InvariantViolation::Size {
                node: index,
                stored,
                computed,
            });
        }

        Ok(left + usize::from(node.color() == Color::Black))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<K: Ord + Clone, V> RawDosTree<K, V> {
        /// Panics with the violation if the tree is corrupt.
        fn assert_valid(&self) {
            if let Err(violation) = self.validate() {
                panic!("tree invariant violated: {violation}");
            }
        }

        /// Collects keys by walking successors from the minimum.
        fn keys_in_order(&self) -> Vec<K> {
            let mut keys = Vec::with_capacity(self.len());
            let mut current = self.minimum(self.root);
            while !current.is_nil() {
                keys.push(self.key(current).clone());
                current = self.successor(current);
            }
            keys
        }

        /// True if `2^ceil(h/2) <= n + 1`, i.e. `h <= 2 * log2(n + 1)`.
        fn within_height_bound(&self) -> bool {
            let height = self.height();
            let half = height.div_ceil(2);
            half < usize::BITS as usize && (1usize << half) <= self.len() + 1
        }
    }

    fn tree_from(keys: &[i32]) -> RawDosTree<i32, i32> {
        let mut tree = RawDosTree::new();
        for &key in keys {
            tree.insert(key, key * 2);
            tree.assert_valid();
        }
        tree
    }

    // Test operations enum for property testing
    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..200).prop_map(Op::Insert),
            2 => (0i32..200).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn tree_invariants_maintained_after_operations(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree: RawDosTree<i32, i32> = RawDosTree::new();
            let mut model: Vec<i32> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        tree.insert(key, key * 2);
                        let at = model.partition_point(|&k| k <= key);
                        model.insert(at, key);
                    }
                    Op::Remove(key) => {
                        let removed = tree.remove(&key);
                        match model.binary_search(&key) {
                            Ok(at) => {
                                model.remove(at);
                                prop_assert_eq!(removed, Some((key, key * 2)));
                            }
                            Err(_) => prop_assert_eq!(removed, None),
                        }
                    }
                }
                tree.assert_valid();
                prop_assert!(tree.within_height_bound(), "height {} for {} entries", tree.height(), tree.len());
                prop_assert_eq!(tree.len(), model.len());
            }

            prop_assert_eq!(tree.keys_in_order(), model);
        }

        #[test]
        fn select_matches_sorted_keys(keys in prop::collection::vec(0i32..500, 1..200)) {
            let tree = tree_from(&keys);
            let mut sorted = keys.clone();
            sorted.sort_unstable();

            for (index, &expected) in sorted.iter().enumerate() {
                let handle = tree.select(index + 1);
                prop_assert!(handle.is_some(), "select({}) returned None", index + 1);
                prop_assert_eq!(*tree.key(handle.unwrap()), expected);
            }
            prop_assert!(tree.select(0).is_none());
            prop_assert!(tree.select(sorted.len() + 1).is_none());
        }

        #[test]
        fn rank_of_selected_node_round_trips(keys in prop::collection::vec(0i32..500, 1..200)) {
            let tree = tree_from(&keys);

            for rank in 1..=tree.len() {
                let handle = tree.select(rank).expect("rank within bounds");
                prop_assert_eq!(tree.rank_of_node(handle), rank);
            }
        }

        #[test]
        fn remove_everything_in_random_order(keys in prop::collection::vec(any::<i16>(), 0..150).prop_shuffle()) {
            let mut tree: RawDosTree<i16, ()> = RawDosTree::new();
            for &key in &keys {
                tree.insert(key, ());
            }

            for (removed, key) in keys.iter().enumerate() {
                prop_assert!(tree.remove(key).is_some());
                tree.assert_valid();
                prop_assert_eq!(tree.len(), keys.len() - removed - 1);
            }
            prop_assert!(tree.is_empty());
            prop_assert!(tree.root().is_nil());
        }
    }

    #[test]
    fn empty_tree_order_statistics() {
        let tree: RawDosTree<i32, i32> = RawDosTree::new();
        tree.assert_valid();

        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert!(tree.select(0).is_none());
        assert!(tree.select(1).is_none());
        assert!(tree.search(&0).is_none());
        assert!(tree.minimum(tree.root()).is_nil());
        assert!(tree.maximum(tree.root()).is_nil());
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let keys: Vec<i32> = (0..1000).collect();
        let tree = tree_from(&keys);
        assert!(tree.within_height_bound());
        assert_eq!(tree.keys_in_order(), keys);
        assert_eq!(*tree.key(tree.minimum(tree.root())), 0);
        assert_eq!(*tree.key(tree.maximum(tree.root())), 999);
    }

    #[test]
    fn three_ascending_keys_rotate_to_middle_root() {
        let tree = tree_from(&[1, 2, 3]);
        let root = tree.root();
        assert_eq!(*tree.key(root), 2);
        assert_eq!(tree.size(root), 3);
        assert_eq!(tree.color(root), Color::Black);
        assert_eq!(tree.color(tree.child(root, Direction::Left)), Color::Red);
        assert_eq!(tree.color(tree.child(root, Direction::Right)), Color::Red);
    }

    #[test]
    fn inner_grandchild_double_rotation() {
        let tree = tree_from(&[3, 1, 2]);
        let root = tree.root();
        assert_eq!(*tree.key(root), 2);
        assert_eq!(*tree.key(tree.child(root, Direction::Left)), 1);
        assert_eq!(*tree.key(tree.child(root, Direction::Right)), 3);
    }

    #[test]
    fn remove_leaf_one_child_and_two_children() {
        let mut tree = tree_from(&[50, 25, 75, 10, 30, 60, 90, 5]);

        // Red leaf.
        assert_eq!(tree.remove(&5), Some((5, 10)));
        tree.assert_valid();

        // Node with a single child.
        tree.insert(95, 190);
        assert_eq!(tree.remove(&90), Some((90, 180)));
        tree.assert_valid();

        // Node with two children: the successor's entry moves into the root slot.
        let root = tree.root();
        assert_eq!(tree.remove(&50), Some((50, 100)));
        tree.assert_valid();
        assert_eq!(tree.root(), root);
        assert_eq!(*tree.key(root), 60);

        assert_eq!(tree.keys_in_order(), [10, 25, 30, 60, 75, 95]);
    }

    #[test]
    fn remove_missing_key_leaves_tree_untouched() {
        let mut tree = tree_from(&[5, 3, 8]);
        let height = tree.height();
        assert_eq!(tree.remove(&4), None);
        tree.assert_valid();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.height(), height);
    }

    #[test]
    fn remove_black_leaf_resets_sentinel_parent() {
        let mut tree = tree_from(&(0..32).collect::<Vec<_>>());
        // Removing black leaves drives the fixup from a NIL replacement.
        for key in [0, 2, 4, 6, 8] {
            tree.remove(&key);
            assert!(tree.nil_parent.is_nil());
            tree.assert_valid();
        }
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut tree = tree_from(&[1, 2, 3, 4]);
        tree.remove(&2);
        tree.remove(&3);
        tree.insert(10, 20);
        tree.insert(11, 22);
        tree.assert_valid();
        assert_eq!(tree.nodes.len(), 4);
        assert_eq!(tree.keys_in_order(), [1, 4, 10, 11]);
    }

    #[test]
    fn duplicates_rank_the_node_search_finds() {
        let tree = tree_from(&[5, 5, 5]);
        let found = tree.search(&5).expect("present");
        let rank = tree.rank_of_node(found);
        assert!((1..=3).contains(&rank));
        assert_eq!(tree.select(rank), Some(found));
    }

    #[test]
    fn replace_value_keeps_shape() {
        let mut tree = tree_from(&[4, 2, 6]);
        let handle = tree.search(&2).expect("present");
        let height = tree.height();
        assert_eq!(tree.replace_value(handle, 99), 4);
        assert_eq!(tree.key_value(handle), (&2, &99));
        assert_eq!(tree.height(), height);
        tree.assert_valid();
    }

    #[test]
    fn clone_is_independent() {
        let tree = tree_from(&[3, 1, 4, 1, 5, 9, 2, 6]);
        let mut copy = tree.clone();
        copy.remove(&9);
        copy.assert_valid();
        assert_eq!(tree.len(), 8);
        assert_eq!(copy.len(), 7);
        assert_eq!(tree.keys_in_order(), [1, 1, 2, 3, 4, 5, 6, 9]);
    }

    #[test]
    fn clear_resets_tree() {
        let mut tree = tree_from(&[1, 2, 3]);
        tree.clear();
        tree.assert_valid();
        assert!(tree.is_empty());
        tree.insert(7, 14);
        tree.assert_valid();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn validate_reports_red_root() {
        let mut tree = tree_from(&[1, 2]);
        let root = tree.root();
        tree.set_color(root, Color::Red);
        assert_eq!(tree.validate(), Err(InvariantViolation::RedRoot { node: root.to_index() }));
    }

    #[test]
    fn validate_reports_stale_size() {
        let mut tree = tree_from(&[1, 2, 3]);
        let root = tree.root();
        tree.nodes.get_mut(root).set_size(Size::from_usize(7));
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::Size {
                node: root.to_index(),
                stored: 7,
                computed: 3,
            })
        );
    }

    #[test]
    fn validate_reports_red_red_edge() {
        let mut tree = tree_from(&[2, 1, 3, 4]);
        // 4 hangs red below the now-black 3; painting 3 red breaks the coloring.
        let three = tree.search(&3).expect("present");
        let four = tree.search(&4).expect("present");
        tree.set_color(three, Color::Red);
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::RedRed {
                node: three.to_index(),
                child: four.to_index(),
            })
        );
    }

    #[test]
    fn validate_reports_black_height_mismatch() {
        let mut tree = tree_from(&[2, 1, 3]);
        let one = tree.search(&1).expect("present");
        tree.set_color(one, Color::Black);
        let root = tree.root();
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BlackHeight {
                node: root.to_index(),
                left: 2,
                right: 1,
            })
        );
    }

    #[test]
    fn validate_reports_dirty_sentinel() {
        let mut tree = tree_from(&[1]);
        tree.nil_parent = tree.root();
        assert!(matches!(tree.validate(), Err(InvariantViolation::DirtySentinel { .. })));
    }
}
