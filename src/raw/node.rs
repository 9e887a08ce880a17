use core::ops::Not;

use super::handle::Handle;
use super::size::Size;

/// Node color for the red-black balance invariants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child slot of a node. Lets every mirrored fixup case be written once.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    Left = 0,
    Right = 1,
}

impl Not for Direction {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A single stored entry plus its structural links.
#[derive(Clone)]
pub(crate) struct Node<K> {
    key: K,
    // Payloads live in a separate arena; swapping handles moves an entry between nodes.
    value: Handle,
    color: Color,
    // Entries in the subtree rooted here, including this node.
    size: Size,
    // Non-owning back-reference; NIL for the root.
    parent: Handle,
    children: [Handle; 2],
}

impl<K> Node<K> {
    /// Creates a red leaf hanging below `parent`.
    pub(crate) fn new(key: K, value: Handle, parent: Handle) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            size: Size::ONE,
            parent,
            children: [Handle::NIL; 2],
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> Handle {
        self.value
    }

    /// Replaces the entry held by this node, returning the previous one.
    pub(crate) fn replace_entry(&mut self, key: K, value: Handle) -> (K, Handle) {
        let key = core::mem::replace(&mut self.key, key);
        let value = core::mem::replace(&mut self.value, value);
        (key, value)
    }

    /// Consumes the node, returning its entry.
    pub(crate) fn into_entry(self) -> (K, Handle) {
        (self.key, self.value)
    }

    #[inline]
    pub(crate) fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub(crate) fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    #[inline]
    pub(crate) fn parent(&self) -> Handle {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Handle) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn child(&self, dir: Direction) -> Handle {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Direction, child: Handle) {
        self.children[dir as usize] = child;
    }

    #[inline]
    pub(crate) fn left(&self) -> Handle {
        self.child(Direction::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Handle {
        self.child(Direction::Right)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn direction_negation() {
        assert_eq!(!Direction::Left, Direction::Right);
        assert_eq!(!Direction::Right, Direction::Left);
    }

    #[test]
    fn new_node_is_red_leaf() {
        let parent = Handle::from_index(3);
        let node = Node::new(10, Handle::from_index(0), parent);
        assert_eq!(node.color(), Color::Red);
        assert_eq!(node.size(), Size::ONE);
        assert_eq!(node.parent(), parent);
        assert!(node.left().is_nil());
        assert!(node.right().is_nil());
    }

    #[test]
    fn replace_entry_swaps_key_and_value() {
        let mut node = Node::new(1, Handle::from_index(0), Handle::NIL);
        let (key, value) = node.replace_entry(2, Handle::from_index(5));
        assert_eq!((key, value), (1, Handle::from_index(0)));
        assert_eq!(*node.key(), 2);
        assert_eq!(node.value(), Handle::from_index(5));
    }
}
