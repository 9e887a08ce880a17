use core::fmt;
use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Index of a node slot in the tree's arena.
///
/// The all-ones bit pattern is reserved for [`Handle::NIL`], the per-tree sentinel that stands
/// in for every missing child and for the root's parent.
#[derive(Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    // `index + 1` must stay below the NIL pattern.
    pub(crate) const MAX: usize = (RawHandle::MAX - 2) as usize;
    pub(crate) const NIL: Self = Self(NonZero::<RawHandle>::MAX);

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        match NonZero::new((index + 1) as RawHandle) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        debug_assert!(!self.is_nil(), "`Handle::to_index()` - called on NIL!");
        (self.0.get() - 1) as usize
    }

    #[inline]
    pub(crate) const fn is_nil(self) -> bool {
        self.0.get() == RawHandle::MAX
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("NIL")
        } else {
            write!(f, "#{}", self.to_index())
        }
    }
}
