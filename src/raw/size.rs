use core::fmt;

use super::handle::Handle;

/// Number of entries in a subtree.
///
/// Stored as a [`Handle`] so it shares the niche and width of a handle; a subtree can never
/// hold more entries than the arena has slots.
#[derive(Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Size(Handle);

impl Size {
    pub(crate) const MAX: usize = Handle::MAX;
    #[cfg(test)]
    pub(crate) const ZERO: Self = Self::from_usize(0);
    pub(crate) const ONE: Self = Self::from_usize(1);

    #[inline]
    pub(crate) const fn from_usize(size: usize) -> Self {
        assert!(size <= Self::MAX, "`Size::from_usize()` - `size` > `Size::MAX`!");
        Self(Handle::from_index(size))
    }

    #[inline]
    pub(crate) const fn to_usize(self) -> usize {
        self.0.to_index()
    }

    #[inline]
    #[must_use]
    pub(crate) const fn increment(self) -> Self {
        Self::from_usize(self.to_usize() + 1)
    }

    #[inline]
    #[must_use]
    pub(crate) const fn decrement(self) -> Self {
        assert!(self.to_usize() > 0, "`Size::decrement()` - `size` is zero!");
        Self::from_usize(self.to_usize() - 1)
    }
}

impl fmt::Debug for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_usize(), f)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Verify our assumptions about `Size` and the niche optimization.
    assert_eq_size!(Size, Option<Size>);
    assert_eq_size!(Size, Handle);

    #[test]
    #[should_panic(expected = "`Size::from_usize()` - `size` > `Size::MAX`!")]
    fn invalid_size() {
        let _ = Size::from_usize(Size::MAX + 1);
    }

    #[test]
    #[should_panic(expected = "`Size::decrement()` - `size` is zero!")]
    fn decrement_zero() {
        let _ = Size::ZERO.decrement();
    }

    #[test]
    fn increment_and_decrement() {
        assert_eq!(Size::ZERO.increment(), Size::ONE);
        assert_eq!(Size::ONE.decrement(), Size::ZERO);
        assert_eq!(Size::from_usize(41).increment().to_usize(), 42);
    }

    proptest! {
        #[test]
        fn size_round_trip(index in 0..=Size::MAX) {
            let size = Size::from_usize(index);
            prop_assert_eq!(size.to_usize(), index);
        }
    }
}
