use core::borrow::{Borrow, BorrowMut};
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::slice;

use super::Buffer;
use crate::alloc::{Allocator, AllocatorDefault};
use crate::capacity::Grow;

impl<T, A: Allocator, G: Grow> AsRef<[T]> for Buffer<T, A, G> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator, G: Grow> AsMut<[T]> for Buffer<T, A, G> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator, G: Grow> Borrow<[T]> for Buffer<T, A, G> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator, G: Grow> BorrowMut<[T]> for Buffer<T, A, G> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

// A clone of a buffer over borrowed storage continues in the spill provider,
// or fails to allocate if there is none.
impl<T: Clone, A: Allocator + Clone, G: Grow> Clone for Buffer<T, A, G> {
    fn clone(&self) -> Self {
        let mut buf = Self::with_capacity_in(self.length, self.allocator().clone());
        buf.extend_from_slice(self.as_slice());
        buf
    }
}

impl<T: fmt::Debug, A: Allocator, G: Grow> fmt::Debug for Buffer<T, A, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, A: AllocatorDefault, G: Grow> Default for Buffer<T, A, G> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator, G: Grow> Deref for Buffer<T, A, G> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator, G: Grow> DerefMut for Buffer<T, A, G> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator, G: Grow> Extend<T> for Buffer<T, A, G> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        match self.try_extend(&mut iter.into_iter()) {
            Ok(_) => (),
            Err(err) => err.panic(),
        }
    }
}

impl<'a, T: Clone + 'a, A: Allocator, G: Grow> Extend<&'a T> for Buffer<T, A, G> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        match self.try_extend(&mut iter.into_iter().cloned()) {
            Ok(_) => (),
            Err(err) => err.panic(),
        }
    }
}

impl<T, A: AllocatorDefault, G: Grow> FromIterator<T> for Buffer<T, A, G> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (min_cap, _) = iter.size_hint();
        let mut buf = if min_cap > 0 {
            Self::with_capacity(min_cap)
        } else {
            Self::new()
        };
        buf.extend(iter);
        buf
    }
}

impl<'a, T, A: Allocator, G: Grow> IntoIterator for &'a Buffer<T, A, G> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, A: Allocator, G: Grow> IntoIterator for &'a mut Buffer<T, A, G> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T1, A1, G1, T2, A2, G2> PartialEq<Buffer<T2, A2, G2>> for Buffer<T1, A1, G1>
where
    A1: Allocator,
    A2: Allocator,
    G1: Grow,
    G2: Grow,
    T1: PartialEq<T2>,
{
    #[inline]
    fn eq(&self, other: &Buffer<T2, A2, G2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: Allocator, G: Grow> Eq for Buffer<T, A, G> {}

impl<T1, A, G, T2> PartialEq<&[T2]> for Buffer<T1, A, G>
where
    A: Allocator,
    G: Grow,
    T1: PartialEq<T2>,
{
    #[inline]
    fn eq(&self, other: &&[T2]) -> bool {
        self.as_slice() == *other
    }
}

impl<T1, A, G, T2> PartialEq<[T2]> for Buffer<T1, A, G>
where
    A: Allocator,
    G: Grow,
    T1: PartialEq<T2>,
{
    #[inline]
    fn eq(&self, other: &[T2]) -> bool {
        self.as_slice() == other
    }
}

impl<T1, A, G, T2, const N: usize> PartialEq<[T2; N]> for Buffer<T1, A, G>
where
    A: Allocator,
    G: Grow,
    T1: PartialEq<T2>,
{
    #[inline]
    fn eq(&self, other: &[T2; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T1, A, G, T2, const N: usize> PartialEq<&[T2; N]> for Buffer<T1, A, G>
where
    A: Allocator,
    G: Grow,
    T1: PartialEq<T2>,
{
    #[inline]
    fn eq(&self, other: &&[T2; N]) -> bool {
        self.as_slice() == *other
    }
}

#[cfg(feature = "std")]
impl<A: Allocator, G: Grow> std::io::Write for Buffer<u8, A, G> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.try_extend_from_slice(buf)
            .map_err(|_| std::io::ErrorKind::OutOfMemory)?;
        Ok(buf.len())
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        std::io::Write::write(self, buf)?;
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<A: Allocator, G: Grow> fmt::Write for Buffer<u8, A, G> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.try_extend_from_slice(s.as_bytes())
            .map_err(|_| fmt::Error)
    }
}

#[cfg(feature = "zeroize")]
impl<T: zeroize::Zeroize, A: Allocator, G: Grow> zeroize::Zeroize for Buffer<T, A, G> {
    fn zeroize(&mut self) {
        for item in self.as_mut_slice() {
            zeroize::Zeroize::zeroize(item);
        }
        self.clear();
    }
}
