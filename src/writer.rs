//! An append-only writer over pooled storage.

use core::fmt;
use core::mem::MaybeUninit;

use crate::alloc::{AllocateIn, Allocator, AllocatorDefault};
use crate::buffer::Buffer;
use crate::capacity::GrowPooled;
use crate::error::{range_panic, StorageError, UpdateError};
use crate::pool::Shared;

/// A sink which appends values to a pooled buffer.
///
/// Values may be appended directly with [`PoolWriter::write`], or produced
/// in place by requesting spare storage with [`PoolWriter::get_spare`] and
/// committing it with [`PoolWriter::advance`]. When writing is complete the
/// contents may be copied out, or the buffer handed off with
/// [`PoolWriter::detach`] so that no copy is needed.
///
/// # Examples
///
/// ```
/// use core::fmt::Write;
/// use flex_pool::PoolWriter;
///
/// let mut w = PoolWriter::<u8>::new();
/// write!(w, "{}-{}", 1, 2).unwrap();
/// assert_eq!(w.as_str(), Ok("1-2"));
/// ```
pub struct PoolWriter<T, A: Allocator = Shared> {
    buffer: Buffer<T, A, GrowPooled>,
}

impl<T, A: AllocatorDefault> PoolWriter<T, A> {
    /// Create a writer which rents storage on the first write.
    pub const fn new() -> Self {
        Self {
            buffer: Buffer::new(),
        }
    }

    /// Create a writer with room for at least `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Buffer::with_capacity(capacity),
        }
    }
}

impl<T, A: Allocator> PoolWriter<T, A> {
    /// Create a writer which rents storage from `alloc` on the first write.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            buffer: Buffer::new_in(alloc),
        }
    }

    /// Create a writer with room for at least `capacity` values, rented
    /// from `alloc_in`.
    pub fn with_capacity_in<I>(capacity: usize, alloc_in: I) -> Self
    where
        I: AllocateIn<Alloc = A>,
    {
        Self {
            buffer: Buffer::with_capacity_in(capacity, alloc_in),
        }
    }

    /// The values written so far.
    #[inline]
    pub fn written(&self) -> &[T] {
        self.buffer.as_slice()
    }

    /// The number of values written.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check whether nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The number of values the writer can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Append a single value.
    #[inline]
    pub fn write(&mut self, item: T) {
        self.buffer.push(item)
    }

    /// Try to append a single value.
    #[inline]
    pub fn try_write(&mut self, item: T) -> Result<(), UpdateError<T>> {
        self.buffer.try_push(item)
    }

    /// Append a copy of `items`.
    #[inline]
    pub fn write_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.buffer.extend_from_slice(items)
    }

    /// Try to append a copy of `items`.
    #[inline]
    pub fn try_write_slice(&mut self, items: &[T]) -> Result<(), StorageError>
    where
        T: Clone,
    {
        self.buffer.try_extend_from_slice(items)
    }

    /// Obtain spare storage for at least `size_hint` values, or at least
    /// one value if `size_hint` is zero.
    ///
    /// Values placed in the returned slice are not part of the written
    /// contents until committed with [`PoolWriter::advance`].
    pub fn get_spare(&mut self, size_hint: usize) -> &mut [MaybeUninit<T>] {
        match self.try_get_spare(size_hint) {
            Ok(spare) => spare,
            Err(err) => err.panic(),
        }
    }

    /// Try to obtain spare storage for at least `size_hint` values.
    pub fn try_get_spare(
        &mut self,
        size_hint: usize,
    ) -> Result<&mut [MaybeUninit<T>], StorageError> {
        self.buffer.try_reserve(size_hint.max(1))?;
        Ok(self.buffer.spare_capacity_mut())
    }

    /// Commit `count` values placed in spare storage.
    ///
    /// Panics if `count` exceeds the spare capacity.
    ///
    /// # Safety
    /// The first `count` slots of the spare storage must have been
    /// initialized.
    pub unsafe fn advance(&mut self, count: usize) {
        let length = self.buffer.len();
        let spare = self.buffer.capacity() - length;
        if count > spare {
            range_panic(length, length.saturating_add(count), self.buffer.capacity());
        }
        self.buffer.set_len(length + count);
    }

    /// Discard the written values, keeping the storage.
    #[inline]
    pub fn clear(&mut self) {
        self.buffer.clear()
    }

    /// Copy the written values into a new boxed slice.
    #[inline]
    pub fn to_owned_array(&self) -> alloc_crate::boxed::Box<[T]>
    where
        T: Clone,
    {
        self.buffer.to_owned_array()
    }

    /// Drop the written values and return the storage to the pool.
    #[inline]
    pub fn dispose(self) {
        drop(self)
    }

    /// Hand off the written values and their storage to the caller. The
    /// storage is released when the returned buffer is dropped.
    #[inline]
    pub fn detach(self) -> Buffer<T, A, GrowPooled> {
        self.buffer
    }
}

impl<A: Allocator> PoolWriter<u8, A> {
    /// View the written bytes as a string, if they are valid UTF-8.
    #[inline]
    pub fn as_str(&self) -> Result<&str, core::str::Utf8Error> {
        core::str::from_utf8(self.written())
    }
}

impl<T, A: AllocatorDefault> Default for PoolWriter<T, A> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for PoolWriter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolWriter")
            .field("written", &self.written())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<T, A: Allocator> Extend<T> for PoolWriter<T, A> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.buffer.extend(iter)
    }
}

impl<A: Allocator> fmt::Write for PoolWriter<u8, A> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        fmt::Write::write_str(&mut self.buffer, s)
    }
}

#[cfg(feature = "std")]
impl<A: Allocator> std::io::Write for PoolWriter<u8, A> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::Write::write(&mut self.buffer, buf)
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Pool;

    #[test]
    fn spare_protocol() {
        let pool = Pool::new();
        let mut w = PoolWriter::<u32, _>::new_in(&pool);
        let spare = w.get_spare(0);
        assert!(!spare.is_empty());
        spare[0].write(5);
        spare[1].write(6);
        unsafe { w.advance(2) };
        w.write(7);
        assert_eq!(w.written(), &[5, 6, 7]);
        assert_eq!(pool.stats().rented, 1);
    }

    #[test]
    #[should_panic(expected = "Invalid element range")]
    fn advance_past_spare() {
        let mut w = PoolWriter::<u8>::with_capacity(4);
        let cap = w.capacity();
        unsafe { w.advance(cap + 1) };
    }

    #[test]
    fn detach_keeps_block() {
        let pool = Pool::new();
        let mut w = PoolWriter::new_in(&pool);
        w.write_slice(b"abc");
        let owned = w.detach();
        assert_eq!(pool.stats().returned, 0);
        assert_eq!(owned, b"abc");
        drop(owned);
        assert_eq!(pool.stats().returned, 1);
    }
}
