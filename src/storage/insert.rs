use core::ptr;

/// Fills a gap opened in the middle of a buffer's storage.
///
/// On creation the tail of the buffer is moved right to open a gap of
/// `count` slots at `index`, and the owner's length is cut back to `index`
/// so an unwinding panic never exposes the gap. When the inserter completes
/// or is dropped, any unfilled part of the gap is closed and the length is
/// restored to cover the inserted values and the tail.
pub(crate) struct Inserter<'a, T> {
    data: *mut T,
    length: &'a mut usize,
    start: usize,
    end: usize,
    gap_end: usize,
    tail: usize,
}

impl<'a, T> Inserter<'a, T> {
    /// # Safety
    /// `data` must be valid for at least `*length + count` slots and the
    /// first `*length` slots must be initialized. `index` may not exceed
    /// `*length`.
    #[inline]
    pub unsafe fn new(data: *mut T, length: &'a mut usize, index: usize, count: usize) -> Self {
        debug_assert!(index <= *length);
        let tail = *length - index;
        if tail > 0 && count > 0 {
            ptr::copy(data.add(index), data.add(index + count), tail);
        }
        *length = index;
        Self {
            data,
            length,
            start: index,
            end: index,
            gap_end: index + count,
            tail,
        }
    }

    #[inline]
    pub const fn full(&self) -> bool {
        self.end == self.gap_end
    }

    #[inline]
    pub fn push(&mut self, val: T) {
        assert!(!self.full(), "inserter capacity exceeded");
        unsafe { self.data.add(self.end).write(val) };
        self.end += 1;
    }

    #[inline]
    pub fn push_clone(&mut self, val: &T)
    where
        T: Clone,
    {
        self.push(val.clone());
    }

    /// Finish inserting, returning the number of values written.
    #[inline]
    pub fn complete(self) -> usize {
        // the gap is closed on drop
        self.end - self.start
    }
}

impl<T> Drop for Inserter<'_, T> {
    #[inline]
    fn drop(&mut self) {
        if self.tail > 0 && self.end != self.gap_end {
            unsafe {
                ptr::copy(
                    self.data.add(self.gap_end),
                    self.data.add(self.end),
                    self.tail,
                )
            };
        }
        *self.length = self.end + self.tail;
    }
}
