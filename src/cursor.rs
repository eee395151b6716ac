//! Cursor-style traversal over a window of a sequence.
//!
//! A cursor starts before the first element of its window. Each successful
//! call to [`Cursor::move_next`] positions it on the following element, until
//! the window is exhausted.

use core::fmt;
use core::iter::FusedIterator;

use crate::error::range_panic;

#[cold]
#[inline(never)]
fn not_positioned() -> ! {
    panic!("Cursor is not positioned on an element");
}

#[inline]
fn check_window(len: usize, offset: usize, count: usize) {
    match offset.checked_add(count) {
        Some(end) if end <= len => (),
        _ => range_panic(offset, offset.saturating_add(count), len),
    }
}

/// A cursor over `count` elements of a slice, starting at `offset`.
pub struct Cursor<'a, T> {
    data: &'a [T],
    offset: usize,
    count: usize,
    next: usize,
    current: Option<usize>,
}

impl<'a, T> Cursor<'a, T> {
    /// Create a cursor over `data[offset..offset + count]`.
    ///
    /// Panics if the window is not within the bounds of `data`.
    pub fn new(data: &'a [T], offset: usize, count: usize) -> Self {
        check_window(data.len(), offset, count);
        Self {
            data,
            offset,
            count,
            next: 0,
            current: None,
        }
    }

    /// Advance to the next element of the window, returning `false` once
    /// the window is exhausted.
    #[inline]
    pub fn move_next(&mut self) -> bool {
        if self.next < self.count {
            self.current = Some(self.next);
            self.next += 1;
            true
        } else {
            self.current = None;
            false
        }
    }

    /// Access the element the cursor is positioned on.
    ///
    /// Panics if `move_next` has not returned `true`, or has since
    /// returned `false`.
    #[inline]
    pub fn current(&self) -> &'a T {
        match self.try_current() {
            Some(item) => item,
            None => not_positioned(),
        }
    }

    /// Access the element the cursor is positioned on, if any.
    #[inline]
    pub fn try_current(&self) -> Option<&'a T> {
        let data = self.data;
        self.current.map(|idx| &data[self.offset + idx])
    }

    /// Obtain a cursor for a fresh traversal of the window. An unstarted
    /// cursor is returned as-is; otherwise an independent cursor is created.
    #[inline]
    pub fn get_enumerator(self) -> Self {
        if self.next == 0 {
            self
        } else {
            Self::new(self.data, self.offset, self.count)
        }
    }

    /// Reset the cursor to its initial position before the first element.
    #[inline]
    pub fn reset(&mut self) {
        self.next = 0;
        self.current = None;
    }

    /// The elements of the window.
    #[inline]
    pub fn window(&self) -> &'a [T] {
        &self.data[self.offset..self.offset + self.count]
    }
}

impl<T> Clone for Cursor<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("window", &self.window())
            .field("current", &self.current)
            .finish()
    }
}

impl<'a, T> Iterator for Cursor<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.move_next() {
            self.try_current()
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remain = self.count - self.next;
        (remain, Some(remain))
    }
}

impl<T> ExactSizeIterator for Cursor<'_, T> {}

impl<T> FusedIterator for Cursor<'_, T> {}

/// A cursor over a window of a mutable slice, permitting modification of
/// the current element.
pub struct CursorMut<'a, T> {
    data: &'a mut [T],
    offset: usize,
    count: usize,
    next: usize,
    current: Option<usize>,
}

impl<'a, T> CursorMut<'a, T> {
    /// Create a cursor over `data[offset..offset + count]`.
    ///
    /// Panics if the window is not within the bounds of `data`.
    pub fn new(data: &'a mut [T], offset: usize, count: usize) -> Self {
        check_window(data.len(), offset, count);
        Self {
            data,
            offset,
            count,
            next: 0,
            current: None,
        }
    }

    /// Advance to the next element of the window.
    #[inline]
    pub fn move_next(&mut self) -> bool {
        if self.next < self.count {
            self.current = Some(self.next);
            self.next += 1;
            true
        } else {
            self.current = None;
            false
        }
    }

    /// Access the element the cursor is positioned on.
    #[inline]
    pub fn current(&self) -> &T {
        match self.current {
            Some(idx) => &self.data[self.offset + idx],
            None => not_positioned(),
        }
    }

    /// Modify the element the cursor is positioned on.
    ///
    /// Panics if the cursor is not positioned on an element.
    #[inline]
    pub fn current_mut(&mut self) -> &mut T {
        match self.current {
            Some(idx) => &mut self.data[self.offset + idx],
            None => not_positioned(),
        }
    }

    /// Obtain a cursor for a fresh traversal of the window.
    #[inline]
    pub fn get_enumerator(mut self) -> Self {
        self.reset();
        self
    }

    /// Reset the cursor to its initial position.
    #[inline]
    pub fn reset(&mut self) {
        self.next = 0;
        self.current = None;
    }
}

impl<T: fmt::Debug> fmt::Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("window", &&self.data[self.offset..self.offset + self.count])
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traverse_window() {
        let data = [1, 2, 3, 4, 5];
        let mut cursor = Cursor::new(&data, 1, 3);
        let mut seen = [0; 3];
        let mut idx = 0;
        while cursor.move_next() {
            seen[idx] = *cursor.current();
            idx += 1;
        }
        assert_eq!(seen, [2, 3, 4]);
        assert!(!cursor.move_next());
        assert_eq!(cursor.try_current(), None);
    }

    #[test]
    fn empty_window() {
        let data: [u8; 0] = [];
        let mut cursor = Cursor::new(&data, 0, 0);
        assert!(!cursor.move_next());
    }

    #[test]
    #[should_panic(expected = "Cursor is not positioned on an element")]
    fn current_before_start() {
        let data = [1];
        Cursor::new(&data, 0, 1).current();
    }

    #[test]
    fn enumerator_restarts() {
        let data = [1, 2, 3];
        let fresh = Cursor::new(&data, 0, 3);
        let mut again = fresh.get_enumerator();
        assert!(again.move_next());
        assert_eq!(*again.current(), 1);
        assert!(again.move_next());
        let restarted = again.get_enumerator();
        assert_eq!(restarted.copied().sum::<i32>(), 6);
        // the original copy is unaffected
        assert_eq!(*again.current(), 2);
    }

    #[test]
    fn modify_through_cursor() {
        let mut data = [1, 2, 3];
        let mut cursor = CursorMut::new(&mut data, 0, 3);
        while cursor.move_next() {
            *cursor.current_mut() *= 10;
        }
        assert_eq!(data, [10, 20, 30]);
    }

    #[test]
    #[should_panic(expected = "Invalid element range: 2..5 (length 3)")]
    fn window_out_of_bounds() {
        let data = [1, 2, 3];
        Cursor::new(&data, 2, 3);
    }
}
