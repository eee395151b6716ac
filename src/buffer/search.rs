use core::cmp::Ordering;
use core::ops::{Range, RangeBounds};

use super::Buffer;
use crate::alloc::Allocator;
use crate::capacity::Grow;

impl<T, A: Allocator, G: Grow> Buffer<T, A, G> {
    /// Find the first position of an element equal to `item`.
    #[inline]
    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.index_of_by(item, PartialEq::eq)
    }

    /// Find the first position of an element matching `item` under the
    /// equality function `eq`.
    pub fn index_of_by<F>(&self, item: &T, mut eq: F) -> Option<usize>
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.as_slice().iter().position(|probe| eq(probe, item))
    }

    /// Find the last position of an element equal to `item`.
    #[inline]
    pub fn last_index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.last_index_of_by(item, PartialEq::eq)
    }

    /// Find the last position of an element matching `item` under the
    /// equality function `eq`.
    pub fn last_index_of_by<F>(&self, item: &T, mut eq: F) -> Option<usize>
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.as_slice().iter().rposition(|probe| eq(probe, item))
    }

    /// Check whether an element equal to `item` is present.
    #[inline]
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(item).is_some()
    }

    /// Check whether an element matching `item` under `eq` is present.
    #[inline]
    pub fn contains_by<F>(&self, item: &T, eq: F) -> bool
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.index_of_by(item, eq).is_some()
    }

    /// Binary search a sorted range of the buffer for `item`.
    ///
    /// Returns `Ok` with the absolute index of a matching element, or `Err`
    /// with the absolute index where `item` could be inserted to keep the
    /// range sorted. If several elements match, any one of them may be
    /// returned. The result is unspecified if the range is not sorted.
    ///
    /// Panics if the range is not within the bounds of the buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[cfg(feature = "alloc")] {
    /// use flex_pool::HeapVec;
    /// let buf = HeapVec::from_slice(&[9, 1, 3, 5, 7]);
    /// assert_eq!(buf.binary_search_range(1.., &5), Ok(3));
    /// assert_eq!(buf.binary_search_range(1.., &4), Err(3));
    /// # }
    /// ```
    #[inline]
    pub fn binary_search_range<R>(&self, range: R, item: &T) -> Result<usize, usize>
    where
        R: RangeBounds<usize>,
        T: Ord,
    {
        self.binary_search_range_by(range, |probe| probe.cmp(item))
    }

    /// Binary search a sorted range of the buffer using a comparator
    /// function. The comparator returns the ordering of the probed element
    /// relative to the target.
    pub fn binary_search_range_by<R, F>(&self, range: R, f: F) -> Result<usize, usize>
    where
        R: RangeBounds<usize>,
        F: FnMut(&T) -> Ordering,
    {
        let Range { start, end } = self.checked_range(range);
        match self.as_slice()[start..end].binary_search_by(f) {
            Ok(idx) => Ok(start + idx),
            Err(idx) => Err(start + idx),
        }
    }

    /// Sort a range of the buffer in ascending order. The sort is not
    /// stable: the relative order of equal elements may change.
    ///
    /// Panics if the range is not within the bounds of the buffer.
    #[inline]
    pub fn sort_range<R>(&mut self, range: R)
    where
        R: RangeBounds<usize>,
        T: Ord,
    {
        self.sort_range_by(range, Ord::cmp)
    }

    /// Sort a range of the buffer with a comparator function. The sort is
    /// not stable.
    pub fn sort_range_by<R, F>(&mut self, range: R, compare: F)
    where
        R: RangeBounds<usize>,
        F: FnMut(&T, &T) -> Ordering,
    {
        let Range { start, end } = self.checked_range(range);
        self.as_mut_slice()[start..end].sort_unstable_by(compare);
    }

    /// Reverse the order of a range of the buffer in place.
    ///
    /// Panics if the range is not within the bounds of the buffer.
    pub fn reverse_range<R>(&mut self, range: R)
    where
        R: RangeBounds<usize>,
    {
        let Range { start, end } = self.checked_range(range);
        self.as_mut_slice()[start..end].reverse();
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use crate::HeapVec;

    #[test]
    fn search_by_custom_equality() {
        let buf = HeapVec::from_slice(&["a", "B", "b", "A"]);
        let ignore_case = |a: &&str, b: &&str| a.eq_ignore_ascii_case(b);
        assert_eq!(buf.index_of_by(&"b", ignore_case), Some(1));
        assert_eq!(buf.last_index_of_by(&"a", ignore_case), Some(3));
        assert!(!buf.contains(&"c"));
        assert!(buf.contains_by(&"A", ignore_case));
    }

    #[test]
    fn search_empty_range() {
        let buf = HeapVec::from_slice(&[1, 2, 3]);
        assert_eq!(buf.binary_search_range(2..2, &5), Err(2));
    }

    #[test]
    fn sort_descending() {
        let mut buf = HeapVec::from_slice(&[3, 1, 4, 1, 5]);
        buf.sort_range_by(.., |a, b| b.cmp(a));
        assert_eq!(buf, [5, 4, 3, 1, 1]);
        assert_eq!(buf.binary_search_range_by(.., |p| 4.cmp(p)), Ok(1));
    }

    #[test]
    #[should_panic(expected = "Invalid element range: 1..5 (length 3)")]
    fn reverse_out_of_range() {
        let mut buf = HeapVec::from_slice(&[1, 2, 3]);
        buf.reverse_range(1..5);
    }
}
