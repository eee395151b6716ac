//! The growable buffer core and its front-end configurations.
//!
//! A [`Buffer`] is a contiguous, growable sequence parameterized by a
//! storage provider `A` and a growth policy `G`. The front-end aliases
//! select a provider and policy for common use cases:
//!
//! | Alias | Initial storage | Grows into | Released on drop |
//! |---|---|---|---|
//! | [`StackVec`] | caller region | shared pool | pooled blocks |
//! | [`PoolList`] | shared pool | shared pool | yes |
//! | [`PoolVec`] | none | shared pool | yes |
//! | [`HeapVec`] | none | global heap | yes |
//! | [`FixedVec`] | caller region | cannot grow | no |

use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ops::{Bound, Range, RangeBounds};
use core::ptr::{self, NonNull};
use core::slice;

use crate::alloc::{AllocateIn, Allocator, AllocatorDefault, Borrowed, Spill};
use crate::capacity::{Grow, GrowFixed, GrowPooled};
use crate::cursor::{Cursor, CursorMut};
use crate::error::{index_panic, range_panic, StorageError, UpdateError};
use crate::storage::insert::Inserter;
use crate::storage::Region;

#[cfg(feature = "alloc")]
use crate::{alloc::Global, capacity::GrowDoubling, pool::Shared};

mod convert;
mod search;

/// A buffer which starts in a caller-supplied region, such as an array on
/// the stack, and spills into the shared pool once the region is outgrown.
#[cfg(feature = "alloc")]
pub type StackVec<'a, T> = Buffer<T, Spill<'a, Shared>, GrowPooled>;

/// A buffer which rents its storage from the shared pool up front.
#[cfg(feature = "alloc")]
pub type PoolList<T> = Buffer<T, Shared, GrowPooled>;

/// A lazily allocated buffer which grows into the shared pool, returning
/// its storage when dropped.
#[cfg(feature = "alloc")]
pub type PoolVec<T> = Buffer<T, Shared, GrowDoubling>;

/// A lazily allocated buffer backed by the global heap.
#[cfg(feature = "alloc")]
pub type HeapVec<T> = Buffer<T, Global, GrowDoubling>;

/// A buffer confined to a caller-supplied region.
pub type FixedVec<'a, T> = Buffer<T, Borrowed<'a>, GrowFixed>;

#[inline]
fn bounds_to_range(range: impl RangeBounds<usize>, length: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Unbounded => 0,
        Bound::Included(i) => *i,
        Bound::Excluded(i) => i.saturating_add(1),
    };
    let end = match range.end_bound() {
        Bound::Unbounded => length,
        Bound::Included(i) => i.saturating_add(1),
        Bound::Excluded(i) => *i,
    };
    Range { start, end }
}

/// A growable, contiguous sequence of `T` with a configurable storage
/// provider `A` and growth policy `G`.
///
/// Growth moves the contents into a larger region obtained from the
/// provider and releases the previous region. Dropping the buffer drops
/// its contents and releases its region.
pub struct Buffer<T, A: Allocator, G: Grow = GrowPooled> {
    region: Region<T, A>,
    length: usize,
    _grow: PhantomData<G>,
}

impl<T, A: AllocatorDefault, G: Grow> Buffer<T, A, G> {
    /// Constructs a new, empty `Buffer`.
    ///
    /// The buffer will not allocate until elements are pushed onto it.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[cfg(feature = "alloc")] {
    /// use flex_pool::HeapVec;
    /// let mut buf = HeapVec::<i32>::new();
    /// buf.push(1);
    /// assert_eq!(buf.capacity(), 16);
    /// # }
    /// ```
    pub const fn new() -> Self {
        Self {
            region: Region::EMPTY,
            length: 0,
            _grow: PhantomData,
        }
    }

    /// Try to construct a buffer with room for at least `capacity` elements.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
        Self::try_with_capacity_in(capacity, A::DEFAULT)
    }

    /// Construct a buffer with room for at least `capacity` elements.
    /// Pooled providers may supply more than the requested capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Construct a buffer containing a copy of `data`.
    pub fn from_slice(data: &[T]) -> Self
    where
        T: Clone,
    {
        let mut buf = Self::with_capacity(data.len());
        buf.extend_from_slice(data);
        buf
    }
}

impl<T, A: Allocator, G: Grow> Buffer<T, A, G> {
    /// Constructs a new, empty `Buffer` with a provider instance.
    /// The buffer will not allocate until elements are pushed onto it.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            region: Region::dangling(alloc),
            length: 0,
            _grow: PhantomData,
        }
    }

    /// Construct a buffer with room for at least `capacity` elements,
    /// allocated from `alloc_in`.
    pub fn with_capacity_in<I>(capacity: usize, alloc_in: I) -> Self
    where
        I: AllocateIn<Alloc = A>,
    {
        match Self::try_with_capacity_in(capacity, alloc_in) {
            Ok(res) => res,
            Err(error) => error.panic(),
        }
    }

    /// Try to construct a buffer with room for at least `capacity` elements,
    /// allocated from `alloc_in`.
    pub fn try_with_capacity_in<I>(capacity: usize, alloc_in: I) -> Result<Self, StorageError>
    where
        I: AllocateIn<Alloc = A>,
    {
        Ok(Self {
            region: Region::allocate_in(capacity, alloc_in)?,
            length: 0,
            _grow: PhantomData,
        })
    }

    /// Construct an empty buffer over an owned region.
    #[inline]
    pub fn from_region(region: Region<T, A>) -> Self {
        Self {
            region,
            length: 0,
            _grow: PhantomData,
        }
    }
}

impl<'a, T> Buffer<T, Borrowed<'a>, GrowFixed> {
    /// Construct an empty buffer confined to a caller-supplied region.
    /// Growing past the end of the region fails with
    /// `StorageError::CapacityLimit`.
    pub fn from_borrowed(region: &'a mut [MaybeUninit<T>]) -> Self {
        let (data, capacity) = borrowed_parts(region);
        Self::from_region(unsafe { Region::from_raw_parts(data, capacity, Borrowed::new()) })
    }
}

impl<'a, T, A: Allocator, G: Grow> Buffer<T, Spill<'a, A>, G> {
    /// Construct an empty buffer which uses a caller-supplied region until
    /// it is outgrown, then continues in storage allocated from `alloc`.
    pub fn from_borrowed_in(region: &'a mut [MaybeUninit<T>], alloc: A) -> Self {
        let (data, capacity) = borrowed_parts(region);
        let spill = Spill::new(alloc, data.as_ptr().cast::<u8>());
        Self::from_region(unsafe { Region::from_raw_parts(data, capacity, spill) })
    }

    /// Check whether the contents have moved out of the borrowed region.
    #[inline]
    pub fn is_spilled(&self) -> bool {
        !ptr::eq(
            self.region.as_ptr().cast::<u8>(),
            self.region.allocator().initial(),
        )
    }
}

impl<'a, T, A: AllocatorDefault, G: Grow> Buffer<T, Spill<'a, A>, G> {
    /// Construct an empty buffer which uses a caller-supplied region until
    /// it is outgrown, then continues in storage from the default provider.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[cfg(feature = "alloc")] {
    /// use flex_pool::{storage::array_storage, StackVec};
    /// let mut storage = array_storage::<u32, 4>();
    /// let mut buf = StackVec::from_borrowed(storage.as_uninit_slice());
    /// buf.extend_from_slice(&[1, 2, 3, 4]);
    /// assert!(!buf.is_spilled());
    /// buf.push(5);
    /// assert!(buf.is_spilled());
    /// assert_eq!(buf, [1, 2, 3, 4, 5]);
    /// # }
    /// ```
    #[inline]
    pub fn from_borrowed(region: &'a mut [MaybeUninit<T>]) -> Self {
        Self::from_borrowed_in(region, A::DEFAULT)
    }
}

#[inline]
fn borrowed_parts<T>(region: &mut [MaybeUninit<T>]) -> (NonNull<T>, usize) {
    let capacity = if core::mem::size_of::<T>() == 0 {
        usize::MAX
    } else {
        region.len()
    };
    (NonNull::from(region).cast(), capacity)
}

impl<T, A: Allocator, G: Grow> Buffer<T, A, G> {
    /// Access the provider of this buffer.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.region.allocator()
    }

    /// Access the contents as a readonly pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.region.as_ptr()
    }

    /// Access the contents as a mutable pointer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.region.as_mut_ptr()
    }

    /// View the logical contents without copying.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.region.as_ptr(), self.length) }
    }

    /// View the logical contents as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.region.as_mut_ptr(), self.length) }
    }

    /// The number of elements the buffer can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// The number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Check whether the buffer has no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Force the length of the buffer.
    ///
    /// # Safety
    /// `length` may not exceed the capacity and the first `length`
    /// elements must be initialized.
    #[inline]
    pub unsafe fn set_len(&mut self, length: usize) {
        debug_assert!(length <= self.region.capacity());
        self.length = length;
    }

    /// Drop the contents and release the storage of this buffer.
    #[inline]
    pub fn dispose(self) {
        drop(self)
    }

    /// Drop all elements, retaining the current storage.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Access the element at `index`, passing a mutable reference to `f`.
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn with_mut<R>(&mut self, index: usize, f: impl FnOnce(&mut T) -> R) -> R {
        let length = self.length;
        match self.as_mut_slice().get_mut(index) {
            Some(item) => f(item),
            None => index_panic(index, length),
        }
    }

    /// Create a cursor over the contents.
    #[inline]
    pub fn cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), 0, self.length)
    }

    /// Create a cursor over a range of the contents.
    ///
    /// Panics if the range is not within the bounds of the buffer.
    #[inline]
    pub fn cursor_range(&self, range: impl RangeBounds<usize>) -> Cursor<'_, T> {
        let Range { start, end } = self.checked_range(range);
        Cursor::new(self.as_slice(), start, end - start)
    }

    /// Create a cursor over the contents which permits modification.
    #[inline]
    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        let length = self.length;
        CursorMut::new(self.as_mut_slice(), 0, length)
    }

    #[inline]
    pub(crate) fn checked_range(&self, range: impl RangeBounds<usize>) -> Range<usize> {
        let range = bounds_to_range(range, self.length);
        if range.start > range.end || range.end > self.length {
            range_panic(range.start, range.end, self.length);
        }
        range
    }

    /// Ensure the capacity is at least `min_capacity`, growing if required.
    #[inline]
    pub fn ensure_capacity(&mut self, min_capacity: usize) {
        match self.try_ensure_capacity(min_capacity) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to ensure the capacity is at least `min_capacity`.
    #[inline]
    pub fn try_ensure_capacity(&mut self, min_capacity: usize) -> Result<(), StorageError> {
        self._try_reserve(min_capacity.saturating_sub(self.length))
    }

    /// Reserve room for at least `additional` more elements.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        match self._try_reserve(additional) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to reserve room for at least `additional` more elements.
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), StorageError> {
        self._try_reserve(additional)
    }

    fn _try_reserve(&mut self, additional: usize) -> Result<(), StorageError> {
        let capacity = self.region.capacity();
        if capacity - self.length >= additional {
            return Ok(());
        }
        let Some(next) = G::next_capacity(capacity, additional, self.length) else {
            return Err(StorageError::CapacityLimit);
        };
        // SAFETY: the first `length` slots are initialized and `next` is
        // at least `length + additional`.
        unsafe { self.region.relocate(next, self.length) }
    }

    /// Append an element, growing the buffer if required.
    pub fn push(&mut self, item: T) {
        match self._try_reserve(1) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
        unsafe {
            self.push_unchecked(item);
        }
    }

    /// Try to append an element, returning it within the error if storage
    /// could not be obtained.
    pub fn try_push(&mut self, item: T) -> Result<(), UpdateError<T>> {
        if let Err(error) = self._try_reserve(1) {
            return Err(UpdateError::new(error, item));
        }
        unsafe {
            self.push_unchecked(item);
        }
        Ok(())
    }

    /// Append an element without checking the available capacity.
    ///
    /// # Safety
    /// The buffer must have spare capacity for at least one element.
    #[inline]
    pub unsafe fn push_unchecked(&mut self, item: T) {
        let length = self.length;
        self.region.as_mut_ptr().add(length).write(item);
        self.length = length + 1;
    }

    /// Remove and return the last element, if any.
    pub fn pop(&mut self) -> Option<T> {
        if self.length > 0 {
            self.length -= 1;
            Some(unsafe { self.region.as_ptr().add(self.length).read() })
        } else {
            None
        }
    }

    /// Append a copy of `items` to the end of the buffer.
    pub fn extend_from_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        match self.try_extend_from_slice(items) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to append a copy of `items` to the end of the buffer.
    pub fn try_extend_from_slice(&mut self, items: &[T]) -> Result<(), StorageError>
    where
        T: Clone,
    {
        let length = self.length;
        self.try_insert_slice(length, items)
    }

    /// Insert `value` at `index`, shifting the following elements right.
    ///
    /// Panics if `index` is greater than the length of the buffer.
    pub fn insert(&mut self, index: usize, value: T) {
        match self.try_insert(index, value) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to insert `value` at `index`, returning it within the error if
    /// storage could not be obtained.
    ///
    /// Panics if `index` is greater than the length of the buffer.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<(), UpdateError<T>> {
        let length = self.length;
        if index > length {
            index_panic(index, length);
        }
        if let Err(error) = self._try_reserve(1) {
            return Err(UpdateError::new(error, value));
        }
        unsafe {
            let head = self.region.as_mut_ptr().add(index);
            if index < length {
                ptr::copy(head, head.add(1), length - index);
            }
            head.write(value);
        }
        self.length = length + 1;
        Ok(())
    }

    /// Insert a copy of `values` at `index`, shifting the following
    /// elements right.
    ///
    /// Panics if `index` is greater than the length of the buffer.
    pub fn insert_slice(&mut self, index: usize, values: &[T])
    where
        T: Clone,
    {
        match self.try_insert_slice(index, values) {
            Ok(_) => (),
            Err(error) => error.panic(),
        }
    }

    /// Try to insert a copy of `values` at `index`.
    ///
    /// Panics if `index` is greater than the length of the buffer.
    pub fn try_insert_slice(&mut self, index: usize, values: &[T]) -> Result<(), StorageError>
    where
        T: Clone,
    {
        let length = self.length;
        if index > length {
            index_panic(index, length);
        }
        if values.is_empty() {
            return Ok(());
        }
        self._try_reserve(values.len())?;
        let data = self.region.as_mut_ptr();
        // SAFETY: capacity for `values.len()` more elements was reserved above.
        let mut insert = unsafe { Inserter::new(data, &mut self.length, index, values.len()) };
        for item in values {
            insert.push_clone(item);
        }
        insert.complete();
        Ok(())
    }

    /// Remove and return the element at `index`, shifting the following
    /// elements left.
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> T {
        let length = self.length;
        if index >= length {
            index_panic(index, length);
        }
        unsafe {
            let head = self.region.as_mut_ptr().add(index);
            let result = head.read();
            ptr::copy(head.add(1), head, length - index - 1);
            self.length = length - 1;
            result
        }
    }

    /// Drop the elements in `range`, shifting the following elements left.
    ///
    /// Panics if the range is not within the bounds of the buffer.
    pub fn remove_range(&mut self, range: impl RangeBounds<usize>) {
        let Range { start, end } = self.checked_range(range);
        let count = end - start;
        if count == 0 {
            return;
        }
        let length = self.length;
        // the tail is leaked rather than double-dropped if a destructor panics
        self.length = start;
        unsafe {
            let head = self.region.as_mut_ptr().add(start);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(head, count));
            ptr::copy(head.add(count), head, length - end);
        }
        self.length = length - count;
    }

    /// Remove and return the element at `index`, replacing it with the last
    /// element. This does not preserve ordering.
    ///
    /// Panics if `index` is out of bounds.
    pub fn swap_remove(&mut self, index: usize) -> T {
        let length = self.length;
        if index >= length {
            index_panic(index, length);
        }
        let last = length - 1;
        self.length = last;
        unsafe {
            let data = self.region.as_mut_ptr();
            let result = data.add(index).read();
            if index != last {
                ptr::copy_nonoverlapping(data.add(last), data.add(index), 1);
            }
            result
        }
    }

    /// Shorten the buffer to `length` elements, dropping the remainder.
    pub fn truncate(&mut self, length: usize) {
        let old_len = self.length;
        if length < old_len {
            self.length = length;
            unsafe {
                let tail = self.region.as_mut_ptr().add(length);
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(tail, old_len - length));
            }
        }
    }

    /// Resize the buffer to `new_len` elements, filling new slots with
    /// clones of `value`.
    #[inline]
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        match self.try_resize(new_len, value) {
            Ok(_) => (),
            Err(err) => err.panic(),
        }
    }

    /// Try to resize the buffer to `new_len` elements.
    pub fn try_resize(&mut self, new_len: usize, value: T) -> Result<(), StorageError>
    where
        T: Clone,
    {
        let length = self.length;
        if new_len <= length {
            self.truncate(new_len);
            return Ok(());
        }
        let count = new_len - length;
        self._try_reserve(count)?;
        let data = self.region.as_mut_ptr();
        let mut insert = unsafe { Inserter::new(data, &mut self.length, length, count) };
        for _ in 1..count {
            insert.push_clone(&value);
        }
        insert.push(value);
        insert.complete();
        Ok(())
    }

    /// Keep only the elements for which `f` returns `true`.
    #[inline]
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.retain_mut(|r| f(r))
    }

    /// Keep only the elements for which `f` returns `true`, permitting
    /// modification of each element.
    pub fn retain_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        let orig_len = self.length;
        if orig_len == 0 {
            return;
        }
        // elements are leaked rather than double-dropped if `f` panics
        self.length = 0;
        let data = self.region.as_mut_ptr();
        let mut len = 0;
        for idx in 0..orig_len {
            unsafe {
                let read = data.add(idx);
                if f(&mut *read) {
                    if len != idx {
                        ptr::copy_nonoverlapping(read, data.add(len), 1);
                    }
                    len += 1;
                } else {
                    ptr::drop_in_place(read);
                }
            }
        }
        self.length = len;
    }

    /// Access the unused capacity of the buffer.
    #[inline]
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<T>] {
        let length = self.length;
        &mut self.region.as_uninit_slice()[length..]
    }

    /// Copy the contents into a newly allocated boxed slice.
    #[cfg(feature = "alloc")]
    pub fn to_owned_array(&self) -> alloc_crate::boxed::Box<[T]>
    where
        T: Clone,
    {
        self.as_slice().into()
    }

    /// Copy the contents into a standard `Vec`.
    #[cfg(feature = "alloc")]
    pub fn to_collection(&self) -> alloc_crate::vec::Vec<T>
    where
        T: Clone,
    {
        self.as_slice().to_vec()
    }

    fn try_extend(&mut self, iter: &mut impl Iterator<Item = T>) -> Result<(), UpdateError<T>> {
        loop {
            let length = self.length;
            let spare = self.region.capacity() - length;
            if spare > 0 {
                let data = self.region.as_mut_ptr();
                // SAFETY: the gap covers only spare capacity.
                let mut insert = unsafe { Inserter::new(data, &mut self.length, length, spare) };
                while !insert.full() {
                    let Some(item) = iter.next() else {
                        // ran out of items to insert
                        return Ok(());
                    };
                    insert.push(item);
                }
                insert.complete();
            }
            let Some(item) = iter.next() else {
                break;
            };
            let min_reserve = iter.size_hint().0.saturating_add(1);
            match self._try_reserve(min_reserve) {
                Ok(_) => unsafe { self.push_unchecked(item) },
                Err(err) => return Err(UpdateError::new(err, item)),
            }
        }
        Ok(())
    }
}

impl<T, A: Allocator, G: Grow> Drop for Buffer<T, A, G> {
    fn drop(&mut self) {
        self.truncate(0);
    }
}

// A buffer is only `Send` or `Sync` when its provider is.
unsafe impl<T: Send, A: Allocator + Send, G: Grow> Send for Buffer<T, A, G> {}

unsafe impl<T: Sync, A: Allocator + Sync, G: Grow> Sync for Buffer<T, A, G> {}

/// ```compile_fail,E0597
/// use flex_pool::{storage::array_storage, StackVec};
///
/// fn run<F: FnOnce() -> () + 'static>(f: F) { f() }
///
/// let mut storage = array_storage::<usize, 10>();
/// let mut v = StackVec::from_borrowed(storage.as_uninit_slice());
/// run(move || v.clear());
/// ```
#[cfg(doctest)]
fn _lifetime_check() {}

/// ```compile_fail,E0502
/// use flex_pool::HeapVec;
///
/// let mut v = HeapVec::<u32>::new();
/// v.push(1);
/// let first = &v[0];
/// v.push(2);
/// assert_eq!(*first, 1);
/// ```
#[cfg(doctest)]
fn _growth_invalidates_references() {}

/// ```compile_fail,E0599
/// use flex_pool::{alloc::Borrowed, capacity::GrowPooled, storage::array_storage, Buffer};
///
/// let mut storage = array_storage::<u32, 2>();
/// let buf = Buffer::<u32, Borrowed<'_>, GrowPooled>::from_borrowed(storage.as_uninit_slice());
/// ```
#[cfg(doctest)]
fn _borrowed_region_cannot_grow() {}
