use core::alloc::Layout;
use core::fmt;
use core::mem::{size_of, ManuallyDrop, MaybeUninit};
use core::ptr::{self, NonNull};
use core::slice;

use crate::alloc::{AllocateIn, Allocator, AllocatorDefault};
use crate::error::StorageError;
use crate::trace::trace_event;

/// An owned handle to a contiguous block of `T` slots and the provider
/// which will release it.
///
/// A region does not track which slots are initialized; its owner does.
/// Dropping the region releases the block without dropping any values.
pub struct Region<T, A: Allocator> {
    data: NonNull<T>,
    capacity: usize,
    alloc: A,
}

impl<T, A: Allocator> Region<T, A> {
    #[inline]
    const fn empty_capacity() -> usize {
        if size_of::<T>() == 0 {
            usize::MAX
        } else {
            0
        }
    }

    /// Create a region without storage.
    #[inline]
    pub const fn dangling(alloc: A) -> Self {
        Self {
            data: NonNull::dangling(),
            capacity: Self::empty_capacity(),
            alloc,
        }
    }

    /// Allocate a region of at least `capacity` slots.
    pub fn allocate_in<I>(capacity: usize, alloc_in: I) -> Result<Self, StorageError>
    where
        I: AllocateIn<Alloc = A>,
    {
        let layout = Self::layout(capacity)?;
        let (ptr, alloc) = alloc_in
            .allocate_in(layout)
            .map_err(|_| StorageError::AllocError(layout))?;
        if layout.size() == 0 {
            // providers hand out dangling pointers for empty layouts
            return Ok(Self::dangling(alloc));
        }
        Ok(Self {
            data: ptr.cast(),
            capacity: ptr.len() / size_of::<T>(),
            alloc,
        })
    }

    /// Create a region from its constituent parts.
    ///
    /// # Safety
    /// `data` must be valid for `capacity` slots of `T`, and releasing it
    /// through `alloc` with the array layout of `capacity` must be sound.
    #[inline]
    pub const unsafe fn from_raw_parts(data: NonNull<T>, capacity: usize, alloc: A) -> Self {
        Self {
            data,
            capacity,
            alloc,
        }
    }

    /// Disassemble this region without releasing it.
    #[inline]
    pub fn into_raw_parts(self) -> (NonNull<T>, usize, A) {
        let me = ManuallyDrop::new(self);
        // SAFETY: `me` is never used again and will not be dropped.
        let alloc = unsafe { ptr::read(&me.alloc) };
        (me.data, me.capacity, alloc)
    }

    #[inline]
    fn layout(capacity: usize) -> Result<Layout, StorageError> {
        Layout::array::<T>(capacity).map_err(StorageError::LayoutError)
    }

    #[inline]
    fn has_block(&self) -> bool {
        size_of::<T>() != 0 && self.capacity != 0
    }

    /// Access the provider of this region.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The number of slots in this region.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Access the slots as a readonly pointer.
    #[inline]
    pub const fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Access the slots as a mutable pointer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_ptr()
    }

    /// Access the slots as a slice of possibly-uninitialized values.
    #[inline]
    pub fn as_uninit_slice(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: the region is valid for `capacity` slots.
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr().cast(), self.capacity) }
    }

    /// Move the first `keep` values into a new block of at least `capacity`
    /// slots obtained from the same provider, then release the old block.
    ///
    /// # Safety
    /// The first `keep` slots must be initialized and `keep` may not
    /// exceed `capacity`.
    pub(crate) unsafe fn relocate(
        &mut self,
        capacity: usize,
        keep: usize,
    ) -> Result<(), StorageError> {
        debug_assert!(keep <= capacity && keep <= self.capacity);
        if size_of::<T>() == 0 {
            return Ok(());
        }
        let layout = Self::layout(capacity)?;
        let ptr = self
            .alloc
            .allocate(layout)
            .map_err(|_| StorageError::AllocError(layout))?;
        let data = ptr.cast::<T>();
        if keep > 0 {
            ptr::copy_nonoverlapping(self.data.as_ptr(), data.as_ptr(), keep);
        }
        trace_event!(from = self.capacity, to = capacity, "region relocated");
        self.release();
        self.data = data;
        self.capacity = ptr.len() / size_of::<T>();
        Ok(())
    }

    /// Return the block to its provider, leaving the region empty.
    pub(crate) fn release(&mut self) {
        if self.has_block() {
            // SAFETY: the layout matches the one used for allocation, or lies
            // between the requested and the provided size.
            unsafe {
                let layout = Layout::from_size_align_unchecked(
                    self.capacity * size_of::<T>(),
                    core::mem::align_of::<T>(),
                );
                self.alloc.deallocate(self.data.cast(), layout);
            }
        }
        self.data = NonNull::dangling();
        self.capacity = Self::empty_capacity();
    }
}

impl<T, A: AllocatorDefault> Region<T, A> {
    /// Constant initializer for a region without storage.
    pub const EMPTY: Self = Self::dangling(A::DEFAULT);
}

impl<T, A: Allocator> fmt::Debug for Region<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("data", &self.data)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<T, A: Allocator> Drop for Region<T, A> {
    #[inline]
    fn drop(&mut self) {
        self.release();
    }
}
