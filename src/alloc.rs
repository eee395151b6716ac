//! Storage providers: where regions come from and how they are released.

use core::alloc::Layout;
#[cfg(not(feature = "allocator-api2"))]
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};
#[cfg(feature = "zeroize")]
use core::slice;

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
use alloc_crate::alloc::{alloc as raw_alloc, dealloc as raw_dealloc};

#[cfg(all(feature = "alloc", feature = "allocator-api2"))]
pub use allocator_api2::alloc::Global;
#[cfg(feature = "allocator-api2")]
pub use allocator_api2::alloc::{AllocError, Allocator};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

#[cfg(all(not(test), feature = "alloc"))]
pub use alloc_crate::alloc::handle_alloc_error;

#[cfg(any(test, not(feature = "alloc")))]
/// Custom allocation error handler.
pub fn handle_alloc_error(layout: Layout) -> ! {
    panic!("memory allocation of {} bytes failed", layout.size());
}

/// A well-aligned, non-null pointer for an empty allocation.
#[inline]
pub(crate) fn layout_dangling(layout: Layout) -> NonNull<u8> {
    // SAFETY: layout alignments are guaranteed to be non-zero.
    unsafe { NonNull::new_unchecked(ptr::null_mut::<u8>().wrapping_add(layout.align())) }
}

/// The AllocError error indicates an allocation failure that may be due to
/// resource exhaustion or to something wrong when combining the given input
/// arguments with this allocator.
#[cfg(not(feature = "allocator-api2"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AllocError;

#[cfg(not(feature = "allocator-api2"))]
impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

#[cfg(all(feature = "std", not(feature = "allocator-api2")))]
impl std::error::Error for AllocError {}

/// A storage provider: allocates and releases blocks of memory described
/// by a `Layout`.
///
/// An allocation may be larger than requested; the returned slice reports
/// the usable size. A released block must be described by a layout with the
/// same alignment and a size between the requested and the returned size.
///
/// # Safety
/// - Memory blocks returned from an allocator must point to valid memory and
///   retain their validity until the instance and all of its clones are dropped.
/// - Cloning or moving the allocator must not invalidate memory blocks returned
///   from this allocator.
#[cfg(not(feature = "allocator-api2"))]
pub unsafe trait Allocator {
    /// Try to allocate a slice of memory within this allocator instance,
    /// returning the new allocation.
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError>;

    /// Release an allocation produced by this allocator.
    ///
    /// # Safety
    /// The value `ptr` must represent an allocation produced by this allocator, otherwise
    /// a memory access error may occur. The value `layout` must fit the allocation.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Obtain a reference to this allocator type.
    #[inline(always)]
    fn by_ref(&self) -> &Self
    where
        Self: Sized,
    {
        self
    }
}

#[cfg(not(feature = "allocator-api2"))]
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout)
    }
}

/// For all types which are an allocator or reference an allocator, enable their
/// usage as a target for allocation.
pub trait AllocateIn: Sized {
    /// The type of the allocator instance
    type Alloc: Allocator;

    /// Try to allocate a slice of a memory corresponding to `layout`, returning
    /// the new allocation and the allocator instance
    fn allocate_in(self, layout: Layout) -> Result<(NonNull<[u8]>, Self::Alloc), AllocError>;
}

impl<A: Allocator> AllocateIn for A {
    type Alloc = A;

    #[inline]
    fn allocate_in(self, layout: Layout) -> Result<(NonNull<[u8]>, Self::Alloc), AllocError> {
        let data = self.allocate(layout)?;
        Ok((data, self))
    }
}

/// A trait implemented by allocators supporting a constant initializer.
/// This cannot use ConstDefault as it is not implemented for the external
/// `Global` allocator.
pub trait AllocatorDefault: Allocator + Clone + Default {
    /// The constant initializer for this allocator.
    const DEFAULT: Self;
}

/// The global memory allocator, used as the heap storage provider.
///
/// When the `alloc` feature is enabled, this type implements the `Allocator`
/// trait by forwarding calls to the allocator registered with the
/// `#[global_allocator]` attribute if there is one, or the `std` crate's default.
#[cfg(any(not(feature = "alloc"), not(feature = "allocator-api2")))]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "alloc", derive(Default, Copy))]
pub struct Global;

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        let ptr = if layout.size() == 0 {
            layout_dangling(layout)
        } else {
            let Some(ptr) = NonNull::new(unsafe { raw_alloc(layout) }) else {
                return Err(AllocError);
            };
            ptr
        };
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() > 0 {
            raw_dealloc(ptr.as_ptr(), layout);
        }
    }
}

#[cfg(not(feature = "alloc"))]
// Stub implementation to allow Global as the default allocator type
// even when the `alloc` feature is not enabled. Any usage as an allocator
// will result in a panic.
unsafe impl Allocator for Global {
    fn allocate(&self, _layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        unimplemented!();
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        unimplemented!();
    }
}

#[cfg(feature = "alloc")]
impl AllocatorDefault for Global {
    const DEFAULT: Self = Global;
}

/// The provider for a caller-supplied region. It never allocates, so a
/// buffer using only borrowed storage fails to grow past its region.
/// Instances are only created by the buffer constructors which accept a
/// caller region.
#[derive(Debug, PartialEq, Eq)]
pub struct Borrowed<'a>(PhantomData<&'a mut ()>);

unsafe impl Allocator for Borrowed<'_> {
    #[inline(always)]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.size() == 0 {
            Ok(NonNull::slice_from_raw_parts(layout_dangling(layout), 0))
        } else {
            Err(AllocError)
        }
    }

    #[inline]
    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}
}

impl Borrowed<'_> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

/// A provider which starts from a borrowed region and spills into
/// allocations from `A` once the region is outgrown. Releasing the
/// borrowed region is a no-op.
#[derive(Debug)]
pub struct Spill<'a, A> {
    alloc: A,
    initial: *const u8,
    _borrowed: Borrowed<'a>,
}

impl<'a, A> Spill<'a, A> {
    pub(crate) const fn new(alloc: A, initial: *const u8) -> Self {
        Self {
            alloc,
            initial,
            _borrowed: Borrowed::new(),
        }
    }

    /// Access the provider used for spilled allocations.
    pub fn inner(&self) -> &A {
        &self.alloc
    }

    #[inline]
    pub(crate) fn initial(&self) -> *const u8 {
        self.initial
    }
}

// The initial pointer is only compared, never dereferenced.
unsafe impl<A: Send> Send for Spill<'_, A> {}

unsafe impl<A: Sync> Sync for Spill<'_, A> {}

impl<A: Default + Allocator> Default for Spill<'_, A> {
    #[inline]
    fn default() -> Self {
        Self::new(A::default(), ptr::null())
    }
}

unsafe impl<A: Allocator> Allocator for Spill<'_, A> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.alloc.allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if !ptr::eq(self.initial, ptr.as_ptr()) {
            self.alloc.deallocate(ptr, layout)
        }
    }
}

impl<A: Default + Allocator> Clone for Spill<'_, A> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<A: AllocatorDefault> AllocatorDefault for Spill<'_, A> {
    const DEFAULT: Self = Self::new(A::DEFAULT, ptr::null());
}

#[cfg(feature = "zeroize")]
/// A provider which allocates via `A` and zeroizes every block before
/// releasing it, so recycled pool blocks never carry stale content.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroizingAlloc<A>(pub A);

#[cfg(feature = "zeroize")]
unsafe impl<A: Allocator> Allocator for ZeroizingAlloc<A> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.0.allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() > 0 {
            let mem = slice::from_raw_parts_mut(ptr.as_ptr(), layout.size());
            mem.zeroize();
        }
        self.0.deallocate(ptr, layout)
    }
}

#[cfg(feature = "zeroize")]
impl<A: AllocatorDefault> AllocatorDefault for ZeroizingAlloc<A> {
    const DEFAULT: Self = ZeroizingAlloc(A::DEFAULT);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_never_allocates() {
        let alloc = Borrowed::new();
        assert!(alloc.allocate(Layout::new::<u32>()).is_err());
        let empty = alloc
            .allocate(Layout::from_size_align(0, 8).unwrap())
            .unwrap();
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.cast::<u8>().as_ptr() as usize % 8, 0);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn spill_skips_initial_region() {
        let mut region = [0u64; 4];
        let initial = region.as_mut_ptr().cast::<u8>();
        let spill = Spill::new(Global, initial);
        // releasing the borrowed region must be a no-op
        unsafe {
            spill.deallocate(
                NonNull::new(initial).unwrap(),
                Layout::new::<[u64; 4]>(),
            )
        };
        let layout = Layout::new::<[u64; 8]>();
        let block = spill.allocate(layout).unwrap();
        assert!(block.len() >= layout.size());
        unsafe { spill.deallocate(block.cast(), layout) };
    }
}
