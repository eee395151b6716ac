//! A shared recycling pool of memory blocks.
//!
//! Blocks are rented in power-of-two size classes, so a rental may be larger
//! than requested. Returned blocks are retained for reuse by later renters of
//! the same class and alignment, up to a configurable limit. The pool is
//! internally synchronized and may be shared between threads; the buffers
//! renting from it are not.

use core::alloc::Layout;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use alloc_crate::vec::Vec as StdVec;
use spin::Mutex;

use crate::alloc::{layout_dangling, AllocError, Allocator, AllocatorDefault, Global};
use crate::trace::trace_event;

/// Settings for a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// The smallest block size in bytes. Rounded up to a power of two.
    pub min_block_size: usize,
    /// The maximum number of returned blocks kept for reuse. Blocks
    /// returned beyond this limit are released to the global allocator.
    pub max_retained: usize,
}

impl PoolConfig {
    /// The default settings: 64-byte minimum blocks, 64 retained blocks.
    pub const DEFAULT: Self = Self {
        min_block_size: 64,
        max_retained: 64,
    };
}

impl Default for PoolConfig {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A snapshot of pool activity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// The number of blocks handed out.
    pub rented: usize,
    /// The number of blocks handed back.
    pub returned: usize,
    /// The number of rentals served from a retained block.
    pub reused: usize,
    /// The number of blocks currently held for reuse.
    pub retained: usize,
}

#[derive(Debug)]
struct FreeBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: a free block is exclusively owned by the pool's free list.
unsafe impl Send for FreeBlock {}

/// A recycling pool of memory blocks.
#[derive(Debug)]
pub struct Pool {
    config: PoolConfig,
    free: Mutex<StdVec<FreeBlock>>,
    rented: AtomicUsize,
    returned: AtomicUsize,
    reused: AtomicUsize,
}

impl Pool {
    /// Create a new, empty pool with the default settings.
    pub const fn new() -> Self {
        Self::with_config(PoolConfig::DEFAULT)
    }

    /// Create a new, empty pool with custom settings.
    pub const fn with_config(config: PoolConfig) -> Self {
        let min_block_size = match config.min_block_size.checked_next_power_of_two() {
            Some(size) => size,
            None => 1,
        };
        Self {
            config: PoolConfig {
                min_block_size,
                max_retained: config.max_retained,
            },
            free: Mutex::new(StdVec::new()),
            rented: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
        }
    }

    /// Access the settings of this pool.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Take a snapshot of the pool statistics.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            rented: self.rented.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            retained: self.free.lock().len(),
        }
    }

    /// Release all retained blocks to the global allocator.
    pub fn trim(&self) {
        let blocks = core::mem::take(&mut *self.free.lock());
        for block in blocks {
            // SAFETY: retained blocks were allocated by `Global` with this layout.
            unsafe { Global.deallocate(block.ptr, block.layout) };
        }
    }

    /// The layout of the size class serving `layout`. Any size between a
    /// class's lower bound and its block size maps back to the same class,
    /// so the layout given on release resolves to the rented block.
    #[inline]
    fn block_layout(&self, layout: Layout) -> Result<Layout, AllocError> {
        let size = layout
            .size()
            .max(self.config.min_block_size)
            .checked_next_power_of_two()
            .ok_or(AllocError)?;
        Layout::from_size_align(size, layout.align()).map_err(|_| AllocError)
    }

    fn rent(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        let block = self.block_layout(layout)?;
        let found = {
            let mut free = self.free.lock();
            free.iter()
                .rposition(|b| b.layout == block)
                .map(|idx| free.swap_remove(idx))
        };
        let ptr = if let Some(found) = found {
            self.reused.fetch_add(1, Ordering::Relaxed);
            trace_event!(size = block.size(), "pool rent: reused block");
            found.ptr
        } else {
            trace_event!(size = block.size(), "pool rent: new block");
            Global.allocate(block)?.cast()
        };
        self.rented.fetch_add(1, Ordering::Relaxed);
        Ok(NonNull::slice_from_raw_parts(ptr, block.size()))
    }

    unsafe fn give_back(&self, ptr: NonNull<u8>, layout: Layout) {
        let Ok(block) = self.block_layout(layout) else {
            return;
        };
        self.returned.fetch_add(1, Ordering::Relaxed);
        {
            let mut free = self.free.lock();
            if free.len() < self.config.max_retained {
                trace_event!(size = block.size(), "pool return: retained block");
                free.push(FreeBlock { ptr, layout: block });
                return;
            }
        }
        trace_event!(size = block.size(), "pool return: released block");
        Global.deallocate(ptr, block);
    }
}

impl Default for Pool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.trim();
    }
}

unsafe impl Allocator for Pool {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.size() == 0 {
            Ok(NonNull::slice_from_raw_parts(layout_dangling(layout), 0))
        } else {
            self.rent(layout)
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() > 0 {
            self.give_back(ptr, layout)
        }
    }
}

static SHARED_POOL: Pool = Pool::new();

/// The process-wide shared pool used by the pooled buffer front-ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Shared;

impl Shared {
    /// Access the pool instance behind this provider.
    #[inline]
    pub fn pool() -> &'static Pool {
        &SHARED_POOL
    }
}

unsafe impl Allocator for Shared {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        SHARED_POOL.allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        SHARED_POOL.deallocate(ptr, layout)
    }
}

impl AllocatorDefault for Shared {
    const DEFAULT: Self = Shared;
}
