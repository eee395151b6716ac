//! Growth behavior for buffers which have exceeded their available storage.

use core::fmt::Debug;

/// Compute the capacity to request when a buffer must grow.
///
/// Must only be called when `capacity - length < additional`. The result is
/// the larger of the required length and double the current capacity, or the
/// larger of `additional` and `minimum` for a buffer without storage. Returns
/// `None` if the required capacity is not representable.
#[inline]
pub const fn grow_capacity(
    capacity: usize,
    additional: usize,
    length: usize,
    minimum: usize,
) -> Option<usize> {
    if capacity == 0 {
        return Some(if additional > minimum {
            additional
        } else {
            minimum
        });
    }
    let Some(required) = length.checked_add(additional) else {
        return None;
    };
    let doubled = capacity.saturating_mul(2);
    Some(if required > doubled { required } else { doubled })
}

/// Growth policy for a buffer front-end.
pub trait Grow: Debug {
    /// The capacity floor applied when a buffer first acquires storage.
    const MIN_CAPACITY: usize;

    /// Calculate the next capacity to request from the storage provider.
    #[inline]
    fn next_capacity(capacity: usize, additional: usize, length: usize) -> Option<usize> {
        grow_capacity(capacity, additional, length, Self::MIN_CAPACITY)
    }
}

/// Doubling growth with an initial floor of 16 elements, used by
/// heap-backed buffers which allocate lazily.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowDoubling;

impl Grow for GrowDoubling {
    const MIN_CAPACITY: usize = 16;
}

/// Doubling growth without an initial floor, used by pooled buffers where
/// the caller chooses the minimum capacity to rent.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowPooled;

impl Grow for GrowPooled {
    const MIN_CAPACITY: usize = 0;
}

/// A policy which never grows, for buffers confined to their initial storage.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowFixed;

impl Grow for GrowFixed {
    const MIN_CAPACITY: usize = 0;

    #[inline]
    fn next_capacity(_capacity: usize, _additional: usize, _length: usize) -> Option<usize> {
        None
    }
}
