//! Growable buffers which start in borrowed or pooled storage.
//!
//! A [`Buffer`] is a contiguous sequence whose storage comes from a
//! configurable provider: a caller-supplied region such as an array on the
//! stack, a shared recycling [`Pool`](pool::Pool), or the global heap. When
//! a buffer outgrows its storage it moves into a larger region from its
//! provider and releases the old one.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(feature = "nightly", feature(allocator_api))]
#![warn(missing_docs)]

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
struct _ReadmeDoctests;

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc as alloc_crate;

pub mod alloc;

pub mod buffer;

pub mod capacity;

pub mod cursor;

pub(crate) mod error;

#[cfg(feature = "alloc")]
pub mod pool;

pub mod storage;

pub(crate) mod trace;

#[cfg(feature = "alloc")]
pub mod writer;

pub use self::{
    buffer::{Buffer, FixedVec},
    cursor::{Cursor, CursorMut},
    error::{StorageError, UpdateError},
};

#[cfg(feature = "alloc")]
pub use self::{
    buffer::{HeapVec, PoolList, PoolVec, StackVec},
    pool::{Pool, Shared},
    writer::PoolWriter,
};
