//! Backing storage regions for buffers.

use const_default::ConstDefault;

mod array;
pub(crate) mod insert;
mod region;

pub use self::{array::ArrayStorage, region::Region};

/// Create a new array storage region for type `T` and capacity `N`,
/// suitable for placing on the stack and lending to a buffer.
pub const fn array_storage<T, const N: usize>() -> ArrayStorage<T, N> {
    ArrayStorage::DEFAULT
}
