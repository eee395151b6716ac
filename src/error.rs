//! Error handling.

use core::alloc::{Layout, LayoutError};
use core::fmt;

/// An enumeration of error types raised by storage providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// A memory allocation failed.
    AllocError(Layout),
    /// The limit of the current storage was reached, or a capacity
    /// calculation overflowed.
    CapacityLimit,
    /// The requested layout was not allocatable.
    LayoutError(LayoutError),
}

impl StorageError {
    /// Generic description of this error.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllocError(_) => "Allocation error",
            Self::CapacityLimit => "Exceeded storage capacity limit",
            Self::LayoutError(_) => "Layout error",
        }
    }

    /// Generate a panic with this error as the reason.
    #[cold]
    #[inline(never)]
    pub fn panic(self) -> ! {
        if let Self::AllocError(layout) = self {
            crate::alloc::handle_alloc_error(layout);
        } else {
            panic!("{}", self.as_str())
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LayoutError> for StorageError {
    fn from(err: LayoutError) -> Self {
        Self::LayoutError(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

/// An error raised by buffer update operations when storage could not be
/// obtained. Carries the value that could not be stored.
#[derive(Clone)]
pub struct UpdateError<T> {
    pub(crate) error: StorageError,
    pub(crate) value: T,
}

impl<T> UpdateError<T> {
    pub(crate) fn new(error: StorageError, value: T) -> Self {
        Self { error, value }
    }

    /// Generic description of this error
    pub fn as_str(&self) -> &'static str {
        "Update error"
    }

    /// Get a reference to the contained `StorageError`
    pub fn error(&self) -> &StorageError {
        &self.error
    }

    /// Unwrap the inner value of this error
    pub fn into_value(self) -> T {
        self.value
    }

    /// Generate a panic with this error as the reason
    #[cold]
    #[inline(never)]
    pub fn panic(self) -> ! {
        panic!("{}: {}", self.as_str(), self.error.as_str());
    }
}

impl<T> fmt::Debug for UpdateError<T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for UpdateError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}: {}", self.as_str(), self.error))
    }
}

#[cfg(feature = "std")]
impl<T> std::error::Error for UpdateError<T> {}

/// Raise the fail-fast error for an invalid element index.
#[cold]
#[inline(never)]
pub(crate) fn index_panic(index: usize, length: usize) -> ! {
    panic!("Invalid element index: {index} (length {length})");
}

/// Raise the fail-fast error for an invalid element range.
#[cold]
#[inline(never)]
pub(crate) fn range_panic(start: usize, end: usize, length: usize) -> ! {
    panic!("Invalid element range: {start}..{end} (length {length})");
}

#[cfg(test)]
mod tests {
    use super::{StorageError, UpdateError};
    use core::alloc::Layout;

    #[test]
    #[should_panic(expected = "memory allocation of 8 bytes failed")]
    fn alloc_error_panic() {
        // When testing, crate::alloc::handle_alloc_error is replaced with an
        // explicit panic. This is because #[should_panic] does not currently
        // capture the panic that is started in the standard out-of-memory handler.
        let a = StorageError::AllocError(Layout::new::<usize>());
        a.panic();
    }

    #[test]
    #[should_panic(expected = "Exceeded storage capacity limit")]
    fn capacity_error_panic() {
        StorageError::CapacityLimit.panic();
    }

    #[test]
    fn update_error_returns_value() {
        let err = UpdateError::new(StorageError::CapacityLimit, 5u32);
        assert_eq!(err.error(), &StorageError::CapacityLimit);
        assert_eq!(
            format!("{}", err),
            "Update error: Exceeded storage capacity limit"
        );
        assert_eq!(err.into_value(), 5);
    }

    #[test]
    #[should_panic(expected = "Invalid element index: 3 (length 2)")]
    fn index_error_panic() {
        super::index_panic(3, 2);
    }
}
