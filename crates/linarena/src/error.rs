//! Error types for `linarena`.
//!
//! Only recoverable conditions are represented here. Programming errors such
//! as an alignment that is not a multiple of 8 panic at the call site, and
//! exhaustion under [`OnExhaustion::Abort`](crate::OnExhaustion::Abort) never
//! reaches the caller.

use std::fmt;

/// Errors reported by arena construction and allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A block was requested with no usable space.
    InvalidCapacity {
        /// The requested capacity in bytes.
        capacity: usize,
    },

    /// Alignment is neither 0 nor a multiple of 8.
    InvalidAlignment {
        /// The requested alignment.
        alignment: usize,
    },

    /// A fixed arena cannot hold the request.
    ArenaFull {
        /// Bytes needed, including alignment padding.
        requested: usize,
        /// Bytes left in the last block.
        available: usize,
    },

    /// The backing store refused to reserve a region.
    ReservationFailed {
        /// The size of the refused reservation.
        size: usize,
    },

    /// The size of the next block does not fit in `usize`.
    CapacityOverflow {
        /// Bytes needed by the push that triggered growth.
        requested: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCapacity { capacity } => {
                write!(f, "Invalid block capacity: {capacity} bytes")
            }
            Error::InvalidAlignment { alignment } => {
                write!(
                    f,
                    "Invalid alignment: {alignment} is not a multiple of 8"
                )
            }
            Error::ArenaFull {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Arena full: requested {requested} bytes, available {available} bytes"
                )
            }
            Error::ReservationFailed { size } => {
                write!(f, "Failed to reserve block of {size} bytes")
            }
            Error::CapacityOverflow { requested } => {
                write!(
                    f,
                    "Block capacity overflow while growing for {requested} bytes"
                )
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type for `linarena` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::ArenaFull {
                requested: 100,
                available: 50
            }
            .to_string(),
            "Arena full: requested 100 bytes, available 50 bytes"
        );
        assert_eq!(
            Error::InvalidAlignment { alignment: 12 }.to_string(),
            "Invalid alignment: 12 is not a multiple of 8"
        );
        assert_eq!(
            Error::ReservationFailed { size: 4096 }.to_string(),
            "Failed to reserve block of 4096 bytes"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            Error::InvalidCapacity { capacity: 0 },
            Error::InvalidCapacity { capacity: 0 }
        );
        assert_ne!(
            Error::ArenaFull {
                requested: 100,
                available: 50
            },
            Error::ArenaFull {
                requested: 200,
                available: 50
            }
        );
    }

    #[test]
    fn test_error_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&Error::CapacityOverflow { requested: usize::MAX });
    }
}
