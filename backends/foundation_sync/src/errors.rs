use derive_more::From;

use std::collections::TryReserveError;

pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// Construction failures of a [`crate::BoundedQueue`].
#[derive(From, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// A queue must hold at least one item.
    ZeroCapacity,

    /// The slot storage could not be reserved.
    Allocation(TryReserveError),
}

impl std::error::Error for QueueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Allocation(err) => Some(err),
            Self::ZeroCapacity => None,
        }
    }
}

impl core::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "queue capacity must be at least 1"),
            Self::Allocation(err) => write!(f, "failed to allocate queue storage: {err}"),
        }
    }
}

pub type LockResult<T> = std::result::Result<T, LockError>;

/// Construction failures of a [`crate::LockPolicy`].
#[derive(From, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The n-way policy needs to admit at least one reader per turn.
    ZeroAlternationLimit,

    #[from(ignore)]
    UnknownPolicy(String),
}

impl std::error::Error for LockError {}

impl core::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroAlternationLimit => {
                write!(f, "n-way alternation limit must be at least 1")
            }
            Self::UnknownPolicy(value) => write!(f, "unknown lock policy: {value:?}"),
        }
    }
}
