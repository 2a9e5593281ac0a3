//! Arbitration rules deciding which waiting class gets the lock next.

use core::fmt;
use core::num::NonZeroUsize;
use core::str::FromStr;

use crate::errors::{LockError, LockResult};

use super::state::Counters;

/// Fairness policy of a [`super::RawPolicyLock`], fixed at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LockPolicy {
    /// Readers are admitted whenever no writer is active. Writers only get in
    /// once every reader, waiting ones included, has drained.
    #[default]
    ReaderPreference,

    /// Once the active readers drain, a waiting writer goes before any newly
    /// arriving reader, and a releasing writer hands over to the next writer.
    /// Readers arriving while a read burst is still active may join it.
    WriterPreference,

    /// While a writer is waiting, at most `limit` readers are admitted since
    /// the previous writer released; later readers wait for the writer's turn.
    /// With no writer waiting readers are never capped.
    NWay { limit: NonZeroUsize },
}

impl LockPolicy {
    /// Builds an [`LockPolicy::NWay`] policy.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::ZeroAlternationLimit`] when `limit` is 0.
    pub fn n_way(limit: usize) -> LockResult<Self> {
        NonZeroUsize::new(limit)
            .map(|limit| Self::NWay { limit })
            .ok_or(LockError::ZeroAlternationLimit)
    }

    /// Returns the n-way alternation limit, `None` for the other policies.
    #[must_use]
    pub const fn alternation_limit(&self) -> Option<NonZeroUsize> {
        match self {
            Self::NWay { limit } => Some(*limit),
            _ => None,
        }
    }

    /// The admission rule a waiting reader re-evaluates on every wakeup.
    pub(crate) fn admits_reader(&self, counters: &Counters) -> bool {
        if counters.active_writers > 0 {
            return false;
        }

        let writer_waiting = counters.waiting_writers > 0;
        match self {
            Self::ReaderPreference => true,
            Self::WriterPreference => !(writer_waiting && counters.active_readers == 0),
            Self::NWay { limit } => {
                !(writer_waiting && counters.readers_since_writer >= limit.get())
            }
        }
    }

    /// Writers only need the lock to be idle.
    #[inline]
    pub(crate) fn admits_writer(counters: &Counters) -> bool {
        counters.active_readers == 0 && counters.active_writers == 0
    }

    /// Whether a releasing writer hands over to a waiting writer before
    /// waking readers.
    #[inline]
    pub(crate) const fn hands_off_to_writer(&self) -> bool {
        matches!(self, Self::WriterPreference)
    }
}

impl fmt::Display for LockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReaderPreference => write!(f, "reader"),
            Self::WriterPreference => write!(f, "writer"),
            Self::NWay { limit } => write!(f, "n-way:{limit}"),
        }
    }
}

impl FromStr for LockPolicy {
    type Err = LockError;

    /// Accepts `reader`, `writer` and `n-way:<limit>`, as printed by `Display`.
    fn from_str(value: &str) -> LockResult<Self> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "reader" | "reader-preference" => Ok(Self::ReaderPreference),
            "writer" | "writer-preference" => Ok(Self::WriterPreference),
            other => {
                let limit = other
                    .strip_prefix("n-way:")
                    .and_then(|limit| limit.trim().parse::<usize>().ok())
                    .ok_or_else(|| LockError::UnknownPolicy(trimmed.to_owned()))?;
                Self::n_way(limit)
            }
        }
    }
}
