//! Bookkeeping shared by every waiter of a lock.

/// Coarse state of a lock as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockState {
    Idle,
    /// At least one reader holds the lock.
    Shared,
    /// Exactly one writer holds the lock.
    Exclusive,
}

/// Point-in-time copy of a lock's counters, taken under its internal mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSnapshot {
    pub active_readers: usize,
    pub waiting_readers: usize,
    pub active_writers: usize,
    pub waiting_writers: usize,
    /// Readers admitted since a writer last acquired the lock.
    pub readers_since_writer: usize,
    pub state: LockState,
}

impl LockSnapshot {
    /// Returns true if the snapshot satisfies the mutual exclusion invariants:
    /// at most one writer, and never a writer together with readers.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.active_writers <= 1 && !(self.active_writers == 1 && self.active_readers > 0)
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Counters {
    pub(crate) active_readers: usize,
    pub(crate) waiting_readers: usize,
    pub(crate) active_writers: usize,
    pub(crate) waiting_writers: usize,
    pub(crate) readers_since_writer: usize,
}

impl Counters {
    pub(crate) fn state(&self) -> LockState {
        if self.active_writers > 0 {
            LockState::Exclusive
        } else if self.active_readers > 0 {
            LockState::Shared
        } else {
            LockState::Idle
        }
    }

    pub(crate) fn snapshot(&self) -> LockSnapshot {
        LockSnapshot {
            active_readers: self.active_readers,
            waiting_readers: self.waiting_readers,
            active_writers: self.active_writers,
            waiting_writers: self.waiting_writers,
            readers_since_writer: self.readers_since_writer,
            state: self.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// WHY: The derived state must follow the counters
    /// WHAT: Idle, shared and exclusive map from reader/writer counts
    #[test]
    fn test_state_from_counters() {
        let mut counters = Counters::default();
        assert_eq!(counters.state(), LockState::Idle);

        counters.active_readers = 3;
        assert_eq!(counters.state(), LockState::Shared);

        counters.active_readers = 0;
        counters.active_writers = 1;
        assert_eq!(counters.state(), LockState::Exclusive);
        assert!(counters.snapshot().is_consistent());
    }

    /// WHY: The invariant check is what stress probes rely on
    /// WHAT: A writer alongside readers, or two writers, is inconsistent
    #[test]
    fn test_inconsistent_snapshots() {
        let mut counters = Counters {
            active_readers: 1,
            active_writers: 1,
            ..Counters::default()
        };
        assert!(!counters.snapshot().is_consistent());

        counters.active_readers = 0;
        counters.active_writers = 2;
        assert!(!counters.snapshot().is_consistent());
    }
}
