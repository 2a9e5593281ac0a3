//! Data-less read-write lock driven by a [`LockPolicy`].
//!
//! All counters live behind one mutex. Readers wait on the `readers` condvar,
//! writers on the `writers` condvar. A releasing reader wakes one writer when
//! it was the last reader out; a releasing writer wakes the next writer or all
//! waiting readers depending on the policy.

use core::fmt;
use std::sync::{Condvar, Mutex, MutexGuard};

use super::policy::LockPolicy;
use super::state::{Counters, LockSnapshot};

/// A read-write lock without protected data.
///
/// Use [`super::PolicyRwLock`] for RAII guards over a value; this type exposes
/// the bare acquire/release operations.
///
/// # Examples
///
/// ```
/// use foundation_sync::{LockPolicy, LockState, RawPolicyLock};
///
/// let lock = RawPolicyLock::new(LockPolicy::n_way(4).unwrap());
///
/// lock.lock_shared();
/// lock.lock_shared();
/// assert_eq!(lock.snapshot().state, LockState::Shared);
///
/// // SAFETY: both shared holds were taken above.
/// unsafe {
///     lock.unlock_shared();
///     lock.unlock_shared();
/// }
///
/// lock.lock_exclusive();
/// assert_eq!(lock.snapshot().state, LockState::Exclusive);
/// // SAFETY: the exclusive hold was taken above.
/// unsafe { lock.unlock_exclusive() };
/// ```
pub struct RawPolicyLock {
    policy: LockPolicy,
    counters: Mutex<Counters>,
    readers: Condvar,
    writers: Condvar,
}

impl RawPolicyLock {
    #[must_use]
    pub fn new(policy: LockPolicy) -> Self {
        tracing::debug!(%policy, "created policy lock");
        Self {
            policy,
            counters: Mutex::new(Counters::default()),
            readers: Condvar::new(),
            writers: Condvar::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    /// Blocks until the policy admits this thread as a reader.
    pub fn lock_shared(&self) {
        let mut counters = self.counters();
        counters.waiting_readers += 1;

        while !self.policy.admits_reader(&counters) {
            tracing::trace!(
                active_writers = counters.active_writers,
                waiting_writers = counters.waiting_writers,
                "reader waiting"
            );
            counters = wait(&self.readers, counters);
        }

        counters.waiting_readers -= 1;
        counters.active_readers += 1;
        counters.readers_since_writer = counters.readers_since_writer.saturating_add(1);
    }

    /// Takes a shared hold only if the policy admits a reader right now.
    pub(crate) fn try_lock_shared(&self) -> bool {
        let mut counters = self.counters();
        if !self.policy.admits_reader(&counters) {
            return false;
        }

        counters.active_readers += 1;
        counters.readers_since_writer = counters.readers_since_writer.saturating_add(1);
        true
    }

    /// Releases a shared hold.
    ///
    /// # Safety
    ///
    /// The calling context must hold a shared lock taken with
    /// [`Self::lock_shared`] that has not been released yet.
    pub unsafe fn unlock_shared(&self) {
        let mut counters = self.counters();
        debug_assert!(counters.active_readers > 0, "unlock_shared without a reader");
        counters.active_readers -= 1;

        if counters.active_readers == 0 && counters.waiting_writers > 0 {
            tracing::trace!("last reader out, waking one writer");
            self.writers.notify_one();
        }
    }

    /// Blocks until no reader and no writer holds the lock, then takes it
    /// exclusively.
    pub fn lock_exclusive(&self) {
        let mut counters = self.counters();
        counters.waiting_writers += 1;

        while !LockPolicy::admits_writer(&counters) {
            tracing::trace!(
                active_readers = counters.active_readers,
                active_writers = counters.active_writers,
                "writer waiting"
            );
            counters = wait(&self.writers, counters);
        }

        counters.waiting_writers -= 1;
        counters.active_writers = 1;
        counters.readers_since_writer = 0;
    }

    /// Releases the exclusive hold and wakes the next waiters per policy.
    ///
    /// # Safety
    ///
    /// The calling context must hold the exclusive lock taken with
    /// [`Self::lock_exclusive`].
    pub unsafe fn unlock_exclusive(&self) {
        let mut counters = self.counters();
        debug_assert_eq!(counters.active_writers, 1, "unlock_exclusive without a writer");
        counters.active_writers = 0;

        if self.policy.hands_off_to_writer() && counters.waiting_writers > 0 {
            tracing::trace!("handing off to next writer");
            self.writers.notify_one();
        } else if counters.waiting_readers > 0 {
            tracing::trace!(waiting = counters.waiting_readers, "waking reader batch");
            self.readers.notify_all();
        } else if counters.waiting_writers > 0 {
            tracing::trace!("waking one writer");
            self.writers.notify_one();
        }
    }

    /// Returns a consistent copy of the lock's counters.
    #[must_use]
    pub fn snapshot(&self) -> LockSnapshot {
        self.counters().snapshot()
    }

    // Each counter update is a single step, so a poisoned mutex still guards
    // consistent counters.
    fn counters(&self) -> MutexGuard<'_, Counters> {
        match self.counters.lock() {
            Ok(g) => g,
            Err(e) => {
                tracing::warn!("recovering poisoned lock state");
                e.into_inner()
            }
        }
    }
}

fn wait<'a>(condvar: &Condvar, guard: MutexGuard<'a, Counters>) -> MutexGuard<'a, Counters> {
    match condvar.wait(guard) {
        Ok(g) => g,
        Err(e) => e.into_inner(),
    }
}

impl Default for RawPolicyLock {
    fn default() -> Self {
        Self::new(LockPolicy::default())
    }
}

impl fmt::Debug for RawPolicyLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("RawPolicyLock");
        d.field("policy", &self.policy);
        match self.counters.try_lock() {
            Ok(counters) => d.field("state", &counters.state()),
            Err(_) => d.field("state", &format_args!("<busy>")),
        };
        d.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rwlock::LockState;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn wait_for(lock: &RawPolicyLock, pred: impl Fn(&LockSnapshot) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !pred(&lock.snapshot()) {
            assert!(Instant::now() < deadline, "condition never reached");
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// WHY: Counters must track each transition
    /// WHAT: Shared then exclusive holds update the snapshot and reset
    #[test]
    fn test_snapshot_transitions() {
        let lock = RawPolicyLock::new(LockPolicy::ReaderPreference);
        assert_eq!(lock.snapshot().state, LockState::Idle);

        lock.lock_shared();
        lock.lock_shared();
        let snap = lock.snapshot();
        assert_eq!(snap.active_readers, 2);
        assert_eq!(snap.readers_since_writer, 2);
        unsafe {
            lock.unlock_shared();
            lock.unlock_shared();
        }

        lock.lock_exclusive();
        let snap = lock.snapshot();
        assert_eq!(snap.state, LockState::Exclusive);
        assert_eq!(snap.readers_since_writer, 0);
        unsafe { lock.unlock_exclusive() };
        assert_eq!(lock.snapshot().state, LockState::Idle);
    }

    /// WHY: A writer must wait for the reader burst to drain
    /// WHAT: `lock_exclusive` blocks until the last reader leaves
    #[test]
    #[ntest::timeout(5000)]
    fn test_writer_waits_for_readers() {
        let lock = Arc::new(RawPolicyLock::new(LockPolicy::ReaderPreference));
        let acquired = Arc::new(AtomicBool::new(false));
        lock.lock_shared();

        let writer = {
            let lock = Arc::clone(&lock);
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                lock.lock_exclusive();
                acquired.store(true, Ordering::SeqCst);
                unsafe { lock.unlock_exclusive() };
            })
        };

        wait_for(&lock, |s| s.waiting_writers == 1);
        assert!(!acquired.load(Ordering::SeqCst));

        unsafe { lock.unlock_shared() };
        writer.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
    }

    /// WHY: Writer preference must hold back a fresh reader burst
    /// WHAT: With a writer waiting and no reader active, a reader blocks
    #[test]
    #[ntest::timeout(5000)]
    fn test_writer_preference_blocks_new_burst() {
        let lock = Arc::new(RawPolicyLock::new(LockPolicy::WriterPreference));
        lock.lock_exclusive();

        let writer = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                lock.lock_exclusive();
                let snap = lock.snapshot();
                unsafe { lock.unlock_exclusive() };
                snap
            })
        };
        wait_for(&lock, |s| s.waiting_writers == 1);

        let reader = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                lock.lock_shared();
                unsafe { lock.unlock_shared() };
            })
        };
        wait_for(&lock, |s| s.waiting_readers == 1);

        // The waiting writer goes first; the reader is still queued behind it.
        unsafe { lock.unlock_exclusive() };
        let snap = writer.join().unwrap();
        assert_eq!(snap.waiting_readers, 1);
        reader.join().unwrap();
    }

    /// WHY: Debug output is used in diagnostics
    /// WHAT: It names the policy and current state
    #[test]
    fn test_debug() {
        let lock = RawPolicyLock::new(LockPolicy::WriterPreference);
        let debug = format!("{lock:?}");
        assert!(debug.contains("WriterPreference"));
        assert!(debug.contains("Idle"));
    }
}
