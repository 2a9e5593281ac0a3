//! Read-write lock with a selectable fairness policy.
//!
//! [`PolicyRwLock`] admits either any number of readers or one writer. Which
//! waiting class goes next when both are queued is decided by its
//! [`LockPolicy`]:
//! - [`LockPolicy::ReaderPreference`]: readers drain before writers.
//! - [`LockPolicy::WriterPreference`]: a waiting writer goes before a new burst
//!   of readers once the active readers are gone.
//! - [`LockPolicy::NWay`]: readers and writers alternate, with at most `limit`
//!   readers admitted per turn while a writer is waiting.
//!
//! # Examples
//!
//! ```
//! use foundation_sync::{LockPolicy, PolicyRwLock};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let lock = Arc::new(PolicyRwLock::new(vec![1, 2, 3], LockPolicy::n_way(2).unwrap()));
//!
//! let writer = {
//!     let lock = Arc::clone(&lock);
//!     thread::spawn(move || lock.write().push(4))
//! };
//!
//! let len = lock.read().len();
//! assert!(len == 3 || len == 4);
//! writer.join().unwrap();
//! assert_eq!(*lock.read(), vec![1, 2, 3, 4]);
//! ```

mod policy;
mod raw;
mod state;

use core::cell::UnsafeCell;
use core::fmt;
use core::ops::{Deref, DerefMut};

pub use policy::LockPolicy;
pub use raw::RawPolicyLock;
pub use state::{LockSnapshot, LockState};

/// A read-write lock protecting a value, arbitrated by a [`LockPolicy`].
///
/// Guards release the lock when dropped. The lock is not reentrant: a thread
/// holding a guard that asks for a conflicting guard deadlocks.
pub struct PolicyRwLock<T: ?Sized> {
    raw: RawPolicyLock,
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Send for PolicyRwLock<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for PolicyRwLock<T> {}

/// RAII shared guard for [`PolicyRwLock`].
#[must_use = "if unused the lock is released immediately"]
pub struct PolicyReadGuard<'a, T: ?Sized + 'a> {
    lock: &'a PolicyRwLock<T>,
}

unsafe impl<T: ?Sized + Sync> Sync for PolicyReadGuard<'_, T> {}

/// RAII exclusive guard for [`PolicyRwLock`].
#[must_use = "if unused the lock is released immediately"]
pub struct PolicyWriteGuard<'a, T: ?Sized + 'a> {
    lock: &'a PolicyRwLock<T>,
}

unsafe impl<T: ?Sized + Sync> Sync for PolicyWriteGuard<'_, T> {}

impl<T> PolicyRwLock<T> {
    /// Creates an unlocked lock around `value`.
    #[must_use]
    pub fn new(value: T, policy: LockPolicy) -> Self {
        Self {
            raw: RawPolicyLock::new(policy),
            data: UnsafeCell::new(value),
        }
    }

    /// Consumes the lock and returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> PolicyRwLock<T> {
    /// Acquires shared access, blocking until the policy admits this reader.
    pub fn read(&self) -> PolicyReadGuard<'_, T> {
        self.raw.lock_shared();
        PolicyReadGuard { lock: self }
    }

    /// Acquires exclusive access, blocking until no reader or writer holds
    /// the lock.
    pub fn write(&self) -> PolicyWriteGuard<'_, T> {
        self.raw.lock_exclusive();
        PolicyWriteGuard { lock: self }
    }

    /// Returns a mutable reference to the value.
    ///
    /// Since this requires a mutable reference to the lock, no locking is needed.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    #[inline]
    #[must_use]
    pub fn policy(&self) -> LockPolicy {
        self.raw.policy()
    }

    /// Returns a consistent copy of the lock's counters.
    #[must_use]
    pub fn snapshot(&self) -> LockSnapshot {
        self.raw.snapshot()
    }
}

impl<T: Default> Default for PolicyRwLock<T> {
    fn default() -> Self {
        Self::new(T::default(), LockPolicy::default())
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for PolicyRwLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("PolicyRwLock");
        d.field("policy", &self.raw.policy());
        if self.raw.try_lock_shared() {
            let guard = PolicyReadGuard { lock: self };
            d.field("data", &&*guard);
        } else {
            d.field("data", &format_args!("<locked>"));
        }
        d.finish()
    }
}

impl<T: ?Sized> Deref for PolicyReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for PolicyReadGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: a read guard only exists while its shared hold is live.
        unsafe { self.lock.raw.unlock_shared() };
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for PolicyReadGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for PolicyReadGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl<T: ?Sized> Deref for PolicyWriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for PolicyWriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for PolicyWriteGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: a write guard only exists while its exclusive hold is live.
        unsafe { self.lock.raw.unlock_exclusive() };
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for PolicyWriteGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for PolicyWriteGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new() {
        let lock = PolicyRwLock::new(42, LockPolicy::ReaderPreference);
        assert_eq!(*lock.read(), 42);
        assert_eq!(lock.policy(), LockPolicy::ReaderPreference);
    }

    #[test]
    fn test_read_guards_overlap() {
        let lock = PolicyRwLock::new(vec![1, 2, 3], LockPolicy::WriterPreference);
        let r1 = lock.read();
        let r2 = lock.read();
        assert_eq!(*r1, vec![1, 2, 3]);
        assert_eq!(*r2, vec![1, 2, 3]);
        assert_eq!(lock.snapshot().active_readers, 2);
    }

    #[test]
    fn test_write() {
        let lock = PolicyRwLock::new(0, LockPolicy::n_way(1).unwrap());
        {
            let mut w = lock.write();
            *w = 42;
            assert_eq!(lock.snapshot().state, LockState::Exclusive);
        }
        assert_eq!(lock.snapshot().state, LockState::Idle);
        assert_eq!(*lock.read(), 42);
    }

    #[test]
    fn test_into_inner_and_get_mut() {
        let mut lock = PolicyRwLock::new(1, LockPolicy::default());
        *lock.get_mut() += 1;
        assert_eq!(lock.into_inner(), 2);
    }

    /// WHY: Guards must release even when their thread panics
    /// WHAT: A guard dropped during unwinding leaves the lock idle
    #[test]
    fn test_guard_released_on_panic() {
        let lock = Arc::new(PolicyRwLock::new(0, LockPolicy::WriterPreference));
        let lock_clone = Arc::clone(&lock);
        let result = thread::spawn(move || {
            let _guard = lock_clone.write();
            panic!("test panic");
        })
        .join();
        assert!(result.is_err());
        assert_eq!(lock.snapshot().state, LockState::Idle);
        *lock.write() = 5;
        assert_eq!(*lock.read(), 5);
    }

    #[test]
    fn test_debug() {
        let lock = PolicyRwLock::new(7, LockPolicy::ReaderPreference);
        let debug = format!("{lock:?}");
        assert!(debug.contains("PolicyRwLock"));
        assert!(debug.contains('7'));

        let guard = lock.write();
        let debug = format!("{lock:?}");
        assert!(debug.contains("<locked>"));
        drop(guard);
    }
}
