//! Fixed-capacity blocking FIFO queue for producer/consumer handoff.
//!
//! Producers block in [`BoundedQueue::push`] while the queue is full and
//! consumers block in [`BoundedQueue::pop`] while it is empty. Each successful
//! push wakes one consumer and each successful pop wakes one producer.
//!
//! # Examples
//!
//! ```
//! use foundation_sync::BoundedQueue;
//! use std::thread;
//!
//! let queue = BoundedQueue::new(2).unwrap();
//!
//! let producer = {
//!     let queue = queue.clone();
//!     thread::spawn(move || {
//!         for word in ["a", "b", "c"] {
//!             queue.push(word);
//!         }
//!     })
//! };
//!
//! assert_eq!(queue.pop(), "a");
//! assert_eq!(queue.pop(), "b");
//! assert_eq!(queue.pop(), "c");
//! producer.join().unwrap();
//! ```

mod ring;

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::errors::{QueueError, QueueResult};
use ring::Ring;

/// A thread-safe bounded FIFO queue using condition variables.
///
/// Cloning yields another handle to the same queue. The storage is released
/// when the last handle is dropped, and any items still queued are dropped
/// with it. A thread blocked inside `push` or `pop` holds a handle, so the
/// queue always outlives its waiters.
pub struct BoundedQueue<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    ring: Mutex<Ring<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ZeroCapacity`] when `capacity` is 0 and
    /// [`QueueError::Allocation`] when the slot storage cannot be reserved.
    pub fn new(capacity: usize) -> QueueResult<Self> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }

        let ring = Ring::with_capacity(capacity)?;
        tracing::debug!(capacity, "created bounded queue");

        Ok(Self {
            inner: Arc::new(Inner {
                ring: Mutex::new(ring),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity,
            }),
        })
    }

    /// Pushes an item to the tail, blocking while the queue is full.
    pub fn push(&self, item: T) {
        let mut ring = self.inner.lock();

        while ring.is_full() {
            tracing::trace!("queue full, producer waiting");
            ring = match self.inner.not_full.wait(ring) {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
        }

        ring.push_back(item);
        self.inner.not_empty.notify_one();
    }

    /// Pops the item at the head, blocking while the queue is empty.
    pub fn pop(&self) -> T {
        let mut ring = self.inner.lock();

        loop {
            if let Some(item) = ring.pop_front() {
                self.inner.not_full.notify_one();
                return item;
            }

            tracing::trace!("queue empty, consumer waiting");
            ring = match self.inner.not_empty.wait(ring) {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
        }
    }

    /// Returns the number of items currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if no items are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns true if a push would block.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.inner.lock().is_full()
    }

    /// Returns the fixed capacity of the queue.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl<T> Inner<T> {
    // Ring updates are single steps taken after the wait loop, so a panic
    // while the lock is held cannot leave head/tail/len out of step.
    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        match self.ring.lock() {
            Ok(g) => g,
            Err(e) => {
                tracing::warn!("recovering poisoned queue lock");
                e.into_inner()
            }
        }
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("BoundedQueue");
        d.field("capacity", &self.inner.capacity);
        match self.inner.ring.try_lock() {
            Ok(ring) => d.field("len", &ring.len()),
            Err(_) => d.field("len", &format_args!("<locked>")),
        };
        d.finish()
    }
}
