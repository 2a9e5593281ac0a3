//! Blocking synchronization primitives for cooperating OS threads.
//!
//! This crate provides two independent building blocks:
//! - [`BoundedQueue`]: a fixed-capacity FIFO handoff queue whose producers block
//!   while it is full and whose consumers block while it is empty.
//! - [`PolicyRwLock`] / [`RawPolicyLock`]: a read-write lock that admits many
//!   readers or one writer, arbitrated by a [`LockPolicy`].
//!
//! Both are built on `std::sync::{Mutex, Condvar}` and every wait re-checks its
//! predicate in a loop, so spurious wakeups and broadcast wakeups are harmless.
//!
//! # Examples
//!
//! ```
//! use foundation_sync::{BoundedQueue, LockPolicy, PolicyRwLock};
//! use std::thread;
//!
//! let queue = BoundedQueue::new(4).expect("capacity is non-zero");
//! let producer = {
//!     let queue = queue.clone();
//!     thread::spawn(move || {
//!         for i in 0..8 {
//!             queue.push(i);
//!         }
//!     })
//! };
//! let received: Vec<i32> = (0..8).map(|_| queue.pop()).collect();
//! producer.join().unwrap();
//! assert_eq!(received, (0..8).collect::<Vec<_>>());
//!
//! let lock = PolicyRwLock::new(0u32, LockPolicy::WriterPreference);
//! *lock.write() += 1;
//! assert_eq!(*lock.read(), 1);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod errors;
pub mod queue;
pub mod rwlock;

pub use errors::{LockError, LockResult, QueueError, QueueResult};
pub use queue::BoundedQueue;
pub use rwlock::{
    LockPolicy, LockSnapshot, LockState, PolicyReadGuard, PolicyRwLock, PolicyWriteGuard,
    RawPolicyLock,
};
