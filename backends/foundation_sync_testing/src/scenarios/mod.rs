//! Reusable load scenarios for the blocking primitives.
//!
//! - [`handoff`]: producers and consumers sharing one `BoundedQueue`
//! - [`readers_writers`]: mixed read/write load over a `PolicyRwLock`

pub mod handoff;
pub mod readers_writers;

pub use handoff::{run_handoff, HandoffReport};
pub use readers_writers::{run_readers_writers, RwReport};
