//! Stress test framework for the blocking primitives.
//!
//! Provides configurable high-contention testing with:
//! - Thread count control
//! - Iteration limits
//! - Time-based duration
//! - Success rate tracking, with panicking workers counted separately

use core::time::Duration;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

pub mod config;

pub use config::StressConfig;

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressResult {
    /// Total operations completed successfully
    pub successes: usize,
    /// Total operations that failed
    pub failures: usize,
    /// Worker threads that panicked before finishing
    pub panicked: usize,
    /// Total time taken for the test
    pub duration: Duration,
    /// Number of threads used
    pub thread_count: usize,
}

impl StressResult {
    /// Returns the total number of operations.
    #[must_use]
    pub const fn total_operations(&self) -> usize {
        self.successes + self.failures
    }

    /// Returns the success rate as a value between 0.0 and 1.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total_operations() == 0 {
            0.0
        } else {
            self.successes as f64 / self.total_operations() as f64
        }
    }

    /// Returns operations per second.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn operations_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.total_operations() as f64 / secs
        }
    }

    /// True when no operation failed and no worker panicked.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failures == 0 && self.panicked == 0
    }
}

/// Base stress test harness.
///
/// Spawns multiple threads that execute a closure repeatedly
/// until the test completes (based on iteration count or duration).
pub struct StressHarness {
    config: StressConfig,
}

impl StressHarness {
    /// Creates a new stress test harness with the given configuration.
    #[must_use]
    pub const fn new(config: StressConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this harness runs with.
    #[must_use]
    pub const fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Runs a stress test with the given operation closure.
    ///
    /// The closure receives:
    /// - `thread_id`: Index of the thread (`0..thread_count`)
    /// - `iteration`: Iteration number for this thread
    ///
    /// Returns `true` on success, `false` on failure. A panicking closure
    /// ends its worker and is counted in [`StressResult::panicked`].
    ///
    /// # Examples
    ///
    /// ```
    /// use foundation_sync::{LockPolicy, PolicyRwLock};
    /// use foundation_sync_testing::stress::{StressConfig, StressHarness};
    /// use std::sync::Arc;
    ///
    /// let lock = Arc::new(PolicyRwLock::new(0usize, LockPolicy::WriterPreference));
    /// let config = StressConfig::new().threads(4).iterations(100);
    /// let harness = StressHarness::new(config);
    ///
    /// let lock_clone = Arc::clone(&lock);
    /// let result = harness.run(move |_thread_id, _iteration| {
    ///     *lock_clone.write() += 1;
    ///     true
    /// });
    ///
    /// assert_eq!(*lock.read(), 400); // 4 threads * 100 iterations
    /// assert!(result.is_clean());
    /// ```
    pub fn run<F>(self, operation: F) -> StressResult
    where
        F: Fn(usize, usize) -> bool + Send + Sync + 'static,
    {
        let start = std::time::Instant::now();
        let operation = Arc::new(operation);

        let successes = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(AtomicUsize::new(0));
        let stop_flag = Arc::new(AtomicBool::new(false));

        // Spawn timeout thread if duration is set
        if let Some(duration) = self.config.get_duration() {
            let stop_flag_clone = Arc::clone(&stop_flag);
            thread::spawn(move || {
                thread::sleep(duration);
                stop_flag_clone.store(true, Ordering::Release);
            });
        }

        let mut handles = Vec::with_capacity(self.config.get_thread_count());

        for thread_id in 0..self.config.get_thread_count() {
            let operation = Arc::clone(&operation);
            let successes = Arc::clone(&successes);
            let failures = Arc::clone(&failures);
            let stop_flag = Arc::clone(&stop_flag);
            let iterations = self.config.get_iterations();

            handles.push(thread::spawn(move || {
                for iteration in 0..iterations {
                    if stop_flag.load(Ordering::Acquire) {
                        break;
                    }

                    if operation(thread_id, iteration) {
                        successes.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failures.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }));
        }

        let mut panicked = 0;
        for handle in handles {
            if let Err(payload) = handle.join() {
                tracing::warn!(
                    error = %crate::ScenarioError::from_panic(payload.as_ref()),
                    "stress worker panicked"
                );
                panicked += 1;
            }
        }

        let result = StressResult {
            successes: successes.load(Ordering::Relaxed),
            failures: failures.load(Ordering::Relaxed),
            panicked,
            duration: start.elapsed(),
            thread_count: self.config.get_thread_count(),
        };
        tracing::debug!(?result, "stress run finished");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_counts_every_operation() {
        let config = StressConfig::new().threads(3).iterations(20);
        let result = StressHarness::new(config).run(|thread_id, iteration| {
            (thread_id + iteration) % 2 == 0
        });
        assert_eq!(result.total_operations(), 60);
        assert_eq!(result.thread_count, 3);
        assert!(result.failures > 0);
        assert!(!result.is_clean());
    }

    /// WHY: Assertion failures inside workers must surface
    /// WHAT: A panicking worker is counted instead of aborting the run
    #[test]
    fn test_harness_counts_panics() {
        let config = StressConfig::new().threads(2).iterations(5);
        let result = StressHarness::new(config).run(|thread_id, iteration| {
            assert!(!(thread_id == 1 && iteration == 2), "probe tripped");
            true
        });
        assert_eq!(result.panicked, 1);
        assert_eq!(result.successes, 5 + 2);
    }

    #[test]
    fn test_duration_stops_early() {
        let config = StressConfig::new()
            .threads(2)
            .iterations(usize::MAX)
            .duration(Duration::from_millis(20));
        let result = StressHarness::new(config).run(|_, _| {
            thread::sleep(Duration::from_millis(1));
            true
        });
        assert!(result.successes > 0);
        assert!(result.operations_per_second() > 0.0);
    }
}
