//! Stress test configuration.

use core::time::Duration;

/// Configuration for stress tests and scenarios.
#[derive(Debug, Clone, Copy)]
pub struct StressConfig {
    /// Number of threads to spawn
    thread_count: usize,
    /// Number of iterations per thread
    iterations: usize,
    /// Optional maximum duration for the test
    duration: Option<Duration>,
    /// One in every `write_every` lock operations is a write
    write_every: usize,
    /// How long a lock holder stays inside its critical section
    hold: Duration,
}

impl StressConfig {
    /// Creates a new stress test configuration with default values.
    ///
    /// Defaults:
    /// - `thread_count`: 4
    /// - `iterations`: 1000
    /// - `duration`: None (no time limit)
    /// - `write_every`: 10
    /// - `hold`: zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            thread_count: 4,
            iterations: 1000,
            duration: None,
            write_every: 10,
            hold: Duration::ZERO,
        }
    }

    /// Sets the number of threads to spawn.
    #[must_use]
    pub const fn threads(mut self, count: usize) -> Self {
        self.thread_count = count;
        self
    }

    /// Sets the number of iterations per thread.
    #[must_use]
    pub const fn iterations(mut self, count: usize) -> Self {
        self.iterations = count;
        self
    }

    /// Sets the maximum duration for the test.
    ///
    /// If the duration is reached, threads will stop early.
    #[must_use]
    pub const fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Makes one in every `every` lock operations a write; 0 and 1 both mean
    /// every operation writes.
    #[must_use]
    pub const fn write_every(mut self, every: usize) -> Self {
        self.write_every = if every == 0 { 1 } else { every };
        self
    }

    /// Sets how long each lock holder sleeps inside its critical section.
    #[must_use]
    pub const fn hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Returns the thread count.
    #[must_use]
    pub const fn get_thread_count(&self) -> usize {
        self.thread_count
    }

    /// Returns the iteration count.
    #[must_use]
    pub const fn get_iterations(&self) -> usize {
        self.iterations
    }

    /// Returns the optional duration.
    #[must_use]
    pub const fn get_duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Returns the write frequency.
    #[must_use]
    pub const fn get_write_every(&self) -> usize {
        self.write_every
    }

    /// Returns the critical section hold time.
    #[must_use]
    pub const fn get_hold(&self) -> Duration {
        self.hold
    }

    /// Whether the operation for `(thread_id, iteration)` is a write.
    #[must_use]
    pub const fn is_write(&self, thread_id: usize, iteration: usize) -> bool {
        (thread_id + iteration) % self.write_every == 0
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// WHY: A zero write frequency would divide by zero
    /// WHAT: `write_every(0)` behaves like `write_every(1)`
    #[test]
    fn test_write_every_zero_means_all_writes() {
        let config = StressConfig::new().write_every(0);
        assert_eq!(config.get_write_every(), 1);
        assert!((0..10).all(|i| config.is_write(3, i)));
    }

    /// WHY: Scenarios rely on a predictable read/write mix
    /// WHAT: `write_every(4)` writes on a quarter of iterations
    #[test]
    fn test_write_mix() {
        let config = StressConfig::new().write_every(4).iterations(100);
        let writes = (0..config.get_iterations())
            .filter(|&i| config.is_write(0, i))
            .count();
        assert_eq!(writes, 25);
    }
}
