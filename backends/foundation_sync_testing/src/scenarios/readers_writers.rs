//! Mixed reader/writer load over a [`PolicyRwLock`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use foundation_sync::{LockPolicy, LockState, PolicyRwLock};

use crate::errors::{ScenarioError, ScenarioResult};
use crate::probe::InvariantProbe;
use crate::stress::{StressConfig, StressHarness};

/// What a reader/writer run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RwReport {
    /// Policy the lock ran under.
    pub policy: LockPolicy,
    /// Read sections completed.
    pub reads: usize,
    /// Write sections completed.
    pub writes: usize,
    /// Counter value after the run; equals `writes` unless an update was lost.
    pub final_value: usize,
    /// Largest number of readers seen inside at once.
    pub max_concurrent_readers: usize,
    /// Exclusion violations seen by the probe, inconsistent snapshots, and a
    /// lock still held once every worker finished.
    pub violations: usize,
    /// Wall time of the run.
    pub duration: Duration,
}

impl RwReport {
    /// True when no exclusion violation happened and no write was lost.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.violations == 0 && self.final_value == self.writes
    }
}

/// Drives `config.get_thread_count()` threads against one lock, each doing
/// `config.get_iterations()` sections, one in every
/// `config.get_write_every()` of them a write.
///
/// # Errors
///
/// Returns [`ScenarioError::WorkerPanicked`] when any worker panics.
///
/// # Examples
///
/// ```
/// use foundation_sync::LockPolicy;
/// use foundation_sync_testing::scenarios::readers_writers::run_readers_writers;
/// use foundation_sync_testing::StressConfig;
///
/// let config = StressConfig::new().threads(4).iterations(200).write_every(5);
/// let report = run_readers_writers(LockPolicy::n_way(3).unwrap(), config).unwrap();
/// assert_eq!(report.reads + report.writes, 800);
/// assert!(report.is_clean());
/// ```
pub fn run_readers_writers(policy: LockPolicy, config: StressConfig) -> ScenarioResult<RwReport> {
    let lock = Arc::new(PolicyRwLock::new(0usize, policy));
    let probe = Arc::new(InvariantProbe::new());
    let reads = Arc::new(AtomicUsize::new(0));
    let writes = Arc::new(AtomicUsize::new(0));
    let bad_snapshots = Arc::new(AtomicUsize::new(0));

    tracing::info!(
        %policy,
        threads = config.get_thread_count(),
        iterations = config.get_iterations(),
        write_every = config.get_write_every(),
        "starting readers/writers scenario"
    );

    let result = {
        let lock = Arc::clone(&lock);
        let probe = Arc::clone(&probe);
        let reads = Arc::clone(&reads);
        let writes = Arc::clone(&writes);
        let bad_snapshots = Arc::clone(&bad_snapshots);
        let hold = config.get_hold();

        StressHarness::new(config).run(move |thread_id, iteration| {
            if config.is_write(thread_id, iteration) {
                let mut guard = lock.write();
                probe.enter_write();
                *guard += 1;
                pause(hold);
                probe.exit_write();
                writes.fetch_add(1, Ordering::Relaxed);
            } else {
                let guard = lock.read();
                probe.enter_read();
                let _ = *guard;
                pause(hold);
                probe.exit_read();
                reads.fetch_add(1, Ordering::Relaxed);
            }

            if lock.snapshot().is_consistent() {
                true
            } else {
                bad_snapshots.fetch_add(1, Ordering::Relaxed);
                false
            }
        })
    };

    if result.panicked > 0 {
        return Err(ScenarioError::WorkerPanicked(format!(
            "{} of {} readers/writers workers",
            result.panicked, result.thread_count
        )));
    }

    let snapshot = lock.snapshot();
    let left_held = snapshot.state != LockState::Idle;
    if left_held {
        tracing::error!(?snapshot, "lock still held after every worker finished");
    }

    let report = RwReport {
        policy,
        reads: reads.load(Ordering::Relaxed),
        writes: writes.load(Ordering::Relaxed),
        final_value: *lock.read(),
        max_concurrent_readers: probe.max_concurrent_readers(),
        violations: probe.violations()
            + bad_snapshots.load(Ordering::Relaxed)
            + usize::from(left_held),
        duration: result.duration,
    };
    tracing::info!(?report, "readers/writers scenario finished");
    Ok(report)
}

fn pause(hold: Duration) {
    if !hold.is_zero() {
        thread::sleep(hold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_only_load() {
        let config = StressConfig::new().threads(3).iterations(50).write_every(1);
        let report = run_readers_writers(LockPolicy::ReaderPreference, config).unwrap();
        assert_eq!(report.writes, 150);
        assert_eq!(report.reads, 0);
        assert_eq!(report.max_concurrent_readers, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_report_carries_policy() {
        let config = StressConfig::new().threads(1).iterations(10);
        let report = run_readers_writers(LockPolicy::WriterPreference, config).unwrap();
        assert_eq!(report.policy, LockPolicy::WriterPreference);
        assert_eq!(report.reads + report.writes, 10);
    }
}
