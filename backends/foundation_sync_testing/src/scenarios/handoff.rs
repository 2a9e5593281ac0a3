//! Many-producer, many-consumer handoff over a [`BoundedQueue`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use foundation_sync::BoundedQueue;

use crate::errors::{ScenarioError, ScenarioResult};

/// An item tagged with the producer that pushed it and its sequence number.
type Tagged = (usize, usize);

/// What a handoff run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffReport {
    /// Items successfully pushed across all producers.
    pub pushed: usize,
    /// Items popped across all consumers.
    pub popped: usize,
    /// Items popped more than once.
    pub duplicates: usize,
    /// Items pushed but never popped.
    pub missing: usize,
    /// Times a consumer saw one producer's items out of push order.
    pub order_violations: usize,
    /// Largest queue length observed after a push.
    pub max_observed_len: usize,
    /// Capacity the queue was built with.
    pub capacity: usize,
    /// Wall time of the run.
    pub duration: Duration,
}

impl HandoffReport {
    /// True when every item arrived exactly once, in order, without the
    /// queue ever exceeding its capacity.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.duplicates == 0
            && self.missing == 0
            && self.order_violations == 0
            && self.pushed == self.popped
            && self.max_observed_len <= self.capacity
    }
}

/// Runs `producers` threads each pushing `items_per_producer` tagged items
/// into a queue of `capacity`, while `consumers` threads drain it.
///
/// Consumers split the total between them up front, so the run ends without
/// any sentinel values.
///
/// # Errors
///
/// Returns [`ScenarioError::Queue`] when the queue cannot be built,
/// [`ScenarioError::Misconfigured`] when items are produced with no consumer
/// to drain them, and [`ScenarioError::WorkerPanicked`] when any worker panics.
///
/// # Examples
///
/// ```
/// use foundation_sync_testing::scenarios::handoff::run_handoff;
///
/// let report = run_handoff(2, 2, 100, 4).unwrap();
/// assert_eq!(report.popped, 200);
/// assert!(report.is_clean());
/// ```
pub fn run_handoff(
    producers: usize,
    consumers: usize,
    items_per_producer: usize,
    capacity: usize,
) -> ScenarioResult<HandoffReport> {
    let queue: BoundedQueue<Tagged> = BoundedQueue::new(capacity)?;
    let total = producers * items_per_producer;
    if consumers == 0 && total > 0 {
        return Err(ScenarioError::Misconfigured("items produced with no consumers"));
    }
    let max_len = Arc::new(AtomicUsize::new(0));

    tracing::info!(
        producers,
        consumers,
        items_per_producer,
        capacity,
        "starting handoff scenario"
    );
    let start = Instant::now();

    let producer_handles: Vec<_> = (0..producers)
        .map(|producer| {
            let queue = queue.clone();
            let max_len = Arc::clone(&max_len);
            thread::spawn(move || {
                for seq in 0..items_per_producer {
                    queue.push((producer, seq));
                    max_len.fetch_max(queue.len(), Ordering::Relaxed);
                }
            })
        })
        .collect();

    let consumer_handles: Vec<_> = (0..consumers)
        .map(|consumer| {
            let queue = queue.clone();
            let share = total / consumers + usize::from(consumer < total % consumers);
            thread::spawn(move || (0..share).map(|_| queue.pop()).collect::<Vec<Tagged>>())
        })
        .collect();

    for handle in producer_handles {
        handle
            .join()
            .map_err(|payload| ScenarioError::from_panic(payload.as_ref()))?;
    }

    let mut received = Vec::with_capacity(consumers);
    for handle in consumer_handles {
        received.push(
            handle
                .join()
                .map_err(|payload| ScenarioError::from_panic(payload.as_ref()))?,
        );
    }
    let duration = start.elapsed();

    let report = tally(received, total, capacity, max_len.load(Ordering::Relaxed), duration);
    tracing::info!(?report, "handoff scenario finished");
    Ok(report)
}

fn tally(
    received: Vec<Vec<Tagged>>,
    total: usize,
    capacity: usize,
    max_observed_len: usize,
    duration: Duration,
) -> HandoffReport {
    let mut seen = HashSet::with_capacity(total);
    let mut popped = 0;
    let mut duplicates = 0;
    let mut order_violations = 0;

    for items in received {
        // Last sequence number this consumer saw per producer.
        let mut last_seq: Vec<Option<usize>> = Vec::new();
        for (producer, seq) in items {
            popped += 1;
            if !seen.insert((producer, seq)) {
                duplicates += 1;
            }

            if last_seq.len() <= producer {
                last_seq.resize(producer + 1, None);
            }
            if last_seq[producer].is_some_and(|prev| prev >= seq) {
                order_violations += 1;
            }
            last_seq[producer] = Some(seq);
        }
    }

    HandoffReport {
        pushed: total,
        popped,
        duplicates,
        missing: total.saturating_sub(seen.len()),
        order_violations,
        max_observed_len,
        capacity,
        duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation_sync::QueueError;

    #[test]
    fn test_zero_capacity_is_a_setup_error() {
        let err = run_handoff(1, 1, 10, 0).unwrap_err();
        assert!(matches!(err, ScenarioError::Queue(QueueError::ZeroCapacity)));
    }

    /// WHY: The tally must actually catch a broken queue
    /// WHAT: Duplicates, gaps and reordering in hand-built input are counted
    #[test]
    fn test_tally_detects_faults() {
        let received = vec![vec![(0, 0), (0, 2), (0, 1)], vec![(0, 0)]];
        let report = tally(received, 4, 2, 2, Duration::ZERO);
        assert_eq!(report.popped, 4);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.missing, 1);
        assert_eq!(report.order_violations, 1);
        assert!(!report.is_clean());
    }

    /// WHY: Producers would block forever with nobody popping
    #[test]
    fn test_no_consumers_rejected() {
        let err = run_handoff(1, 0, 10, 4).unwrap_err();
        assert!(matches!(err, ScenarioError::Misconfigured(_)));
        assert!(run_handoff(0, 0, 10, 4).unwrap().is_clean());
    }

    #[test]
    fn test_single_slot_handoff() {
        let report = run_handoff(3, 2, 50, 1).unwrap();
        assert!(report.is_clean(), "{report:?}");
        assert!(report.max_observed_len <= 1);
    }
}
