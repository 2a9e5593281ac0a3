//! Errors raised while setting up or running a scenario.

use derive_more::From;

use foundation_sync::{LockError, QueueError};

/// Result alias for scenario runners.
pub type ScenarioResult<T> = std::result::Result<T, ScenarioError>;

/// Why a scenario could not produce a report.
#[derive(From, Debug)]
pub enum ScenarioError {
    /// The queue under test could not be built.
    Queue(QueueError),

    /// The lock policy under test could not be built.
    Lock(LockError),

    /// A worker thread panicked; the payload message when it was a string.
    #[from(ignore)]
    WorkerPanicked(String),

    /// The requested shape can never finish, e.g. items with no consumers.
    #[from(ignore)]
    Misconfigured(&'static str),
}

impl std::error::Error for ScenarioError {}

impl core::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queue(err) => write!(f, "queue setup failed: {err}"),
            Self::Lock(err) => write!(f, "lock setup failed: {err}"),
            Self::WorkerPanicked(msg) => write!(f, "worker panicked: {msg}"),
            Self::Misconfigured(why) => write!(f, "scenario misconfigured: {why}"),
        }
    }
}

impl ScenarioError {
    /// Builds a `WorkerPanicked` from a `JoinHandle::join` payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string panic payload>".to_owned());
        Self::WorkerPanicked(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// WHY: Setup failures must convert with `?`
    /// WHAT: Queue and lock errors wrap into their variants
    #[test]
    fn test_from_conversions() {
        let err: ScenarioError = QueueError::ZeroCapacity.into();
        assert!(matches!(err, ScenarioError::Queue(QueueError::ZeroCapacity)));

        let err: ScenarioError = LockError::ZeroAlternationLimit.into();
        assert!(err.to_string().contains("lock setup failed"));
    }

    /// WHY: Panic payloads are either `&str` or `String`
    /// WHAT: Both are recovered as the error message
    #[test]
    fn test_from_panic_payload() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(
            ScenarioError::from_panic(payload.as_ref()).to_string(),
            "worker panicked: boom"
        );

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert!(ScenarioError::from_panic(payload.as_ref())
            .to_string()
            .contains("bang"));
    }
}
