//! Deadline guard - bounds the local wait on a routing attempt.
//!
//! Only the caller's wait is bounded. The guarded task is spawned, not
//! cancelled: work it represents (a gateway call, say) may already have an
//! externally visible side effect, so it is left to finish in the
//! background and its late result is discarded. Callers must be
//! idempotent-safe against both racing outcomes completing.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Default wall-clock budget for one routing attempt.
pub const DEFAULT_ROUTING_DEADLINE: Duration = Duration::from_millis(5000);

/// Failure modes of a guarded task, from the caller's point of view.
#[derive(Debug, Error)]
pub enum DeadlineError {
    /// The timer fired first; the task keeps running detached.
    #[error("task exceeded the {0:?} deadline")]
    Elapsed(Duration),

    /// The task panicked or was aborted before the deadline.
    #[error("task failed before the deadline: {0}")]
    TaskFailed(String),
}

/// Races `task` against a timer, without cancelling it on expiry.
pub async fn with_deadline<F, T>(task: F, limit: Duration) -> Result<T, DeadlineError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(task);
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_error)) => Err(DeadlineError::TaskFailed(join_error.to_string())),
        // Dropping the JoinHandle detaches the task; it runs to completion.
        Err(_) => Err(DeadlineError::Elapsed(limit)),
    }
}
