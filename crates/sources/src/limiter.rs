use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::warn;

/// Global concurrency gate for outbound adapter calls. The choice between a
/// real gate and pass-through is made once at construction; callers never
/// branch on it.
#[derive(Clone, Debug)]
pub enum Limiter {
    Bounded(Arc<Semaphore>),
    Unthrottled,
}

impl Limiter {
    /// A zero-permit request cannot make progress, so it degrades to
    /// unthrottled rather than deadlocking the batch.
    pub fn bounded(permits: usize) -> Self {
        if permits == 0 {
            warn!(
                event_name = "enrich.limiter.degraded",
                "limiter requested with zero permits, running unthrottled"
            );
            return Self::Unthrottled;
        }
        Self::Bounded(Arc::new(Semaphore::new(permits)))
    }

    /// Acquires a slot, or `None` when running unthrottled. A closed
    /// semaphore also yields `None`: losing the limiter must never block or
    /// fail the work it was meant to pace.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        match self {
            Self::Bounded(semaphore) => match semaphore.clone().acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    warn!(
                        event_name = "enrich.limiter.closed",
                        "limiter closed mid-flight, continuing unthrottled"
                    );
                    None
                }
            },
            Self::Unthrottled => None,
        }
    }
}
