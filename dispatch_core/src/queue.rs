//! Per destination delivery ordering.
//!
//! Jobs for one destination start strictly in submission order, each only after its
//! predecessor has settled. Jobs for different destinations run concurrently.
use std::{collections::HashMap, future::Future, sync::Arc};

use dispatch_api::ApiError;
use dispatch_common::time::{self, Duration};
use futures::{future::Shared, FutureExt};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery to {destination} failed: {source}")]
    Api {
        destination: String,
        #[source]
        source: ApiError,
    },
    #[error("server rejected delivery to {destination}: {reason}")]
    Rejected { destination: String, reason: String },
    #[error("delivery to {destination} timed out after {after:?}")]
    TimedOut {
        destination: String,
        after: Duration,
    },
    #[error("delivery to {destination} was abandoned")]
    Aborted { destination: String },
}

impl DeliveryError {
    pub fn destination(&self) -> &str {
        match self {
            Self::Api { destination, .. }
            | Self::Rejected { destination, .. }
            | Self::TimedOut { destination, .. }
            | Self::Aborted { destination } => destination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    TimedOut,
}

/// Settles when the predecessor job has.
type Settled = Shared<oneshot::Receiver<()>>;

struct Tail {
    seq: u64,
    settled: Settled,
}

#[derive(Default)]
struct Registry {
    next_seq: u64,
    tails: HashMap<String, Tail>,
}

/// Registry of per destination job chains. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct DeliveryQueue {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for DeliveryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryQueue")
            .field("active_destinations", &self.active_destinations())
            .finish()
    }
}

/// Handle to one enqueued job.
#[derive(Debug)]
pub struct JobHandle<T> {
    destination: String,
    state: Arc<Mutex<JobState>>,
    result: oneshot::Receiver<Result<T, DeliveryError>>,
}

impl<T> JobHandle<T> {
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn state(&self) -> JobState {
        *self.state.lock()
    }

    /// Waits for the job to settle.
    pub async fn settled(self) -> Result<T, DeliveryError> {
        match self.result.await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Aborted {
                destination: self.destination,
            }),
        }
    }
}

impl DeliveryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of destinations with jobs that have not settled yet.
    pub fn active_destinations(&self) -> usize {
        self.registry.lock().tails.len()
    }

    /// Appends `job` to the chain for `destination`.
    ///
    /// The job is given `timeout` once it starts. On expiry it is dropped and the next job
    /// for the destination may start. Must be called within a tokio runtime.
    pub fn enqueue<F, T>(&self, destination: &str, timeout: Duration, job: F) -> JobHandle<T>
    where
        F: Future<Output = Result<T, DeliveryError>> + Send + 'static,
        T: Send + 'static,
    {
        let (settled_tx, settled_rx) = oneshot::channel::<()>();
        let (seq, previous) = {
            let mut registry = self.registry.lock();
            let seq = registry.next_seq;
            registry.next_seq += 1;
            let previous = registry.tails.insert(
                destination.to_string(),
                Tail {
                    seq,
                    settled: settled_rx.shared(),
                },
            );
            (seq, previous.map(|p| p.settled))
        };

        let state = Arc::new(Mutex::new(JobState::Pending));
        let (result_tx, result_rx) = oneshot::channel();
        let registry = self.registry.clone();
        let job_state = state.clone();
        let owned_destination = destination.to_string();

        tokio::spawn(async move {
            if let Some(previous) = previous {
                // the predecessor's outcome does not matter, only that it settled
                let _ = previous.await;
            }
            *job_state.lock() = JobState::Running;
            tracing::trace!(destination = %owned_destination, seq, "delivery job started");

            let result = match time::timeout(timeout, job).await {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::TimedOut {
                    destination: owned_destination.clone(),
                    after: timeout,
                }),
            };
            *job_state.lock() = match &result {
                Ok(_) => JobState::Succeeded,
                Err(DeliveryError::TimedOut { .. }) => JobState::TimedOut,
                Err(_) => JobState::Failed,
            };

            let _ = settled_tx.send(());
            {
                let mut registry = registry.lock();
                if registry
                    .tails
                    .get(&owned_destination)
                    .is_some_and(|tail| tail.seq == seq)
                {
                    registry.tails.remove(&owned_destination);
                }
            }
            let _ = result_tx.send(result);
        });

        JobHandle {
            destination: destination.to_string(),
            state,
            result: result_rx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::Arc;
    use tokio::sync::Barrier;

    #[tokio::test]
    async fn same_destination_runs_in_order() {
        let queue = DeliveryQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let handles: Vec<_> = (0..5u64)
            .map(|i| {
                let order = order.clone();
                queue.enqueue("+1", Duration::from_secs(5), async move {
                    // later jobs finish faster, so only the queue can keep them in order
                    time::sleep(Duration::from_millis(10 * (5 - i))).await;
                    order.lock().push(i);
                    Ok(i)
                })
            })
            .collect();

        let results: Vec<_> = join_all(handles.into_iter().map(JobHandle::settled)).await;
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn distinct_destinations_overlap() {
        let queue = DeliveryQueue::new();
        let barrier = Arc::new(Barrier::new(3));
        let handles: Vec<_> = ["+1", "+2", "+3"]
            .into_iter()
            .map(|destination| {
                let barrier = barrier.clone();
                queue.enqueue(destination, Duration::from_secs(5), async move {
                    // every job must be running at once to pass the barrier
                    barrier.wait().await;
                    Ok(())
                })
            })
            .collect();

        let all = join_all(handles.into_iter().map(JobHandle::settled));
        let results = time::timeout(Duration::from_secs(5), all).await.unwrap();
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn drained_destinations_are_pruned() {
        let queue = DeliveryQueue::new();
        let first = queue.enqueue("+1", Duration::from_secs(5), async { Ok(()) });
        let second = queue.enqueue("+1", Duration::from_secs(5), async { Ok(()) });
        let other = queue.enqueue("+2", Duration::from_secs(5), async { Ok(()) });
        assert!(queue.active_destinations() <= 2);

        first.settled().await.unwrap();
        second.settled().await.unwrap();
        other.settled().await.unwrap();
        // pruning happens before the result is sent
        assert_eq!(queue.active_destinations(), 0);
    }

    #[tokio::test]
    async fn failure_does_not_block_successor() {
        let queue = DeliveryQueue::new();
        let failing = queue.enqueue::<_, ()>("+1", Duration::from_secs(5), async {
            Err(DeliveryError::Rejected {
                destination: "+1".into(),
                reason: "unregistered".into(),
            })
        });
        let next = queue.enqueue("+1", Duration::from_secs(5), async { Ok(7) });

        assert!(matches!(
            failing.settled().await,
            Err(DeliveryError::Rejected { .. })
        ));
        assert_eq!(next.settled().await.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_releases_the_queue() {
        let queue = DeliveryQueue::new();
        let stuck = queue.enqueue("+1", Duration::from_secs(60), async {
            futures::future::pending::<Result<(), DeliveryError>>().await
        });
        let next = queue.enqueue("+1", Duration::from_secs(60), async { Ok("sent") });

        let stuck_state = stuck.state.clone();
        assert!(matches!(
            stuck.settled().await,
            Err(DeliveryError::TimedOut { after, .. }) if after == Duration::from_secs(60)
        ));
        assert_eq!(*stuck_state.lock(), JobState::TimedOut);
        assert_eq!(next.settled().await.unwrap(), "sent");
    }

    #[tokio::test]
    async fn job_waits_for_predecessor() {
        let queue = DeliveryQueue::new();
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let first = queue.enqueue("+1", Duration::from_secs(5), async move {
            let _ = release_rx.await;
            Ok(())
        });
        let second = queue.enqueue("+1", Duration::from_secs(5), async { Ok(()) });

        tokio::task::yield_now().await;
        assert_eq!(second.state(), JobState::Pending);

        release_tx.send(()).unwrap();
        first.settled().await.unwrap();
        let second_state = second.state.clone();
        second.settled().await.unwrap();
        assert_eq!(*second_state.lock(), JobState::Succeeded);
    }
}
