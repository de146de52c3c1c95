//! Concurrent fetching with a shared deadline.
//!
//! Every request of a batch races the same deadline; anything still
//! outstanding when it passes is dropped and reported as timed out.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;
use tokio::time::Instant;

use crate::error::{Error, Result};

/// Type alias for boxed futures used in batch fetching
type SlotFuture<'a, T> = Pin<Box<dyn Future<Output = (usize, Result<T>)> + Send + 'a>>;

/// Result of one slot in a batch
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// Fetched and processed
    Done(T),
    /// The fetch function returned an error
    Failed(Error),
    /// Still outstanding when the deadline passed
    TimedOut,
}

/// Run `fetch` for every input, keeping at most `max_concurrent` in flight.
///
/// Outcomes are returned in input order regardless of completion order.
///
/// # Example
///
/// ```ignore
/// let outcomes = fetch_all(
///     paths,
///     |path| async move { fetcher.fetch(&path).await },
///     32,
///     Duration::from_secs(10),
/// )
/// .await;
/// ```
pub async fn fetch_all<'a, I, T, F, Fut>(
    inputs: Vec<I>,
    fetch: F,
    max_concurrent: usize,
    timeout: Duration,
) -> Vec<FetchOutcome<T>>
where
    I: Send + 'a,
    T: Send + 'a,
    F: Fn(I) -> Fut + Send + Sync + 'a,
    Fut: Future<Output = Result<T>> + Send + 'a,
{
    let total = inputs.len();
    let mut outcomes: Vec<FetchOutcome<T>> = (0..total).map(|_| FetchOutcome::TimedOut).collect();
    if total == 0 {
        return outcomes;
    }

    let max_concurrent = max_concurrent.max(1);
    debug!(
        "Fetching {} items with max {} concurrent, deadline {:?}",
        total, max_concurrent, timeout
    );

    let deadline = Instant::now() + timeout;
    let mut futures: FuturesUnordered<SlotFuture<'a, T>> = FuturesUnordered::new();
    let mut pending = inputs.into_iter().enumerate();

    // Helper to create a boxed future
    let make_future = |slot: usize, input: I, f: &F| -> SlotFuture<'a, T> {
        let fut = f(input);
        Box::pin(async move { (slot, fut.await) })
    };

    for (slot, input) in pending.by_ref().take(max_concurrent) {
        futures.push(make_future(slot, input, &fetch));
    }

    let mut completed = 0usize;
    let drain = async {
        while let Some((slot, result)) = futures.next().await {
            completed += 1;
            outcomes[slot] = match result {
                Ok(value) => FetchOutcome::Done(value),
                Err(e) => {
                    debug!("Slot {} failed: {}", slot, e);
                    FetchOutcome::Failed(e)
                }
            };

            if let Some((next_slot, input)) = pending.next() {
                futures.push(make_future(next_slot, input, &fetch));
            }
        }
    };

    if tokio::time::timeout_at(deadline, drain).await.is_err() {
        debug!(
            "Deadline reached with {} of {} items outstanding",
            total - completed,
            total
        );
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_fetch_all_empty() {
        let outcomes: Vec<FetchOutcome<String>> =
            fetch_all(Vec::<usize>::new(), |_i| async { Ok(String::new()) }, 4, Duration::from_secs(1))
                .await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_input_order() {
        let outcomes = fetch_all(
            vec![30u64, 10, 20],
            |delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(delay)
            },
            3,
            Duration::from_secs(5),
        )
        .await;

        let values: Vec<u64> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                FetchOutcome::Done(value) => Some(value),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn test_fetch_all_respects_concurrency() {
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_observed = Arc::new(AtomicUsize::new(0));

        let cc = concurrent.clone();
        let mo = max_observed.clone();

        let outcomes = fetch_all(
            vec![1, 2, 3, 4, 5],
            move |n: usize| {
                let cc = cc.clone();
                let mo = mo.clone();
                async move {
                    let current = cc.fetch_add(1, Ordering::SeqCst) + 1;
                    mo.fetch_max(current, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    cc.fetch_sub(1, Ordering::SeqCst);
                    Ok(n)
                }
            },
            2,
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(outcomes.len(), 5);
        assert!(outcomes.iter().all(|o| matches!(o, FetchOutcome::Done(_))));
        assert!(max_observed.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_fetch_all_isolates_failures() {
        let outcomes = fetch_all(
            vec![1, 2, 3],
            |n: u32| async move {
                if n == 2 {
                    Err(crate::error::FetchError::Network("boom".to_string()).into())
                } else {
                    Ok(n)
                }
            },
            10,
            Duration::from_secs(5),
        )
        .await;

        assert!(matches!(outcomes[0], FetchOutcome::Done(1)));
        assert!(matches!(outcomes[1], FetchOutcome::Failed(_)));
        assert!(matches!(outcomes[2], FetchOutcome::Done(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_all_shared_deadline() {
        let outcomes = fetch_all(
            vec![1u64, 60],
            |secs| async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                Ok(secs)
            },
            10,
            Duration::from_secs(10),
        )
        .await;

        assert!(matches!(outcomes[0], FetchOutcome::Done(1)));
        assert!(matches!(outcomes[1], FetchOutcome::TimedOut));
    }
}
