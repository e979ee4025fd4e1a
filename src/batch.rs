//! Bounded-parallelism batch runner
//!
//! Items are processed in batches of `concurrency`; each batch runs
//! concurrently and is awaited fully before the next one starts. Results are
//! written back by original position, so the output order always matches the
//! input order even though tasks complete out of order.

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Duration;

/// Runs `task` over every item with at most `concurrency` tasks in flight
///
/// # Arguments
///
/// * `items` - Work items, in discovery order
/// * `concurrency` - Batch size (0 is treated as 1)
/// * `pause` - Delay between consecutive batches
/// * `task` - Called with the item's original index and the item
///
/// # Returns
///
/// One result per item, in the same order as `items`
///
/// # Example
///
/// ```
/// use scoped_harvest::batch::run_batched;
/// use std::time::Duration;
///
/// # async fn example() {
/// let doubled = run_batched(vec![1, 2, 3], 2, Duration::ZERO, |_, n| async move { n * 2 }).await;
/// assert_eq!(doubled, vec![2, 4, 6]);
/// # }
/// ```
pub async fn run_batched<I, T, F, Fut>(
    items: Vec<I>,
    concurrency: usize,
    pause: Duration,
    task: F,
) -> Vec<T>
where
    F: Fn(usize, I) -> Fut,
    Fut: Future<Output = T>,
{
    let total = items.len();
    let batch_size = concurrency.max(1);
    let batch_count = total.div_ceil(batch_size);

    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut pending = items.into_iter().enumerate().peekable();
    let mut batch_number = 0;

    while pending.peek().is_some() {
        batch_number += 1;
        let batch: Vec<(usize, I)> = pending.by_ref().take(batch_size).collect();
        tracing::debug!(
            "Processing batch {}/{} ({} items)",
            batch_number,
            batch_count,
            batch.len()
        );

        let mut in_flight: FuturesUnordered<_> = batch
            .into_iter()
            .map(|(index, item)| {
                let future = task(index, item);
                async move { (index, future.await) }
            })
            .collect();

        while let Some((index, value)) = in_flight.next().await {
            slots[index] = Some(value);
        }

        if pending.peek().is_some() && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    slots.into_iter().flatten().collect()
}
