//! Completion-ordered concurrent delay scheduling.
//!
//! Each unit of work samples a delay uniformly from `[0, max_delay)`, sleeps
//! for that long on the tokio timer, and resolves with the sampled value.
//! The scheduler fans out `count` such units and collects their results in
//! the order they finish, never the order they were launched.
//!
//! Two consumption shapes are provided:
//!
//! - [`run_concurrent`]: spawn and drain in one call. Units report into a
//!   shared completion channel; the channel's arrival order is the result
//!   order.
//! - [`DelayTask::spawn`] + [`collect_completed`]: construct handles ahead of
//!   consumption, then drain them as they finish. Ordering and count
//!   semantics are identical.
//!
//! The caller is suspended only for roughly the longest single delay; waits
//! are never serialized. Once spawned, every unit runs to completion - there
//! is no cancellation and `max_delay` is a sampling bound, not a deadline.

use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use rand::Rng;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

mod stream;

pub use stream::{gather_samples, sample_stream};

/// Failure surface for the delay scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Rejected before any unit is spawned; the bound must be usable as a
    /// sleep duration.
    #[error("max_delay must be finite and non-negative, got {0}")]
    InvalidMaxDelay(f64),

    /// A spawned unit was cancelled or panicked. Normal operation never
    /// produces this.
    #[error("delay task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    /// The completion channel closed before every unit reported.
    #[error("completion channel closed after {received} of {expected} results")]
    Incomplete { expected: usize, received: usize },
}

fn validate_max_delay(max_delay: f64) -> Result<(), SchedulerError> {
    if max_delay.is_finite() && max_delay >= 0.0 {
        Ok(())
    } else {
        Err(SchedulerError::InvalidMaxDelay(max_delay))
    }
}

/// Sample a delay uniformly from `[0, max_delay)`.
///
/// Callers must have validated `max_delay`; zero short-circuits because an
/// empty range cannot be sampled.
fn sample_delay(max_delay: f64) -> f64 {
    if max_delay == 0.0 {
        0.0
    } else {
        rand::rng().random_range(0.0..max_delay)
    }
}

/// Wait a uniformly sampled random delay and return it.
///
/// `max_delay == 0.0` resolves immediately with `0.0`.
///
/// # Errors
///
/// [`SchedulerError::InvalidMaxDelay`] for a negative or non-finite bound,
/// before any sampling or sleeping happens.
pub async fn wait_random(max_delay: f64) -> Result<f64, SchedulerError> {
    validate_max_delay(max_delay)?;
    let delay = sample_delay(max_delay);
    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
    Ok(delay)
}

/// A single spawned unit of delayed work.
///
/// The unit starts running as soon as it is spawned; [`DelayTask::wait`]
/// only consumes the result. Dropping the task does not cancel it.
#[derive(Debug)]
pub struct DelayTask {
    handle: JoinHandle<f64>,
}

impl DelayTask {
    /// Spawn one unit that sleeps a sampled delay and resolves with it.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidMaxDelay`] for a negative or non-finite
    /// bound; nothing is spawned in that case.
    pub fn spawn(max_delay: f64) -> Result<Self, SchedulerError> {
        validate_max_delay(max_delay)?;
        let handle = tokio::spawn(async move {
            let delay = sample_delay(max_delay);
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;
            delay
        });
        Ok(Self { handle })
    }

    /// Wait for this unit's sampled delay value.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::TaskFailed`] if the unit was cancelled or panicked.
    pub async fn wait(self) -> Result<f64, SchedulerError> {
        Ok(self.handle.await?)
    }
}

/// Spawn `count` delay units and collect their values in completion order.
///
/// Every unit reports into a shared channel when it finishes; the channel is
/// drained until all `count` results arrived, so the i-th entry of the result
/// is the value of the i-th unit to finish. No value is dropped or
/// duplicated. `count == 0` returns an empty vec without spawning anything.
///
/// # Errors
///
/// - [`SchedulerError::InvalidMaxDelay`] before any unit is spawned.
/// - [`SchedulerError::Incomplete`] if a unit disappeared without reporting
///   (only possible if its body panicked).
pub async fn run_concurrent(count: usize, max_delay: f64) -> Result<Vec<f64>, SchedulerError> {
    validate_max_delay(max_delay)?;
    if count == 0 {
        return Ok(Vec::new());
    }

    tracing::debug!(count, max_delay, "fanning out delay units");
    let (tx, mut rx) = mpsc::unbounded_channel();
    for _ in 0..count {
        let tx = tx.clone();
        tokio::spawn(async move {
            let delay = sample_delay(max_delay);
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;
            tracing::trace!(delay, "delay unit completed");
            // Receiver outlives all senders unless collection itself died.
            let _ = tx.send(delay);
        });
    }
    drop(tx);

    let mut results = Vec::with_capacity(count);
    while let Some(delay) = rx.recv().await {
        results.push(delay);
    }

    if results.len() == count {
        Ok(results)
    } else {
        Err(SchedulerError::Incomplete {
            expected: count,
            received: results.len(),
        })
    }
}

/// Drain already-spawned [`DelayTask`]s in completion order.
///
/// Same ordering and count guarantees as [`run_concurrent`]; this is the
/// consumption half for callers that construct handles ahead of time.
///
/// # Errors
///
/// [`SchedulerError::TaskFailed`] if any unit was cancelled or panicked.
pub async fn collect_completed(tasks: Vec<DelayTask>) -> Result<Vec<f64>, SchedulerError> {
    let mut pending: FuturesUnordered<JoinHandle<f64>> =
        tasks.into_iter().map(|task| task.handle).collect();

    let mut results = Vec::with_capacity(pending.len());
    while let Some(joined) = pending.next().await {
        results.push(joined?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::{DelayTask, SchedulerError, collect_completed, run_concurrent, wait_random};
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    fn assert_completion_ordered(results: &[f64]) {
        for pair in results.windows(2) {
            assert!(
                pair[0] <= pair[1],
                "results not in completion order: {pair:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_random_stays_in_bounds() {
        let delay = wait_random(5.0).await.unwrap();
        assert!((0.0..5.0).contains(&delay));
    }

    #[tokio::test]
    async fn wait_random_zero_bound_is_immediate() {
        let delay = wait_random(0.0).await.unwrap();
        assert_eq!(delay, 0.0);
    }

    #[tokio::test]
    async fn wait_random_rejects_negative_bound() {
        let err = wait_random(-1.0).await.unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidMaxDelay(d) if d == -1.0));
    }

    #[tokio::test]
    async fn wait_random_rejects_non_finite_bound() {
        assert!(matches!(
            wait_random(f64::NAN).await.unwrap_err(),
            SchedulerError::InvalidMaxDelay(_)
        ));
        assert!(matches!(
            wait_random(f64::INFINITY).await.unwrap_err(),
            SchedulerError::InvalidMaxDelay(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn run_concurrent_returns_exact_count() {
        let results = run_concurrent(10, 5.0).await.unwrap();
        assert_eq!(results.len(), 10);
        for delay in &results {
            assert!((0.0..5.0).contains(delay));
        }
    }

    #[tokio::test]
    async fn run_concurrent_zero_count_is_empty() {
        let results = run_concurrent(0, 5.0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn run_concurrent_zero_bound_yields_zeros() {
        let results = run_concurrent(4, 0.0).await.unwrap();
        assert_eq!(results, vec![0.0; 4]);
    }

    #[tokio::test]
    async fn run_concurrent_rejects_negative_bound() {
        assert!(matches!(
            run_concurrent(3, -0.5).await.unwrap_err(),
            SchedulerError::InvalidMaxDelay(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn run_concurrent_results_track_completion_order() {
        // Shorter delays finish first under this wait model, so the result
        // sequence is non-decreasing.
        let results = run_concurrent(25, 10.0).await.unwrap();
        assert_eq!(results.len(), 25);
        assert_completion_ordered(&results);
    }

    #[tokio::test(start_paused = true)]
    async fn run_concurrent_blocks_only_for_the_slowest_unit() {
        let start = Instant::now();
        let results = run_concurrent(20, 10.0).await.unwrap();
        let elapsed = start.elapsed().as_secs_f64();

        let slowest = results.last().copied().unwrap();
        let total: f64 = results.iter().sum();
        assert!(
            (elapsed - slowest).abs() < 1e-3,
            "elapsed {elapsed} should track the slowest delay {slowest}"
        );
        assert!(elapsed < total, "waits must not be serialized");
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_task_resolves_within_bounds() {
        let task = DelayTask::spawn(3.0).unwrap();
        let delay = task.wait().await.unwrap();
        assert!((0.0..3.0).contains(&delay));
    }

    #[tokio::test]
    async fn spawn_rejects_invalid_bound_before_spawning() {
        assert!(matches!(
            DelayTask::spawn(-2.0).unwrap_err(),
            SchedulerError::InvalidMaxDelay(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn collect_completed_matches_run_concurrent_semantics() {
        let tasks = (0..15)
            .map(|_| DelayTask::spawn(8.0))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let results = collect_completed(tasks).await.unwrap();
        assert_eq!(results.len(), 15);
        assert_completion_ordered(&results);
    }

    #[tokio::test]
    async fn collect_completed_empty_input() {
        let results = collect_completed(Vec::new()).await.unwrap();
        assert!(results.is_empty());
    }
}
