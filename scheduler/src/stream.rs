//! Paced streams of uniform samples.
//!
//! A sampled stream pauses a fixed interval before each element, so draining
//! one takes `count * interval` of wall-clock time. [`gather_samples`] runs
//! several drains concurrently and reports the elapsed time, which tracks the
//! longest single round rather than the sum.

use std::time::Duration;

use futures_util::future::try_join_all;
use futures_util::{Stream, StreamExt};
use tokio::time::Instant;

use crate::{SchedulerError, sample_delay};

/// A stream of `count` uniform samples from `[0, max_value)`, pausing
/// `interval` before yielding each one.
///
/// # Errors
///
/// [`SchedulerError::InvalidMaxDelay`] for a negative or non-finite
/// `max_value`, before the stream is constructed.
pub fn sample_stream(
    count: usize,
    interval: Duration,
    max_value: f64,
) -> Result<impl Stream<Item = f64>, SchedulerError> {
    crate::validate_max_delay(max_value)?;
    Ok(futures_util::stream::unfold(0usize, move |yielded| async move {
        if yielded == count {
            return None;
        }
        tokio::time::sleep(interval).await;
        Some((sample_delay(max_value), yielded + 1))
    }))
}

/// Drain `rounds` sampled streams concurrently.
///
/// Returns each round's collected samples (every round has length `count`)
/// together with the wall-clock time the whole gather took. Because the
/// rounds run concurrently, the elapsed time tracks one round's drain, not
/// `rounds` of them.
///
/// # Errors
///
/// [`SchedulerError::InvalidMaxDelay`] for a negative or non-finite
/// `max_value`; nothing is spawned in that case.
pub async fn gather_samples(
    rounds: usize,
    count: usize,
    interval: Duration,
    max_value: f64,
) -> Result<(Vec<Vec<f64>>, Duration), SchedulerError> {
    crate::validate_max_delay(max_value)?;

    tracing::debug!(rounds, count, "gathering sample rounds");
    let start = Instant::now();
    let collected = try_join_all((0..rounds).map(|_| async move {
        let stream = sample_stream(count, interval, max_value)?;
        Ok::<_, SchedulerError>(stream.collect::<Vec<f64>>().await)
    }))
    .await?;

    Ok((collected, start.elapsed()))
}
