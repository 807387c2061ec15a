//! Single-slot, compute-once async cache.
//!
//! [`Memo`] replaces attribute-rewriting memoization with an explicit slot:
//! the first successful computation fills it, every later request reads it
//! back without recomputing. The slot lock is held across the computation, so
//! concurrent first callers are single-flight: one computes, the rest wait on
//! the lock and observe the stored value.
//!
//! Only successes are cached. A failed first computation leaves the slot
//! empty and the next call runs the computation again.

use tokio::sync::Mutex;

/// A write-once-on-success cache slot.
///
/// The slot lives exactly as long as its owner; there is no eviction and no
/// expiry.
#[derive(Debug, Default)]
pub struct Memo<T> {
    slot: Mutex<Option<T>>,
}

impl<T: Clone> Memo<T> {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value, computing and storing it on first use.
    ///
    /// `init` runs at most once across the life of the slot, even when
    /// several callers race on an empty slot: the lock is held for the whole
    /// computation, so late arrivals wake up to a filled slot and never run
    /// `init` themselves.
    ///
    /// # Errors
    ///
    /// Propagates the error from `init` unchanged. Errors are not cached;
    /// the slot stays empty and the next caller retries the computation.
    pub async fn get_or_try_init<F, Fut, E>(&self, init: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(value) = slot.as_ref() {
            tracing::trace!("memo hit");
            return Ok(value.clone());
        }

        let value = init().await?;
        *slot = Some(value.clone());
        Ok(value)
    }

    /// Peek at the slot without computing anything.
    pub async fn get(&self) -> Option<T> {
        self.slot.lock().await.clone()
    }
}
