//! Cached MATLAB availability.
//!
//! The first tool call probes MATLAB; the answer is kept for the rest of the
//! process lifetime. [`AvailabilityState::invalidate`] forgets it so the next
//! call probes again.

use std::future::Future;
use tokio::sync::RwLock;

/// Probe-once cache for whether MATLAB can be started.
///
/// # Examples
///
/// ```
/// use matlab_mcp_server::state::AvailabilityState;
///
/// # async fn example() {
/// let state = AvailabilityState::new();
/// assert_eq!(state.cached().await, None);
///
/// assert!(state.get_or_probe(|| async { true }).await);
/// // Cached: the second probe is never run.
/// assert!(state.get_or_probe(|| async { false }).await);
///
/// state.invalidate().await;
/// assert_eq!(state.cached().await, None);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct AvailabilityState {
    available: RwLock<Option<bool>>,
}

impl AvailabilityState {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached answer, if any.
    pub async fn cached(&self) -> Option<bool> {
        *self.available.read().await
    }

    /// Returns the cached answer, running `probe` first if there is none.
    ///
    /// Concurrent callers wait for a single probe instead of starting their
    /// own.
    pub async fn get_or_probe<F, Fut>(&self, probe: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        if let Some(available) = *self.available.read().await {
            return available;
        }

        let mut slot = self.available.write().await;
        if let Some(available) = *slot {
            return available;
        }

        let available = probe().await;
        tracing::debug!(available, "Cached MATLAB availability");
        *slot = Some(available);
        available
    }

    /// Forgets the cached answer so the next call probes again.
    pub async fn invalidate(&self) {
        *self.available.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_probe_runs_once() {
        let state = AvailabilityState::new();
        let probes = AtomicUsize::new(0);

        for _ in 0..3 {
            let available = state
                .get_or_probe(|| async {
                    probes.fetch_add(1, Ordering::SeqCst);
                    false
                })
                .await;
            assert!(!available);
        }

        assert_eq!(probes.load(Ordering::SeqCst), 1);
        assert_eq!(state.cached().await, Some(false));
    }

    #[tokio::test]
    async fn test_invalidate_forces_reprobe() {
        let state = AvailabilityState::new();

        assert!(!state.get_or_probe(|| async { false }).await);
        state.invalidate().await;
        assert!(state.get_or_probe(|| async { true }).await);
        assert_eq!(state.cached().await, Some(true));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_probe() {
        let state = Arc::new(AvailabilityState::new());
        let probes = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for _ in 0..10 {
            let state = Arc::clone(&state);
            let probes = Arc::clone(&probes);
            handles.push(tokio::spawn(async move {
                state
                    .get_or_probe(|| async move {
                        probes.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        true
                    })
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(probes.load(Ordering::SeqCst), 1);
    }
}
