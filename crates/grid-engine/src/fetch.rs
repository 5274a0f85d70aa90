//! Bounded-concurrency fan-out fetching of sample points.

use crate::config::FetchConfig;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use overlay_common::{GridPoint, OverlayResult, Reading};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The point-level weather service the engine consumes.
///
/// Implementations are expected to deduplicate/cache identical-coordinate
/// requests over a short window themselves; the engine imposes only a
/// per-call timeout.
#[async_trait]
pub trait PointWeatherService: Send + Sync {
    /// Fetch a reading for a single coordinate.
    async fn fetch(&self, lat: f64, lon: f64) -> OverlayResult<Reading>;
}

/// Progress callback surface: `(completed, total)`.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Sliding-window concurrent fetcher.
///
/// Keeps up to `concurrency` requests in flight; as soon as one completes
/// the next queued point starts immediately (not fixed batches). Every
/// failure mode — timeout, network error, bad payload — degrades to a
/// `None` slot rather than failing the whole grid.
pub struct ConcurrentFetcher {
    concurrency: usize,
    timeout: Duration,
}

impl ConcurrentFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            timeout: config.timeout,
        }
    }

    /// Fetch readings for the selected sample points.
    ///
    /// `sample_indices` index into `points`; the returned vector has one
    /// slot per sample, in the original sample order regardless of
    /// completion order.
    pub async fn fetch_samples(
        &self,
        service: Arc<dyn PointWeatherService>,
        points: &[GridPoint],
        sample_indices: &[usize],
        progress: Option<ProgressFn>,
    ) -> Vec<Option<Reading>> {
        let total = sample_indices.len();
        let completed = Arc::new(AtomicUsize::new(0));

        let tasks = sample_indices.iter().copied().enumerate().map(|(slot, point_idx)| {
            let service = service.clone();
            let progress = progress.clone();
            let completed = completed.clone();
            let point = points[point_idx];
            let timeout = self.timeout;

            async move {
                let result = match tokio::time::timeout(
                    timeout,
                    service.fetch(point.lat, point.lon),
                )
                .await
                {
                    Ok(Ok(reading)) => Some(reading),
                    Ok(Err(e)) => {
                        debug!(lat = point.lat, lon = point.lon, error = %e, "Sample fetch failed");
                        None
                    }
                    Err(_) => {
                        debug!(lat = point.lat, lon = point.lon, "Sample fetch timed out");
                        None
                    }
                };

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(cb) = progress.as_ref() {
                    cb(done, total);
                }

                (slot, result)
            }
        });

        // Reassemble in sample order even though completions interleave.
        let mut results: Vec<Option<Reading>> = vec![None; total];
        let mut completions = stream::iter(tasks).buffer_unordered(self.concurrency);
        while let Some((slot, result)) = completions.next().await {
            results[slot] = result;
        }

        results
    }
}
