//! Scripted point-weather services.

use async_trait::async_trait;
use grid_engine::PointWeatherService;
use overlay_common::{OverlayError, OverlayResult, Reading};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A weather service backed by a deterministic field function.
///
/// Counts calls so tests can assert fetch budgets.
pub struct FieldWeatherService {
    field: Box<dyn Fn(f64, f64) -> Reading + Send + Sync>,
    calls: AtomicUsize,
}

impl FieldWeatherService {
    pub fn new(field: impl Fn(f64, f64) -> Reading + Send + Sync + 'static) -> Self {
        Self {
            field: Box::new(field),
            calls: AtomicUsize::new(0),
        }
    }

    /// A smooth synthetic field: temperature tracks latitude, wind blows
    /// eastward proportional to longitude, precipitation and cloud follow
    /// simple gradients.
    pub fn synthetic() -> Self {
        Self::new(|lat, lon| crate::fixtures::reading_at(lat, lon))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PointWeatherService for FieldWeatherService {
    async fn fetch(&self, lat: f64, lon: f64) -> OverlayResult<Reading> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.field)(lat, lon))
    }
}

/// Wraps a service and fails a deterministic subset of requests.
///
/// Failures key off a coordinate hash, so the same points fail on every
/// run regardless of completion order.
pub struct FlakyWeatherService {
    inner: Arc<dyn PointWeatherService>,
    failure_pct: u64,
    calls: AtomicUsize,
}

impl FlakyWeatherService {
    pub fn new(inner: Arc<dyn PointWeatherService>, failure_pct: u64) -> Self {
        Self {
            inner,
            failure_pct,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn should_fail(&self, lat: f64, lon: f64) -> bool {
        let bits = lat.to_bits() ^ lon.to_bits().rotate_left(17);
        let mixed = bits.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        (mixed >> 32) % 100 < self.failure_pct
    }
}

#[async_trait]
impl PointWeatherService for FlakyWeatherService {
    async fn fetch(&self, lat: f64, lon: f64) -> OverlayResult<Reading> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(lat, lon) {
            return Err(OverlayError::Fetch("injected failure".to_string()));
        }
        self.inner.fetch(lat, lon).await
    }
}

/// Wraps a service with a fixed per-request latency.
///
/// Combined with a paused tokio clock this makes concurrency scheduling
/// measurable: wall time reveals how many requests ran in parallel.
pub struct SlowWeatherService {
    inner: Arc<dyn PointWeatherService>,
    delay: Duration,
}

impl SlowWeatherService {
    pub fn new(inner: Arc<dyn PointWeatherService>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl PointWeatherService for SlowWeatherService {
    async fn fetch(&self, lat: f64, lon: f64) -> OverlayResult<Reading> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch(lat, lon).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_field_service_counts_calls() {
        let service = FieldWeatherService::synthetic();
        service.fetch(40.0, -74.0).await.unwrap();
        service.fetch(41.0, -74.0).await.unwrap();
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_flaky_service_is_deterministic() {
        let flaky = FlakyWeatherService::new(Arc::new(FieldWeatherService::synthetic()), 50);
        let first = flaky.fetch(40.123, -74.456).await.is_ok();
        let second = flaky.fetch(40.123, -74.456).await.is_ok();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_flaky_service_failure_rate_roughly_holds() {
        let flaky = FlakyWeatherService::new(Arc::new(FieldWeatherService::synthetic()), 10);
        let mut failures = 0;
        for i in 0..200 {
            let lat = 40.0 + i as f64 * 0.01;
            if flaky.fetch(lat, -74.0).await.is_err() {
                failures += 1;
            }
        }
        // 10% nominal; allow generous slack for the hash distribution.
        assert!((5..=40).contains(&failures), "{} failures", failures);
    }
}
