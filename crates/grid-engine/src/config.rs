//! Engine configuration.
//!
//! Every empirically tuned constant from the production dashboards lives
//! here as a field with a documented default, so per-metric engines can be
//! tuned independently.

use overlay_common::{OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Grid sizing knobs (§ zoom-adaptive density).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Target cell budget at the reference zoom level (zoom 10).
    pub base_max_cells: usize,
    /// Floor for the total cell count after zoom scaling.
    pub min_cells: usize,
    /// Hard ceiling on the zoom-scaled cell budget.
    pub absolute_max_cells: usize,
    /// Hard floor on the zoom-scaled cell budget.
    pub absolute_min_cells: usize,
    /// Exponent applied to the clamped zoom factor. Empirically 1.4–1.5.
    pub zoom_exponent: f64,
    /// Zoom assumed when the host map does not report one.
    pub default_zoom: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            base_max_cells: 1600,
            min_cells: 100,
            absolute_max_cells: 4500,
            absolute_min_cells: 100,
            zoom_exponent: 1.45,
            default_zoom: 10.0,
        }
    }
}

/// Sparse sampling knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Fraction of grid points fetched when interpolation is enabled.
    pub base_ratio: f64,
    /// Ceiling for the adaptively increased ratio on dense grids.
    pub max_ratio: f64,
    /// Point count at which the ratio starts ramping up.
    pub ramp_start: usize,
    /// Point count at which the ratio reaches `max_ratio`.
    pub ramp_full: usize,
    /// When false, every cell is fetched directly (ratio 1.0).
    pub interpolation_enabled: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            base_ratio: 0.22,
            max_ratio: 0.32,
            ramp_start: 1000,
            ramp_full: 4000,
            interpolation_enabled: true,
        }
    }
}

/// Concurrent fetch knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum in-flight point requests.
    pub concurrency: usize,
    /// Per-sample timeout before the fetch counts as a soft failure.
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 18,
            timeout: Duration::from_secs(3),
        }
    }
}

/// IDW interpolation knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpolationConfig {
    /// Samples beyond this distance are ignored (until the global fallback).
    pub max_radius_km: f64,
    /// Number of nearest candidates that contribute to the weighted average.
    pub max_neighbors: usize,
    /// Inverse-distance power.
    pub power: f64,
    /// Below this distance a candidate's value is returned directly.
    pub min_distance_km: f64,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            max_radius_km: 500.0,
            max_neighbors: 10,
            power: 2.0,
            min_distance_km: 0.001,
        }
    }
}

/// Grid cache knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for a cached grid.
    #[serde(with = "duration_millis")]
    pub ttl: Duration,
    /// Maximum number of cached viewports per engine.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(180),
            capacity: 32,
        }
    }
}

/// Complete configuration for one metric engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub sizing: SizingConfig,
    pub sampling: SamplingConfig,
    pub fetch: FetchConfig,
    pub interpolation: InterpolationConfig,
    pub cache: CacheConfig,
    /// Viewport-change debounce window.
    #[serde(with = "duration_millis", default = "default_debounce")]
    pub debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sizing: SizingConfig::default(),
            sampling: SamplingConfig::default(),
            fetch: FetchConfig::default(),
            interpolation: InterpolationConfig::default(),
            cache: CacheConfig::default(),
            debounce: default_debounce(),
        }
    }
}

fn default_debounce() -> Duration {
    Duration::from_millis(600)
}

impl EngineConfig {
    /// Apply environment overrides for deployment-dependent knobs.
    ///
    /// Recognized variables: `OVERLAY_FETCH_CONCURRENCY`,
    /// `OVERLAY_FETCH_TIMEOUT_MS`, `OVERLAY_CACHE_TTL_SECS`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env_parse::<usize>("OVERLAY_FETCH_CONCURRENCY") {
            self.fetch.concurrency = n;
        }
        if let Some(ms) = env_parse::<u64>("OVERLAY_FETCH_TIMEOUT_MS") {
            self.fetch.timeout = Duration::from_millis(ms);
        }
        if let Some(secs) = env_parse::<u64>("OVERLAY_CACHE_TTL_SECS") {
            self.cache.ttl = Duration::from_secs(secs);
        }
        self
    }

    /// Validate cross-field invariants.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.sizing.absolute_min_cells == 0 || self.sizing.absolute_max_cells == 0 {
            return Err(OverlayError::InvalidConfig(
                "cell budget bounds must be positive".to_string(),
            ));
        }
        if self.sizing.absolute_min_cells > self.sizing.absolute_max_cells {
            return Err(OverlayError::InvalidConfig(format!(
                "absolute_min_cells {} exceeds absolute_max_cells {}",
                self.sizing.absolute_min_cells, self.sizing.absolute_max_cells
            )));
        }
        if !(0.0..=1.0).contains(&self.sampling.base_ratio)
            || !(0.0..=1.0).contains(&self.sampling.max_ratio)
        {
            return Err(OverlayError::InvalidConfig(
                "sampling ratios must be within [0, 1]".to_string(),
            ));
        }
        if self.sampling.base_ratio > self.sampling.max_ratio {
            return Err(OverlayError::InvalidConfig(format!(
                "base_ratio {} exceeds max_ratio {}",
                self.sampling.base_ratio, self.sampling.max_ratio
            )));
        }
        if self.fetch.concurrency == 0 {
            return Err(OverlayError::InvalidConfig(
                "fetch concurrency must be at least 1".to_string(),
            ));
        }
        if self.interpolation.max_neighbors == 0 {
            return Err(OverlayError::InvalidConfig(
                "max_neighbors must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
