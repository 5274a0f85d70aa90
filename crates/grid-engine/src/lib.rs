//! Adaptive viewport grid engine for weather map overlays.
//!
//! Turns sparse point-measurements across a map viewport into a dense,
//! smoothly interpolated grid:
//! - zoom-adaptive grid sizing
//! - bandwidth-aware sparse sampling
//! - bounded-concurrency fan-out fetching, failure tolerant
//! - inverse-distance-weighted interpolation with fallbacks
//! - bounds-keyed TTL caching with a same-viewport short-circuit

pub mod cache;
pub mod config;
pub mod engine;
pub mod fetch;
pub mod interpolate;
pub mod metric;
pub mod points;
pub mod sampling;
pub mod sizer;

pub use cache::{GridCache, GridCacheStats};
pub use config::EngineConfig;
pub use engine::{EngineController, EngineOutcome, GridRenderer};
pub use fetch::{ConcurrentFetcher, PointWeatherService, ProgressFn};
pub use interpolate::{Interpolator, ScalarSample, VectorSample};
pub use metric::{
    CloudCoverMetric, MetricAdapter, MetricKind, PayloadKind, PrecipitationMetric, SampleExtract,
    TemperatureMetric, WindMetric,
};
pub use sizer::GridDims;
