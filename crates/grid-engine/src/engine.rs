//! Engine controller: one per metric overlay.
//!
//! Orchestrates sizing, point generation, sampling, concurrent fetch,
//! interpolation, caching, and rendering, and owns the lifecycle guards:
//! viewport-change debouncing, the single-request-in-flight rule, the
//! same-viewport short-circuit, and soft discard of stale results.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use overlay_common::{
    CellValue, ComputedGrid, GridCell, OverlayError, OverlayResult, ViewportBounds,
};

use crate::cache::{GridCache, GridCacheStats};
use crate::config::EngineConfig;
use crate::fetch::{ConcurrentFetcher, PointWeatherService, ProgressFn};
use crate::interpolate::{Interpolator, ScalarSample, VectorSample};
use crate::metric::{MetricAdapter, PayloadKind, SampleExtract};
use crate::points::generate_points;
use crate::sampling::select_samples;
use crate::sizer::size_grid;

/// Output side of the engine: draws computed grids onto the map overlay.
///
/// Implementations must probe the map host before writing and report
/// `OverlayError::HostGone` when it has been torn down; the engine treats
/// that as a silent abort, never a failure.
pub trait GridRenderer: Send + Sync {
    fn render(&self, grid: &ComputedGrid) -> OverlayResult<()>;

    /// Wipe the overlay surface.
    fn clear(&self) -> OverlayResult<()>;
}

/// What a grid cycle ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOutcome {
    /// Fresh grid computed, cached, and rendered.
    Rendered,
    /// Bounds hash matched the previous request; re-rendered without
    /// recomputation or cache lookup.
    RenderedUnchanged,
    /// Served from the TTL cache.
    RenderedFromCache,
    /// Degenerate viewport; nothing fetched or drawn.
    SkippedInvalidViewport,
    /// A newer viewport superseded this cycle while it was in flight.
    SkippedStale,
    /// Every sample fetch failed; the last good grid was re-rendered.
    DegradedLastGood,
    /// Every sample fetch failed and no previous grid exists; overlay
    /// cleared.
    ClearedNoData,
    /// The map host disappeared before the draw; render silently aborted.
    HostGone,
}

/// Controller for one metric overlay engine.
pub struct EngineController {
    config: EngineConfig,
    metric: Arc<dyn MetricAdapter>,
    service: Arc<dyn PointWeatherService>,
    renderer: Arc<dyn GridRenderer>,
    fetcher: ConcurrentFetcher,
    interpolator: Interpolator,
    cache: GridCache,
    progress: Option<ProgressFn>,

    /// Hash of the most recently requested viewport; in-flight cycles whose
    /// hash no longer matches are discarded when they resolve.
    latest_hash: Mutex<Option<String>>,
    /// Hash of the last grid actually rendered.
    last_bounds_hash: Mutex<Option<String>>,
    last_grid: Mutex<Option<Arc<ComputedGrid>>>,
    request_in_progress: AtomicBool,
    debounce_generation: AtomicU64,
}

impl EngineController {
    pub fn new(
        config: EngineConfig,
        metric: Arc<dyn MetricAdapter>,
        service: Arc<dyn PointWeatherService>,
        renderer: Arc<dyn GridRenderer>,
    ) -> OverlayResult<Self> {
        config.validate()?;
        Ok(Self {
            fetcher: ConcurrentFetcher::new(&config.fetch),
            interpolator: Interpolator::new(config.interpolation.clone()),
            cache: GridCache::new(&config.cache),
            config,
            metric,
            service,
            renderer,
            progress: None,
            latest_hash: Mutex::new(None),
            last_bounds_hash: Mutex::new(None),
            last_grid: Mutex::new(None),
            request_in_progress: AtomicBool::new(false),
            debounce_generation: AtomicU64::new(0),
        })
    }

    /// Attach a `(completed, total)` progress callback for host UI.
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Debounced viewport-change trigger.
    ///
    /// Waits out the configured debounce window; if no newer change arrives
    /// in the meantime, runs a full grid cycle. Rapid pan/zoom streams thus
    /// collapse into a single computation for the final viewport.
    pub fn viewport_changed(
        self: &Arc<Self>,
        bounds: ViewportBounds,
    ) -> tokio::task::JoinHandle<OverlayResult<EngineOutcome>> {
        let generation = self.debounce_generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Invalidate any in-flight cycle right away; its result is stale
        // the moment the viewport moves.
        if bounds.is_valid() {
            *self.latest_hash.lock().expect("latest_hash lock") = Some(bounds.bounds_hash());
        }

        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(engine.config.debounce).await;
            loop {
                if engine.debounce_generation.load(Ordering::SeqCst) != generation {
                    return Ok(EngineOutcome::SkippedStale);
                }
                match engine.compute_and_render(bounds).await {
                    // A previous cycle still holds the guard; wait it out as
                    // long as this trigger remains the newest.
                    Err(OverlayError::RequestInProgress) => {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                    other => return other,
                }
            }
        })
    }

    /// Run one full grid cycle for a settled viewport.
    ///
    /// Rejects overlapping computations with `RequestInProgress`; callers
    /// are expected to debounce (or use [`viewport_changed`]) so this only
    /// fires on settle events.
    #[instrument(skip(self, bounds), fields(metric = %self.metric.kind()))]
    pub async fn compute_and_render(
        &self,
        bounds: ViewportBounds,
    ) -> OverlayResult<EngineOutcome> {
        if !bounds.is_valid() {
            warn!(?bounds, "Degenerate viewport, skipping grid computation");
            return Ok(EngineOutcome::SkippedInvalidViewport);
        }

        let hash = bounds.bounds_hash();
        *self.latest_hash.lock().expect("latest_hash lock") = Some(hash.clone());

        // Same-viewport short-circuit: skip recomputation and even the
        // cache lookup when the hash is unchanged and cells are on screen.
        let unchanged = {
            let last_hash = self.last_bounds_hash.lock().expect("last_bounds_hash lock");
            last_hash.as_deref() == Some(hash.as_str())
        };
        if unchanged {
            let last = self.last_grid.lock().expect("last_grid lock").clone();
            if let Some(grid) = last {
                debug!(hash = %hash, "Viewport unchanged, re-rendering last grid");
                return self.draw(&grid, EngineOutcome::RenderedUnchanged);
            }
        }

        if self
            .request_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(OverlayError::RequestInProgress);
        }

        let result = self.run_cycle(bounds, &hash).await;
        self.request_in_progress.store(false, Ordering::SeqCst);
        result
    }

    async fn run_cycle(
        &self,
        bounds: ViewportBounds,
        hash: &str,
    ) -> OverlayResult<EngineOutcome> {
        if let Some(grid) = self.cache.get(hash).await {
            debug!(hash = %hash, "Grid cache hit");
            self.remember(hash, &grid);
            return self.draw(&grid, EngineOutcome::RenderedFromCache);
        }

        let dims = size_grid(&bounds, &self.config.sizing);
        let points = generate_points(&bounds, dims);
        let sample_indices = select_samples(
            dims,
            &self.config.sampling,
            self.metric.include_edge_midpoints(),
        );

        info!(
            rows = dims.rows,
            cols = dims.cols,
            samples = sample_indices.len(),
            "Computing grid"
        );

        let readings = self
            .fetcher
            .fetch_samples(
                self.service.clone(),
                &points,
                &sample_indices,
                self.progress.clone(),
            )
            .await;

        // Soft cancellation: a newer viewport arrived while we were
        // fetching, so this result is for a view nobody is looking at.
        let superseded = {
            let latest = self.latest_hash.lock().expect("latest_hash lock");
            latest.as_deref() != Some(hash)
        };
        if superseded {
            debug!(hash = %hash, "Discarding stale grid result");
            return Ok(EngineOutcome::SkippedStale);
        }

        let fetched = readings.iter().filter(|r| r.is_some()).count();
        let failed = readings.len() - fetched;

        if fetched == 0 {
            warn!("Every sample fetch failed");
            let last = self.last_grid.lock().expect("last_grid lock").clone();
            return match last {
                Some(grid) => self.draw(&grid, EngineOutcome::DegradedLastGood),
                None => {
                    self.clear_overlay();
                    Ok(EngineOutcome::ClearedNoData)
                }
            };
        }
        if fetched < 3 {
            warn!(fetched, "Degraded interpolation: fewer than 3 samples");
        }

        let cells = self.build_cells(&points, &sample_indices, &readings);
        let grid = Arc::new(ComputedGrid {
            rows: dims.rows,
            cols: dims.cols,
            bounds,
            cells,
        });

        info!(
            cells = grid.len(),
            fetched,
            failed,
            "Grid computed"
        );

        self.cache.insert(hash.to_string(), grid.clone()).await;
        self.remember(hash, &grid);
        self.draw(&grid, EngineOutcome::Rendered)
    }

    /// Turn fetched readings into a dense cell list via IDW.
    ///
    /// Sampled cells come back exactly (the interpolator's near-zero
    /// distance guard returns the sample verbatim); everything else is
    /// estimated from the successful samples.
    fn build_cells(
        &self,
        points: &[overlay_common::GridPoint],
        sample_indices: &[usize],
        readings: &[Option<overlay_common::Reading>],
    ) -> Vec<GridCell> {
        match self.metric.payload() {
            PayloadKind::Scalar => {
                let samples: Vec<ScalarSample> = sample_indices
                    .iter()
                    .zip(readings)
                    .filter_map(|(&point_idx, reading)| {
                        let reading = reading.as_ref()?;
                        let point = &points[point_idx];
                        match self.metric.extract(reading) {
                            SampleExtract::Scalar(value) => Some(ScalarSample {
                                lat: point.lat,
                                lon: point.lon,
                                value,
                            }),
                            SampleExtract::Vector(_) => None,
                        }
                    })
                    .collect();

                let field = self.interpolator.scalar_field(points, &samples);
                points
                    .iter()
                    .zip(field)
                    .filter_map(|(p, value)| {
                        Some(GridCell {
                            lat: p.lat,
                            lon: p.lon,
                            value: CellValue::Scalar(value?),
                        })
                    })
                    .collect()
            }
            PayloadKind::Vector => {
                let samples: Vec<VectorSample> = sample_indices
                    .iter()
                    .zip(readings)
                    .filter_map(|(&point_idx, reading)| {
                        let reading = reading.as_ref()?;
                        let point = &points[point_idx];
                        match self.metric.extract(reading) {
                            SampleExtract::Vector(w) => {
                                Some(VectorSample::new(point.lat, point.lon, w.u, w.v))
                            }
                            SampleExtract::Scalar(_) => None,
                        }
                    })
                    .collect();

                let field = self.interpolator.vector_field(points, &samples);
                points
                    .iter()
                    .zip(field)
                    .filter_map(|(p, vector)| {
                        Some(GridCell {
                            lat: p.lat,
                            lon: p.lon,
                            value: CellValue::Vector(vector?),
                        })
                    })
                    .collect()
            }
        }
    }

    fn remember(&self, hash: &str, grid: &Arc<ComputedGrid>) {
        *self.last_bounds_hash.lock().expect("last_bounds_hash lock") = Some(hash.to_string());
        *self.last_grid.lock().expect("last_grid lock") = Some(grid.clone());
    }

    /// Render with the dead-host guard: a vanished map host aborts the draw
    /// silently instead of surfacing an error.
    fn draw(&self, grid: &ComputedGrid, outcome: EngineOutcome) -> OverlayResult<EngineOutcome> {
        match self.renderer.render(grid) {
            Ok(()) => Ok(outcome),
            Err(OverlayError::HostGone) => {
                debug!("Map host gone, render aborted");
                Ok(EngineOutcome::HostGone)
            }
            Err(e) => Err(e),
        }
    }

    fn clear_overlay(&self) {
        if let Err(e) = self.renderer.clear() {
            debug!(error = %e, "Overlay clear skipped");
        }
    }

    /// Shared cache statistics for host dashboards.
    pub fn cache_stats(&self) -> Arc<GridCacheStats> {
        self.cache.stats()
    }

    /// The grid currently on screen, if any.
    pub fn last_grid(&self) -> Option<Arc<ComputedGrid>> {
        self.last_grid.lock().expect("last_grid lock").clone()
    }

    /// Tear down engine state: cache, remembered grids, and the overlay
    /// surface. Call before rebinding to a new map host.
    pub async fn teardown(&self) {
        self.cache.clear().await;
        *self.last_bounds_hash.lock().expect("last_bounds_hash lock") = None;
        *self.last_grid.lock().expect("last_grid lock") = None;
        *self.latest_hash.lock().expect("latest_hash lock") = None;
        self.clear_overlay();
    }
}
