//! Animated wind streamlines.
//!
//! Each cell draws short dashes travelling along its flow direction. The
//! animation loop runs independently of fetch cycles at a throttled ~30 fps;
//! pixel projections refresh on a slower cadence and are reused across
//! frames, while the underlying vectors only change when a grid cycle
//! completes and swaps new cells in.

use crate::canvas::OverlayLayer;
use crate::colorscale::wind_speed_color;
use grid_engine::GridRenderer;
use overlay_common::{CellValue, ComputedGrid, OverlayResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tiny_skia::{Paint, PathBuilder, Stroke, Transform};
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Streamline animation style.
#[derive(Debug, Clone)]
pub struct WindRenderConfig {
    /// Base dash travel speed in px/sec.
    pub animation_speed: f32,
    /// Dash travel cycle length in px; dashes wrap modulo this spacing.
    pub dash_spacing_px: f32,
    pub min_line_len: f32,
    pub max_line_len: f32,
    /// Dash length gained per kph of wind speed.
    pub length_per_kph: f32,
    /// Travel speed multiplier per kph of wind speed.
    pub speed_factor: f32,
    pub stroke_width: f32,
    /// Animation frame cadence (~30 fps).
    pub frame_interval: Duration,
    /// Projection refresh cadence; projections are reused between
    /// refreshes.
    pub projection_interval: Duration,
    /// Below this speed a cell draws nothing.
    pub calm_threshold_kph: f64,
    pub max_draw_cells: usize,
}

impl Default for WindRenderConfig {
    fn default() -> Self {
        Self {
            animation_speed: 14.0,
            dash_spacing_px: 22.0,
            min_line_len: 4.0,
            max_line_len: 16.0,
            length_per_kph: 0.18,
            speed_factor: 0.04,
            stroke_width: 1.6,
            frame_interval: Duration::from_millis(33),
            projection_interval: Duration::from_millis(120),
            calm_threshold_kph: 0.5,
            max_draw_cells: 2000,
        }
    }
}

/// Deterministic per-cell phase seed in [0, 1).
fn cell_seed(row: usize, col: usize) -> f32 {
    let seed = (row as u64).wrapping_mul(0x517c_c1b7_2722_0a95)
        ^ (col as u64).wrapping_mul(0x6c62_272e_07bb_0142);
    let mixed = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    let mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    let mixed = mixed ^ (mixed >> 27);
    (mixed % 1000) as f32 / 1000.0
}

/// Dash travel offset within the spacing cycle at time `t`.
fn dash_offset(t_secs: f32, speed_kph: f32, seed: f32, config: &WindRenderConfig) -> f32 {
    let travel = t_secs * config.animation_speed * (1.0 + config.speed_factor * speed_kph)
        + seed * config.dash_spacing_px;
    travel.rem_euclid(config.dash_spacing_px)
}

/// Dash length for a given wind speed.
fn dash_length(speed_kph: f32, config: &WindRenderConfig) -> f32 {
    (config.min_line_len + speed_kph * config.length_per_kph)
        .clamp(config.min_line_len, config.max_line_len)
}

/// A cell's projected draw state, refreshed on the projection cadence.
struct ProjectedCell {
    x: f32,
    y: f32,
    // Unit flow direction in pixel space (screen y grows downward).
    dir_x: f32,
    dir_y: f32,
    speed_kph: f32,
    seed: f32,
}

struct WindState {
    grid: Option<Arc<ComputedGrid>>,
    projected: Vec<ProjectedCell>,
    projected_at: Option<Instant>,
}

/// Streamline renderer with its own animation loop.
pub struct WindRenderer {
    layer: Arc<OverlayLayer>,
    config: WindRenderConfig,
    state: Mutex<WindState>,
    epoch: Instant,
    running: AtomicBool,
}

impl WindRenderer {
    pub fn new(layer: Arc<OverlayLayer>, config: WindRenderConfig) -> Self {
        Self {
            layer,
            config,
            state: Mutex::new(WindState {
                grid: None,
                projected: Vec::new(),
                projected_at: None,
            }),
            epoch: Instant::now(),
            running: AtomicBool::new(false),
        }
    }

    /// Start the ~30 fps animation loop.
    ///
    /// The loop runs until [`stop_animation`](Self::stop_animation) and only
    /// swaps in new vectors when a grid cycle completes; a dead map host
    /// skips frames silently rather than stopping the loop.
    pub fn start_animation(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let renderer = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(renderer.config.frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            while renderer.running.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !renderer.running.load(Ordering::SeqCst) {
                    break;
                }
                renderer.animation_frame();
            }
            debug!("Wind animation loop stopped");
        })
    }

    pub fn stop_animation(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// One animation tick: refresh projections when stale, then draw.
    fn animation_frame(&self) {
        if self.layer.ensure_alive().is_err() {
            return;
        }

        let mut state = self.state.lock().expect("wind state lock");
        let stale = state
            .projected_at
            .map_or(true, |at| at.elapsed() >= self.config.projection_interval);
        if stale {
            self.reproject(&mut state);
        }

        let t = self.epoch.elapsed().as_secs_f32();
        self.draw_frame(&state, t);
    }

    /// Recompute pixel positions through the live host projection.
    fn reproject(&self, state: &mut WindState) {
        state.projected.clear();
        let Some(grid) = state.grid.clone() else {
            state.projected_at = Some(Instant::now());
            return;
        };

        let stride = crate::scalar::draw_stride(grid.len(), self.config.max_draw_cells);
        let host = self.layer.host();

        for (i, cell) in grid.cells.iter().enumerate().step_by(stride) {
            let vector = match cell.value {
                CellValue::Vector(w) => w,
                CellValue::Scalar(_) => continue,
            };
            let speed = vector.speed();
            if speed < self.config.calm_threshold_kph {
                continue;
            }
            let Some((ux, uy)) = vector.unit() else {
                continue;
            };
            let Some((x, y)) = host.project(cell.lat, cell.lon) else {
                continue;
            };

            let row = i / grid.cols.max(1);
            let col = i % grid.cols.max(1);
            state.projected.push(ProjectedCell {
                x,
                y,
                dir_x: ux as f32,
                // Northward flow moves up the screen.
                dir_y: -(uy as f32),
                speed_kph: speed as f32,
                seed: cell_seed(row, col),
            });
        }
        state.projected_at = Some(Instant::now());
    }

    /// Draw one frame of dashes from the cached projections.
    fn draw_frame(&self, state: &WindState, t_secs: f32) {
        self.layer.clear();

        self.layer.with_pixmap(|pixmap| {
            let mut paint = Paint::default();
            paint.anti_alias = true;
            let mut stroke = Stroke::default();
            stroke.width = self.config.stroke_width;
            let half_cycle = self.config.dash_spacing_px / 2.0;

            for cell in &state.projected {
                let len = dash_length(cell.speed_kph, &self.config);
                let offset = dash_offset(t_secs, cell.speed_kph, cell.seed, &self.config);
                paint.set_color(wind_speed_color(cell.speed_kph as f64).to_tiny());

                // Two phase-offset dashes per cell keep the flow continuous
                // as each one wraps.
                for phase in [0.0, half_cycle] {
                    let along =
                        (offset + phase).rem_euclid(self.config.dash_spacing_px) - half_cycle;
                    let start_x = cell.x + cell.dir_x * along;
                    let start_y = cell.y + cell.dir_y * along;
                    let end_x = start_x + cell.dir_x * len;
                    let end_y = start_y + cell.dir_y * len;

                    let mut pb = PathBuilder::new();
                    pb.move_to(start_x, start_y);
                    pb.line_to(end_x, end_y);
                    let Some(path) = pb.finish() else { continue };
                    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
        });
    }
}

impl GridRenderer for WindRenderer {
    /// Swap in a freshly computed grid and draw one frame immediately.
    ///
    /// The animation loop picks the new vectors up on its next tick; fetch
    /// cycles never block on the animation.
    fn render(&self, grid: &ComputedGrid) -> OverlayResult<()> {
        self.layer.ensure_alive()?;

        let mut state = self.state.lock().expect("wind state lock");
        state.grid = Some(Arc::new(grid.clone()));
        self.reproject(&mut state);
        let t = self.epoch.elapsed().as_secs_f32();
        self.draw_frame(&state, t);

        debug!(cells = state.projected.len(), "Wind grid swapped in");
        Ok(())
    }

    fn clear(&self) -> OverlayResult<()> {
        self.layer.ensure_alive()?;
        let mut state = self.state.lock().expect("wind state lock");
        state.grid = None;
        state.projected.clear();
        self.layer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_offset_wraps_within_spacing() {
        let cfg = WindRenderConfig::default();
        for t in [0.0, 0.5, 3.7, 120.9] {
            let o = dash_offset(t, 30.0, 0.42, &cfg);
            assert!((0.0..cfg.dash_spacing_px).contains(&o), "offset {}", o);
        }
    }

    #[test]
    fn test_dash_offset_advances_with_time() {
        let cfg = WindRenderConfig::default();
        let a = dash_offset(0.0, 10.0, 0.0, &cfg);
        let b = dash_offset(0.1, 10.0, 0.0, &cfg);
        assert_ne!(a, b);
    }

    #[test]
    fn test_faster_wind_travels_further() {
        let cfg = WindRenderConfig::default();
        let slow = dash_offset(0.5, 5.0, 0.0, &cfg);
        let fast = dash_offset(0.5, 50.0, 0.0, &cfg);
        assert!(fast > slow);
    }

    #[test]
    fn test_dash_length_clamped() {
        let cfg = WindRenderConfig::default();
        assert_eq!(dash_length(0.0, &cfg), cfg.min_line_len);
        assert_eq!(dash_length(500.0, &cfg), cfg.max_line_len);

        let mid = dash_length(30.0, &cfg);
        assert!(mid > cfg.min_line_len && mid < cfg.max_line_len);
    }

    #[test]
    fn test_cell_seed_varies_per_cell() {
        let seeds: Vec<f32> = (0..20).map(|i| cell_seed(i, i + 3)).collect();
        let distinct = seeds
            .iter()
            .filter(|&&s| (s - seeds[0]).abs() > 1e-6)
            .count();
        assert!(distinct > 10);
    }
}
