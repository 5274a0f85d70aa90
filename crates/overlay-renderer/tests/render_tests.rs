//! Renderer tests against a fake map host with a linear projection.

use grid_engine::{EngineConfig, EngineController, EngineOutcome, GridRenderer, TemperatureMetric};
use overlay_common::{CellValue, ComputedGrid, GridCell, OverlayError, ViewportBounds, WindVector};
use overlay_renderer::{
    CloudRenderConfig, CloudRenderer, OverlayLayer, ScalarStyle, ScalarTileRenderer,
    WindRenderConfig, WindRenderer,
};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{bounds_1x1_deg, FakeMapHost, FieldWeatherService};

/// Build a grid whose cell centers are laid out like the engine's point
/// generator: row-major, row 0 at the northern edge.
fn make_grid(
    bounds: ViewportBounds,
    rows: usize,
    cols: usize,
    value: impl Fn(usize, usize) -> CellValue,
) -> ComputedGrid {
    let lat_step = bounds.lat_span() / rows as f64;
    let lng_step = bounds.lng_span() / cols as f64;
    let mut cells = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            cells.push(GridCell {
                lat: bounds.northeast.lat - (row as f64 + 0.5) * lat_step,
                lon: bounds.southwest.lng + (col as f64 + 0.5) * lng_step,
                value: value(row, col),
            });
        }
    }
    ComputedGrid {
        rows,
        cols,
        bounds,
        cells,
    }
}

fn painted_pixels(layer: &OverlayLayer) -> usize {
    layer
        .snapshot()
        .pixels()
        .iter()
        .filter(|p| p.alpha() > 0)
        .count()
}

#[test]
fn test_scalar_tiles_cover_canvas_without_gaps() {
    let bounds = bounds_1x1_deg(Some(10.0));
    let host = Arc::new(FakeMapHost::new(bounds, 100, 100));
    let layer = Arc::new(OverlayLayer::attach(host).unwrap());
    let renderer = ScalarTileRenderer::new(layer.clone(), ScalarStyle::temperature());

    let grid = make_grid(bounds, 4, 4, |_, _| CellValue::Scalar(25.0));
    renderer.render(&grid).unwrap();

    // Adjacent cells share projected edges exactly: every canvas pixel is
    // covered, none twice-blended into visible seams.
    assert_eq!(painted_pixels(&layer), 100 * 100);
}

#[test]
fn test_dry_precipitation_cells_are_invisible() {
    let bounds = bounds_1x1_deg(Some(10.0));
    let host = Arc::new(FakeMapHost::new(bounds, 80, 80));
    let layer = Arc::new(OverlayLayer::attach(host).unwrap());
    let renderer = ScalarTileRenderer::new(layer.clone(), ScalarStyle::precipitation());

    let dry = make_grid(bounds, 5, 5, |_, _| CellValue::Scalar(0.0));
    renderer.render(&dry).unwrap();
    assert_eq!(painted_pixels(&layer), 0);

    let wet = make_grid(bounds, 5, 5, |_, _| CellValue::Scalar(7.0));
    renderer.render(&wet).unwrap();
    assert_eq!(painted_pixels(&layer), 80 * 80);
}

#[test]
fn test_cloud_blobs_respect_visibility_threshold() {
    let bounds = bounds_1x1_deg(Some(10.0));
    let host = Arc::new(FakeMapHost::new(bounds, 120, 120));
    let layer = Arc::new(OverlayLayer::attach(host).unwrap());
    let renderer = CloudRenderer::new(layer.clone(), CloudRenderConfig::default());

    let thin = make_grid(bounds, 4, 4, |_, _| CellValue::Scalar(3.0));
    renderer.render(&thin).unwrap();
    assert_eq!(painted_pixels(&layer), 0);

    let overcast = make_grid(bounds, 4, 4, |_, _| CellValue::Scalar(85.0));
    renderer.render(&overcast).unwrap();
    assert!(painted_pixels(&layer) > 0);
}

#[test]
fn test_dead_host_aborts_render() {
    let bounds = bounds_1x1_deg(Some(10.0));
    let host = Arc::new(FakeMapHost::new(bounds, 50, 50));
    let layer = Arc::new(OverlayLayer::attach(host.clone()).unwrap());
    let renderer = ScalarTileRenderer::new(layer, ScalarStyle::temperature());

    host.destroy();
    let grid = make_grid(bounds, 2, 2, |_, _| CellValue::Scalar(10.0));
    assert!(matches!(
        renderer.render(&grid),
        Err(OverlayError::HostGone)
    ));
}

#[test]
fn test_rebind_allocates_fresh_canvas() {
    let bounds = bounds_1x1_deg(Some(10.0));
    let old_host = Arc::new(FakeMapHost::new(bounds, 50, 50));
    let layer = OverlayLayer::attach(old_host).unwrap();
    assert_eq!(layer.size(), (50, 50));

    let new_host = Arc::new(FakeMapHost::new(bounds, 200, 150));
    let layer = layer.rebind(new_host).unwrap();
    assert_eq!(layer.size(), (200, 150));
    assert_eq!(painted_pixels(&layer), 0);
}

#[test]
fn test_wind_dashes_draw_and_clear() {
    let bounds = bounds_1x1_deg(Some(10.0));
    let host = Arc::new(FakeMapHost::new(bounds, 100, 100));
    let layer = Arc::new(OverlayLayer::attach(host).unwrap());
    let renderer = WindRenderer::new(layer.clone(), WindRenderConfig::default());

    let grid = make_grid(bounds, 5, 5, |_, _| {
        CellValue::Vector(WindVector { u: 20.0, v: 0.0 })
    });
    renderer.render(&grid).unwrap();
    assert!(painted_pixels(&layer) > 0);

    renderer.clear().unwrap();
    assert_eq!(painted_pixels(&layer), 0);
}

#[test]
fn test_calm_cells_draw_nothing() {
    let bounds = bounds_1x1_deg(Some(10.0));
    let host = Arc::new(FakeMapHost::new(bounds, 100, 100));
    let layer = Arc::new(OverlayLayer::attach(host).unwrap());
    let renderer = WindRenderer::new(layer.clone(), WindRenderConfig::default());

    let calm = make_grid(bounds, 5, 5, |_, _| {
        CellValue::Vector(WindVector { u: 0.0, v: 0.0 })
    });
    renderer.render(&calm).unwrap();
    assert_eq!(painted_pixels(&layer), 0);
}

#[tokio::test(start_paused = true)]
async fn test_animation_loop_runs_until_stopped() {
    let bounds = bounds_1x1_deg(Some(10.0));
    let host = Arc::new(FakeMapHost::new(bounds, 100, 100));
    let layer = Arc::new(OverlayLayer::attach(host).unwrap());
    let renderer = Arc::new(WindRenderer::new(layer.clone(), WindRenderConfig::default()));

    let grid = make_grid(bounds, 4, 4, |_, _| {
        CellValue::Vector(WindVector { u: 15.0, v: 5.0 })
    });
    renderer.render(&grid).unwrap();

    let handle = renderer.start_animation();
    assert!(renderer.is_running());

    // Several frame intervals pass; the loop keeps painting dashes.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(painted_pixels(&layer) > 0);

    renderer.stop_animation();
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.await.unwrap();
    assert!(!renderer.is_running());
}

#[tokio::test]
async fn test_engine_to_canvas_integration() {
    test_utils::init_tracing();
    let bounds = bounds_1x1_deg(Some(10.0));
    let host = Arc::new(FakeMapHost::new(bounds, 160, 160));
    let layer = Arc::new(OverlayLayer::attach(host).unwrap());
    let renderer = Arc::new(ScalarTileRenderer::new(
        layer.clone(),
        ScalarStyle::temperature(),
    ));

    let engine = EngineController::new(
        EngineConfig::default(),
        Arc::new(TemperatureMetric),
        Arc::new(FieldWeatherService::synthetic()),
        renderer,
    )
    .unwrap();

    let outcome = engine.compute_and_render(bounds).await.unwrap();
    assert_eq!(outcome, EngineOutcome::Rendered);

    // The synthetic temperature field is 20-30°C: every cell colors, and
    // the grid spans the viewport edge to edge.
    assert_eq!(painted_pixels(&layer), 160 * 160);
}
