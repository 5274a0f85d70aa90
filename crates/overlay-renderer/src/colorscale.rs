//! Color scales for the overlay metrics.

use serde::{Deserialize, Serialize};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// With the alpha channel replaced.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_tiny(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f64 * t_inv) + (color2.r as f64 * t)) as u8,
        ((color1.g as f64 * t_inv) + (color2.g as f64 * t)) as u8,
        ((color1.b as f64 * t_inv) + (color2.b as f64 * t)) as u8,
        ((color1.a as f64 * t_inv) + (color2.a as f64 * t)) as u8,
    )
}

/// Temperature color ramp (Celsius), continuous.
///
/// -50°C deep purple through blue/cyan/green/yellow/orange to dark red at
/// +50°C, the common weather-map convention.
pub fn temperature_color(temp_celsius: f64) -> Color {
    match temp_celsius {
        t if t < -50.0 => Color::new(25, 0, 76, 200),
        t if t < -30.0 => interpolate_color(
            Color::new(25, 0, 76, 200),
            Color::new(0, 0, 255, 200),
            (t + 50.0) / 20.0,
        ),
        t if t < 0.0 => interpolate_color(
            Color::new(0, 0, 255, 200),
            Color::new(0, 255, 255, 200),
            (t + 30.0) / 30.0,
        ),
        t if t < 10.0 => interpolate_color(
            Color::new(0, 255, 255, 200),
            Color::new(0, 255, 0, 200),
            t / 10.0,
        ),
        t if t < 20.0 => interpolate_color(
            Color::new(0, 255, 0, 200),
            Color::new(255, 255, 0, 200),
            (t - 10.0) / 10.0,
        ),
        t if t < 30.0 => interpolate_color(
            Color::new(255, 255, 0, 200),
            Color::new(255, 165, 0, 200),
            (t - 20.0) / 10.0,
        ),
        t if t < 40.0 => interpolate_color(
            Color::new(255, 165, 0, 200),
            Color::new(255, 0, 0, 200),
            (t - 30.0) / 10.0,
        ),
        t if t < 50.0 => interpolate_color(
            Color::new(255, 0, 0, 200),
            Color::new(139, 0, 0, 200),
            (t - 40.0) / 10.0,
        ),
        _ => Color::new(139, 0, 0, 200),
    }
}

/// Precipitation thresholds in mm for the discrete 7-bin scale.
pub const PRECIP_THRESHOLDS_MM: [f64; 7] = [0.0, 0.1, 1.0, 5.0, 10.0, 25.0, 50.0];

/// Precipitation color scale (mm), discrete bins.
///
/// Dry cells are fully transparent; each successive threshold steps the
/// color rather than blending, matching radar-style precipitation maps.
pub fn precipitation_color(precip_mm: f64) -> Color {
    match precip_mm {
        p if p < 0.1 => Color::transparent(),
        p if p < 1.0 => Color::new(160, 210, 255, 140),
        p if p < 5.0 => Color::new(80, 160, 250, 170),
        p if p < 10.0 => Color::new(30, 110, 235, 190),
        p if p < 25.0 => Color::new(20, 60, 200, 210),
        p if p < 50.0 => Color::new(120, 40, 200, 220),
        _ => Color::new(200, 30, 160, 230),
    }
}

/// Wind speed color scale (kph) for streamline strokes.
pub fn wind_speed_color(speed_kph: f64) -> Color {
    match speed_kph {
        s if s < 0.0 => Color::new(220, 220, 220, 210),
        s if s < 15.0 => interpolate_color(
            Color::new(220, 220, 220, 210),
            Color::new(120, 220, 255, 210),
            s / 15.0,
        ),
        s if s < 35.0 => interpolate_color(
            Color::new(120, 220, 255, 210),
            Color::new(255, 235, 80, 210),
            (s - 15.0) / 20.0,
        ),
        s if s < 60.0 => interpolate_color(
            Color::new(255, 235, 80, 210),
            Color::new(255, 120, 40, 210),
            (s - 35.0) / 25.0,
        ),
        s if s < 90.0 => interpolate_color(
            Color::new(255, 120, 40, 210),
            Color::new(180, 20, 20, 210),
            (s - 60.0) / 30.0,
        ),
        _ => Color::new(120, 0, 0, 210),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_ramp_is_continuous_at_joins() {
        // Crossing a segment boundary should not jump colors.
        for t in [-30.0, 0.0, 10.0, 20.0, 30.0, 40.0] {
            let below = temperature_color(t - 0.01);
            let above = temperature_color(t + 0.01);
            let dr = (below.r as i32 - above.r as i32).abs();
            let dg = (below.g as i32 - above.g as i32).abs();
            let db = (below.b as i32 - above.b as i32).abs();
            assert!(dr + dg + db < 12, "jump at {}°C: {:?} vs {:?}", t, below, above);
        }
    }

    #[test]
    fn test_precipitation_bins_are_discrete() {
        // Within a bin the color is constant; across a threshold it steps.
        assert_eq!(precipitation_color(2.0), precipitation_color(4.9));
        assert_ne!(precipitation_color(4.9), precipitation_color(5.1));
        assert_eq!(precipitation_color(0.0), Color::transparent());
        assert_eq!(precipitation_color(0.05), Color::transparent());
        assert_ne!(precipitation_color(0.2), Color::transparent());
    }

    #[test]
    fn test_bin_count_matches_thresholds() {
        // One distinct color per threshold-bounded bin (dry bin included).
        let probes = [0.05, 0.5, 2.0, 7.0, 15.0, 30.0, 60.0];
        let colors: Vec<Color> = probes.iter().map(|&p| precipitation_color(p)).collect();
        for pair in colors.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(probes.len(), PRECIP_THRESHOLDS_MM.len());
    }

    #[test]
    fn test_wind_speed_color_intensifies() {
        let calm = wind_speed_color(2.0);
        let gale = wind_speed_color(80.0);
        assert!(gale.r > calm.b.min(calm.r));
        assert_ne!(calm, gale);
    }
}
