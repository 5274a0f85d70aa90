//! Point weather readings and wind vector conversions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single point observation from the weather service.
///
/// Units follow the upstream point API: Celsius, kph, millimeters, percent.
/// Wind direction uses the meteorological convention (degrees the wind blows
/// *from*, clockwise from north).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature_c: f64,
    pub wind_speed_kph: f64,
    pub wind_direction_deg: f64,
    pub precipitation_mm: f64,
    pub cloud_cover_pct: f64,
    /// Observation timestamp reported by the service.
    pub observed_at: DateTime<Utc>,
}

/// A wind flow vector in kph components.
///
/// `u` is the eastward component, `v` the northward component. Speed is
/// always derived from the components; it is never stored separately once a
/// vector has been interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindVector {
    pub u: f64,
    pub v: f64,
}

impl WindVector {
    /// Build a flow vector from meteorological speed + direction.
    ///
    /// Direction is where the wind comes *from*, so the flow vector points
    /// the opposite way: a north wind (0°) flows southward (`v = -speed`).
    pub fn from_speed_direction(speed_kph: f64, direction_deg: f64) -> Self {
        let dir = direction_deg.to_radians();
        Self {
            u: -speed_kph * dir.sin(),
            v: -speed_kph * dir.cos(),
        }
    }

    /// Magnitude of the flow vector.
    pub fn speed(&self) -> f64 {
        (self.u * self.u + self.v * self.v).sqrt()
    }

    /// Recover meteorological direction (degrees from north, "from"
    /// convention) from the components.
    pub fn direction_deg(&self) -> f64 {
        let deg = (-self.u).atan2(-self.v).to_degrees();
        if deg < 0.0 {
            deg + 360.0
        } else {
            deg
        }
    }

    /// Unit direction of flow, or None for calm air.
    pub fn unit(&self) -> Option<(f64, f64)> {
        let speed = self.speed();
        if speed < 1e-9 {
            None
        } else {
            Some((self.u / speed, self.v / speed))
        }
    }
}

impl Reading {
    /// The wind flow vector for this reading.
    pub fn wind_vector(&self) -> WindVector {
        WindVector::from_speed_direction(self.wind_speed_kph, self.wind_direction_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_north_wind_flows_south() {
        let w = WindVector::from_speed_direction(10.0, 0.0);
        assert!(w.u.abs() < 1e-9);
        assert!((w.v + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_west_wind_flows_east() {
        let w = WindVector::from_speed_direction(5.0, 270.0);
        assert!((w.u - 5.0).abs() < 1e-9);
        assert!(w.v.abs() < 1e-9);
    }

    #[test]
    fn test_speed_direction_round_trip() {
        for &(speed, dir) in &[(3.0, 45.0), (12.5, 180.0), (0.7, 300.0)] {
            let w = WindVector::from_speed_direction(speed, dir);
            assert!((w.speed() - speed).abs() < 1e-9);
            assert!((w.direction_deg() - dir).abs() < 1e-9, "dir {}", dir);
        }
    }

    #[test]
    fn test_calm_air_has_no_unit_direction() {
        let w = WindVector { u: 0.0, v: 0.0 };
        assert!(w.unit().is_none());
    }
}
