//! Per-metric strategies.
//!
//! One generic engine serves all four overlays; everything metric-specific
//! funnels through this trait: which field of a reading to extract, whether
//! the payload interpolates as a scalar or a vector, and sampling quirks.

use overlay_common::{Reading, WindVector};
use serde::{Deserialize, Serialize};

/// The four supported overlay metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Temperature,
    Wind,
    Precipitation,
    CloudCover,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKind::Temperature => write!(f, "temperature"),
            MetricKind::Wind => write!(f, "wind"),
            MetricKind::Precipitation => write!(f, "precipitation"),
            MetricKind::CloudCover => write!(f, "cloud_cover"),
        }
    }
}

/// Whether a metric interpolates as a scalar or as a wind vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Scalar,
    Vector,
}

/// A metric value extracted from one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleExtract {
    Scalar(f64),
    Vector(WindVector),
}

/// Strategy interface for one overlay metric.
pub trait MetricAdapter: Send + Sync {
    fn kind(&self) -> MetricKind;

    fn payload(&self) -> PayloadKind;

    /// Pull this metric's value out of a point reading.
    fn extract(&self, reading: &Reading) -> SampleExtract;

    /// Whether sampling should force the 4 edge-midpoint cells in addition
    /// to corners and center.
    fn include_edge_midpoints(&self) -> bool {
        false
    }
}

/// Temperature in °C, rendered as a continuous color ramp.
pub struct TemperatureMetric;

impl MetricAdapter for TemperatureMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::Temperature
    }

    fn payload(&self) -> PayloadKind {
        PayloadKind::Scalar
    }

    fn extract(&self, reading: &Reading) -> SampleExtract {
        SampleExtract::Scalar(reading.temperature_c)
    }

    // Temperature fields have strong boundary gradients worth anchoring.
    fn include_edge_midpoints(&self) -> bool {
        true
    }
}

/// Wind as a u/v flow vector in kph.
pub struct WindMetric;

impl MetricAdapter for WindMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::Wind
    }

    fn payload(&self) -> PayloadKind {
        PayloadKind::Vector
    }

    fn extract(&self, reading: &Reading) -> SampleExtract {
        SampleExtract::Vector(reading.wind_vector())
    }
}

/// Precipitation in mm, rendered with the discrete bin scale.
pub struct PrecipitationMetric;

impl MetricAdapter for PrecipitationMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::Precipitation
    }

    fn payload(&self) -> PayloadKind {
        PayloadKind::Scalar
    }

    fn extract(&self, reading: &Reading) -> SampleExtract {
        SampleExtract::Scalar(reading.precipitation_mm)
    }
}

/// Cloud cover percentage, rendered as gradient blobs.
pub struct CloudCoverMetric;

impl MetricAdapter for CloudCoverMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::CloudCover
    }

    fn payload(&self) -> PayloadKind {
        PayloadKind::Scalar
    }

    fn extract(&self, reading: &Reading) -> SampleExtract {
        SampleExtract::Scalar(reading.cloud_cover_pct)
    }
}
