//! Inverse-distance-weighted spatial interpolation.
//!
//! Estimates every unsampled cell from the successfully fetched samples.
//! The estimate never fails outright: when no sample lies within the search
//! radius the globally nearest one is used, so any grid with at least one
//! good sample renders completely.

use crate::config::InterpolationConfig;
use overlay_common::{haversine_km, GridPoint, WindVector};
use rayon::prelude::*;

/// A successfully fetched scalar sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarSample {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

/// A successfully fetched wind sample.
///
/// `speed` is always derived from the components at construction; it exists
/// for draw-time convenience and is never interpolated directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorSample {
    pub lat: f64,
    pub lon: f64,
    pub u: f64,
    pub v: f64,
    pub speed: f64,
}

impl VectorSample {
    pub fn new(lat: f64, lon: f64, u: f64, v: f64) -> Self {
        Self {
            lat,
            lon,
            u,
            v,
            speed: (u * u + v * v).sqrt(),
        }
    }
}

/// How a query point draws on the candidate samples.
enum Contribution {
    /// Use one sample's value verbatim.
    Direct(usize),
    /// Blend the listed samples with normalized weights.
    Weighted(Vec<(usize, f64)>),
}

/// IDW interpolator with radius, neighbor-count, and singularity guards.
pub struct Interpolator {
    config: InterpolationConfig,
}

impl Interpolator {
    pub fn new(config: InterpolationConfig) -> Self {
        Self { config }
    }

    /// Pick the contributing samples for a query point.
    ///
    /// Selection rules, in order:
    /// 1. discard samples beyond `max_radius_km`;
    /// 2. zero left within radius: fall back to the globally nearest sample;
    /// 3. exactly one candidate: use it verbatim;
    /// 4. otherwise the k nearest weighted by `1/d^power`, except that a
    ///    candidate closer than `min_distance_km` wins outright (near-zero
    ///    distance would blow up the weight), and a degenerate all-zero
    ///    weight sum also resolves to the nearest candidate.
    fn select(&self, lat: f64, lon: f64, coords: &[(f64, f64)]) -> Option<Contribution> {
        if coords.is_empty() {
            return None;
        }

        let mut distances: Vec<(f64, usize)> = coords
            .iter()
            .enumerate()
            .map(|(idx, &(s_lat, s_lon))| (haversine_km(lat, lon, s_lat, s_lon), idx))
            .collect();

        let mut candidates: Vec<(f64, usize)> = distances
            .iter()
            .copied()
            .filter(|&(d, _)| d <= self.config.max_radius_km)
            .collect();

        if candidates.is_empty() {
            // Radius fallback: the nearest sample anywhere.
            distances.sort_by(|a, b| a.0.total_cmp(&b.0));
            return Some(Contribution::Direct(distances[0].1));
        }

        if candidates.len() == 1 {
            return Some(Contribution::Direct(candidates[0].1));
        }

        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        candidates.truncate(self.config.max_neighbors);

        if candidates[0].0 < self.config.min_distance_km {
            return Some(Contribution::Direct(candidates[0].1));
        }

        let weights: Vec<(usize, f64)> = candidates
            .iter()
            .map(|&(d, idx)| (idx, 1.0 / d.powf(self.config.power)))
            .collect();

        let sum: f64 = weights.iter().map(|&(_, w)| w).sum();
        if sum == 0.0 {
            return Some(Contribution::Direct(candidates[0].1));
        }

        Some(Contribution::Weighted(
            weights.into_iter().map(|(idx, w)| (idx, w / sum)).collect(),
        ))
    }

    /// Interpolate a scalar value at a query point.
    ///
    /// Returns None only when `samples` is empty.
    pub fn scalar_at(&self, lat: f64, lon: f64, samples: &[ScalarSample]) -> Option<f64> {
        let coords: Vec<(f64, f64)> = samples.iter().map(|s| (s.lat, s.lon)).collect();
        self.scalar_at_with_coords(lat, lon, samples, &coords)
    }

    fn scalar_at_with_coords(
        &self,
        lat: f64,
        lon: f64,
        samples: &[ScalarSample],
        coords: &[(f64, f64)],
    ) -> Option<f64> {
        match self.select(lat, lon, coords)? {
            Contribution::Direct(idx) => Some(samples[idx].value),
            Contribution::Weighted(weights) => Some(
                weights
                    .iter()
                    .map(|&(idx, w)| samples[idx].value * w)
                    .sum(),
            ),
        }
    }

    /// Interpolate a wind vector at a query point.
    ///
    /// u and v interpolate independently with the same candidate set, and
    /// speed is recomputed from the blended components. Opposing winds
    /// cancel instead of averaging their scalar speeds.
    pub fn vector_at(&self, lat: f64, lon: f64, samples: &[VectorSample]) -> Option<WindVector> {
        let coords: Vec<(f64, f64)> = samples.iter().map(|s| (s.lat, s.lon)).collect();
        self.vector_at_with_coords(lat, lon, samples, &coords)
    }

    fn vector_at_with_coords(
        &self,
        lat: f64,
        lon: f64,
        samples: &[VectorSample],
        coords: &[(f64, f64)],
    ) -> Option<WindVector> {
        match self.select(lat, lon, coords)? {
            Contribution::Direct(idx) => Some(WindVector {
                u: samples[idx].u,
                v: samples[idx].v,
            }),
            Contribution::Weighted(weights) => {
                let u = weights.iter().map(|&(idx, w)| samples[idx].u * w).sum();
                let v = weights.iter().map(|&(idx, w)| samples[idx].v * w).sum();
                Some(WindVector { u, v })
            }
        }
    }

    /// Interpolate scalars for a whole grid of cell centers.
    pub fn scalar_field(
        &self,
        points: &[GridPoint],
        samples: &[ScalarSample],
    ) -> Vec<Option<f64>> {
        let coords: Vec<(f64, f64)> = samples.iter().map(|s| (s.lat, s.lon)).collect();
        points
            .par_iter()
            .map(|p| self.scalar_at_with_coords(p.lat, p.lon, samples, &coords))
            .collect()
    }

    /// Interpolate wind vectors for a whole grid of cell centers.
    pub fn vector_field(
        &self,
        points: &[GridPoint],
        samples: &[VectorSample],
    ) -> Vec<Option<WindVector>> {
        let coords: Vec<(f64, f64)> = samples.iter().map(|s| (s.lat, s.lon)).collect();
        points
            .par_iter()
            .map(|p| self.vector_at_with_coords(p.lat, p.lon, samples, &coords))
            .collect()
    }
}
