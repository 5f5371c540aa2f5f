//! Site registry
//!
//! Owns the unique weighted sites of one diagram, assigns their stable
//! indices and yields them in sweep order.

use std::collections::HashMap;

use glam::DVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::geometry::{compare_by_y_then_x, Bounds, CoordKey};

/// Upper bound (exclusive) of the filler weights given to sites registered without one
pub const FILLER_WEIGHT_RANGE: f64 = 100.0;

/// An input point around which a Voronoi region is built
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Registration order among surviving (non-duplicate) sites
    pub index: usize,
    /// Site position
    pub coord: DVec2,
    /// Non-negative weight
    pub weight: f64,
}

/// The unique sites of one diagram, in registration order
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: Vec<Site>,
    by_location: HashMap<CoordKey, usize>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a point list, optionally with per-point weights
    ///
    /// Points whose coordinate is already registered are dropped (first
    /// registrant wins). Sites without a supplied weight get a filler drawn
    /// from `[0, FILLER_WEIGHT_RANGE)` by a generator seeded with `weight_seed`,
    /// so the same input always yields the same weights.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for non-finite coordinates, a weight slice whose
    /// length differs from `points`, or negative / non-finite weights.
    pub fn from_points(points: &[DVec2], weights: Option<&[f64]>, weight_seed: u64) -> Result<Self> {
        if let Some(weights) = weights {
            if weights.len() != points.len() {
                return Err(VoronoiError::InvalidInput(format!(
                    "expected {} weights, got {}",
                    points.len(),
                    weights.len()
                )));
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(weight_seed);
        let mut registry = Self {
            sites: Vec::with_capacity(points.len()),
            by_location: HashMap::with_capacity(points.len()),
        };

        for (i, &coord) in points.iter().enumerate() {
            if !coord.is_finite() {
                return Err(VoronoiError::InvalidInput(format!(
                    "point {} is not finite: {:?}",
                    i, coord
                )));
            }
            let weight = match weights {
                Some(weights) => {
                    let w = weights[i];
                    if !w.is_finite() || w < 0.0 {
                        return Err(VoronoiError::InvalidInput(format!(
                            "weight {} must be finite and non-negative (got {})",
                            i, w
                        )));
                    }
                    w
                }
                None => rng.gen_range(0.0..FILLER_WEIGHT_RANGE),
            };
            registry.insert(coord, weight)?;
        }

        Ok(registry)
    }

    /// Add one site; returns its index, or `None` if the coordinate is taken
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-finite coordinate or a negative or
    /// non-finite weight. Nothing is registered in that case.
    pub fn insert(&mut self, coord: DVec2, weight: f64) -> Result<Option<usize>> {
        if !coord.is_finite() {
            return Err(VoronoiError::InvalidInput(format!(
                "site coordinate is not finite: {:?}",
                coord
            )));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(VoronoiError::InvalidInput(format!(
                "site weight must be finite and non-negative (got {})",
                weight
            )));
        }

        let key = CoordKey::from(coord);
        if self.by_location.contains_key(&key) {
            return Ok(None);
        }
        let index = self.sites.len();
        self.sites.push(Site { index, coord, weight });
        self.by_location.insert(key, index);
        Ok(Some(index))
    }

    /// Site indices sorted by ascending y, then ascending x
    pub fn ordered_sequence(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.sites.len()).collect();
        order.sort_by(|&a, &b| compare_by_y_then_x(self.sites[a].coord, self.sites[b].coord));
        order
    }

    /// Look up the site registered at a coordinate
    pub fn find(&self, coord: DVec2) -> Option<&Site> {
        self.by_location
            .get(&CoordKey::from(coord))
            .map(|&i| &self.sites[i])
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Site> {
        self.sites.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Site] {
        &self.sites
    }

    /// Site coordinates in registration order
    pub fn coords(&self) -> Vec<DVec2> {
        self.sites.iter().map(|s| s.coord).collect()
    }

    /// Bounding box of the registered sites, `None` when empty
    pub fn sites_bounds(&self) -> Option<Bounds> {
        let first = self.sites.first()?.coord;
        let (min, max) = self
            .sites
            .iter()
            .fold((first, first), |(min, max), s| (min.min(s.coord), max.max(s.coord)));
        Some(Bounds::from_corners(min, max))
    }
}
