//! Point relaxation
//!
//! Moves sites toward the centroids of their Voronoi regions, either
//! unweighted ([`lloyd`]) or weighted by a density source ([`weighted`]).

pub mod lloyd;
pub mod weighted;

pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions};
pub use weighted::{weighted_relaxation, weighted_relaxation_step};

use glam::DVec2;

/// Largest distance between corresponding points of two equal-length sets
pub(crate) fn max_displacement(old: &[DVec2], new: &[DVec2]) -> f64 {
    old.iter()
        .zip(new)
        .map(|(a, b)| a.distance(*b))
        .fold(0.0, f64::max)
}
