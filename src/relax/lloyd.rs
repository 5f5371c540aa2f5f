//! Lloyd's relaxation for uniform point distribution
//!
//! Lloyd's relaxation iteratively improves the uniformity of a point set by
//! moving each point to the centroid of its clipped Voronoi region.

use std::time::Instant;

use glam::DVec2;

use super::max_displacement;
use crate::error::Result;
use crate::geometry::Bounds;
use crate::voronoi::Voronoi;

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Convergence threshold as a fraction of the larger bounds side;
    /// stop when the max displacement falls below it.
    /// Set to 0.0 to disable early termination.
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            // For 100 x 100 bounds, stop once no point moves more than 1 unit
            convergence_threshold: 0.01,
        }
    }
}

/// Apply Lloyd's relaxation for a fixed number of iterations
///
/// Each iteration:
/// 1. Build the Voronoi diagram of the current points, clipped to `bounds`
/// 2. Compute the centroid of every region
/// 3. Move every point to its site's centroid
///
/// The output has one point per input point, in input order; duplicated
/// input points follow their shared site.
///
/// # Errors
///
/// Returns `InvalidConfig` for invalid bounds and `InvalidInput` for
/// non-finite points.
///
/// # Example
///
/// ```
/// use fortune_voronoi::*;
///
/// let points = vec![DVec2::new(1.0, 1.0), DVec2::new(2.0, 1.5), DVec2::new(1.5, 2.0)];
/// let relaxed = lloyd_relaxation(&points, Bounds::new(0.0, 0.0, 10.0, 10.0), 3).unwrap();
/// assert_eq!(relaxed.len(), 3);
/// ```
pub fn lloyd_relaxation(points: &[DVec2], bounds: Bounds, iterations: usize) -> Result<Vec<DVec2>> {
    let options = LloydOptions {
        max_iterations: iterations,
        convergence_threshold: 0.0,
    };
    lloyd_relaxation_with_options(points, bounds, options)
}

/// Apply Lloyd's relaxation with custom options
///
/// This variant allows control over convergence detection and the maximum
/// number of iterations. Use [`lloyd_relaxation`] for the simple interface.
///
/// # Arguments
///
/// * `points` - Initial point distribution; duplicates are allowed
/// * `bounds` - Rectangle every diagram is clipped to
/// * `options` - Relaxation options (max iterations, convergence threshold)
///
/// # Returns
///
/// One relaxed point per input point, in input order
///
/// # Performance
///
/// Each iteration builds a full diagram, so a run costs
/// O(iterations * n log n). Early termination skips the remaining
/// iterations once the point set has settled.
///
/// # Errors
///
/// As [`lloyd_relaxation`].
pub fn lloyd_relaxation_with_options(
    points: &[DVec2],
    bounds: Bounds,
    options: LloydOptions,
) -> Result<Vec<DVec2>> {
    bounds.validate()?;
    let convergence_threshold = options.convergence_threshold * bounds.width.max(bounds.height);
    let total_start = Instant::now();

    tracing::debug!(
        points = points.len(),
        max_iterations = options.max_iterations,
        threshold = convergence_threshold,
        "lloyd relaxation starting"
    );

    let mut points = points.to_vec();
    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();

        let diagram = Voronoi::new(&points, bounds)?;
        let centroids = diagram.lloyd_relaxation();
        let new_points: Vec<DVec2> = points
            .iter()
            .map(|&p| {
                diagram
                    .sites()
                    .find(p)
                    .map_or(p, |site| centroids[site.index])
            })
            .collect();

        let displacement = max_displacement(&points, &new_points);
        points = new_points;
        iterations_run = iteration + 1;

        tracing::debug!(
            iteration = iteration + 1,
            sites = diagram.site_count(),
            max_displacement = displacement,
            elapsed_ms = iter_start.elapsed().as_secs_f64() * 1000.0,
            "lloyd iteration"
        );

        if convergence_threshold > 0.0 && displacement < convergence_threshold {
            converged = true;
            break;
        }
    }

    tracing::debug!(
        iterations = iterations_run,
        max_iterations = options.max_iterations,
        converged,
        elapsed_ms = total_start.elapsed().as_secs_f64() * 1000.0,
        "lloyd relaxation finished"
    );

    Ok(points)
}
