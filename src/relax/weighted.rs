//! Density-weighted centroidal relaxation (stippling)
//!
//! Every sample of a [`SampleGrid`] is assigned to its nearest site and pulls
//! that site with the density found at the sample. Rows are split into
//! chunks accumulated in parallel; the partial sums are merged in chunk
//! order so the result does not depend on thread scheduling.

use std::time::Instant;

use glam::DVec2;
use rayon::prelude::*;

use super::max_displacement;
use crate::config::StipplingConfig;
use crate::density::{DensitySampler, SampleGrid};
use crate::spatial::NearestSite;

/// Weighted sums of the samples claimed by each site
#[derive(Debug, Clone)]
struct Accumulator {
    sum: Vec<DVec2>,
    weight: Vec<f64>,
}

impl Accumulator {
    fn new(sites: usize) -> Self {
        Self {
            sum: vec![DVec2::ZERO; sites],
            weight: vec![0.0; sites],
        }
    }

    #[inline]
    fn add(&mut self, site: usize, position: DVec2, weight: f64) {
        self.sum[site] += position * weight;
        self.weight[site] += weight;
    }

    fn merge(&mut self, other: &Accumulator) {
        for (a, b) in self.sum.iter_mut().zip(&other.sum) {
            *a += *b;
        }
        for (a, b) in self.weight.iter_mut().zip(&other.weight) {
            *a += *b;
        }
    }
}

/// One weighted relaxation step
///
/// Returns the new site positions in input order. A site that claims no
/// weight keeps its position; the others move `config.blend` of the way to
/// their weighted centroid.
///
/// # Example
///
/// ```
/// use fortune_voronoi::*;
///
/// let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
/// let grid = SampleGrid::new(bounds, 20, 20).unwrap();
/// let sites = vec![DVec2::new(2.0, 2.0), DVec2::new(8.0, 8.0)];
///
/// // Only the lower half carries weight
/// let density = |p: DVec2| if p.y < 5.0 { 1.0 } else { 0.0 };
/// let moved = weighted_relaxation_step(&sites, &density, &grid, &StipplingConfig::default());
/// assert!(moved[0].y < 5.0);
/// ```
pub fn weighted_relaxation_step<S>(
    sites: &[DVec2],
    sampler: &S,
    grid: &SampleGrid,
    config: &StipplingConfig,
) -> Vec<DVec2>
where
    S: DensitySampler + Sync + ?Sized,
{
    if sites.is_empty() {
        return Vec::new();
    }

    let stride = config.stride.max(1);
    let rows: Vec<usize> = (0..grid.rows()).step_by(stride).collect();
    let columns: Vec<usize> = (0..grid.columns()).step_by(stride).collect();
    let chunk = rows.len().div_ceil(config.partitions.max(1)).max(1);
    let nearest = NearestSite::new(sites);

    let partials: Vec<Accumulator> = rows
        .par_chunks(chunk)
        .map(|chunk_rows| {
            let mut acc = Accumulator::new(sites.len());
            for &row in chunk_rows {
                for &column in &columns {
                    let position = grid.position(column, row);
                    let weight = sampler.sample(position);
                    // Also rejects NaN
                    if !(weight > 0.0) {
                        continue;
                    }
                    if let Some(site) = nearest.find(position) {
                        acc.add(site, position, weight);
                    }
                }
            }
            acc
        })
        .collect();

    let mut total = Accumulator::new(sites.len());
    for partial in &partials {
        total.merge(partial);
    }

    sites
        .iter()
        .enumerate()
        .map(|(i, &old)| {
            let weight = total.weight[i];
            if weight > 0.0 {
                old.lerp(total.sum[i] / weight, config.blend)
            } else {
                old
            }
        })
        .collect()
}

/// Run up to `config.iterations` weighted steps
///
/// Stops early once no site moves further than
/// `config.convergence_threshold`.
pub fn weighted_relaxation<S>(
    points: &[DVec2],
    sampler: &S,
    grid: &SampleGrid,
    config: &StipplingConfig,
) -> Vec<DVec2>
where
    S: DensitySampler + Sync + ?Sized,
{
    let total_start = Instant::now();
    let mut points = points.to_vec();
    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..config.iterations {
        let iter_start = Instant::now();
        let next = weighted_relaxation_step(&points, sampler, grid, config);
        let displacement = max_displacement(&points, &next);
        points = next;
        iterations_run = iteration + 1;

        tracing::debug!(
            iteration = iteration + 1,
            max_displacement = displacement,
            elapsed_ms = iter_start.elapsed().as_secs_f64() * 1000.0,
            "weighted iteration"
        );

        if config.convergence_threshold > 0.0 && displacement < config.convergence_threshold {
            converged = true;
            break;
        }
    }

    tracing::debug!(
        points = points.len(),
        iterations = iterations_run,
        converged,
        elapsed_ms = total_start.elapsed().as_secs_f64() * 1000.0,
        "weighted relaxation finished"
    );

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StipplingConfigBuilder;
    use crate::geometry::Bounds;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_points(n: usize, seed: u64) -> Vec<DVec2> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| DVec2::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
            .collect()
    }

    fn grid() -> SampleGrid {
        SampleGrid::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 100, 100).unwrap()
    }

    fn left_half(p: DVec2) -> f64 {
        if p.x < 50.0 {
            1.0
        } else {
            0.0
        }
    }

    #[test]
    fn test_points_move_toward_density() {
        let sites = random_points(20, 8);
        let moved =
            weighted_relaxation_step(&sites, &left_half, &grid(), &StipplingConfig::default());

        for (old, new) in sites.iter().zip(&moved) {
            assert!(new.x < 50.0 || new == old);
        }
        let count_left = |pts: &[DVec2]| pts.iter().filter(|p| p.x < 50.0).count();
        assert!(count_left(&moved) >= count_left(&sites));
    }

    #[test]
    fn test_partition_count_independent() {
        let sites = random_points(25, 3);
        let density = |p: DVec2| 1.0 + (p.x * 0.05).sin() * (p.y * 0.03).cos();
        let one = StipplingConfigBuilder::new().partitions(1).unwrap().build().unwrap();
        let many = StipplingConfigBuilder::new().partitions(7).unwrap().build().unwrap();

        let a = weighted_relaxation_step(&sites, &density, &grid(), &one);
        let b = weighted_relaxation_step(&sites, &density, &grid(), &many);
        for (pa, pb) in a.iter().zip(&b) {
            assert!(pa.distance(*pb) < 1e-9);
        }
    }

    #[test]
    fn test_zero_density_keeps_positions() {
        let sites = random_points(10, 1);
        let nothing = |_: DVec2| 0.0;
        let negative = |_: DVec2| -3.0;
        let nan = |_: DVec2| f64::NAN;
        let config = StipplingConfig::default();

        assert_eq!(weighted_relaxation_step(&sites, &nothing, &grid(), &config), sites);
        assert_eq!(weighted_relaxation_step(&sites, &negative, &grid(), &config), sites);
        assert_eq!(weighted_relaxation_step(&sites, &nan, &grid(), &config), sites);
    }

    #[test]
    fn test_blend_moves_part_way() {
        let sites = vec![DVec2::new(10.0, 10.0)];
        let uniform = |_: DVec2| 1.0;
        let config = StipplingConfigBuilder::new().blend(0.5).unwrap().build().unwrap();

        let moved = weighted_relaxation_step(&sites, &uniform, &grid(), &config);
        // Centroid of the full grid is (50, 50)
        assert!(moved[0].distance(DVec2::new(30.0, 30.0)) < 1e-9);
    }

    #[test]
    fn test_weighted_relaxation_driver() {
        let sites = random_points(15, 77);
        let config = StipplingConfigBuilder::new()
            .iterations(10)
            .unwrap()
            .stride(2)
            .unwrap()
            .convergence_threshold(0.01)
            .unwrap()
            .build()
            .unwrap();

        let relaxed = weighted_relaxation(&sites, &left_half, &grid(), &config);
        assert_eq!(relaxed.len(), sites.len());
        assert!(relaxed.iter().all(|p| p.x >= 0.0 && p.x <= 100.0));
        assert!(weighted_relaxation_step(&[], &left_half, &grid(), &config).is_empty());
    }
}
