//! Example: Build a diagram and relax it
//!
//! Demonstrates diagram queries and Lloyd's relaxation on random points.

use fortune_voronoi::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn area_spread(diagram: &Voronoi) -> (f64, f64) {
    let areas: Vec<f64> = diagram.regions().iter().map(|r| r.area()).collect();
    let min = areas.iter().copied().fold(f64::INFINITY, f64::min);
    let max = areas.iter().copied().fold(0.0, f64::max);
    (min, max)
}

fn main() -> Result<()> {
    println!("Voronoi Relaxation Example");
    println!("==========================\n");

    let bounds = Bounds::new(0.0, 0.0, 500.0, 500.0);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let points: Vec<DVec2> = (0..200)
        .map(|_| DVec2::new(rng.gen_range(0.0..500.0), rng.gen_range(0.0..500.0)))
        .collect();

    let diagram = Voronoi::new(&points, bounds)?;
    let (min, max) = area_spread(&diagram);
    println!("Initial diagram:");
    println!("  Sites: {}", diagram.site_count());
    println!("  Voronoi edges: {}", diagram.voronoi_diagram().len());
    println!("  Vertices: {}", diagram.vertices().len());
    println!("  Hull sites: {}", diagram.hull_points_in_order().len());
    println!("  Cell area: {:.1} .. {:.1}", min, max);
    println!();

    let options = LloydOptions {
        max_iterations: 20,
        convergence_threshold: 0.001,
    };
    let relaxed = lloyd_relaxation_with_options(&points, bounds, options)?;
    let diagram = Voronoi::new(&relaxed, bounds)?;
    let (min, max) = area_spread(&diagram);
    println!("After Lloyd's relaxation:");
    println!("  Cell area: {:.1} .. {:.1}", min, max);

    let tree = diagram.spanning_tree(SpanningTreeKind::Minimum);
    let length: f64 = tree.iter().map(|s| s.length()).sum();
    println!("  Minimum spanning tree: {} segments, length {:.1}", tree.len(), length);

    println!("\nRelaxation complete!");
    Ok(())
}
