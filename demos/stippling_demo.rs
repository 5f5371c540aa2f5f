//! Example: Weighted stippling of a synthetic image
//!
//! Distributes points over a radial gradient so that darker areas receive
//! more points, then prints an ASCII preview.

use fortune_voronoi::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WIDTH: usize = 120;
const HEIGHT: usize = 60;

fn main() -> Result<()> {
    println!("Weighted Stippling Example");
    println!("==========================\n");

    // Dark in the middle, bright at the edges
    let bounds = Bounds::new(0.0, 0.0, WIDTH as f64, HEIGHT as f64);
    let center = DVec2::new(WIDTH as f64 / 2.0, HEIGHT as f64 / 2.0);
    let brightness: Vec<f64> = (0..HEIGHT)
        .flat_map(|row| (0..WIDTH).map(move |col| (col, row)))
        .map(|(col, row)| {
            let p = DVec2::new(col as f64 + 0.5, row as f64 + 0.5);
            (p.distance(center) / center.length()).min(1.0)
        })
        .collect();
    let density = DensityGrid::from_brightness(WIDTH, HEIGHT, &brightness, bounds)?;

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let points: Vec<DVec2> = (0..300)
        .map(|_| DVec2::new(rng.gen_range(0.0..WIDTH as f64), rng.gen_range(0.0..HEIGHT as f64)))
        .collect();

    let config = StipplingConfigBuilder::new()
        .iterations(40)?
        .convergence_threshold(0.05)?
        .build()?;
    println!("Configuration: {:?}\n", config);

    let stipples = weighted_relaxation(&points, &density, &density.sample_grid(), &config);

    let mut canvas = vec![vec![' '; WIDTH / 2]; HEIGHT / 2];
    for p in &stipples {
        let col = ((p.x / 2.0) as usize).min(WIDTH / 2 - 1);
        let row = ((p.y / 2.0) as usize).min(HEIGHT / 2 - 1);
        canvas[HEIGHT / 2 - 1 - row][col] = '*';
    }
    for line in canvas {
        println!("{}", line.into_iter().collect::<String>());
    }

    let diagram = Voronoi::new(&stipples, bounds)?;
    println!("\n{} stipples, {} Voronoi edges", diagram.site_count(), diagram.voronoi_diagram().len());
    Ok(())
}
