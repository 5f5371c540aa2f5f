//! Density sources for weighted relaxation
//!
//! A [`DensitySampler`] tells the weighted relaxation how much each sample
//! position should pull on its nearest site. Closures work directly; a
//! [`DensityGrid`] turns a brightness raster into darkness weights.

use glam::DVec2;

use crate::error::{Result, VoronoiError};
use crate::geometry::Bounds;

/// Trait for sampling point density over the plane
///
/// Higher values attract sites more strongly. Negative and NaN values are
/// treated as zero by the relaxation.
pub trait DensitySampler {
    fn sample(&self, position: DVec2) -> f64;
}

impl<F> DensitySampler for F
where
    F: Fn(DVec2) -> f64,
{
    #[inline]
    fn sample(&self, position: DVec2) -> f64 {
        self(position)
    }
}

/// Regular lattice of sample positions covering a rectangle
///
/// Samples sit at cell centres; row 0 is the bottom row (`y_min`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    bounds: Bounds,
    columns: usize,
    rows: usize,
}

impl SampleGrid {
    /// # Errors
    ///
    /// Returns `InvalidConfig` for zero columns or rows and for invalid bounds.
    pub fn new(bounds: Bounds, columns: usize, rows: usize) -> Result<Self> {
        bounds.validate()?;
        if columns == 0 || rows == 0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "sample grid needs at least one column and row (got {} x {})",
                columns, rows
            )));
        }
        Ok(Self { bounds, columns, rows })
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns * self.rows
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Centre of the cell at `(column, row)`
    pub fn position(&self, column: usize, row: usize) -> DVec2 {
        let cell = DVec2::new(
            self.bounds.width / self.columns as f64,
            self.bounds.height / self.rows as f64,
        );
        self.bounds.min() + DVec2::new(column as f64 + 0.5, row as f64 + 0.5) * cell
    }
}

/// Piecewise-constant density from a brightness raster
///
/// Darker pixels weigh more: `weight = 1 - clamp(brightness, 0, 1)`.
///
/// # Example
///
/// ```
/// use fortune_voronoi::*;
///
/// // 2 x 1 image: black on the left, white on the right
/// let bounds = Bounds::new(0.0, 0.0, 2.0, 1.0);
/// let grid = DensityGrid::from_brightness(2, 1, &[0.0, 1.0], bounds).unwrap();
///
/// assert_eq!(grid.sample(DVec2::new(0.5, 0.5)), 1.0);
/// assert_eq!(grid.sample(DVec2::new(1.5, 0.5)), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    bounds: Bounds,
    columns: usize,
    rows: usize,
    weights: Vec<f64>,
}

impl DensityGrid {
    /// Build from row-major brightness values, row 0 at `y_min`
    ///
    /// NaN brightness gives zero weight.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty raster or invalid bounds, and
    /// `InvalidInput` when `brightness.len() != columns * rows`.
    pub fn from_brightness(
        columns: usize,
        rows: usize,
        brightness: &[f64],
        bounds: Bounds,
    ) -> Result<Self> {
        SampleGrid::new(bounds, columns, rows)?;
        if brightness.len() != columns * rows {
            return Err(VoronoiError::InvalidInput(format!(
                "expected {} brightness values for a {} x {} raster, got {}",
                columns * rows,
                columns,
                rows,
                brightness.len()
            )));
        }

        let weights = brightness
            .iter()
            .map(|&b| if b.is_nan() { 0.0 } else { 1.0 - b.clamp(0.0, 1.0) })
            .collect();

        Ok(Self { bounds, columns, rows, weights })
    }

    /// One sample per raster cell centre
    pub fn sample_grid(&self) -> SampleGrid {
        SampleGrid {
            bounds: self.bounds,
            columns: self.columns,
            rows: self.rows,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Weight of the raster cell at `(column, row)`
    pub fn weight(&self, column: usize, row: usize) -> Option<f64> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.weights.get(row * self.columns + column).copied()
    }

    fn cell_of(&self, position: DVec2) -> Option<(usize, usize)> {
        if !self.bounds.contains(position) {
            return None;
        }
        let index = |offset: f64, extent: f64, count: usize| -> usize {
            if extent <= 0.0 {
                return 0;
            }
            ((offset / extent * count as f64) as usize).min(count - 1)
        };
        Some((
            index(position.x - self.bounds.x_min(), self.bounds.width, self.columns),
            index(position.y - self.bounds.y_min(), self.bounds.height, self.rows),
        ))
    }
}

impl DensitySampler for DensityGrid {
    fn sample(&self, position: DVec2) -> f64 {
        self.cell_of(position)
            .and_then(|(column, row)| self.weight(column, row))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_grid_positions() {
        let grid = SampleGrid::new(Bounds::new(10.0, 20.0, 4.0, 2.0), 4, 2).unwrap();
        assert_eq!(grid.len(), 8);
        assert_eq!(grid.position(0, 0), DVec2::new(10.5, 20.5));
        assert_eq!(grid.position(3, 1), DVec2::new(13.5, 21.5));
    }

    #[test]
    fn test_sample_grid_validation() {
        let bounds = Bounds::new(0.0, 0.0, 1.0, 1.0);
        assert!(SampleGrid::new(bounds, 0, 3).is_err());
        assert!(SampleGrid::new(bounds, 3, 0).is_err());
        assert!(SampleGrid::new(Bounds::new(0.0, 0.0, -1.0, 1.0), 3, 3).is_err());
    }

    #[test]
    fn test_brightness_to_weight() {
        let bounds = Bounds::new(0.0, 0.0, 2.0, 2.0);
        let grid =
            DensityGrid::from_brightness(2, 2, &[0.0, 0.25, 2.0, f64::NAN], bounds).unwrap();

        assert_eq!(grid.weight(0, 0), Some(1.0));
        assert_eq!(grid.weight(1, 0), Some(0.75));
        assert_eq!(grid.weight(0, 1), Some(0.0));
        assert_eq!(grid.weight(1, 1), Some(0.0));
        assert_eq!(grid.weight(2, 0), None);
    }

    #[test]
    fn test_row_zero_is_bottom() {
        let bounds = Bounds::new(0.0, 0.0, 1.0, 2.0);
        let grid = DensityGrid::from_brightness(1, 2, &[0.0, 1.0], bounds).unwrap();

        assert_eq!(grid.sample(DVec2::new(0.5, 0.5)), 1.0);
        assert_eq!(grid.sample(DVec2::new(0.5, 1.5)), 0.0);
        // Far edge belongs to the last cell
        assert_eq!(grid.sample(DVec2::new(1.0, 0.0)), 1.0);
        assert_eq!(grid.sample(DVec2::new(0.5, 3.0)), 0.0);
    }

    #[test]
    fn test_brightness_length_mismatch() {
        let bounds = Bounds::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            DensityGrid::from_brightness(2, 2, &[0.0; 3], bounds).unwrap_err(),
            VoronoiError::InvalidInput("expected 4 brightness values for a 2 x 2 raster, got 3".into())
        );
    }

    #[test]
    fn test_closure_sampler() {
        let sampler = |p: DVec2| p.x * 2.0;
        assert_eq!(sampler.sample(DVec2::new(1.5, 0.0)), 3.0);
    }
}
