//! Diagram and relaxation configuration
//!
//! [`DiagramConfig`] describes one diagram build; [`StipplingConfig`] drives
//! the density-weighted relaxation and is built through a validating
//! [`StipplingConfigBuilder`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::geometry::Bounds;

/// Upper limit accepted by [`StipplingConfigBuilder::iterations`]
pub const MAX_STIPPLING_ITERATIONS: usize = 1_000;

/// Settings for building one diagram
///
/// # Example
///
/// ```rust
/// use fortune_voronoi::*;
///
/// let config = DiagramConfig::new(Bounds::new(0.0, 0.0, 100.0, 100.0)).with_weight_seed(7);
/// let points = vec![DVec2::new(10.0, 10.0), DVec2::new(90.0, 40.0), DVec2::new(50.0, 80.0)];
///
/// let diagram = Voronoi::with_config(&points, None, &config).unwrap();
/// assert_eq!(diagram.site_count(), 3);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramConfig {
    /// Clip rectangle for every visible output
    pub bounds: Bounds,

    /// Seed for the filler weights of sites registered without one
    ///
    /// The same seed and points always produce the same weights.
    pub weight_seed: u64,
}

impl DiagramConfig {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds, weight_seed: 0 }
    }

    pub fn with_weight_seed(mut self, seed: u64) -> Self {
        self.weight_seed = seed;
        self
    }
}

/// Configuration for density-weighted relaxation (stippling)
///
/// # Example
///
/// ```rust
/// use fortune_voronoi::*;
///
/// let config = StipplingConfigBuilder::new()
///     .iterations(30)
///     .unwrap()
///     .blend(0.8)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: StipplingConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StipplingConfig {
    /// Maximum number of relaxation steps
    pub iterations: usize,

    /// How far each step moves a site toward its weighted centroid
    ///
    /// - 1.0: jump straight to the centroid (default)
    /// - 0.5: move half-way, slower but smoother
    pub blend: f64,

    /// Use every `stride`-th sample column and row
    ///
    /// Larger strides trade accuracy for speed on large rasters.
    pub stride: usize,

    /// Number of row chunks accumulated in parallel
    ///
    /// Partial sums are merged in chunk order, so results depend on this
    /// value only through floating-point summation order.
    pub partitions: usize,

    /// Stop once no site moves further than this (absolute units)
    ///
    /// 0.0 runs every iteration.
    pub convergence_threshold: f64,
}

impl Default for StipplingConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            blend: 1.0,
            stride: 1,
            partitions: 8,
            convergence_threshold: 0.0,
        }
    }
}

/// Builder for [`StipplingConfig`] with validation
///
/// Range-checked setters return `Result<Self>`.
#[derive(Debug, Clone, Default)]
pub struct StipplingConfigBuilder {
    config: StipplingConfig,
}

impl StipplingConfigBuilder {
    /// Start from the defaults: 50 iterations, blend 1.0, stride 1, 8
    /// partitions, no early stop
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > [`MAX_STIPPLING_ITERATIONS`]
    pub fn iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > MAX_STIPPLING_ITERATIONS {
            return Err(VoronoiError::InvalidConfig(format!(
                "stippling iterations must be <= {} (got {})",
                MAX_STIPPLING_ITERATIONS, iterations
            )));
        }
        self.config.iterations = iterations;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 < blend <= 1`
    pub fn blend(mut self, blend: f64) -> Result<Self> {
        if !(blend > 0.0 && blend <= 1.0) {
            return Err(VoronoiError::InvalidConfig(format!(
                "blend must be in (0, 1] (got {})",
                blend
            )));
        }
        self.config.blend = blend;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if stride is 0
    pub fn stride(mut self, stride: usize) -> Result<Self> {
        if stride == 0 {
            return Err(VoronoiError::InvalidConfig("stride must be >= 1".into()));
        }
        self.config.stride = stride;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if partitions is 0
    pub fn partitions(mut self, partitions: usize) -> Result<Self> {
        if partitions == 0 {
            return Err(VoronoiError::InvalidConfig("partitions must be >= 1".into()));
        }
        self.config.partitions = partitions;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if the threshold is negative or NaN
    pub fn convergence_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(threshold >= 0.0) {
            return Err(VoronoiError::InvalidConfig(format!(
                "convergence threshold must be >= 0 (got {})",
                threshold
            )));
        }
        self.config.convergence_threshold = threshold;
        Ok(self)
    }

    pub fn build(self) -> Result<StipplingConfig> {
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = StipplingConfigBuilder::new().build().unwrap();
        assert_eq!(config, StipplingConfig::default());
        assert_eq!(config.iterations, 50);
        assert_eq!(config.partitions, 8);
    }

    #[test]
    fn test_builder_custom() {
        let config = StipplingConfigBuilder::new()
            .iterations(5)
            .unwrap()
            .blend(0.5)
            .unwrap()
            .stride(2)
            .unwrap()
            .partitions(3)
            .unwrap()
            .convergence_threshold(0.01)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.iterations, 5);
        assert_eq!(config.blend, 0.5);
        assert_eq!(config.stride, 2);
        assert_eq!(config.partitions, 3);
        assert_eq!(config.convergence_threshold, 0.01);
    }

    #[test]
    fn test_builder_rejects_out_of_range() {
        assert!(StipplingConfigBuilder::new().iterations(MAX_STIPPLING_ITERATIONS + 1).is_err());
        assert!(StipplingConfigBuilder::new().blend(0.0).is_err());
        assert!(StipplingConfigBuilder::new().blend(1.5).is_err());
        assert!(StipplingConfigBuilder::new().blend(f64::NAN).is_err());
        assert!(StipplingConfigBuilder::new().stride(0).is_err());
        assert!(StipplingConfigBuilder::new().partitions(0).is_err());
        assert!(StipplingConfigBuilder::new().convergence_threshold(-1.0).is_err());
    }

    #[test]
    fn test_diagram_config() {
        let bounds = Bounds::new(0.0, 0.0, 5.0, 5.0);
        let config = DiagramConfig::new(bounds).with_weight_seed(3);
        assert_eq!(config.bounds, bounds);
        assert_eq!(config.weight_seed, 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = DiagramConfig::new(Bounds::new(1.0, 2.0, 3.0, 4.0)).with_weight_seed(99);
        let json = serde_json::to_string(&config).unwrap();
        let restored: DiagramConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
