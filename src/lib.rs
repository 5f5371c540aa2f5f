//! Planar Voronoi diagrams and Delaunay triangulations
//!
//! Builds the Voronoi diagram of a point set with Fortune's sweep, clips it
//! to a rectangle and derives regions, the Delaunay dual, the convex hull and
//! spanning trees from it. Lloyd relaxation and density-weighted relaxation
//! (stippling) iterate on top of the diagram.
//!
//! # Quick Start
//!
//! ```rust
//! use fortune_voronoi::*;
//!
//! let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
//! let points = vec![
//!     DVec2::new(20.0, 30.0),
//!     DVec2::new(70.0, 20.0),
//!     DVec2::new(50.0, 80.0),
//!     DVec2::new(40.0, 50.0),
//! ];
//!
//! let diagram = Voronoi::new(&points, bounds).unwrap();
//! for region in diagram.regions() {
//!     println!("site {:?}: {} corners", region.site, region.vertex_count());
//! }
//!
//! // Even out the cells
//! let relaxed = lloyd_relaxation(&points, bounds, 5).unwrap();
//! assert_eq!(relaxed.len(), points.len());
//!
//! let tree = diagram.spanning_tree(SpanningTreeKind::Minimum);
//! assert_eq!(tree.len(), 3);
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): KD-tree nearest-site lookups for queries and
//!   weighted relaxation; a linear scan is used without it
//! - `serde`: Serialization support for configuration and output types

// Modules
pub mod error;
pub mod geometry;
pub mod config;
pub mod site;
pub mod edge;
pub mod region;
pub mod voronoi;
pub mod density;
pub mod relax;
pub mod kruskal;
pub mod spatial;

mod sweep;

// Re-export core types for convenience
pub use error::{VoronoiError, Result};
pub use geometry::{Bounds, Circle, LineSegment, Side, CoordKey, compare_by_y_then_x};
pub use config::{DiagramConfig, StipplingConfig, StipplingConfigBuilder};
pub use site::{Site, SiteRegistry};
pub use edge::{Edge, Vertex};
pub use region::{Region, ChainCriterion, extract_region, reorder_edges};
pub use voronoi::Voronoi;
pub use density::{DensitySampler, DensityGrid, SampleGrid};
pub use relax::{LloydOptions, lloyd_relaxation, lloyd_relaxation_with_options, weighted_relaxation, weighted_relaxation_step};
pub use kruskal::{SpanningTreeKind, kruskal};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
