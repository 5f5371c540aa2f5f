//! Voronoi diagram facade
//!
//! [`Voronoi`] registers the sites, runs the sweep once and answers every
//! query about the resulting diagram and its Delaunay dual.

use std::cmp::Ordering;
use std::time::Instant;

use glam::DVec2;

use crate::config::DiagramConfig;
use crate::edge::{Edge, Vertex};
use crate::error::{Result, VoronoiError};
use crate::geometry::{Bounds, Circle, LineSegment, Side};
use crate::kruskal::{kruskal, SpanningTreeKind};
use crate::region::{extract_region, reorder_edges, ChainCriterion, Region};
use crate::site::{Site, SiteRegistry};
use crate::sweep::fortune;

#[cfg(not(feature = "spatial-index"))]
use crate::spatial::nearest_linear;
#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// A planar Voronoi diagram clipped to a rectangle
///
/// Built in one pass from a point set; there are no incremental updates, so
/// moving points means building a new diagram.
///
/// # Examples
///
/// ```
/// use fortune_voronoi::*;
///
/// let points = vec![DVec2::new(0.0, 0.0), DVec2::new(4.0, 0.0), DVec2::new(2.0, 4.0)];
/// let diagram = Voronoi::new(&points, Bounds::new(-10.0, -10.0, 20.0, 20.0)).unwrap();
///
/// // Three sites meet at a single circumcenter
/// assert_eq!(diagram.vertices().len(), 1);
/// assert_eq!(diagram.voronoi_diagram().len(), 3);
/// assert_eq!(diagram.regions().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Voronoi {
    sites: SiteRegistry,
    edges: Vec<Edge>,
    vertices: Vec<Vertex>,
    bounds: Bounds,

    /// Edge indices incident to each site, by site index
    site_edges: Vec<Vec<usize>>,

    #[cfg(feature = "spatial-index")]
    spatial_index: Option<SpatialIndex>,
}

impl Voronoi {
    /// Build a diagram with deterministic filler weights
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for invalid bounds and `InvalidInput` for
    /// non-finite points.
    pub fn new(points: &[DVec2], bounds: Bounds) -> Result<Self> {
        Self::with_config(points, None, &DiagramConfig::new(bounds))
    }

    /// Build a diagram with one weight per point
    ///
    /// # Errors
    ///
    /// As [`Voronoi::new`], plus `InvalidInput` when `weights` does not match
    /// `points` in length or holds a negative or non-finite value.
    pub fn with_weights(points: &[DVec2], weights: &[f64], bounds: Bounds) -> Result<Self> {
        Self::with_config(points, Some(weights), &DiagramConfig::new(bounds))
    }

    pub fn with_config(
        points: &[DVec2],
        weights: Option<&[f64]>,
        config: &DiagramConfig,
    ) -> Result<Self> {
        config.bounds.validate()?;
        let sites = SiteRegistry::from_points(points, weights, config.weight_seed)?;
        Self::from_registry(sites, config.bounds)
    }

    /// Build a diagram from an already populated registry
    pub fn from_registry(sites: SiteRegistry, bounds: Bounds) -> Result<Self> {
        bounds.validate()?;
        let start = Instant::now();

        let output = fortune(&sites, &bounds);

        let mut site_edges = vec![Vec::new(); sites.len()];
        for (i, edge) in output.edges.iter().enumerate() {
            site_edges[edge.left_site].push(i);
            site_edges[edge.right_site].push(i);
        }

        #[cfg(feature = "spatial-index")]
        let spatial_index = (!sites.is_empty()).then(|| SpatialIndex::new(&sites.coords()));

        tracing::debug!(
            sites = sites.len(),
            edges = output.edges.len(),
            vertices = output.vertices.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "diagram built"
        );

        Ok(Self {
            sites,
            edges: output.edges,
            vertices: output.vertices,
            bounds,
            site_edges,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn sites(&self) -> &SiteRegistry {
        &self.sites
    }

    #[inline]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Every bisector found by the sweep, visible or not, in creation order
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Fixed Voronoi vertices in the order the sweep found them
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Site coordinates in registration order
    pub fn site_coords(&self) -> Vec<DVec2> {
        self.sites.coords()
    }

    /// Clipped Voronoi edges that intersect the bounds
    pub fn voronoi_diagram(&self) -> Vec<LineSegment> {
        self.edges.iter().filter_map(Edge::voronoi_line).collect()
    }

    /// Delaunay segments whose dual Voronoi edge is visible
    pub fn delaunay_triangulation(&self) -> Vec<LineSegment> {
        let sites = self.sites.as_slice();
        self.edges
            .iter()
            .filter(|e| e.is_visible())
            .map(|e| e.delaunay_line(sites))
            .collect()
    }

    /// One Delaunay segment per edge, visible or not
    pub fn delaunay_edges(&self) -> Vec<LineSegment> {
        let sites = self.sites.as_slice();
        self.edges.iter().map(|e| e.delaunay_line(sites)).collect()
    }

    /// One region per site, in registration order
    pub fn regions(&self) -> Vec<Region> {
        self.sites.iter().map(|site| self.region_of(site)).collect()
    }

    /// The region of the site registered at `coord`
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if no site is registered there.
    pub fn region(&self, coord: DVec2) -> Result<Region> {
        let site = self.find_site(coord)?;
        Ok(self.region_of(site))
    }

    /// Coordinates of the sites sharing an edge with the site at `coord`
    ///
    /// Neighbours are listed in boundary order.
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if no site is registered there.
    pub fn neighbor_sites_for_site(&self, coord: DVec2) -> Result<Vec<DVec2>> {
        let site = self.find_site(coord)?;
        let sites = self.sites.as_slice();
        Ok(self
            .ordered_site_edges(site)
            .into_iter()
            .filter_map(|(e, _)| self.edges[e].opposite_site(site.index))
            .map(|other| sites[other].coord)
            .collect())
    }

    /// Visible boundary segments of the site at `coord`, walked in order
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if no site is registered there.
    pub fn voronoi_boundary_for_site(&self, coord: DVec2) -> Result<Vec<LineSegment>> {
        let site = self.find_site(coord)?;
        Ok(self.boundary_segments(&self.ordered_site_edges(site)))
    }

    /// Delaunay segments from the site at `coord` to each of its neighbours
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` if no site is registered there.
    pub fn delaunay_lines_for_site(&self, coord: DVec2) -> Result<Vec<LineSegment>> {
        let site = self.find_site(coord)?;
        let sites = self.sites.as_slice();
        Ok(self
            .ordered_site_edges(site)
            .into_iter()
            .map(|(e, _)| self.edges[e].delaunay_line(sites))
            .collect())
    }

    /// Delaunay segments along the convex hull of the sites
    pub fn hull(&self) -> Vec<LineSegment> {
        let sites = self.sites.as_slice();
        self.hull_edges()
            .into_iter()
            .map(|e| e.delaunay_line(sites))
            .collect()
    }

    /// Hull sites in walking order
    ///
    /// Falls back to sorting the hull sites by angle around their mean when
    /// the hull edges do not form a single chain.
    pub fn hull_points_in_order(&self) -> Vec<DVec2> {
        let hull = self.hull_edges();
        let sites = self.sites.as_slice();

        if let Some(chain) = reorder_edges(&hull, ChainCriterion::Site) {
            return chain
                .into_iter()
                .map(|(i, side)| sites[hull[i].site(side)].coord)
                .collect();
        }

        tracing::debug!(edges = hull.len(), "hull edges do not chain, sorting by angle");
        let mut indices: Vec<usize> = hull
            .iter()
            .flat_map(|e| [e.left_site, e.right_site])
            .collect();
        indices.sort_unstable();
        indices.dedup();
        let points: Vec<DVec2> = indices.into_iter().map(|i| sites[i].coord).collect();
        let mean = points.iter().copied().sum::<DVec2>() / points.len().max(1) as f64;
        sort_by_angle(points, mean, |&p| p)
    }

    /// Minimum or maximum spanning tree over every Delaunay edge
    pub fn spanning_tree(&self, kind: SpanningTreeKind) -> Vec<LineSegment> {
        kruskal(&self.delaunay_edges(), kind)
    }

    /// One unweighted Lloyd step: each site's region centroid
    ///
    /// Sites whose region is empty or degenerate keep their coordinate.
    /// Output is in registration order.
    pub fn lloyd_relaxation(&self) -> Vec<DVec2> {
        self.regions()
            .iter()
            .map(|region| region.centroid().unwrap_or(region.site))
            .collect()
    }

    /// One circle per site, in registration order
    ///
    /// Each circle is centred on its site with half the distance to the
    /// nearest other site as radius, so no two circles overlap. A site with
    /// no neighbours gets radius 0.
    ///
    /// # Example
    ///
    /// ```
    /// use fortune_voronoi::*;
    ///
    /// let points = vec![DVec2::new(0.0, 0.0), DVec2::new(4.0, 0.0), DVec2::new(0.0, 10.0)];
    /// let diagram = Voronoi::new(&points, Bounds::new(-1.0, -1.0, 12.0, 12.0)).unwrap();
    ///
    /// let circles = diagram.circles();
    /// assert_eq!(circles[0], Circle::new(DVec2::new(0.0, 0.0), 2.0));
    /// ```
    pub fn circles(&self) -> Vec<Circle> {
        let sites = self.sites.as_slice();
        sites
            .iter()
            .map(|site| {
                let nearest = self.site_edges[site.index]
                    .iter()
                    .filter_map(|&e| self.edges[e].opposite_site(site.index))
                    .map(|other| site.coord.distance(sites[other].coord))
                    .fold(f64::INFINITY, f64::min);
                let radius = if nearest.is_finite() { nearest * 0.5 } else { 0.0 };
                Circle::new(site.coord, radius)
            })
            .collect()
    }

    /// Coordinate of the site closest to `p`, `None` for an empty diagram
    pub fn nearest_site_point(&self, p: DVec2) -> Option<DVec2> {
        #[cfg(feature = "spatial-index")]
        {
            let index = self.spatial_index.as_ref()?;
            self.sites.get(index.find_nearest(p)).map(|s| s.coord)
        }
        #[cfg(not(feature = "spatial-index"))]
        {
            let coords = self.sites.coords();
            nearest_linear(&coords, p).map(|i| coords[i])
        }
    }

    fn find_site(&self, coord: DVec2) -> Result<&Site> {
        self.sites.find(coord).ok_or(VoronoiError::SiteNotFound {
            x: coord.x,
            y: coord.y,
        })
    }

    fn region_of(&self, site: &Site) -> Region {
        let incident = self.site_edges[site.index].iter().map(|&e| &self.edges[e]);
        extract_region(site, incident, self.sites.as_slice(), &self.bounds)
    }

    fn hull_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.is_part_of_convex_hull())
            .collect()
    }

    /// Incident edges of a site chained through shared vertices, each with
    /// the direction it is walked in
    ///
    /// Falls back to [`Self::angular_site_edges`] when the edges do not chain.
    fn ordered_site_edges(&self, site: &Site) -> Vec<(usize, Side)> {
        let ids = &self.site_edges[site.index];
        let edges: Vec<&Edge> = ids.iter().map(|&e| &self.edges[e]).collect();

        if let Some(chain) = reorder_edges(&edges, ChainCriterion::Vertex) {
            return chain.into_iter().map(|(i, side)| (ids[i], side)).collect();
        }

        tracing::debug!(site = site.index, edges = ids.len(), "site edges do not chain, sorting by angle");
        self.angular_site_edges(site)
    }

    /// Incident edges sorted counter-clockwise by the direction of the
    /// neighbouring site
    ///
    /// The first visible edge is walked counter-clockwise around the site;
    /// each later one is turned so it starts where the previous one ended.
    fn angular_site_edges(&self, site: &Site) -> Vec<(usize, Side)> {
        let sites = self.sites.as_slice();
        let with_dir: Vec<(usize, DVec2)> = self.site_edges[site.index]
            .iter()
            .filter_map(|&e| {
                let other = self.edges[e].opposite_site(site.index)?;
                Some((e, sites[other].coord))
            })
            .collect();

        let mut previous_end: Option<DVec2> = None;
        sort_by_angle(with_dir, site.coord, |(_, p)| *p)
            .into_iter()
            .map(|(e, _)| {
                let Some(segment) = self.edges[e].voronoi_line() else {
                    return (e, Side::Left);
                };
                let forward = match previous_end {
                    Some(end) => end.distance(segment.p0) <= end.distance(segment.p1),
                    None => (segment.p0 - site.coord).perp_dot(segment.p1 - site.coord) >= 0.0,
                };
                let (side, end) = if forward {
                    (Side::Left, segment.p1)
                } else {
                    (Side::Right, segment.p0)
                };
                previous_end = Some(end);
                (e, side)
            })
            .collect()
    }

    /// Visible segments of a walked edge chain, each oriented along the walk
    fn boundary_segments(&self, chain: &[(usize, Side)]) -> Vec<LineSegment> {
        chain
            .iter()
            .filter_map(|&(e, side)| {
                let segment = self.edges[e].voronoi_line()?;
                Some(match side {
                    Side::Left => segment,
                    Side::Right => segment.reversed(),
                })
            })
            .collect()
    }
}

/// Sort items counter-clockwise by the angle of their point around `center`
fn sort_by_angle<T, F>(mut items: Vec<T>, center: DVec2, point: F) -> Vec<T>
where
    F: Fn(&T) -> DVec2,
{
    let angle = |p: DVec2| {
        let d = p - center;
        d.y.atan2(d.x)
    };
    items.sort_by(|a, b| {
        angle(point(a))
            .partial_cmp(&angle(point(b)))
            .unwrap_or(Ordering::Equal)
    });
    items
}
