//! Region extraction
//!
//! A site's region is the bounds rectangle cut by the half-plane of every
//! incident bisector that contains the site. The cuts are applied one at a
//! time with Sutherland-Hodgman, so the result is a closed convex polygon in
//! counter-clockwise order with rectangle corners included where the region
//! reaches them.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::geometry::{Bounds, Side};
use crate::site::Site;

/// Consecutive polygon points closer than this are merged
const DEDUP_DISTANCE: f64 = 1e-9;

/// Regions with a smaller absolute area have no usable centroid
pub const MIN_CENTROID_AREA: f64 = 1e-12;

/// The clipped Voronoi cell of one site
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub site_index: usize,
    pub site: DVec2,
    /// Counter-clockwise, without repeating the first point; empty when the
    /// cell does not reach into the bounds
    pub vertices: Vec<DVec2>,
}

impl Region {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Shoelace area, positive for counter-clockwise polygons
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.perp_dot(b)).sum::<f64>() * 0.5
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area-weighted centroid of the polygon
    ///
    /// Returns `None` for degenerate polygons whose area is below
    /// [`MIN_CENTROID_AREA`].
    pub fn centroid(&self) -> Option<DVec2> {
        let mut area = 0.0;
        let mut sum = DVec2::ZERO;
        for (a, b) in self.edges() {
            let cross = a.x * b.y - b.x * a.y;
            area += cross;
            sum += (a + b) * cross;
        }
        area *= 0.5;
        if area.abs() < MIN_CENTROID_AREA {
            return None;
        }
        Some(sum / (6.0 * area))
    }

    /// Whether `p` lies inside or on the border of the (convex) polygon
    pub fn contains(&self, p: DVec2) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }
        self.edges().all(|(a, b)| (b - a).perp_dot(p - a) >= -1e-9)
    }

    fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Build the region of `site` from the edges it participates in
///
/// `sites` is the full site table the edges index into. Edges not incident
/// to `site` are ignored.
pub fn extract_region<'a, I>(site: &Site, incident: I, sites: &[Site], bounds: &Bounds) -> Region
where
    I: IntoIterator<Item = &'a Edge>,
{
    let s = site.coord;
    let mut polygon = bounds.corners().to_vec();

    for edge in incident {
        if polygon.is_empty() {
            break;
        }
        let Some(other) = edge.opposite_site(site.index) else {
            continue;
        };
        let t = sites[other].coord;
        // Points closer to s than to t: p·(t − s) <= (|t|² − |s|²) / 2
        let normal = t - s;
        let offset = (t.length_squared() - s.length_squared()) * 0.5;
        polygon = clip_half_plane(&polygon, normal, offset);
    }

    let vertices = dedup_ring(polygon);
    Region {
        site_index: site.index,
        site: s,
        vertices: if vertices.len() < 3 { Vec::new() } else { vertices },
    }
}

/// Keep the part of `polygon` where `normal · p <= offset`
pub fn clip_half_plane(polygon: &[DVec2], normal: DVec2, offset: f64) -> Vec<DVec2> {
    let n = polygon.len();
    let mut output = Vec::with_capacity(n + 1);

    for i in 0..n {
        let current = polygon[i];
        let next = polygon[(i + 1) % n];
        let dc = normal.dot(current) - offset;
        let dn = normal.dot(next) - offset;
        let current_inside = dc <= 0.0;
        let next_inside = dn <= 0.0;

        if current_inside {
            output.push(current);
            if !next_inside {
                output.push(current.lerp(next, dc / (dc - dn)));
            }
        } else if next_inside {
            output.push(current.lerp(next, dc / (dc - dn)));
        }
    }

    output
}

fn dedup_ring(mut points: Vec<DVec2>) -> Vec<DVec2> {
    points.dedup_by(|b, a| a.distance(*b) < DEDUP_DISTANCE);
    while points.len() > 1 {
        let (first, last) = (points[0], points[points.len() - 1]);
        if first.distance(last) < DEDUP_DISTANCE {
            points.pop();
        } else {
            break;
        }
    }
    points
}

/// What two consecutive edges of a chain must share
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainCriterion {
    /// Share a Voronoi vertex (walks a region boundary)
    Vertex,
    /// Share a site (walks the convex hull)
    Site,
}

/// Order edges into a chain where each edge ends where the next begins
///
/// Returns `(position in edges, orientation)` pairs; an orientation of
/// `Side::Left` means the edge is walked from its left end to its right end.
/// Open ends (absent vertices) match each other. Returns `None` when some
/// edge cannot be attached to either end of the chain.
pub fn reorder_edges(edges: &[&Edge], criterion: ChainCriterion) -> Option<Vec<(usize, Side)>> {
    if edges.is_empty() {
        return Some(Vec::new());
    }

    let end = |edge: &Edge, side: Side| -> Option<usize> {
        match criterion {
            ChainCriterion::Vertex => edge.vertex(side).map(|v| v.index),
            ChainCriterion::Site => Some(edge.site(side)),
        }
    };

    let mut chain = std::collections::VecDeque::with_capacity(edges.len());
    chain.push_back((0, Side::Left));
    let mut first = end(edges[0], Side::Left);
    let mut last = end(edges[0], Side::Right);

    let mut done = vec![false; edges.len()];
    done[0] = true;
    let mut remaining = edges.len() - 1;

    while remaining > 0 {
        let before = remaining;
        for (i, &edge) in edges.iter().enumerate().skip(1) {
            if done[i] {
                continue;
            }
            let left = end(edge, Side::Left);
            let right = end(edge, Side::Right);

            if left == last {
                last = right;
                chain.push_back((i, Side::Left));
            } else if right == first {
                first = left;
                chain.push_front((i, Side::Left));
            } else if left == first {
                first = right;
                chain.push_front((i, Side::Right));
            } else if right == last {
                last = left;
                chain.push_back((i, Side::Right));
            } else {
                continue;
            }
            done[i] = true;
            remaining -= 1;
        }
        if remaining == before {
            return None;
        }
    }

    Some(chain.into_iter().collect())
}
