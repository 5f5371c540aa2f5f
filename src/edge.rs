//! Voronoi edges and vertices
//!
//! An edge is the perpendicular bisector of two sites in implicit form
//! `a·x + b·y = c`. One of `a`, `b` is always exactly `1.0`: `a` when the
//! sites are further apart in x than in y, `b` otherwise. The sweep fills in
//! the endpoint vertices as it discovers them; an endpoint that is still
//! absent afterwards is an open ray (the vertex at infinity).

use glam::DVec2;

use crate::geometry::{Bounds, LineSegment, Side};
use crate::site::Site;

/// A fixed Voronoi vertex: the circumcenter of three sites
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Order in which the sweep fixed this vertex (starts at 0 per diagram)
    pub index: usize,
    pub coord: DVec2,
    /// Indices of the three sites whose bisectors meet here
    pub sites: [usize; 3],
}

/// A bisector between two sites, clipped to the diagram bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Index of the lower site (by y then x) at creation time
    pub left_site: usize,
    pub right_site: usize,
    pub left_vertex: Option<Vertex>,
    pub right_vertex: Option<Vertex>,
    /// Clipped ends as `[left, right]`; `None` when the edge misses the bounds
    pub clipped: Option<[DVec2; 2]>,
}

impl Edge {
    /// The bisector of two distinct sites
    pub(crate) fn bisecting(left: &Site, right: &Site) -> Self {
        let dx = right.coord.x - left.coord.x;
        let dy = right.coord.y - left.coord.y;
        let mut c = left.coord.x * dx + left.coord.y * dy + (dx * dx + dy * dy) * 0.5;

        let (a, b) = if dx.abs() > dy.abs() {
            c /= dx;
            (1.0, dy / dx)
        } else {
            c /= dy;
            (dx / dy, 1.0)
        };

        Self {
            a,
            b,
            c,
            left_site: left.index,
            right_site: right.index,
            left_vertex: None,
            right_vertex: None,
            clipped: None,
        }
    }

    #[inline]
    pub fn site(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left_site,
            Side::Right => self.right_site,
        }
    }

    #[inline]
    pub fn vertex(&self, side: Side) -> Option<Vertex> {
        match side {
            Side::Left => self.left_vertex,
            Side::Right => self.right_vertex,
        }
    }

    pub(crate) fn set_vertex(&mut self, side: Side, vertex: Vertex) {
        match side {
            Side::Left => self.left_vertex = Some(vertex),
            Side::Right => self.right_vertex = Some(vertex),
        }
    }

    /// Whether any part of the edge survived clipping
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.clipped.is_some()
    }

    #[inline]
    pub fn clipped_end(&self, side: Side) -> Option<DVec2> {
        self.clipped.map(|ends| match side {
            Side::Left => ends[0],
            Side::Right => ends[1],
        })
    }

    /// The clipped Voronoi segment, left end first
    pub fn voronoi_line(&self) -> Option<LineSegment> {
        self.clipped.map(|[l, r]| LineSegment::new(l, r))
    }

    /// The dual Delaunay segment joining the two sites
    pub fn delaunay_line(&self, sites: &[Site]) -> LineSegment {
        LineSegment::new(sites[self.left_site].coord, sites[self.right_site].coord)
    }

    /// The other site of this edge, if `site` is one of its two sites
    pub fn opposite_site(&self, site: usize) -> Option<usize> {
        if site == self.left_site {
            Some(self.right_site)
        } else if site == self.right_site {
            Some(self.left_site)
        } else {
            None
        }
    }

    /// An edge with an open end separates two consecutive convex-hull sites
    #[inline]
    pub fn is_part_of_convex_hull(&self) -> bool {
        self.left_vertex.is_none() || self.right_vertex.is_none()
    }

    /// Clip the bisector line to `bounds`
    ///
    /// Absent endpoints are replaced by the line's intersection with the
    /// rectangle border. Leaves `clipped` as `None` when nothing of the edge
    /// lies inside the rectangle.
    pub(crate) fn clip_vertices(&mut self, bounds: &Bounds) {
        let (xmin, ymin) = (bounds.x_min(), bounds.y_min());
        let (xmax, ymax) = (bounds.x_max(), bounds.y_max());
        let (a, b, c) = (self.a, self.b, self.c);

        // For steep lines the "first" end is the lower one; it is the right
        // vertex when the line leans right.
        let left_first = !(a == 1.0 && b >= 0.0);
        let (vertex0, vertex1) = if left_first {
            (self.left_vertex, self.right_vertex)
        } else {
            (self.right_vertex, self.left_vertex)
        };

        let (mut x0, mut y0, mut x1, mut y1);
        if a == 1.0 {
            y0 = match vertex0 {
                Some(v) if v.coord.y > ymin => v.coord.y,
                _ => ymin,
            };
            if y0 > ymax {
                return;
            }
            x0 = c - b * y0;

            y1 = match vertex1 {
                Some(v) if v.coord.y < ymax => v.coord.y,
                _ => ymax,
            };
            if y1 < ymin {
                return;
            }
            x1 = c - b * y1;

            if (x0 > xmax && x1 > xmax) || (x0 < xmin && x1 < xmin) {
                return;
            }

            if x0 > xmax {
                x0 = xmax;
                y0 = (c - x0) / b;
            } else if x0 < xmin {
                x0 = xmin;
                y0 = (c - x0) / b;
            }

            if x1 > xmax {
                x1 = xmax;
                y1 = (c - x1) / b;
            } else if x1 < xmin {
                x1 = xmin;
                y1 = (c - x1) / b;
            }
        } else {
            x0 = match vertex0 {
                Some(v) if v.coord.x > xmin => v.coord.x,
                _ => xmin,
            };
            if x0 > xmax {
                return;
            }
            y0 = c - a * x0;

            x1 = match vertex1 {
                Some(v) if v.coord.x < xmax => v.coord.x,
                _ => xmax,
            };
            if x1 < xmin {
                return;
            }
            y1 = c - a * x1;

            if (y0 > ymax && y1 > ymax) || (y0 < ymin && y1 < ymin) {
                return;
            }

            if y0 > ymax {
                y0 = ymax;
                x0 = (c - y0) / a;
            } else if y0 < ymin {
                y0 = ymin;
                x0 = (c - y0) / a;
            }

            if y1 > ymax {
                y1 = ymax;
                x1 = (c - y1) / a;
            } else if y1 < ymin {
                y1 = ymin;
                x1 = (c - y1) / a;
            }
        }

        let p0 = DVec2::new(x0, y0);
        let p1 = DVec2::new(x1, y1);
        self.clipped = Some(if left_first { [p0, p1] } else { [p1, p0] });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(index: usize, x: f64, y: f64) -> Site {
        Site { index, coord: DVec2::new(x, y), weight: 0.0 }
    }

    fn on_line(edge: &Edge, p: DVec2) -> bool {
        (edge.a * p.x + edge.b * p.y - edge.c).abs() < 1e-9
    }

    #[test]
    fn test_bisecting_horizontal_pair() {
        let edge = Edge::bisecting(&site(0, 0.0, 0.0), &site(1, 4.0, 0.0));
        assert_eq!((edge.a, edge.b, edge.c), (1.0, 0.0, 2.0));
        assert_eq!(edge.left_site, 0);
        assert_eq!(edge.right_site, 1);
    }

    #[test]
    fn test_bisecting_is_equidistant() {
        let s0 = site(0, 1.0, 2.0);
        let s1 = site(1, 3.0, 7.0);
        let edge = Edge::bisecting(&s0, &s1);
        assert_eq!(edge.b, 1.0);

        let mid = (s0.coord + s1.coord) * 0.5;
        assert!(on_line(&edge, mid));
        let x = 10.0;
        let p = DVec2::new(x, (edge.c - edge.a * x) / edge.b);
        assert!((p.distance(s0.coord) - p.distance(s1.coord)).abs() < 1e-9);
    }

    #[test]
    fn test_clip_open_line() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let mut edge = Edge::bisecting(&site(0, 3.0, 5.0), &site(1, 5.0, 5.0));
        edge.clip_vertices(&bounds);

        let [l, r] = edge.clipped.unwrap();
        assert!((l.x - 4.0).abs() < 1e-12 && (r.x - 4.0).abs() < 1e-12);
        let mut ys = [l.y, r.y];
        ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(ys, [0.0, 10.0]);
    }

    #[test]
    fn test_clip_miss() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let mut edge = Edge::bisecting(&site(0, 20.0, 5.0), &site(1, 30.0, 5.0));
        edge.clip_vertices(&bounds);
        assert!(!edge.is_visible());
        assert!(edge.voronoi_line().is_none());
    }

    #[test]
    fn test_clip_diagonal_to_border() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let mut edge = Edge::bisecting(&site(0, 0.0, 0.0), &site(1, 2.0, 2.0));
        edge.clip_vertices(&bounds);

        let [l, r] = edge.clipped.unwrap();
        assert!(on_line(&edge, l) && on_line(&edge, r));
        assert!(bounds.contains(l) && bounds.contains(r));
        // x + y = 2 crosses the square between (0, 2) and (2, 0)
        assert!((l.distance(r) - 8f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_clip_respects_vertex() {
        let bounds = Bounds::new(-10.0, -10.0, 20.0, 20.0);
        let mut edge = Edge::bisecting(&site(0, 0.0, 0.0), &site(1, 4.0, 0.0));
        edge.set_vertex(
            Side::Left,
            Vertex { index: 0, coord: DVec2::new(2.0, 1.5), sites: [0, 1, 2] },
        );
        edge.clip_vertices(&bounds);

        let segment = edge.voronoi_line().unwrap();
        let ends = [segment.p0, segment.p1];
        assert!(ends.contains(&DVec2::new(2.0, 1.5)));
        assert!(ends.contains(&DVec2::new(2.0, -10.0)));
        assert_eq!(edge.clipped_end(Side::Left), Some(DVec2::new(2.0, 1.5)));
        assert!(edge.is_part_of_convex_hull());
    }

    #[test]
    fn test_opposite_site() {
        let edge = Edge::bisecting(&site(3, 0.0, 0.0), &site(8, 1.0, 1.0));
        assert_eq!(edge.opposite_site(3), Some(8));
        assert_eq!(edge.opposite_site(8), Some(3));
        assert_eq!(edge.opposite_site(1), None);
    }
}
