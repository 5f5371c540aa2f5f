//! Fortune's plane sweep
//!
//! Sites are consumed bottom to top (ascending y, then x). The beach line
//! holds the breakpoints between parabolic arcs as half-edges; the event
//! queue holds the circle events at which an arc vanishes and a Voronoi
//! vertex is fixed. After the sweep every edge is clipped to the diagram
//! bounds.

mod beach_line;
mod event_queue;

use std::cmp::Ordering;
use std::time::Instant;

use glam::DVec2;

use crate::edge::{Edge, Vertex};
use crate::geometry::{compare_by_y_then_x, Bounds, Side};
use crate::site::{Site, SiteRegistry};

use beach_line::BeachLine;
use event_queue::EventQueue;

/// Determinants below this are treated as parallel bisectors
const PARALLEL_EPSILON: f64 = 1e-10;

/// One side of an edge as it travels along the beach line
///
/// Sentinels carry no edge. `left`/`right` link the beach line; `vertex`,
/// `ystar` and `next_in_queue` are only meaningful while a circle event is
/// pending for this half-edge.
#[derive(Debug, Clone)]
pub(crate) struct HalfEdge {
    edge: Option<usize>,
    side: Side,
    left: usize,
    right: usize,
    deleted: bool,
    vertex: Option<DVec2>,
    ystar: f64,
    next_in_queue: Option<usize>,
}

impl HalfEdge {
    fn new(edge: Option<usize>, side: Side) -> Self {
        Self {
            edge,
            side,
            left: usize::MAX,
            right: usize::MAX,
            deleted: false,
            vertex: None,
            ystar: 0.0,
            next_in_queue: None,
        }
    }

    fn sentinel(left: usize, right: usize) -> Self {
        Self { left, right, ..Self::new(None, Side::Left) }
    }
}

/// Raw sweep result: edges in creation order, vertices in fixing order
#[derive(Debug, Clone, Default)]
pub(crate) struct SweepOutput {
    pub edges: Vec<Edge>,
    pub vertices: Vec<Vertex>,
}

/// Run the sweep over every registered site and clip the edges to `bounds`
pub(crate) fn fortune(registry: &SiteRegistry, bounds: &Bounds) -> SweepOutput {
    let start = Instant::now();
    let order = registry.ordered_sequence();
    if order.len() < 2 {
        return SweepOutput::default();
    }

    let sites = registry.as_slice();
    let (xmin, xmax) = sites
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.coord.x), hi.max(s.coord.x))
        });
    let ymin = sites[order[0]].coord.y;
    let ymax = sites[order[order.len() - 1]].coord.y;
    let sqrt_sites = ((order.len() + 4) as f64).sqrt() as usize;

    let mut halfedges = Vec::with_capacity(4 * order.len());
    let beach = BeachLine::new(xmin, xmax - xmin, sqrt_sites, &mut halfedges);
    let mut sweep = Sweep {
        sites,
        bottom_most: order[0],
        halfedges,
        edges: Vec::with_capacity(3 * order.len()),
        vertices: Vec::with_capacity(2 * order.len()),
        beach,
        queue: EventQueue::new(ymin, ymax - ymin, sqrt_sites),
    };

    let mut next_site = order[1..].iter().copied().peekable();
    loop {
        let circle = sweep.queue.min(&sweep.halfedges);
        let site_first = match (next_site.peek(), circle) {
            (Some(&s), Some(c)) => compare_by_y_then_x(sites[s].coord, c) != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        if site_first {
            if let Some(s) = next_site.next() {
                sweep.site_event(s);
            }
        } else {
            sweep.circle_event();
        }
    }

    let Sweep { mut edges, vertices, .. } = sweep;
    for edge in &mut edges {
        edge.clip_vertices(bounds);
    }

    tracing::debug!(
        sites = order.len(),
        edges = edges.len(),
        vertices = vertices.len(),
        visible = edges.iter().filter(|e| e.is_visible()).count(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "sweep complete"
    );

    SweepOutput { edges, vertices }
}

struct Sweep<'a> {
    sites: &'a [Site],
    bottom_most: usize,
    halfedges: Vec<HalfEdge>,
    edges: Vec<Edge>,
    vertices: Vec<Vertex>,
    beach: BeachLine,
    queue: EventQueue,
}

impl Sweep<'_> {
    fn site_event(&mut self, site: usize) {
        let coord = self.sites[site].coord;
        let lbnd = self
            .beach
            .left_neighbor(coord, &self.halfedges, &self.edges, self.sites);
        let rbnd = self.halfedges[lbnd].right;
        let bottom = self.right_region(lbnd);

        let edge = self.push_edge(Edge::bisecting(&self.sites[bottom], &self.sites[site]));

        let left_half = self.push_half_edge(Some(edge), Side::Left);
        self.beach.insert(lbnd, left_half, &mut self.halfedges);
        // The arc being split can no longer vanish where it was scheduled to
        self.queue.remove(lbnd, &mut self.halfedges);
        if let Some(v) = self.intersect(lbnd, left_half) {
            self.schedule(lbnd, v, site);
        }

        let right_half = self.push_half_edge(Some(edge), Side::Right);
        self.beach.insert(left_half, right_half, &mut self.halfedges);
        if let Some(v) = self.intersect(right_half, rbnd) {
            self.schedule(right_half, v, site);
        }
    }

    fn circle_event(&mut self) {
        let Some((lbnd, coord)) = self.queue.extract_min(&mut self.halfedges) else {
            return;
        };
        let llbnd = self.halfedges[lbnd].left;
        let rbnd = self.halfedges[lbnd].right;
        let rrbnd = self.halfedges[rbnd].right;

        let mut bottom = self.left_region(lbnd);
        let middle = self.right_region(lbnd);
        let mut top = self.right_region(rbnd);

        let vertex = Vertex {
            index: self.vertices.len(),
            coord,
            sites: [bottom, middle, top],
        };
        self.vertices.push(vertex);
        self.end_edge(lbnd, vertex);
        self.end_edge(rbnd, vertex);

        self.beach.remove(lbnd, &mut self.halfedges);
        self.queue.remove(rbnd, &mut self.halfedges);
        self.beach.remove(rbnd, &mut self.halfedges);

        let mut side = Side::Left;
        if self.sites[bottom].coord.y > self.sites[top].coord.y {
            std::mem::swap(&mut bottom, &mut top);
            side = Side::Right;
        }

        let edge = self.push_edge(Edge::bisecting(&self.sites[bottom], &self.sites[top]));
        let bisector = self.push_half_edge(Some(edge), side);
        self.beach.insert(llbnd, bisector, &mut self.halfedges);
        self.edges[edge].set_vertex(side.other(), vertex);

        self.queue.remove(llbnd, &mut self.halfedges);
        if let Some(v) = self.intersect(llbnd, bisector) {
            self.schedule(llbnd, v, bottom);
        }
        if let Some(v) = self.intersect(bisector, rrbnd) {
            self.schedule(bisector, v, bottom);
        }
    }

    /// Where the breakpoints of two half-edges will meet, if they converge
    fn intersect(&self, he0: usize, he1: usize) -> Option<DVec2> {
        let edge0 = &self.edges[self.halfedges[he0].edge?];
        let edge1 = &self.edges[self.halfedges[he1].edge?];
        if edge0.right_site == edge1.right_site {
            return None;
        }

        let det = edge0.a * edge1.b - edge0.b * edge1.a;
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let x = (edge0.c * edge1.b - edge1.c * edge0.b) / det;
        let y = (edge1.c * edge0.a - edge0.c * edge1.a) / det;

        let r0 = self.sites[edge0.right_site].coord;
        let r1 = self.sites[edge1.right_site].coord;
        let (he, right) = if compare_by_y_then_x(r0, r1) == Ordering::Less {
            (he0, r0)
        } else {
            (he1, r1)
        };

        let right_of_site = x >= right.x;
        match (right_of_site, self.halfedges[he].side) {
            (true, Side::Left) | (false, Side::Right) => None,
            _ => Some(DVec2::new(x, y)),
        }
    }

    fn schedule(&mut self, he: usize, vertex: DVec2, site: usize) {
        let he_ref = &mut self.halfedges[he];
        he_ref.vertex = Some(vertex);
        he_ref.ystar = vertex.y + self.sites[site].coord.distance(vertex);
        self.queue.insert(he, &mut self.halfedges);
    }

    fn end_edge(&mut self, he: usize, vertex: Vertex) {
        let HalfEdge { edge, side, .. } = self.halfedges[he];
        if let Some(edge) = edge {
            self.edges[edge].set_vertex(side, vertex);
        }
    }

    /// Site whose arc lies left of the half-edge
    fn left_region(&self, he: usize) -> usize {
        let HalfEdge { edge, side, .. } = self.halfedges[he];
        edge.map_or(self.bottom_most, |e| self.edges[e].site(side))
    }

    /// Site whose arc lies right of the half-edge
    fn right_region(&self, he: usize) -> usize {
        let HalfEdge { edge, side, .. } = self.halfedges[he];
        edge.map_or(self.bottom_most, |e| self.edges[e].site(side.other()))
    }

    fn push_edge(&mut self, edge: Edge) -> usize {
        self.edges.push(edge);
        self.edges.len() - 1
    }

    fn push_half_edge(&mut self, edge: Option<usize>, side: Side) -> usize {
        self.halfedges.push(HalfEdge::new(edge, side));
        self.halfedges.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn run(raw: &[(f64, f64)], bounds: Bounds) -> (SiteRegistry, SweepOutput) {
        let points: Vec<DVec2> = raw.iter().map(|&(x, y)| DVec2::new(x, y)).collect();
        let registry = SiteRegistry::from_points(&points, None, 0).unwrap();
        let output = fortune(&registry, &bounds);
        (registry, output)
    }

    #[test]
    fn test_fewer_than_two_sites() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(run(&[], bounds).1.edges.is_empty());
        assert!(run(&[(5.0, 5.0)], bounds).1.edges.is_empty());
    }

    #[test]
    fn test_two_sites_single_edge() {
        let (_, out) = run(&[(3.0, 5.0), (5.0, 5.0)], Bounds::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(out.edges.len(), 1);
        assert!(out.vertices.is_empty());

        let segment = out.edges[0].voronoi_line().unwrap();
        assert!((segment.p0.x - 4.0).abs() < 1e-12 && (segment.p1.x - 4.0).abs() < 1e-12);
        assert!((segment.length() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_three_sites_one_vertex() {
        let (_, out) = run(
            &[(0.0, 0.0), (4.0, 0.0), (2.0, 4.0)],
            Bounds::new(-10.0, -10.0, 20.0, 20.0),
        );

        assert_eq!(out.vertices.len(), 1);
        let v = out.vertices[0].coord;
        assert!(v.distance(DVec2::new(2.0, 1.5)) < 1e-9);

        let mut sites = out.vertices[0].sites;
        sites.sort_unstable();
        assert_eq!(sites, [0, 1, 2]);

        assert_eq!(out.edges.len(), 3);
        for edge in &out.edges {
            assert!(edge.is_visible());
            let touches = [edge.left_vertex, edge.right_vertex]
                .iter()
                .flatten()
                .any(|vx| vx.index == 0);
            assert!(touches);
        }
    }

    #[test]
    fn test_collinear_sites_parallel_edges() {
        let (_, out) = run(
            &[(1.0, 5.0), (3.0, 5.0), (5.0, 5.0), (7.0, 5.0)],
            Bounds::new(0.0, 0.0, 10.0, 10.0),
        );

        assert!(out.vertices.is_empty());
        assert_eq!(out.edges.len(), 3);
        let mut xs: Vec<f64> = out
            .edges
            .iter()
            .map(|e| {
                let s = e.voronoi_line().unwrap();
                assert!((s.p0.x - s.p1.x).abs() < 1e-12);
                assert!((s.length() - 10.0).abs() < 1e-12);
                s.p0.x
            })
            .collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_cocircular_square() {
        let (_, out) = run(
            &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
            Bounds::new(-1.0, -1.0, 3.0, 3.0),
        );
        assert!(!out.vertices.is_empty());
        for v in &out.vertices {
            assert!(v.coord.distance(DVec2::new(0.5, 0.5)) < 1e-9);
        }
    }

    #[test]
    fn test_vertices_are_empty_circumcenters() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let raw: Vec<(f64, f64)> = (0..60)
            .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
            .collect();
        let (registry, out) = run(&raw, Bounds::new(0.0, 0.0, 100.0, 100.0));
        assert!(!out.vertices.is_empty());

        for v in &out.vertices {
            let [a, b, c] = v.sites.map(|i| registry.as_slice()[i].coord.distance(v.coord));
            assert!((a - b).abs() < 1e-6 && (a - c).abs() < 1e-6);

            for site in registry.iter() {
                assert!(site.coord.distance(v.coord) > a - 1e-6);
            }
        }
    }
}
