//! Kruskal spanning trees over segment sets
//!
//! Nodes are implied by segment endpoints; endpoints sharing a
//! [`CoordKey`](crate::geometry::CoordKey) are the same node.

use std::cmp::Ordering;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{CoordKey, LineSegment};

/// Which spanning tree [`kruskal`] extracts
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpanningTreeKind {
    /// Minimise the total segment length
    #[default]
    Minimum,
    /// Maximise the total segment length
    Maximum,
}

/// Disjoint sets of endpoint nodes, union by size with path compression
#[derive(Debug, Default)]
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn push(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.size.push(1);
        id
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`; the larger set absorbs the smaller and
    /// `a`'s set wins ties. Returns `false` if they were already joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (root, child) = if self.size[ra] >= self.size[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[child] = root;
        self.size[root] += self.size[child];
        true
    }
}

/// Spanning forest of the graph formed by `segments`
///
/// Each connected component contributes `nodes - 1` segments. Equal-length
/// segments are taken in reverse input order.
///
/// # Arguments
///
/// * `segments` - Graph edges; endpoints sharing a [`CoordKey`] are one node
/// * `kind` - Whether to keep the shortest or the longest segments
///
/// # Returns
///
/// The accepted segments in the order they joined the forest
///
/// # Performance
///
/// O(m log m) for the sort; the union-find with path compression and union
/// by size makes the merge pass near linear.
///
/// # Example
///
/// ```
/// use fortune_voronoi::*;
///
/// let a = DVec2::new(0.0, 0.0);
/// let b = DVec2::new(1.0, 0.0);
/// let c = DVec2::new(1.0, 2.0);
/// let triangle = [LineSegment::new(a, b), LineSegment::new(b, c), LineSegment::new(c, a)];
///
/// let tree = kruskal(&triangle, SpanningTreeKind::Minimum);
/// assert_eq!(tree, vec![LineSegment::new(a, b), LineSegment::new(b, c)]);
/// ```
pub fn kruskal(segments: &[LineSegment], kind: SpanningTreeKind) -> Vec<LineSegment> {
    let mut sorted = segments.to_vec();
    // Traversed from the back, so sort the opposite way round
    match kind {
        SpanningTreeKind::Minimum => sorted.sort_by(|a, b| compare_lengths(b, a)),
        SpanningTreeKind::Maximum => sorted.sort_by(compare_lengths),
    }

    let mut nodes: HashMap<CoordKey, usize> = HashMap::new();
    let mut sets = UnionFind::default();
    let mut tree = Vec::new();

    for segment in sorted.iter().rev() {
        let n0 = *nodes
            .entry(CoordKey::from(segment.p0))
            .or_insert_with(|| sets.push());
        let n1 = *nodes
            .entry(CoordKey::from(segment.p1))
            .or_insert_with(|| sets.push());

        if sets.union(n0, n1) {
            tree.push(*segment);
        }
    }

    tracing::debug!(
        kind = ?kind,
        segments = segments.len(),
        nodes = nodes.len(),
        tree = tree.len(),
        "spanning tree built"
    );

    tree
}

fn compare_lengths(a: &LineSegment, b: &LineSegment) -> Ordering {
    a.length().partial_cmp(&b.length()).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn complete_graph(points: &[DVec2]) -> Vec<LineSegment> {
        let mut segments = Vec::new();
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                segments.push(LineSegment::new(points[i], points[j]));
            }
        }
        segments
    }

    fn total(segments: &[LineSegment]) -> f64 {
        segments.iter().map(|s| s.length()).sum()
    }

    /// Best total length over all acyclic subsets with `size` segments
    fn brute_force(segments: &[LineSegment], size: usize, kind: SpanningTreeKind) -> f64 {
        let mut best: Option<f64> = None;
        for mask in 0u32..(1 << segments.len()) {
            if mask.count_ones() as usize != size {
                continue;
            }
            let chosen: Vec<LineSegment> = (0..segments.len())
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| segments[i])
                .collect();
            if kruskal(&chosen, kind).len() != size {
                continue; // has a cycle
            }
            let t = total(&chosen);
            best = Some(match (best, kind) {
                (None, _) => t,
                (Some(b), SpanningTreeKind::Minimum) => b.min(t),
                (Some(b), SpanningTreeKind::Maximum) => b.max(t),
            });
        }
        best.unwrap()
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let points: Vec<DVec2> = (0..5)
            .map(|_| DVec2::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)))
            .collect();
        let segments = complete_graph(&points);

        for kind in [SpanningTreeKind::Minimum, SpanningTreeKind::Maximum] {
            let tree = kruskal(&segments, kind);
            assert_eq!(tree.len(), 4);
            assert!((total(&tree) - brute_force(&segments, 4, kind)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_forest_size() {
        let p = |x: f64, y: f64| DVec2::new(x, y);
        // Two components: a triangle and a lone segment
        let segments = vec![
            LineSegment::new(p(0.0, 0.0), p(1.0, 0.0)),
            LineSegment::new(p(1.0, 0.0), p(0.0, 1.0)),
            LineSegment::new(p(0.0, 1.0), p(0.0, 0.0)),
            LineSegment::new(p(5.0, 5.0), p(6.0, 5.0)),
        ];

        // 5 distinct endpoints, 2 components
        let tree = kruskal(&segments, SpanningTreeKind::Minimum);
        assert_eq!(tree.len(), 3);
        assert!(tree.contains(&segments[3]));
        // The diagonal is the longest triangle side
        assert!(!tree.contains(&segments[1]));

        let tree = kruskal(&segments, SpanningTreeKind::Maximum);
        assert_eq!(tree.len(), 3);
        assert!(tree.contains(&segments[1]));
    }

    #[test]
    fn test_shared_endpoints_within_quantum() {
        let segments = vec![
            LineSegment::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0)),
            LineSegment::new(DVec2::new(1.0 + 1e-12, 0.0), DVec2::new(0.0, -0.0)),
        ];
        assert_eq!(kruskal(&segments, SpanningTreeKind::Minimum).len(), 1);
    }

    #[test]
    fn test_large_coordinates_are_separate_nodes() {
        let a = DVec2::new(1e10, 0.0);
        let b = DVec2::new(2e10, 0.0);
        let c = DVec2::new(3e10, 5e9);
        let segments = vec![LineSegment::new(a, b), LineSegment::new(b, c), LineSegment::new(c, a)];
        assert_eq!(kruskal(&segments, SpanningTreeKind::Minimum).len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(kruskal(&[], SpanningTreeKind::Maximum).is_empty());
        assert_eq!(SpanningTreeKind::default(), SpanningTreeKind::Minimum);
    }
}
