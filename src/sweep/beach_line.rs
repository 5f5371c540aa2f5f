//! Bucketed beach line
//!
//! The beach line is a doubly-linked list of half-edges ordered by their
//! current x position on the sweep front, stored as indices into the sweep's
//! half-edge arena. Two sentinel half-edges (no edge) bound the list. A hash
//! of x-buckets remembers recently visited half-edges so that locating the
//! arc above a new site starts close to the answer.

use glam::DVec2;

use super::HalfEdge;
use crate::edge::Edge;
use crate::geometry::Side;
use crate::site::Site;

pub(crate) struct BeachLine {
    hash: Vec<Option<usize>>,
    left_end: usize,
    right_end: usize,
    xmin: f64,
    deltax: f64,
}

impl BeachLine {
    /// Create an empty beach line spanning `[xmin, xmin + deltax]`
    ///
    /// Pushes the two sentinels into `halfedges`.
    pub fn new(xmin: f64, deltax: f64, sqrt_sites: usize, halfedges: &mut Vec<HalfEdge>) -> Self {
        let hash_size = (2 * sqrt_sites).max(2);

        let left_end = halfedges.len();
        let right_end = left_end + 1;
        halfedges.push(HalfEdge::sentinel(left_end, right_end));
        halfedges.push(HalfEdge::sentinel(left_end, right_end));

        let mut hash = vec![None; hash_size];
        hash[0] = Some(left_end);
        hash[hash_size - 1] = Some(right_end);

        Self { hash, left_end, right_end, xmin, deltax }
    }

    /// Link `new` immediately to the right of `left`
    pub fn insert(&self, left: usize, new: usize, halfedges: &mut [HalfEdge]) {
        let right = halfedges[left].right;
        halfedges[new].left = left;
        halfedges[new].right = right;
        halfedges[right].left = new;
        halfedges[left].right = new;
    }

    /// Unlink a half-edge; stale hash entries pointing at it are dropped lazily
    pub fn remove(&self, he: usize, halfedges: &mut [HalfEdge]) {
        let (left, right) = (halfedges[he].left, halfedges[he].right);
        halfedges[left].right = right;
        halfedges[right].left = left;
        halfedges[he].deleted = true;
    }

    /// The half-edge immediately to the left of `p` on the beach line
    pub fn left_neighbor(
        &mut self,
        p: DVec2,
        halfedges: &[HalfEdge],
        edges: &[Edge],
        sites: &[Site],
    ) -> usize {
        let bucket = self.bucket_for(p.x);

        let mut he = match self.hash_at(bucket, halfedges) {
            Some(he) => he,
            None => {
                // The sentinels occupy the first and last bucket, so this ends.
                let mut i = 1;
                loop {
                    if let Some(he) = self.hash_at(bucket - i, halfedges) {
                        break he;
                    }
                    if let Some(he) = self.hash_at(bucket + i, halfedges) {
                        break he;
                    }
                    i += 1;
                }
            }
        };

        if he == self.left_end || (he != self.right_end && is_left_of(&halfedges[he], p, edges, sites)) {
            loop {
                he = halfedges[he].right;
                if he == self.right_end || !is_left_of(&halfedges[he], p, edges, sites) {
                    break;
                }
            }
            he = halfedges[he].left;
        } else {
            loop {
                he = halfedges[he].left;
                if he == self.left_end || is_left_of(&halfedges[he], p, edges, sites) {
                    break;
                }
            }
        }

        if bucket > 0 && (bucket as usize) < self.hash.len() - 1 {
            self.hash[bucket as usize] = Some(he);
        }
        he
    }

    fn bucket_for(&self, x: f64) -> isize {
        let last = self.hash.len() as isize - 1;
        if self.deltax <= 0.0 {
            return 0;
        }
        let bucket = ((x - self.xmin) / self.deltax * self.hash.len() as f64) as isize;
        bucket.clamp(0, last)
    }

    fn hash_at(&mut self, bucket: isize, halfedges: &[HalfEdge]) -> Option<usize> {
        if bucket < 0 || bucket as usize >= self.hash.len() {
            return None;
        }
        let slot = &mut self.hash[bucket as usize];
        match *slot {
            Some(he) if halfedges[he].deleted => {
                *slot = None;
                None
            }
            other => other,
        }
    }
}

/// Whether `p` lies to the right of the breakpoint traced by `he`
fn is_left_of(he: &HalfEdge, p: DVec2, edges: &[Edge], sites: &[Site]) -> bool {
    let Some(edge) = he.edge.map(|e| &edges[e]) else {
        return false;
    };
    let top = sites[edge.right_site].coord;
    let right_of_site = p.x > top.x;

    if right_of_site && he.side == Side::Left {
        return true;
    }
    if !right_of_site && he.side == Side::Right {
        return false;
    }

    let above = if edge.a == 1.0 {
        let dyp = p.y - top.y;
        let dxp = p.x - top.x;
        let mut fast = false;
        let mut above;

        if (!right_of_site && edge.b < 0.0) || (right_of_site && edge.b >= 0.0) {
            above = dyp >= edge.b * dxp;
            fast = above;
        } else {
            above = p.x + p.y * edge.b > edge.c;
            if edge.b < 0.0 {
                above = !above;
            }
            if !above {
                fast = true;
            }
        }

        if !fast {
            let dxs = top.x - sites[edge.left_site].coord.x;
            above = edge.b * (dxp * dxp - dyp * dyp)
                < dxs * dyp * (1.0 + 2.0 * dxp / dxs + edge.b * edge.b);
            if edge.b < 0.0 {
                above = !above;
            }
        }
        above
    } else {
        let yl = edge.c - edge.a * p.x;
        let t1 = p.y - yl;
        let t2 = p.x - top.x;
        let t3 = yl - top.y;
        t1 * t1 > t2 * t2 + t3 * t3
    };

    match he.side {
        Side::Left => above,
        Side::Right => !above,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites(raw: &[(f64, f64)]) -> Vec<Site> {
        raw.iter()
            .enumerate()
            .map(|(index, &(x, y))| Site { index, coord: DVec2::new(x, y), weight: 0.0 })
            .collect()
    }

    #[test]
    fn test_empty_beach_line_returns_left_end() {
        let mut halfedges = Vec::new();
        let mut beach = BeachLine::new(0.0, 10.0, 2, &mut halfedges);
        let he = beach.left_neighbor(DVec2::new(5.0, 1.0), &halfedges, &[], &[]);
        assert_eq!(he, beach.left_end);
    }

    #[test]
    fn test_insert_and_remove_links() {
        let mut halfedges = Vec::new();
        let beach = BeachLine::new(0.0, 10.0, 2, &mut halfedges);
        let a = halfedges.len();
        halfedges.push(HalfEdge::new(Some(0), Side::Left));
        let b = halfedges.len();
        halfedges.push(HalfEdge::new(Some(0), Side::Right));

        beach.insert(beach.left_end, a, &mut halfedges);
        beach.insert(a, b, &mut halfedges);
        assert_eq!(halfedges[beach.left_end].right, a);
        assert_eq!(halfedges[a].right, b);
        assert_eq!(halfedges[b].right, beach.right_end);

        beach.remove(a, &mut halfedges);
        assert_eq!(halfedges[beach.left_end].right, b);
        assert_eq!(halfedges[b].left, beach.left_end);
        assert!(halfedges[a].deleted);
    }

    #[test]
    fn test_locates_arc_between_bisector_halves() {
        let sites = sites(&[(1.0, 5.0), (3.0, 5.0), (5.0, 5.0)]);
        let edges = vec![Edge::bisecting(&sites[0], &sites[1])];

        let mut halfedges = Vec::new();
        let mut beach = BeachLine::new(1.0, 4.0, 2, &mut halfedges);
        let left = halfedges.len();
        halfedges.push(HalfEdge::new(Some(0), Side::Left));
        let right = halfedges.len();
        halfedges.push(HalfEdge::new(Some(0), Side::Right));
        beach.insert(beach.left_end, left, &mut halfedges);
        beach.insert(left, right, &mut halfedges);

        // A site right of both sites on the same row falls in the arc of site 1
        let he = beach.left_neighbor(sites[2].coord, &halfedges, &edges, &sites);
        assert_eq!(he, left);

        // A site far to the left falls in the arc of site 0, left of both halves
        let he = beach.left_neighbor(DVec2::new(-5.0, 6.0), &halfedges, &edges, &sites);
        assert_eq!(he, beach.left_end);
    }
}
