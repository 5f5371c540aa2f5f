//! Circle-event priority queue
//!
//! Half-edges with a pending circle event are kept in y-buckets, each bucket a
//! singly-linked list sorted by `(ystar, vertex.x)`. A half-edge is queued
//! exactly when its `vertex` is set.

use glam::DVec2;

use super::HalfEdge;

pub(crate) struct EventQueue {
    heads: Vec<Option<usize>>,
    count: usize,
    min_bucket: usize,
    ymin: f64,
    deltay: f64,
}

impl EventQueue {
    pub fn new(ymin: f64, deltay: f64, sqrt_sites: usize) -> Self {
        let hash_size = (4 * sqrt_sites).max(1);
        Self {
            heads: vec![None; hash_size],
            count: 0,
            min_bucket: 0,
            ymin,
            deltay,
        }
    }

    /// Queue a half-edge whose `vertex` and `ystar` are already set
    pub fn insert(&mut self, he: usize, halfedges: &mut [HalfEdge]) {
        let bucket = self.bucket(halfedges[he].ystar);
        if bucket < self.min_bucket {
            self.min_bucket = bucket;
        }

        let ystar = halfedges[he].ystar;
        let vx = vertex_x(&halfedges[he]);

        let mut previous: Option<usize> = None;
        let mut next = self.heads[bucket];
        while let Some(n) = next {
            let ny = halfedges[n].ystar;
            if ystar > ny || (ystar == ny && vx > vertex_x(&halfedges[n])) {
                previous = Some(n);
                next = halfedges[n].next_in_queue;
            } else {
                break;
            }
        }

        halfedges[he].next_in_queue = next;
        match previous {
            Some(p) => halfedges[p].next_in_queue = Some(he),
            None => self.heads[bucket] = Some(he),
        }
        self.count += 1;
    }

    /// Drop a half-edge's pending event, if any, and clear its vertex candidate
    pub fn remove(&mut self, he: usize, halfedges: &mut [HalfEdge]) {
        if halfedges[he].vertex.is_none() {
            return;
        }
        let bucket = self.bucket(halfedges[he].ystar);
        let after = halfedges[he].next_in_queue;

        let found = if self.heads[bucket] == Some(he) {
            self.heads[bucket] = after;
            true
        } else {
            let mut cursor = self.heads[bucket];
            let mut found = false;
            while let Some(c) = cursor {
                if halfedges[c].next_in_queue == Some(he) {
                    halfedges[c].next_in_queue = after;
                    found = true;
                    break;
                }
                cursor = halfedges[c].next_in_queue;
            }
            found
        };

        if found {
            self.count -= 1;
        }
        halfedges[he].vertex = None;
        halfedges[he].next_in_queue = None;
    }

    /// `(vertex.x, ystar)` of the earliest pending event
    pub fn min(&mut self, halfedges: &[HalfEdge]) -> Option<DVec2> {
        let he = self.min_half_edge()?;
        Some(DVec2::new(vertex_x(&halfedges[he]), halfedges[he].ystar))
    }

    /// Pop the earliest event, returning the half-edge and its vertex
    ///
    /// The half-edge's `vertex` is taken, leaving it unqueued.
    pub fn extract_min(&mut self, halfedges: &mut [HalfEdge]) -> Option<(usize, DVec2)> {
        let he = self.min_half_edge()?;
        self.heads[self.min_bucket] = halfedges[he].next_in_queue;
        self.count -= 1;
        halfedges[he].next_in_queue = None;
        let vertex = halfedges[he].vertex.take()?;
        Some((he, vertex))
    }

    fn min_half_edge(&mut self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let last = self.heads.len() - 1;
        while self.min_bucket < last && self.heads[self.min_bucket].is_none() {
            self.min_bucket += 1;
        }
        self.heads[self.min_bucket]
    }

    fn bucket(&self, ystar: f64) -> usize {
        if self.deltay <= 0.0 {
            return 0;
        }
        let last = self.heads.len() as isize - 1;
        let bucket = ((ystar - self.ymin) / self.deltay * self.heads.len() as f64) as isize;
        bucket.clamp(0, last) as usize
    }
}

fn vertex_x(he: &HalfEdge) -> f64 {
    he.vertex.map_or(f64::NAN, |v| v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Side;

    fn queued(halfedges: &mut Vec<HalfEdge>, x: f64, ystar: f64) -> usize {
        let mut he = HalfEdge::new(Some(0), Side::Left);
        he.vertex = Some(DVec2::new(x, ystar - 1.0));
        he.ystar = ystar;
        halfedges.push(he);
        halfedges.len() - 1
    }

    #[test]
    fn test_extracts_in_priority_order() {
        let mut halfedges = Vec::new();
        let mut queue = EventQueue::new(0.0, 10.0, 2);
        let a = queued(&mut halfedges, 1.0, 7.0);
        let b = queued(&mut halfedges, 2.0, 1.5);
        let c = queued(&mut halfedges, 0.5, 7.0);
        let d = queued(&mut halfedges, 9.0, 20.0);
        for he in [a, b, c, d] {
            queue.insert(he, &mut halfedges);
        }

        assert_eq!(queue.min(&halfedges), Some(DVec2::new(2.0, 1.5)));
        let order: Vec<usize> = std::iter::from_fn(|| queue.extract_min(&mut halfedges).map(|(he, _)| he))
            .collect();
        assert_eq!(order, vec![b, c, a, d]);
        assert!(queue.min(&halfedges).is_none());
    }

    #[test]
    fn test_remove_pending_event() {
        let mut halfedges = Vec::new();
        let mut queue = EventQueue::new(0.0, 10.0, 2);
        let a = queued(&mut halfedges, 1.0, 3.0);
        let b = queued(&mut halfedges, 1.0, 4.0);
        queue.insert(a, &mut halfedges);
        queue.insert(b, &mut halfedges);

        queue.remove(a, &mut halfedges);
        assert!(halfedges[a].vertex.is_none());
        assert_eq!(queue.extract_min(&mut halfedges).map(|(he, _)| he), Some(b));
        assert!(queue.min(&halfedges).is_none());

        // Removing an unqueued half-edge is a no-op
        queue.remove(a, &mut halfedges);
        assert!(queue.min(&halfedges).is_none());
    }

    #[test]
    fn test_zero_height_range() {
        let mut halfedges = Vec::new();
        let mut queue = EventQueue::new(5.0, 0.0, 2);
        let a = queued(&mut halfedges, 0.0, 8.0);
        let b = queued(&mut halfedges, 0.0, 6.0);
        queue.insert(a, &mut halfedges);
        queue.insert(b, &mut halfedges);
        assert_eq!(queue.extract_min(&mut halfedges).map(|(he, _)| he), Some(b));
        assert_eq!(queue.extract_min(&mut halfedges).map(|(he, _)| he), Some(a));
    }
}
