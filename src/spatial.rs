//! Nearest-site lookups
//!
//! With the `spatial-index` feature a kd-tree answers nearest-site queries;
//! without it [`nearest_linear`] scans every site.

#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;

use glam::DVec2;

/// KD-tree over site coordinates
///
/// Built once per diagram or relaxation step; answers nearest-site queries
/// in O(log n). Returned ids are positions in the slice the index was built
/// from.
///
/// # Example
///
/// ```
/// use fortune_voronoi::*;
///
/// # #[cfg(feature = "spatial-index")]
/// # {
/// let sites = vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0)];
///
/// let index = SpatialIndex::new(&sites);
/// assert_eq!(index.find_nearest(DVec2::new(8.0, 1.0)), 1);
/// # }
/// ```
#[cfg(feature = "spatial-index")]
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
    len: usize,
}

#[cfg(feature = "spatial-index")]
impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len).finish()
    }
}

#[cfg(feature = "spatial-index")]
impl SpatialIndex {
    /// Build an index over site coordinates
    ///
    /// # Arguments
    ///
    /// * `points` - Site coordinates; their positions become the ids
    ///   returned by [`SpatialIndex::find_nearest`]
    ///
    /// # Performance
    ///
    /// O(n log n) construction; the tree is immutable afterwards.
    pub fn new(points: &[DVec2]) -> Self {
        let coords: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&coords),
            len: points.len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Id of the point closest to `position`
    ///
    /// The index must not be empty.
    ///
    /// # Returns
    ///
    /// Position of the nearest point in the slice the index was built from
    ///
    /// # Performance
    ///
    /// O(log n) per query.
    pub fn find_nearest(&self, position: DVec2) -> usize {
        let query = [position.x, position.y];
        let result = self.tree.nearest_one::<SquaredEuclidean>(&query);
        result.item as usize
    }
}

/// Position of the point closest to `position`, by linear scan
///
/// Ties keep the lowest id. Returns `None` for an empty slice.
pub fn nearest_linear(points: &[DVec2], position: DVec2) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        let d = p.distance_squared(position);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Nearest-site lookup using whichever strategy is compiled in
#[derive(Debug, Clone)]
pub(crate) struct NearestSite<'a> {
    #[cfg_attr(feature = "spatial-index", allow(dead_code))]
    points: &'a [DVec2],
    #[cfg(feature = "spatial-index")]
    index: Option<SpatialIndex>,
}

impl<'a> NearestSite<'a> {
    pub fn new(points: &'a [DVec2]) -> Self {
        Self {
            points,
            #[cfg(feature = "spatial-index")]
            index: (!points.is_empty()).then(|| SpatialIndex::new(points)),
        }
    }

    pub fn find(&self, position: DVec2) -> Option<usize> {
        #[cfg(feature = "spatial-index")]
        {
            self.index.as_ref().map(|index| index.find_nearest(position))
        }
        #[cfg(not(feature = "spatial-index"))]
        {
            nearest_linear(self.points, position)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_sites() -> Vec<DVec2> {
        vec![
            DVec2::new(1.0, 1.0),
            DVec2::new(9.0, 1.0),
            DVec2::new(9.0, 9.0),
            DVec2::new(1.0, 9.0),
        ]
    }

    #[test]
    fn test_nearest_linear() {
        let sites = square_sites();
        assert_eq!(nearest_linear(&sites, DVec2::new(2.0, 3.0)), Some(0));
        assert_eq!(nearest_linear(&sites, DVec2::new(8.0, 7.0)), Some(2));
        assert_eq!(nearest_linear(&[], DVec2::ZERO), None);
    }

    #[test]
    fn test_nearest_site_matches_linear_scan() {
        let sites = square_sites();
        let lookup = NearestSite::new(&sites);
        for &(x, y) in &[(0.0, 0.0), (6.0, 2.0), (7.5, 8.0), (2.0, 6.5), (4.0, 9.0)] {
            let p = DVec2::new(x, y);
            assert_eq!(lookup.find(p), nearest_linear(&sites, p));
        }
        assert_eq!(NearestSite::new(&[]).find(DVec2::ZERO), None);
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_spatial_index_exact_match() {
        let sites = square_sites();
        let index = SpatialIndex::new(&sites);
        assert_eq!(index.len(), 4);
        for (i, &site) in sites.iter().enumerate() {
            assert_eq!(index.find_nearest(site), i);
        }
    }
}
