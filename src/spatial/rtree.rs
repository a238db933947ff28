//! R-tree broad phase for the collision force, using the rstar crate.
//!
//! Each node is indexed by the bounding box of its collision disc, so a
//! single envelope query returns every node that might overlap a given disc.

use rstar::{AABB, RTree, RTreeObject};

/// A collision disc in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Slot in the node store.
    pub index: usize,
    pub x: f32,
    pub y: f32,
    /// Effective radius plus half the collision padding.
    pub reach: f32,
}

impl Body {
    pub fn new(index: usize, x: f32, y: f32, reach: f32) -> Self {
        Self { index, x, y, reach }
    }
}

impl RTreeObject for Body {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.x - self.reach, self.y - self.reach],
            [self.x + self.reach, self.y + self.reach],
        )
    }
}

/// Spatial index of collision discs.
///
/// Rebuilt by bulk load before every relaxation pass; positions move every
/// pass so incremental updates would not pay off at tens of nodes.
#[derive(Default)]
pub struct CollisionIndex {
    tree: RTree<Body>,
}

impl CollisionIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Replace the contents with `bodies`.
    pub fn rebuild(&mut self, bodies: Vec<Body>) {
        self.tree = RTree::bulk_load(bodies);
    }

    /// Bodies whose envelope intersects the square around `(x, y)` with
    /// half-size `reach`. Includes the querying body itself if indexed.
    pub fn candidates(&self, x: f32, y: f32, reach: f32) -> impl Iterator<Item = &Body> {
        let envelope = AABB::from_corners([x - reach, y - reach], [x + reach, y + reach]);
        self.tree.locate_in_envelope_intersecting(&envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(index: &CollisionIndex, x: f32, y: f32, reach: f32) -> Vec<usize> {
        let mut found: Vec<usize> = index.candidates(x, y, reach).map(|b| b.index).collect();
        found.sort_unstable();
        found
    }

    #[test]
    fn test_candidates_overlapping_envelopes() {
        let mut index = CollisionIndex::new();
        index.rebuild(vec![
            Body::new(0, 0.0, 0.0, 10.0),
            Body::new(1, 15.0, 0.0, 10.0),
            Body::new(2, 100.0, 100.0, 10.0),
        ]);

        assert_eq!(indices(&index, 0.0, 0.0, 10.0), vec![0, 1]);
        assert_eq!(indices(&index, 100.0, 100.0, 5.0), vec![2]);
        assert!(indices(&index, 50.0, 50.0, 5.0).is_empty());
    }

    #[test]
    fn test_large_reach_sees_small_neighbor() {
        let mut index = CollisionIndex::new();
        index.rebuild(vec![Body::new(0, 0.0, 0.0, 2.0), Body::new(1, 40.0, 0.0, 2.0)]);

        // A big disc centered on node 0 must find node 1 through its own reach
        assert_eq!(indices(&index, 0.0, 0.0, 45.0), vec![0, 1]);
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut index = CollisionIndex::new();
        index.rebuild(vec![Body::new(0, 0.0, 0.0, 1.0)]);
        index.rebuild(vec![Body::new(5, 1.0, 1.0, 1.0), Body::new(6, 2.0, 2.0, 1.0)]);
        assert_eq!(indices(&index, 0.0, 0.0, 0.5), vec![5]);
        assert_eq!(indices(&index, 1.5, 1.5, 10.0), vec![5, 6]);
    }
}
