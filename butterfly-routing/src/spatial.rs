//! Spatial index for snapping coordinates to edge-based nodes

use butterfly_common::{great_circle_distance, Coordinate};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::constants::NodeId;
use crate::phantom::{Bearing, Component, PhantomNode, PhantomResolver};

/// Nearest points inspected per coordinate before giving up
const MAX_CANDIDATES_PER_QUERY: usize = 100;

/// Representative point of an edge-based node
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedSegment {
    pub coords: [f64; 2], // [lon, lat]
    pub node: NodeId,
    /// Direction of travel, degrees clockwise from north
    pub bearing: f64,
    pub component: Component,
}

impl IndexedSegment {
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.coords[0], self.coords[1])
    }
}

// Segments are indexed as points in raw degree space. The tree only
// orders candidates; metric distances come from `great_circle_distance`.
impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords)
    }
}

impl PointDistance for IndexedSegment {
    /// Squared planar distance in degrees
    fn distance_2(&self, query: &[f64; 2]) -> f64 {
        let [lon, lat] = self.coords;
        (lon - query[0]).powi(2) + (lat - query[1]).powi(2)
    }

    fn contains_point(&self, query: &[f64; 2]) -> bool {
        self.coords == *query
    }
}

/// R-tree over edge-based node points
pub struct SpatialIndex {
    tree: RTree<IndexedSegment>,
}

impl SpatialIndex {
    pub fn build(segments: Vec<IndexedSegment>) -> Self {
        Self {
            tree: RTree::bulk_load(segments),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Closest accepted segment plus any others at the same location
    pub fn nearest_candidates(
        &self,
        coordinate: Coordinate,
        bearing: Option<Bearing>,
        radius: Option<f64>,
    ) -> Vec<PhantomNode> {
        let query = coordinate.to_lon_lat();
        let mut nearest: Option<(f64, [f64; 2])> = None;
        let mut candidates = Vec::new();

        for point in self
            .tree
            .nearest_neighbor_iter(&query)
            .take(MAX_CANDIDATES_PER_QUERY)
        {
            let d2 = point.distance_2(&query);
            if let Some((best_d2, _)) = nearest {
                if d2 > best_d2 {
                    break;
                }
            }

            if bearing.is_some_and(|b| !b.accepts(point.bearing)) {
                continue;
            }

            let location = point.location();
            let distance_m = great_circle_distance(coordinate, location);
            // Degree-space order is not metric order, so keep scanning
            if radius.is_some_and(|r| distance_m > r) {
                continue;
            }

            match nearest {
                Some((_, coords)) if coords != point.coords => continue,
                Some(_) => {}
                None => nearest = Some((d2, point.coords)),
            }

            candidates.push(PhantomNode {
                node: point.node,
                input_location: coordinate,
                location,
                distance_m,
                component: point.component,
            });
        }

        candidates
    }
}

impl PhantomResolver for SpatialIndex {
    fn resolve(
        &self,
        coordinates: &[Coordinate],
        bearings: &[Option<Bearing>],
        radiuses: &[Option<f64>],
    ) -> Vec<Vec<PhantomNode>> {
        coordinates
            .iter()
            .enumerate()
            .map(|(i, &coordinate)| {
                let bearing = bearings.get(i).copied().flatten();
                let radius = radiuses.get(i).copied().flatten();
                let candidates = self.nearest_candidates(coordinate, bearing, radius);
                tracing::trace!(index = i, candidates = candidates.len(), "snapped coordinate");
                candidates
            })
            .collect()
    }
}
