//! Phantom nodes: input coordinates snapped onto the road network

use butterfly_common::Coordinate;
use serde::{Deserialize, Serialize};

use crate::constants::NodeId;

/// Strongly connected component a segment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Component {
    pub id: u32,
    /// Small island cut off from the main network
    pub is_tiny: bool,
}

/// One snapped position on an edge-based node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhantomNode {
    pub node: NodeId,
    /// Coordinate as supplied by the caller
    pub input_location: Coordinate,
    /// Position on the segment
    pub location: Coordinate,
    /// Great-circle distance between the two, meters
    pub distance_m: f64,
    pub component: Component,
}

/// Non-empty set of equally good snaps for one input coordinate, closest first
#[derive(Debug, Clone, PartialEq)]
pub struct PhantomCandidates {
    candidates: Vec<PhantomNode>,
}

impl PhantomCandidates {
    /// `None` when the coordinate did not resolve
    pub fn new(candidates: Vec<PhantomNode>) -> Option<Self> {
        if candidates.is_empty() {
            None
        } else {
            Some(Self { candidates })
        }
    }

    pub fn nearest(&self) -> &PhantomNode {
        &self.candidates[0]
    }

    pub fn candidates(&self) -> &[PhantomNode] {
        &self.candidates
    }

    pub fn input_location(&self) -> Coordinate {
        self.nearest().input_location
    }

    pub fn snapped_location(&self) -> Coordinate {
        self.nearest().location
    }
}

/// Accepted travel direction at a coordinate: `bearing ± range` degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bearing {
    pub bearing: u16,
    pub range: u16,
}

impl Bearing {
    pub fn new(bearing: u16, range: u16) -> Self {
        Self { bearing, range }
    }

    pub fn is_valid(&self) -> bool {
        self.bearing <= 360 && self.range <= 180
    }

    /// True when a segment heading `segment_bearing` lies inside the window
    pub fn accepts(&self, segment_bearing: f64) -> bool {
        let diff = (segment_bearing - self.bearing as f64).rem_euclid(360.0);
        diff.min(360.0 - diff) <= self.range as f64
    }
}

/// Snapping collaborator.
///
/// `bearings` and `radiuses` are either empty or hold one entry per
/// coordinate. Returns one candidate list per coordinate, empty when the
/// coordinate could not be snapped.
pub trait PhantomResolver {
    fn resolve(
        &self,
        coordinates: &[Coordinate],
        bearings: &[Option<Bearing>],
        radiuses: &[Option<f64>],
    ) -> Vec<Vec<PhantomNode>>;
}

/// Keep queries off disconnected islands.
///
/// If every candidate sits in the same tiny component the caller is
/// clearly routing inside that island and nothing changes. Otherwise each
/// coordinate that has a candidate on the main network drops its tiny ones.
pub fn snap_phantom_nodes(phantoms: Vec<PhantomCandidates>) -> Vec<PhantomCandidates> {
    let every_phantom_is_tiny = phantoms
        .iter()
        .flat_map(|p| p.candidates())
        .all(|c| c.component.is_tiny);
    let first_component = phantoms.first().map(|p| p.nearest().component.id);
    let all_in_same_component = phantoms
        .iter()
        .flat_map(|p| p.candidates())
        .all(|c| Some(c.component.id) == first_component);

    if every_phantom_is_tiny && all_in_same_component {
        return phantoms;
    }

    phantoms
        .into_iter()
        .map(|mut p| {
            if p.candidates.iter().any(|c| !c.component.is_tiny) {
                p.candidates.retain(|c| !c.component.is_tiny);
            }
            p
        })
        .collect()
}
