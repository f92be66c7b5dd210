//! Compact edge-based edge record (28 bytes)
//!
//! One record per turn transition in the edge-based graph. Continental
//! graphs hold hundreds of millions of these, so the layout is pinned:
//! seven 4-byte words, with the duration and both direction flags sharing
//! the last word.
//!
//! Layout (little-endian words):
//!
//! | word | field                                   |
//! |------|-----------------------------------------|
//! | 0    | source                                  |
//! | 1    | target                                  |
//! | 2    | turn_id                                 |
//! | 3    | weight                                  |
//! | 4    | distance (f32 meters)                   |
//! | 5    | energy                                  |
//! | 6    | duration:30 \| forward:1 \| backward:1  |

use std::cmp::Ordering;

use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;

use crate::constants::{
    EdgeDistance, EdgeDuration, EdgeEnergyConsumption, EdgeWeight, NodeId, MAX_PACKED_DURATION,
};

const DURATION_MASK: u32 = MAX_PACKED_DURATION;
const FORWARD_BIT: u32 = 1 << 30;
const BACKWARD_BIT: u32 = 1 << 31;

/// Lists shorter than this are sorted on the calling thread
const PARALLEL_SORT_THRESHOLD: usize = 1 << 16;

/// Payload of an edge-based edge
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct EdgeData {
    /// Edge-based node (directed node-based edge) this turn leads onto
    pub turn_id: NodeId,
    pub weight: EdgeWeight,
    pub distance: EdgeDistance,
    pub energy: EdgeEnergyConsumption,
    packed: u32,
}

impl EdgeData {
    /// Durations above 2^30 - 1 saturate.
    pub fn new(
        turn_id: NodeId,
        weight: EdgeWeight,
        distance: EdgeDistance,
        duration: EdgeDuration,
        energy: EdgeEnergyConsumption,
        forward: bool,
        backward: bool,
    ) -> Self {
        let mut data = Self {
            turn_id,
            weight,
            distance,
            energy,
            packed: 0,
        };
        data.set_duration(duration);
        data.set_directions(forward, backward);
        data
    }

    pub fn duration(&self) -> EdgeDuration {
        self.packed & DURATION_MASK
    }

    pub fn set_duration(&mut self, duration: EdgeDuration) {
        self.packed = (self.packed & !DURATION_MASK) | duration.min(MAX_PACKED_DURATION);
    }

    pub fn forward(&self) -> bool {
        self.packed & FORWARD_BIT != 0
    }

    pub fn backward(&self) -> bool {
        self.packed & BACKWARD_BIT != 0
    }

    pub fn set_directions(&mut self, forward: bool, backward: bool) {
        self.packed &= DURATION_MASK;
        if forward {
            self.packed |= FORWARD_BIT;
        }
        if backward {
            self.packed |= BACKWARD_BIT;
        }
    }

    /// False only when the edge can be traversed both ways
    pub fn is_unidirectional(&self) -> bool {
        !self.forward() || !self.backward()
    }
}

/// Directed transition `source -> target` in the edge-based graph
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct EdgeBasedEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub data: EdgeData,
}

const _: () = assert!(
    std::mem::size_of::<EdgeBasedEdge>() == 28,
    "EdgeBasedEdge grew beyond 28 bytes; this multiplies graph memory"
);

impl EdgeBasedEdge {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: NodeId,
        target: NodeId,
        turn_id: NodeId,
        weight: EdgeWeight,
        duration: EdgeDuration,
        distance: EdgeDistance,
        energy: EdgeEnergyConsumption,
        forward: bool,
        backward: bool,
    ) -> Self {
        Self {
            source,
            target,
            data: EdgeData::new(turn_id, weight, distance, duration, energy, forward, backward),
        }
    }

    pub fn with_data(source: NodeId, target: NodeId, data: EdgeData) -> Self {
        Self { source, target, data }
    }

    /// Ordering key: `(source, target, weight, is_unidirectional)`.
    ///
    /// `false < true`, so among otherwise equal edges the bidirectional one
    /// comes first and survives deduplication.
    pub fn sort_key(&self) -> (NodeId, NodeId, EdgeWeight, bool) {
        (
            self.source,
            self.target,
            self.data.weight,
            self.data.is_unidirectional(),
        )
    }

    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    /// Raw bytes of a bulk edge slice (28 bytes per edge)
    pub fn as_bytes(edges: &[EdgeBasedEdge]) -> &[u8] {
        bytemuck::cast_slice(edges)
    }
}

/// Sort an edge list into canonical order
pub fn sort_edges(edges: &mut [EdgeBasedEdge]) {
    if edges.len() < PARALLEL_SORT_THRESHOLD {
        edges.sort_unstable_by(EdgeBasedEdge::canonical_cmp);
    } else {
        edges.par_sort_unstable_by(EdgeBasedEdge::canonical_cmp);
    }
}

/// Collapse parallel edges between the same pair of nodes.
///
/// Per `(source, target)` the cheapest forward edge and the cheapest
/// backward edge are kept. If they have equal weight they become a single
/// bidirectional edge, otherwise two one-way edges. Edges usable in neither
/// direction are dropped.
pub fn merge_parallel_edges(mut edges: Vec<EdgeBasedEdge>) -> Vec<EdgeBasedEdge> {
    let input_len = edges.len();
    sort_edges(&mut edges);

    let mut merged = Vec::with_capacity(edges.len());
    for group in edges.chunk_by(|a, b| a.source == b.source && a.target == b.target) {
        let forward = group.iter().find(|e| e.data.forward());
        let backward = group.iter().find(|e| e.data.backward());

        match (forward, backward) {
            (Some(fwd), Some(bwd)) if fwd.data.weight == bwd.data.weight => {
                let mut edge = *fwd;
                edge.data.set_directions(true, true);
                merged.push(edge);
            }
            (fwd, bwd) => {
                if let Some(fwd) = fwd {
                    let mut edge = *fwd;
                    edge.data.set_directions(true, false);
                    merged.push(edge);
                }
                if let Some(bwd) = bwd {
                    let mut edge = *bwd;
                    edge.data.set_directions(false, true);
                    merged.push(edge);
                }
            }
        }
    }

    tracing::debug!(
        input = input_len,
        output = merged.len(),
        "merged parallel edge-based edges"
    );
    merged
}
