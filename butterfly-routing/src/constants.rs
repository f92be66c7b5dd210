//! Shared numeric aliases and sentinels
//!
//! Every "invalid"/"unreachable" marker used by the matrix core lives here.

/// Edge-based node identifier (a directed road segment)
pub type NodeId = u32;
/// Search weight (profile-dependent cost)
pub type EdgeWeight = u32;
/// Duration in deciseconds
pub type EdgeDuration = u32;
/// Distance in meters
pub type EdgeDistance = f32;
/// Energy consumption in profile units (e.g. Wh)
pub type EdgeEnergyConsumption = u32;

pub const SPECIAL_NODEID: NodeId = u32::MAX;
pub const INVALID_EDGE_WEIGHT: EdgeWeight = u32::MAX;

/// Matrix sentinel: no path between source and destination
pub const MAXIMAL_EDGE_DURATION: EdgeDuration = u32::MAX;
pub const INVALID_EDGE_DISTANCE: EdgeDistance = f32::MAX;
pub const INVALID_EDGE_ENERGY: EdgeEnergyConsumption = u32::MAX;

/// Marks `fallback_speed` as disabled
pub const INVALID_FALLBACK_SPEED: f64 = f64::MAX;

/// Durations are stored in deciseconds
pub const DURATION_TICKS_PER_SECOND: f64 = 10.0;

/// Largest duration an edge record can hold (30 bits)
pub const MAX_PACKED_DURATION: EdgeDuration = (1 << 30) - 1;
