//! Table response formatting

use serde::Serialize;

use crate::algorithms::ManyToManyTables;
use crate::constants::{
    NodeId, DURATION_TICKS_PER_SECOND, INVALID_EDGE_DISTANCE, INVALID_EDGE_ENERGY,
    MAXIMAL_EDGE_DURATION,
};
use crate::matrix::params::{Annotations, TableParameters};
use crate::matrix::postprocess::TableCellRef;
use crate::phantom::PhantomCandidates;

/// Turns computed matrices into the caller-facing representation
pub trait TableFormatter {
    type Output;

    fn make_response(
        &self,
        tables: &ManyToManyTables,
        phantoms: &[PhantomCandidates],
        estimated_cells: &[TableCellRef],
        params: &TableParameters,
    ) -> Self::Output;
}

/// Response for table computation (OSRM-compatible layout)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableResponse {
    /// Status code (always "Ok" on success)
    pub code: String,
    /// Row-major durations in seconds (null if unreachable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durations: Option<Vec<Vec<Option<f64>>>>,
    /// Row-major distances in meters (null if unreachable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distances: Option<Vec<Vec<Option<f64>>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_consumptions: Option<Vec<Vec<Option<f64>>>>,
    pub sources: Vec<Waypoint>,
    pub destinations: Vec<Waypoint>,
    /// `[row, column]` cells estimated from straight-line distance
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallback_speed_cells: Vec<[usize; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    /// Snapped location [lon, lat]
    pub location: [f64; 2],
    /// Meters between input and snapped location
    pub distance: f64,
    pub node: NodeId,
}

impl From<&PhantomCandidates> for Waypoint {
    fn from(phantom: &PhantomCandidates) -> Self {
        let nearest = phantom.nearest();
        Self {
            location: nearest.location.to_lon_lat(),
            distance: round_one_decimal(nearest.distance_m),
            node: nearest.node,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn to_rows<T: Copy>(
    values: &[T],
    num_destinations: usize,
    convert: impl Fn(T) -> Option<f64>,
) -> Vec<Vec<Option<f64>>> {
    if num_destinations == 0 {
        return Vec::new();
    }
    values
        .chunks(num_destinations)
        .map(|row| row.iter().map(|&v| convert(v)).collect())
        .collect()
}

/// Default JSON-shaped formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct TableApi;

impl TableFormatter for TableApi {
    type Output = TableResponse;

    fn make_response(
        &self,
        tables: &ManyToManyTables,
        phantoms: &[PhantomCandidates],
        estimated_cells: &[TableCellRef],
        params: &TableParameters,
    ) -> TableResponse {
        let num_destinations = params.num_destinations();
        let wants = |a: Annotations| params.annotations.contains(a);

        let durations = wants(Annotations::DURATION).then(|| {
            to_rows(&tables.durations, num_destinations, |d| {
                (d != MAXIMAL_EDGE_DURATION).then(|| d as f64 / DURATION_TICKS_PER_SECOND)
            })
        });
        let distances = wants(Annotations::DISTANCE).then(|| {
            to_rows(&tables.distances, num_destinations, |d| {
                (d != INVALID_EDGE_DISTANCE).then(|| round_one_decimal(d as f64))
            })
        });
        let energy_consumptions = wants(Annotations::ENERGY_CONSUMPTION).then(|| {
            to_rows(&tables.energy, num_destinations, |e| {
                (e != INVALID_EDGE_ENERGY).then_some(e as f64)
            })
        });

        let sources = (0..params.num_sources())
            .map(|row| Waypoint::from(&phantoms[params.source_index(row)]))
            .collect();
        let destinations = (0..num_destinations)
            .map(|column| Waypoint::from(&phantoms[params.destination_index(column)]))
            .collect();

        TableResponse {
            code: "Ok".to_string(),
            durations,
            distances,
            energy_consumptions,
            sources,
            destinations,
            fallback_speed_cells: estimated_cells
                .iter()
                .map(|cell| [cell.row, cell.column])
                .collect(),
        }
    }
}
