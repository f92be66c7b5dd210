//! Matrix postprocessing: fallback estimates and scale quantization
//!
//! Cells are independent of each other, so rows are processed in parallel
//! once the matrix is large enough to amortize the thread hand-off.

use butterfly_common::great_circle_distance;
use rayon::prelude::*;
use serde::Serialize;

use crate::algorithms::ManyToManyTables;
use crate::constants::{
    EdgeDistance, EdgeDuration, MAXIMAL_EDGE_DURATION,
};
use crate::matrix::params::{FallbackCoordinateType, TableParameters};
use crate::phantom::PhantomCandidates;

/// Matrices with fewer cells are processed on the calling thread
const PARALLEL_CELL_THRESHOLD: usize = 2500;

/// A `(row, column)` cell whose value was estimated rather than routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableCellRef {
    pub row: usize,
    pub column: usize,
}

impl TableCellRef {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Fallback cell value for `distance_m` at `speed_mps`: `distance / speed`,
/// truncated toward zero.
///
/// Never returns the unreachable sentinel.
pub fn fallback_duration(distance_m: f64, speed_mps: f64) -> EdgeDuration {
    let estimate = (distance_m / speed_mps).trunc();
    if estimate >= (MAXIMAL_EDGE_DURATION - 1) as f64 {
        MAXIMAL_EDGE_DURATION - 1
    } else {
        estimate as EdgeDuration
    }
}

/// Scale a routed duration, clamping below the unreachable sentinel.
///
/// Unreachable and zero cells pass through unchanged.
pub fn scale_duration(duration: EdgeDuration, scale_factor: f64) -> EdgeDuration {
    if duration == MAXIMAL_EDGE_DURATION || duration == 0 {
        return duration;
    }

    let limit = MAXIMAL_EDGE_DURATION / duration;
    if scale_factor >= limit as f64 {
        tracing::trace!(duration, scale_factor, "scaled duration clamped");
        return MAXIMAL_EDGE_DURATION - 1;
    }

    let scaled = (duration as f64 * scale_factor).round();
    if scaled >= (MAXIMAL_EDGE_DURATION - 1) as f64 {
        MAXIMAL_EDGE_DURATION - 1
    } else {
        scaled as EdgeDuration
    }
}

struct CellContext<'a> {
    params: &'a TableParameters,
    phantoms: &'a [PhantomCandidates],
    /// Set only when enabled and positive
    fallback_speed: Option<f64>,
    /// Set only when positive and not 1
    scale_factor: Option<f64>,
}

impl CellContext<'_> {
    fn distance_estimate(&self, row: usize, column: usize) -> f64 {
        let source = &self.phantoms[self.params.source_index(row)];
        let destination = &self.phantoms[self.params.destination_index(column)];
        match self.params.fallback_coordinate_type {
            FallbackCoordinateType::Input => {
                great_circle_distance(source.input_location(), destination.input_location())
            }
            FallbackCoordinateType::Snapped => {
                great_circle_distance(source.snapped_location(), destination.snapped_location())
            }
        }
    }

    fn process_row(
        &self,
        row: usize,
        durations: &mut [EdgeDuration],
        mut distances: Option<&mut [EdgeDistance]>,
    ) -> Vec<TableCellRef> {
        let mut estimated = Vec::new();

        for (column, duration) in durations.iter_mut().enumerate() {
            if let Some(speed) = self.fallback_speed {
                if *duration == MAXIMAL_EDGE_DURATION {
                    let estimate = self.distance_estimate(row, column);
                    *duration = fallback_duration(estimate, speed);
                    if let Some(distance) = distances
                        .as_deref_mut()
                        .and_then(|cells| cells.get_mut(column))
                    {
                        *distance = estimate as EdgeDistance;
                    }
                    estimated.push(TableCellRef::new(row, column));
                }
            }

            if let Some(factor) = self.scale_factor {
                *duration = scale_duration(*duration, factor);
            }
        }

        estimated
    }
}

/// Apply fallback estimation and duration scaling in place.
///
/// Returns the cells filled in by fallback estimation, in row-major order.
/// Does nothing unless the request enables a fallback speed or a scale
/// factor other than 1.
pub fn postprocess_tables(
    tables: &mut ManyToManyTables,
    phantoms: &[PhantomCandidates],
    params: &TableParameters,
) -> Vec<TableCellRef> {
    if !params.fallback_enabled() && params.scale_factor == 1.0 {
        return Vec::new();
    }

    let ctx = CellContext {
        params,
        phantoms,
        fallback_speed: (params.fallback_enabled() && params.fallback_speed > 0.0)
            .then_some(params.fallback_speed),
        scale_factor: params.scale_enabled().then_some(params.scale_factor),
    };

    let num_sources = params.num_sources();
    let num_destinations = params.num_destinations();
    if num_destinations == 0 {
        return Vec::new();
    }

    let durations = &mut tables.durations;
    let distances = &mut tables.distances;
    let cells = num_sources * num_destinations;

    let estimated: Vec<TableCellRef> = if cells < PARALLEL_CELL_THRESHOLD {
        let mut distance_rows = distances.chunks_mut(num_destinations);
        durations
            .chunks_mut(num_destinations)
            .take(num_sources)
            .enumerate()
            .flat_map(|(row, duration_row)| {
                ctx.process_row(row, duration_row, distance_rows.next())
            })
            .collect()
    } else if distances.is_empty() {
        durations
            .par_chunks_mut(num_destinations)
            .take(num_sources)
            .enumerate()
            .flat_map_iter(|(row, duration_row)| ctx.process_row(row, duration_row, None))
            .collect()
    } else {
        durations
            .par_chunks_mut(num_destinations)
            .zip(distances.par_chunks_mut(num_destinations))
            .take(num_sources)
            .enumerate()
            .flat_map_iter(|(row, (duration_row, distance_row))| {
                ctx.process_row(row, duration_row, Some(distance_row))
            })
            .collect()
    };

    tracing::debug!(
        num_sources,
        num_destinations,
        estimated = estimated.len(),
        "postprocessed table"
    );
    estimated
}
