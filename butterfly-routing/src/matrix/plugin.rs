//! Table plugin: many-to-many matrix requests
//!
//! Validation runs in a fixed order and the first failure is returned.
//! Nothing expensive (snapping, search) happens before the request has
//! passed every cheap check, including the matrix size limit.

use crate::algorithms::{ManyToManyTables, RoutingAlgorithms};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::matrix::params::{Annotations, TableParameters};
use crate::matrix::postprocess::{postprocess_tables, TableCellRef};
use crate::matrix::response::TableFormatter;
use crate::phantom::{snap_phantom_nodes, PhantomCandidates, PhantomResolver};

/// Everything a formatter needs from a successful request
#[derive(Debug, Clone, PartialEq)]
pub struct TableResult {
    pub tables: ManyToManyTables,
    pub phantoms: Vec<PhantomCandidates>,
    /// Cells filled in by fallback estimation
    pub estimated_cells: Vec<TableCellRef>,
}

#[derive(Debug, Clone)]
pub struct TablePlugin {
    /// 0 disables the limit
    max_locations_distance_table: usize,
    default_radius: Option<f64>,
}

impl TablePlugin {
    pub fn new(max_locations_distance_table: usize, default_radius: Option<f64>) -> Self {
        Self {
            max_locations_distance_table,
            default_radius,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.max_locations_distance_table,
            config.default_snapping_radius,
        )
    }

    /// Validate, compute and format a table request
    pub fn handle_request<A, F>(
        &self,
        algorithms: &A,
        params: &TableParameters,
        formatter: &F,
    ) -> Result<F::Output>
    where
        A: RoutingAlgorithms,
        F: TableFormatter,
    {
        let result = self.compute(algorithms, params)?;
        Ok(formatter.make_response(
            &result.tables,
            &result.phantoms,
            &result.estimated_cells,
            params,
        ))
    }

    /// Validate and compute the matrices without formatting them
    pub fn compute<A: RoutingAlgorithms>(
        &self,
        algorithms: &A,
        params: &TableParameters,
    ) -> Result<TableResult> {
        if !algorithms.has_many_to_many_search() {
            return Err(Error::NotImplemented(
                "Many to many search is not implemented for the chosen search algorithm."
                    .to_string(),
            ));
        }

        if !params.is_valid() {
            return Err(Error::InvalidOptions(
                "Table parameters are invalid".to_string(),
            ));
        }

        if !params.coordinates.iter().all(|c| c.is_valid()) {
            return Err(Error::InvalidOptions("Coordinates are invalid".to_string()));
        }

        if !params.bearings.is_empty() && params.bearings.len() != params.coordinates.len() {
            return Err(Error::InvalidOptions(
                "Number of bearings does not match number of coordinates".to_string(),
            ));
        }

        // Empty sources or destinations means the caller wants all of them
        let num_sources = params.num_sources();
        let num_destinations = params.num_destinations();

        if self.exceeds_size_limit(num_sources, num_destinations) {
            return Err(Error::TooBig("Too many table coordinates".to_string()));
        }

        algorithms.check_parameters(params)?;

        tracing::debug!(
            coordinates = params.coordinates.len(),
            num_sources,
            num_destinations,
            annotations = params.annotations.bits(),
            "table request"
        );

        let phantoms = self.resolve_phantoms(algorithms.facade(), params)?;
        let phantoms = snap_phantom_nodes(phantoms);

        let request_distance = params.annotations.contains(Annotations::DISTANCE);
        let mut tables = algorithms.many_to_many_search(
            &phantoms,
            &params.sources,
            &params.destinations,
            request_distance,
        );

        let missing_table = (params.annotations.contains(Annotations::DURATION)
            && tables.durations.is_empty())
            || (request_distance && tables.distances.is_empty())
            || (params.annotations.contains(Annotations::ENERGY_CONSUMPTION)
                && tables.energy.is_empty());
        if missing_table {
            return Err(Error::NoTable("No table found".to_string()));
        }

        let estimated_cells = postprocess_tables(&mut tables, &phantoms, params);

        Ok(TableResult {
            tables,
            phantoms,
            estimated_cells,
        })
    }

    fn exceeds_size_limit(&self, num_sources: usize, num_destinations: usize) -> bool {
        let max = self.max_locations_distance_table;
        max > 0 && num_sources.saturating_mul(num_destinations) > max.saturating_mul(max)
    }

    /// Snap every coordinate, failing with the positions that did not snap
    fn resolve_phantoms<R: PhantomResolver>(
        &self,
        resolver: &R,
        params: &TableParameters,
    ) -> Result<Vec<PhantomCandidates>> {
        let radiuses: Vec<Option<f64>> = (0..params.coordinates.len())
            .map(|i| {
                params
                    .radiuses
                    .get(i)
                    .copied()
                    .flatten()
                    .or(self.default_radius)
            })
            .collect();

        let mut resolved = resolver
            .resolve(&params.coordinates, &params.bearings, &radiuses)
            .into_iter();

        let mut phantoms = Vec::with_capacity(params.coordinates.len());
        let mut missing = Vec::new();
        for index in 0..params.coordinates.len() {
            match resolved.next().and_then(PhantomCandidates::new) {
                Some(candidates) => phantoms.push(candidates),
                None => missing.push(index),
            }
        }

        if missing.is_empty() {
            Ok(phantoms)
        } else {
            Err(Error::NoSegment(missing_segment_message(&missing)))
        }
    }
}

fn missing_segment_message(missing: &[usize]) -> String {
    let indices = missing
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if missing.len() == 1 {
        format!("Could not find a matching segment for coordinate {indices}")
    } else {
        format!("Could not find a matching segment for coordinates {indices}")
    }
}
