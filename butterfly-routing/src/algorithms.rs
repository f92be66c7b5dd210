//! Search collaborator interface
//!
//! Implemented once per search backend (bucket CH, multi-level Dijkstra, ...).
//! The matrix plugin only talks to this trait.

use crate::constants::{EdgeDistance, EdgeDuration, EdgeEnergyConsumption};
use crate::error::{Error, Result};
use crate::matrix::params::TableParameters;
use crate::phantom::{PhantomCandidates, PhantomResolver};

/// Row-major `sources × destinations` matrices.
///
/// Each matrix is either fully populated or empty (not computed).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManyToManyTables {
    pub durations: Vec<EdgeDuration>,
    pub distances: Vec<EdgeDistance>,
    pub energy: Vec<EdgeEnergyConsumption>,
}

pub trait RoutingAlgorithms {
    /// Read-only view of the loaded graph
    type Facade: PhantomResolver;

    fn has_many_to_many_search(&self) -> bool;

    /// Empty `sources`/`destinations` mean every phantom.
    fn many_to_many_search(
        &self,
        phantoms: &[PhantomCandidates],
        sources: &[usize],
        destinations: &[usize],
        calculate_distance: bool,
    ) -> ManyToManyTables;

    fn facade(&self) -> &Self::Facade;

    /// Whether this backend can route with road classes excluded at all
    fn has_exclude_flags(&self) -> bool {
        false
    }

    /// Whether a graph exists for this particular set of excluded classes
    fn supports_exclude(&self, exclude: &[String]) -> bool {
        exclude.is_empty()
    }

    /// Backend-specific compatibility check, run after generic validation
    fn check_parameters(&self, params: &TableParameters) -> Result<()> {
        if self.supports_exclude(&params.exclude) {
            return Ok(());
        }
        if !self.has_exclude_flags() {
            return Err(Error::NotImplemented(
                "This algorithm does not support exclude flags.".to_string(),
            ));
        }
        Err(Error::InvalidValue(
            "Exclude flag combination is not supported.".to_string(),
        ))
    }
}
