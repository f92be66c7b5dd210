//! Route summary assembled from its legs

use serde::Serialize;

/// One leg between two consecutive waypoints
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RouteLeg {
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub weight: f64,
    pub energy_consumption: f64,
}

/// Whole-route totals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Route {
    pub distance: f64,
    pub duration: f64,
    pub weight: f64,
    pub energy_consumption: f64,
}

/// Sum every leg into a route summary. No legs gives an all-zero route.
pub fn assemble_route(legs: &[RouteLeg]) -> Route {
    legs.iter().fold(Route::default(), |route, leg| Route {
        distance: route.distance + leg.distance,
        duration: route.duration + leg.duration,
        weight: route.weight + leg.weight,
        energy_consumption: route.energy_consumption + leg.energy_consumption,
    })
}
