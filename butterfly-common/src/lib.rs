//! Common utilities for the butterfly-osm toolkit

pub mod coordinate;
pub mod error;

pub use coordinate::{great_circle_distance, parse_coordinates, Coordinate};
pub use error::{Error, Result};
