//! Table request parameters

use std::ops::BitOr;

use butterfly_common::Coordinate;
use serde::{Deserialize, Serialize};

use crate::constants::INVALID_FALLBACK_SPEED;
use crate::phantom::Bearing;

/// Bitmask of matrices the caller wants back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(u8);

impl Annotations {
    pub const NONE: Annotations = Annotations(0);
    pub const DURATION: Annotations = Annotations(0b001);
    pub const DISTANCE: Annotations = Annotations(0b010);
    pub const ENERGY_CONSUMPTION: Annotations = Annotations(0b100);
    pub const ALL: Annotations = Annotations(0b111);

    pub fn contains(self, other: Annotations) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl Default for Annotations {
    fn default() -> Self {
        Annotations::DURATION
    }
}

impl BitOr for Annotations {
    type Output = Annotations;

    fn bitor(self, rhs: Self) -> Self::Output {
        Annotations(self.0 | rhs.0)
    }
}

/// Which location the fallback distance estimate is measured between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackCoordinateType {
    #[default]
    Input,
    Snapped,
}

/// Many-to-many table request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableParameters {
    pub coordinates: Vec<Coordinate>,
    /// Indices into `coordinates`; empty means all
    pub sources: Vec<usize>,
    /// Indices into `coordinates`; empty means all
    pub destinations: Vec<usize>,
    /// Empty, or one per coordinate
    pub bearings: Vec<Option<Bearing>>,
    /// Snapping radius in meters per coordinate; empty, or one per coordinate
    pub radiuses: Vec<Option<f64>>,
    /// Road classes to avoid
    pub exclude: Vec<String>,
    pub annotations: Annotations,
    /// Meters per second used for unreachable cells, `INVALID_FALLBACK_SPEED` disables
    pub fallback_speed: f64,
    pub fallback_coordinate_type: FallbackCoordinateType,
    /// Duration multiplier, 1.0 disables
    pub scale_factor: f64,
}

impl Default for TableParameters {
    fn default() -> Self {
        Self {
            coordinates: Vec::new(),
            sources: Vec::new(),
            destinations: Vec::new(),
            bearings: Vec::new(),
            radiuses: Vec::new(),
            exclude: Vec::new(),
            annotations: Annotations::default(),
            fallback_speed: INVALID_FALLBACK_SPEED,
            fallback_coordinate_type: FallbackCoordinateType::default(),
            scale_factor: 1.0,
        }
    }
}

impl TableParameters {
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        Self {
            coordinates,
            ..Self::default()
        }
    }

    pub fn num_sources(&self) -> usize {
        if self.sources.is_empty() {
            self.coordinates.len()
        } else {
            self.sources.len()
        }
    }

    pub fn num_destinations(&self) -> usize {
        if self.destinations.is_empty() {
            self.coordinates.len()
        } else {
            self.destinations.len()
        }
    }

    /// Coordinate index behind a matrix row
    pub fn source_index(&self, row: usize) -> usize {
        self.sources.get(row).copied().unwrap_or(row)
    }

    /// Coordinate index behind a matrix column
    pub fn destination_index(&self, column: usize) -> usize {
        self.destinations.get(column).copied().unwrap_or(column)
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_speed != INVALID_FALLBACK_SPEED
    }

    pub fn scale_enabled(&self) -> bool {
        self.scale_factor > 0.0 && self.scale_factor != 1.0
    }

    /// Internal consistency of the request.
    ///
    /// Coordinate ranges and the bearings count are checked separately by
    /// the plugin so they can report their own messages.
    pub fn is_valid(&self) -> bool {
        let n = self.coordinates.len();

        // A table makes only sense with 2+ coordinates
        if n < 2 {
            return false;
        }
        if !self.radiuses.is_empty() && self.radiuses.len() != n {
            return false;
        }
        if !self.radiuses.iter().flatten().all(|r| r.is_finite() && *r >= 0.0) {
            return false;
        }
        if !self.bearings.iter().flatten().all(Bearing::is_valid) {
            return false;
        }
        if self.sources.len() > n || self.destinations.len() > n {
            return false;
        }
        if self.sources.iter().chain(&self.destinations).any(|&i| i >= n) {
            return false;
        }
        if self.fallback_speed.is_nan() || self.fallback_speed <= 0.0 {
            return false;
        }
        if self.scale_factor.is_nan() || self.scale_factor <= 0.0 {
            return false;
        }
        true
    }
}
