//! WGS84 coordinates and the great-circle distance primitive

use std::fmt;
use std::str::FromStr;

use geo::{algorithm::Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Fixed-point scale used by the on-disk formats (1e-7 degrees)
pub const COORDINATE_PRECISION: f64 = 1e7;

/// A longitude/latitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build from fixed-point values (1e-7 degrees)
    pub fn from_fixed(lon_fxp: i32, lat_fxp: i32) -> Self {
        Self {
            lon: lon_fxp as f64 / COORDINATE_PRECISION,
            lat: lat_fxp as f64 / COORDINATE_PRECISION,
        }
    }

    /// True when both components are finite and within WGS84 range
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// [lon, lat] array as used by the JSON responses
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(c: Coordinate) -> Self {
        Point::new(c.lon, c.lat)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

/// Parses "lon,lat"
impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| Error::InvalidInput(format!("coordinate '{s}' must be 'lon,lat'")))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::InvalidInput(format!("bad longitude in '{s}': {e}")))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::InvalidInput(format!("bad latitude in '{s}': {e}")))?;
        Ok(Self { lon, lat })
    }
}

/// Parse a semicolon-separated coordinate list: "lon,lat;lon,lat;..."
pub fn parse_coordinates(s: &str) -> crate::Result<Vec<Coordinate>> {
    s.split(';').map(str::parse).collect()
}

/// Great-circle (haversine) distance in meters
pub fn great_circle_distance(a: Coordinate, b: Coordinate) -> f64 {
    Haversine::distance(Point::from(a), Point::from(b))
}
