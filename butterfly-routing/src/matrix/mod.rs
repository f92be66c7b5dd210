//! Many-to-many duration/distance/energy matrices
//!
//! The plugin validates a request, snaps its coordinates, hands the phantoms
//! to the search backend and patches the returned matrices:
//!
//! - **Fallback**: unreachable cells get a straight-line estimate at the
//!   requested speed and are reported as estimated.
//! - **Scaling**: durations are multiplied by the scale factor, clamped
//!   just below the unreachable sentinel.

pub mod params;
pub mod plugin;
pub mod postprocess;
pub mod response;

pub use params::{Annotations, FallbackCoordinateType, TableParameters};
pub use plugin::{TablePlugin, TableResult};
pub use postprocess::{fallback_duration, postprocess_tables, scale_duration, TableCellRef};
pub use response::{TableApi, TableFormatter, TableResponse, Waypoint};
