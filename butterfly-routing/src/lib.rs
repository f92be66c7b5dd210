//! Road routing core: edge-based graph records, route assembly and
//! many-to-many table requests.

pub mod algorithms;
pub mod config;
pub mod constants;
pub mod ebg;
pub mod error;
pub mod guidance;
pub mod matrix;
pub mod phantom;
pub mod spatial;

pub use algorithms::{ManyToManyTables, RoutingAlgorithms};
pub use config::EngineConfig;
pub use ebg::{EdgeBasedEdge, EdgeData};
pub use error::{Error, ErrorResponse, Result};
pub use guidance::{assemble_route, Route, RouteLeg};
pub use matrix::{TableApi, TableParameters, TablePlugin, TableResponse};
pub use phantom::{Bearing, PhantomCandidates, PhantomNode, PhantomResolver};
pub use spatial::{IndexedSegment, SpatialIndex};
