//! Route assembly

pub mod route;

pub use route::{assemble_route, Route, RouteLeg};
