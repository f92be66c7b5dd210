//! Edge-Based Graph (EBG) records
//!
//! Nodes of the edge-based graph are directed road segments; its edges are
//! the turns between them.

pub mod edge;

pub use edge::{merge_parallel_edges, sort_edges, EdgeBasedEdge, EdgeData};
