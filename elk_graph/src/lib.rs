//! In-memory model of a hierarchical layout graph: nodes nested in nodes,
//! ports on nodes, edges between nodes or ports, edge sections carrying the
//! routing, and labels on all of them.

mod element;
mod graph;
mod iter;

pub use element::*;
pub use graph::ElkGraph;
pub use iter::Elements;
