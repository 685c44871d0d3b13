//! Projection of a compliance report onto a node/link graph.

mod builder;
mod types;

pub use builder::{EvidenceMatcher, GraphBuilder, SubstringMatcher, build_graph};
pub use types::{GraphData, GraphLink, GraphNode, NodeCategory, Relation};
