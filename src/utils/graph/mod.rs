//! Directed graphs over dense node indices.
//!
//! The control-flow graph is a [`DirectedGraph`] whose nodes are basic blocks and whose edges
//! carry the kind of transfer. Algorithms are written against the small traits in [`traits`]
//! so they only see the adjacency structure.

mod directed;
mod node;
mod traits;

pub(crate) mod algorithms;

pub use directed::DirectedGraph;
pub use node::NodeId;
pub use traits::{GraphBase, Predecessors, RootedGraph, Successors};
