//! Adjacency traits the graph algorithms are written against.
//!
//! - [`GraphBase`] - node count and node iteration
//! - [`Successors`] / [`Predecessors`] - forward and backward adjacency
//! - [`RootedGraph`] - a designated entry node

use crate::utils::graph::NodeId;

/// Node count and node enumeration.
pub trait GraphBase {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// All node ids in ascending index order.
    fn node_ids(&self) -> impl Iterator<Item = NodeId>;
}

/// Forward adjacency.
pub trait Successors: GraphBase {
    /// Targets of the edges leaving `node`, in insertion order.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Backward adjacency.
pub trait Predecessors: GraphBase {
    /// Sources of the edges entering `node`, in insertion order.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// A graph with a single entry node.
pub trait RootedGraph: Successors {
    /// The entry node every traversal starts from.
    fn entry(&self) -> NodeId;
}
