//! Adjacency-list directed graph.

use crate::{
    utils::graph::{
        node::NodeId,
        traits::{GraphBase, Predecessors, Successors},
    },
    Result,
};

#[derive(Debug, Clone)]
struct EdgeData<E> {
    source: NodeId,
    target: NodeId,
    data: E,
}

/// A directed graph with node payloads `N` and edge payloads `E`.
///
/// Nodes are numbered densely in insertion order. Each node keeps the indices of its outgoing
/// and incoming edges in insertion order, so successor and predecessor iteration is
/// deterministic.
///
/// # Examples
///
/// ```rust,ignore
/// let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
/// let a = graph.add_node("a");
/// let b = graph.add_node("b");
/// graph.add_edge(a, b, ())?;
/// assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![b]);
/// ```
#[derive(Debug, Clone)]
pub struct DirectedGraph<N, E> {
    nodes: Vec<N>,
    edges: Vec<EdgeData<E>>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl<N, E> Default for DirectedGraph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> DirectedGraph<N, E> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Creates an empty graph with room for `nodes` nodes.
    #[must_use]
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::new(),
            outgoing: Vec::with_capacity(nodes),
            incoming: Vec::with_capacity(nodes),
        }
    }

    /// Appends a node and returns its id.
    pub fn add_node(&mut self, data: N) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(data);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Adds an edge unless one from `source` to `target` already exists.
    ///
    /// Returns `true` if a new edge was inserted. An existing edge keeps its original payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if either endpoint is not a node of this graph.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, data: E) -> Result<bool> {
        if source.index() >= self.nodes.len() || target.index() >= self.nodes.len() {
            return Err(malformed_error!(
                "edge {} -> {} references a node outside a graph of {} nodes",
                source,
                target,
                self.nodes.len()
            ));
        }

        if self.has_edge(source, target) {
            return Ok(false);
        }

        let edge = self.edges.len();
        self.edges.push(EdgeData {
            source,
            target,
            data,
        });
        self.outgoing[source.index()].push(edge);
        self.incoming[target.index()].push(edge);
        Ok(true)
    }

    /// Returns `true` if an edge from `source` to `target` exists.
    #[must_use]
    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.outgoing
            .get(source.index())
            .is_some_and(|out| out.iter().any(|&e| self.edges[e].target == target))
    }

    /// Payload of a node.
    #[must_use]
    pub fn node(&self, node: NodeId) -> Option<&N> {
        self.nodes.get(node.index())
    }

    /// All nodes with their ids, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, data)| (NodeId::new(index), data))
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of `node` as `(target, payload)`.
    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = (NodeId, &E)> + '_ {
        self.outgoing
            .get(node.index())
            .into_iter()
            .flatten()
            .map(|&e| (self.edges[e].target, &self.edges[e].data))
    }

    /// Number of edges leaving `node`.
    #[must_use]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.outgoing.get(node.index()).map_or(0, Vec::len)
    }
}

impl<N, E> GraphBase for DirectedGraph<N, E> {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::new)
    }
}

impl<N, E> Successors for DirectedGraph<N, E> {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.outgoing
            .get(node.index())
            .into_iter()
            .flatten()
            .map(|&e| self.edges[e].target)
    }
}

impl<N, E> Predecessors for DirectedGraph<N, E> {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.incoming
            .get(node.index())
            .into_iter()
            .flatten()
            .map(|&e| self.edges[e].source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> (DirectedGraph<&'static str, u8>, [NodeId; 4]) {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        let d = graph.add_node("d");
        graph.add_edge(a, b, 1).unwrap();
        graph.add_edge(a, c, 2).unwrap();
        graph.add_edge(b, d, 3).unwrap();
        graph.add_edge(c, d, 4).unwrap();
        (graph, [a, b, c, d])
    }

    #[test]
    fn test_adjacency_in_insertion_order() {
        let (graph, [a, b, c, d]) = diamond();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![b, c]);
        assert_eq!(graph.predecessors(d).collect::<Vec<_>>(), vec![b, c]);
        assert_eq!(graph.predecessors(a).count(), 0);
        assert_eq!(graph.out_degree(d), 0);
        assert_eq!(graph.node(c), Some(&"c"));
    }

    #[test]
    fn test_duplicate_edge_keeps_first_payload() {
        let (mut graph, [a, b, _, _]) = diamond();
        assert!(!graph.add_edge(a, b, 9).unwrap());
        assert_eq!(graph.edge_count(), 4);
        let payloads: Vec<_> = graph.outgoing_edges(a).map(|(_, p)| *p).collect();
        assert_eq!(payloads, vec![1, 2]);
    }

    #[test]
    fn test_self_loop() {
        let mut graph: DirectedGraph<(), ()> = DirectedGraph::new();
        let a = graph.add_node(());
        assert!(graph.add_edge(a, a, ()).unwrap());
        assert!(graph.has_edge(a, a));
        assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![a]);
        assert_eq!(graph.predecessors(a).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_edge_to_missing_node_rejected() {
        let mut graph: DirectedGraph<(), ()> = DirectedGraph::new();
        let a = graph.add_node(());
        assert!(graph.add_edge(a, NodeId::new(5), ()).is_err());
        assert_eq!(graph.successors(NodeId::new(5)).count(), 0);
    }
}
