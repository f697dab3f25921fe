//! Depth-first orders and reachability.
//!
//! All traversals are iterative and visit successors in adjacency order, so every order
//! computed here is a pure function of the graph's insertion order.

use crate::utils::{
    graph::{NodeId, Successors},
    BitSet,
};

#[derive(Clone, Copy)]
enum Visit {
    Enter,
    Exit,
}

/// Nodes reachable from `start`, in depth-first postorder.
///
/// Returns an empty vector if `start` is not a node of `graph`.
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let count = graph.node_count();
    if start.index() >= count {
        return Vec::new();
    }

    let mut seen = vec![false; count];
    let mut order = Vec::with_capacity(count);
    let mut stack = vec![(start, Visit::Enter)];

    while let Some((node, visit)) = stack.pop() {
        match visit {
            Visit::Enter => {
                if std::mem::replace(&mut seen[node.index()], true) {
                    continue;
                }
                stack.push((node, Visit::Exit));
                // reversed so the first successor is explored first
                let successors: Vec<NodeId> = graph.successors(node).collect();
                stack.extend(
                    successors
                        .into_iter()
                        .rev()
                        .filter(|s| !seen[s.index()])
                        .map(|s| (s, Visit::Enter)),
                );
            }
            Visit::Exit => order.push(node),
        }
    }

    order
}

/// Nodes reachable from `start`, in reverse postorder.
///
/// In an acyclic region every node appears after all of its predecessors.
pub fn reverse_postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut order = postorder(graph, start);
    order.reverse();
    order
}

/// The set of nodes reachable from `start`, including `start` itself.
pub fn reachable<G: Successors>(graph: &G, start: NodeId) -> BitSet {
    let mut seen = BitSet::new(graph.node_count());
    if start.index() >= graph.node_count() {
        return seen;
    }

    let mut stack = vec![start];
    seen.insert(start.index());
    while let Some(node) = stack.pop() {
        for succ in graph.successors(node) {
            if seen.insert(succ.index()) {
                stack.push(succ);
            }
        }
    }
    seen
}
