//! Dominance frontiers.

use crate::{
    analysis::{
        cfg::ControlFlowGraph,
        dominators::{sets::DominatorSets, tree::DominatorTree},
    },
    utils::{
        graph::{GraphBase, NodeId, Predecessors, Successors},
        BitSet,
    },
};

/// `DF[a]`: blocks `f` such that `a` dominates a predecessor of `f` but does not strictly
/// dominate `f`.
///
/// A block with a self-loop, or a loop header reached by its own back edge, is in its own
/// frontier. Unreachable blocks have empty frontiers and never appear in one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominanceFrontier {
    frontiers: Vec<BitSet>,
}

impl DominanceFrontier {
    /// Computes frontiers straight from the definition over dominator sets.
    ///
    /// For each `a`, every block `d` dominated by `a` (including `a`) contributes the
    /// successors of `d` that `a` does not strictly dominate.
    #[must_use]
    pub fn compute(cfg: &ControlFlowGraph, sets: &DominatorSets) -> Self {
        let count = cfg.block_count();
        let mut frontiers = vec![BitSet::new(count); count];

        for d in cfg.node_ids() {
            let Some(dominators_of_d) = sets.get(d) else {
                continue;
            };
            for a in dominators_of_d.iter().map(NodeId::new) {
                for s in cfg.successors(d) {
                    if sets.is_reachable(s) && !sets.strictly_dominates(a, s) {
                        frontiers[a.index()].insert(s.index());
                    }
                }
            }
        }

        Self { frontiers }
    }

    /// Computes the same frontiers by walking up the dominator tree from each predecessor of a
    /// block until reaching that block's immediate dominator.
    #[must_use]
    pub fn from_tree(cfg: &ControlFlowGraph, tree: &DominatorTree) -> Self {
        let count = cfg.block_count();
        let mut frontiers = vec![BitSet::new(count); count];

        for node in cfg.node_ids().filter(|&n| tree.contains(n)) {
            let stop = tree.immediate_dominator(node);
            for pred in cfg.predecessors(node).filter(|&p| tree.contains(p)) {
                let mut runner = Some(pred);
                while let Some(current) = runner {
                    if Some(current) == stop {
                        break;
                    }
                    frontiers[current.index()].insert(node.index());
                    runner = tree.immediate_dominator(current);
                }
            }
        }

        Self { frontiers }
    }

    /// Frontier of `node` as a block-index set.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&BitSet> {
        self.frontiers.get(node.index())
    }

    /// Frontier members of `node` in ascending block order.
    pub fn frontier(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(node)
            .into_iter()
            .flat_map(|set| set.iter().map(NodeId::new))
    }
}
