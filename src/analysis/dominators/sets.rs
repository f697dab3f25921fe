//! Dominator sets by iterative fixed point.

use crate::{
    analysis::cfg::ControlFlowGraph,
    utils::{
        graph::{NodeId, Predecessors},
        BitSet,
    },
    Error, Result,
};

/// The dominator set of every block, or `None` for blocks unreachable from the entry.
///
/// For a reachable block `b`: `b ∈ dom[b]`, `entry ∈ dom[b]`, and for `b ≠ entry`
/// `dom[b] = {b} ∪ ⋂ dom[p]` over the reachable predecessors `p` of `b`. Unreachable blocks
/// carry no set and are dominated by nothing; they also dominate nothing reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominatorSets {
    sets: Vec<Option<BitSet>>,
}

impl DominatorSets {
    /// Runs the fixed point over `cfg`.
    ///
    /// Every reachable non-entry block starts at the set of all reachable blocks and the entry
    /// at `{entry}`. Blocks are then revisited in reverse postorder until a full pass changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IterationLimit`] if more than `pass_limit` passes are needed.
    pub fn compute(cfg: &ControlFlowGraph, reachable: &BitSet, pass_limit: usize) -> Result<Self> {
        let count = cfg.block_count();
        let entry = cfg.entry();

        let mut sets: Vec<Option<BitSet>> = (0..count)
            .map(|index| reachable.contains(index).then(|| reachable.clone()))
            .collect();
        if count == 0 {
            return Ok(Self { sets });
        }
        sets[entry.index()] = Some(BitSet::from_indices(count, [entry.index()]));

        let order: Vec<NodeId> = cfg
            .reverse_postorder()
            .into_iter()
            .filter(|&node| node != entry)
            .collect();

        let mut passes = 0;
        loop {
            passes += 1;
            if passes > pass_limit {
                return Err(Error::IterationLimit {
                    analysis: "dominator sets",
                    limit: pass_limit,
                });
            }

            let mut changed = false;
            for &node in &order {
                let mut next: Option<BitSet> = None;
                for pred in cfg.predecessors(node) {
                    let Some(pred_set) = &sets[pred.index()] else {
                        continue;
                    };
                    match next.as_mut() {
                        Some(acc) => {
                            acc.intersect_with(pred_set);
                        }
                        None => next = Some(pred_set.clone()),
                    }
                }

                let mut next = next.unwrap_or_else(|| BitSet::new(count));
                next.insert(node.index());
                if sets[node.index()].as_ref() != Some(&next) {
                    sets[node.index()] = Some(next);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        log::debug!(
            "{}: dominator sets converged after {passes} passes",
            cfg.function_name()
        );
        Ok(Self { sets })
    }

    /// Number of blocks covered, reachable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` for a function without blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The dominator set of `node`, `None` if it is unreachable.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&BitSet> {
        self.sets.get(node.index()).and_then(Option::as_ref)
    }

    /// Returns `true` if `node` is reachable from the entry.
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    /// Returns `true` if `a` dominates `b`. Always `false` when `b` is unreachable.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        self.get(b).is_some_and(|set| a.index() < set.capacity() && set.contains(a.index()))
    }

    /// Returns `true` if `a` dominates `b` and `a != b`.
    #[must_use]
    pub fn strictly_dominates(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.dominates(a, b)
    }

    /// Dominators of `node` in ascending block order; empty for unreachable blocks.
    pub fn dominators(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(node).into_iter().flat_map(|set| set.iter().map(NodeId::new))
    }
}
