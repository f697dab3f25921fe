//! Dominance: dominator sets, the dominator tree, dominance frontiers and their verifier.
//!
//! Block `a` dominates block `b` when every path from the entry to `b` passes through `a`.
//! [`DominatorAnalysis::compute`] runs the whole pipeline for one function:
//!
//! 1. reachability from the entry
//! 2. the dominator-set fixed point ([`DominatorSets`])
//! 3. optional verification by ancestor walk ([`verify_dominators`])
//! 4. the immediate-dominator tree ([`DominatorTree`])
//! 5. the dominance frontiers ([`DominanceFrontier`])
//!
//! # Unreachable blocks
//!
//! Blocks with no path from the entry are flagged with a sentinel rather than given the
//! vacuous "dominated by every block" set: they have no dominator set, are absent from the
//! tree, have an empty frontier and never appear in another block's frontier.
//!
//! # Examples
//!
//! ```rust
//! use brilflow::{analysis::{cfg::ControlFlowGraph, dominators::DominatorAnalysis}, AnalysisConfig, Program};
//!
//! let program = Program::from_json_str(r#"{"functions": [{"name": "main", "instrs": [
//!     {"label": "entry"},
//!     {"dest": "c", "type": "bool", "op": "const", "value": true},
//!     {"op": "br", "args": ["c"], "labels": ["b1", "b2"]},
//!     {"label": "b1"}, {"op": "jmp", "labels": ["merge"]},
//!     {"label": "b2"}, {"op": "jmp", "labels": ["merge"]},
//!     {"label": "merge"}, {"op": "ret"}
//! ]}]}"#)?;
//!
//! let cfg = ControlFlowGraph::from_function(&program.functions[0])?;
//! let dom = DominatorAnalysis::compute(&cfg, &AnalysisConfig::default())?;
//!
//! let b1 = cfg.node_by_name("b1").unwrap();
//! let merge = cfg.node_by_name("merge").unwrap();
//! assert!(dom.dominates(cfg.entry(), merge));
//! assert!(!dom.dominates(b1, merge));
//! assert_eq!(dom.frontier().frontier(b1).collect::<Vec<_>>(), vec![merge]);
//! # Ok::<(), brilflow::Error>(())
//! ```

mod frontier;
mod sets;
mod tree;
mod verify;

pub use frontier::DominanceFrontier;
pub use sets::DominatorSets;
pub use tree::DominatorTree;
pub use verify::verify_dominators;

use crate::{analysis::cfg::ControlFlowGraph, utils::graph::NodeId, AnalysisConfig, Result};

/// Dominator sets, tree and frontiers of one function.
#[derive(Debug, Clone)]
pub struct DominatorAnalysis {
    sets: DominatorSets,
    tree: DominatorTree,
    frontier: DominanceFrontier,
}

impl DominatorAnalysis {
    /// Computes all dominance structures of `cfg`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::IterationLimit`] if the fixed point exceeds its pass bound
    /// - [`crate::Error::InvariantViolation`] if verification is enabled and fails
    pub fn compute(cfg: &ControlFlowGraph, config: &AnalysisConfig) -> Result<Self> {
        let reachable = cfg.reachable();
        let sets = DominatorSets::compute(
            cfg,
            &reachable,
            config.dominator_passes(cfg.block_count()),
        )?;

        if config.verify_dominators {
            verify_dominators(cfg, &sets)?;
        }

        let tree = DominatorTree::build(cfg, &sets);
        let frontier = DominanceFrontier::compute(cfg, &sets);

        log::debug!(
            "{}: {} of {} blocks reachable",
            cfg.function_name(),
            reachable.count(),
            cfg.block_count()
        );

        Ok(Self {
            sets,
            tree,
            frontier,
        })
    }

    /// Per-block dominator sets.
    #[must_use]
    pub fn sets(&self) -> &DominatorSets {
        &self.sets
    }

    /// The dominator tree.
    #[must_use]
    pub fn tree(&self) -> &DominatorTree {
        &self.tree
    }

    /// Per-block dominance frontiers.
    #[must_use]
    pub fn frontier(&self) -> &DominanceFrontier {
        &self.frontier
    }

    /// Returns `true` if `a` dominates `b`.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        self.sets.dominates(a, b)
    }

    /// Returns `true` if `node` is reachable from the entry.
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.sets.is_reachable(node)
    }
}
