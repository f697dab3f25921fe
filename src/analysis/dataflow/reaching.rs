//! Reaching definitions at the granularity of variable names.
//!
//! A variable is *defined* at a point if some path from the entry to that point assigns it.
//! Function parameters are defined on entry.

use crate::{
    analysis::{
        blocks::BasicBlock,
        cfg::ControlFlowGraph,
        dataflow::{
            framework::{DataFlowAnalysis, Direction},
            varset::{VarSet, VarTable},
        },
    },
    utils::graph::NodeId,
};

/// Forward may-analysis: `out = in ∪ defs(block)`, merged by union over predecessors.
pub struct ReachingDefinitions {
    boundary: VarSet,
    empty: VarSet,
    defs: Vec<VarSet>,
}

impl ReachingDefinitions {
    /// Precomputes the definitions of every block of `cfg`.
    #[must_use]
    pub fn new(cfg: &ControlFlowGraph, vars: &VarTable) -> Self {
        let boundary = vars.set_of(cfg.params().iter().map(|p| p.name.as_str()));
        let defs = cfg
            .blocks()
            .map(|(_, block)| vars.set_of(block.definitions()))
            .collect();
        Self {
            boundary,
            empty: vars.empty_set(),
            defs,
        }
    }

    fn defs(&self, node: NodeId) -> Option<&VarSet> {
        self.defs.get(node.index())
    }
}

impl DataFlowAnalysis for ReachingDefinitions {
    type Lattice = VarSet;
    const DIRECTION: Direction = Direction::Forward;
    const NAME: &'static str = "reaching definitions";

    fn boundary(&self) -> VarSet {
        self.boundary.clone()
    }

    fn unreached(&self) -> VarSet {
        self.empty.clone()
    }

    fn initial(&self, node: NodeId, _block: &BasicBlock) -> VarSet {
        self.defs(node).cloned().unwrap_or_else(|| self.boundary.clone())
    }

    fn transfer(&self, node: NodeId, _block: &BasicBlock, input: &VarSet) -> VarSet {
        let mut output = input.clone();
        if let Some(defs) = self.defs(node) {
            output.union_with(defs);
        }
        output
    }
}
