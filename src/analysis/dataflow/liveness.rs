//! Live variables.
//!
//! A variable is live at a point if some path from that point reads it before any write.

use crate::{
    analysis::{
        blocks::BasicBlock,
        dataflow::{
            framework::{DataFlowAnalysis, Direction},
            varset::{VarSet, VarTable},
        },
    },
    utils::graph::NodeId,
};

/// Backward may-analysis, merged by union over successors.
///
/// The transfer walks the block from its last instruction to its first, removing each
/// destination from the live set and then adding each argument, so `x = add x y` keeps `x`
/// live on entry.
pub struct LiveVariables<'a> {
    vars: &'a VarTable,
}

impl<'a> LiveVariables<'a> {
    /// Creates the analysis over the names in `vars`.
    #[must_use]
    pub fn new(vars: &'a VarTable) -> Self {
        Self { vars }
    }
}

impl DataFlowAnalysis for LiveVariables<'_> {
    type Lattice = VarSet;
    const DIRECTION: Direction = Direction::Backward;
    const NAME: &'static str = "live variables";

    fn boundary(&self) -> VarSet {
        self.vars.empty_set()
    }

    fn unreached(&self) -> VarSet {
        self.vars.empty_set()
    }

    fn initial(&self, _node: NodeId, _block: &BasicBlock) -> VarSet {
        self.vars.empty_set()
    }

    fn transfer(&self, _node: NodeId, block: &BasicBlock, live_out: &VarSet) -> VarSet {
        let mut live = live_out.clone();
        for instr in block.instructions.iter().rev() {
            if let Some(id) = instr.dest().and_then(|d| self.vars.get(d)) {
                live.remove(id);
            }
            for id in instr.args().iter().filter_map(|a| self.vars.get(a)) {
                live.insert(id);
            }
        }
        live
    }
}
