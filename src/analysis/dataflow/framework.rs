//! The analysis interface driven by [`DataFlowSolver`](super::DataFlowSolver).

use crate::{
    analysis::{blocks::BasicBlock, dataflow::lattice::MeetSemiLattice},
    utils::graph::NodeId,
};

/// Direction in which facts propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From predecessors to successors; the entry receives the boundary value.
    Forward,

    /// From successors to predecessors; blocks without successors receive the boundary value.
    Backward,
}

/// One dataflow problem.
///
/// The solver speaks in terms of a block's *input* (the state on the side facts arrive
/// from) and *output* (the state it passes on). For a forward problem these are the block's
/// entry and exit states; for a backward problem they are swapped. [`AnalysisResults`] always
/// reports states in program order.
pub trait DataFlowAnalysis {
    /// The value domain.
    type Lattice: MeetSemiLattice;

    /// Propagation direction.
    const DIRECTION: Direction;

    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Input of the boundary blocks.
    fn boundary(&self) -> Self::Lattice;

    /// Input of a forward block that has no predecessors but is not the entry. Nothing flows
    /// into such a block, so this is the identity of [`MeetSemiLattice::meet`].
    fn unreached(&self) -> Self::Lattice;

    /// Output of `block` before its first visit.
    fn initial(&self, node: NodeId, block: &BasicBlock) -> Self::Lattice;

    /// Output of `block` given its input.
    fn transfer(&self, node: NodeId, block: &BasicBlock, input: &Self::Lattice) -> Self::Lattice;

    /// Confluence of neighbour outputs; `states` is never empty. Defaults to folding
    /// [`MeetSemiLattice::meet`].
    fn merge(&self, states: &[&Self::Lattice]) -> Self::Lattice {
        let mut merged = states[0].clone();
        for state in &states[1..] {
            merged = merged.meet(state);
        }
        merged
    }
}

/// Converged per-block states, indexed by block position and reported in program order.
///
/// Equality compares the states only, not the iteration count.
#[derive(Debug, Clone)]
pub struct AnalysisResults<L> {
    in_states: Vec<L>,
    out_states: Vec<L>,
    iterations: usize,
}

impl<L> AnalysisResults<L> {
    pub(crate) fn new(in_states: Vec<L>, out_states: Vec<L>, iterations: usize) -> Self {
        Self {
            in_states,
            out_states,
            iterations,
        }
    }

    /// State at the entry of `node`.
    #[must_use]
    pub fn in_state(&self, node: NodeId) -> Option<&L> {
        self.in_states.get(node.index())
    }

    /// State at the exit of `node`.
    #[must_use]
    pub fn out_state(&self, node: NodeId) -> Option<&L> {
        self.out_states.get(node.index())
    }

    /// Number of blocks covered.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.in_states.len()
    }

    /// Block visits the solver made before converging.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    pub(crate) fn into_states(self) -> (Vec<L>, Vec<L>) {
        (self.in_states, self.out_states)
    }
}

impl<L: PartialEq> PartialEq for AnalysisResults<L> {
    fn eq(&self, other: &Self) -> bool {
        self.in_states == other.in_states && self.out_states == other.out_states
    }
}
