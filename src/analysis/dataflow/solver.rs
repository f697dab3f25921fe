//! The worklist fixed-point engine.

use std::collections::VecDeque;

use crate::{
    analysis::{
        cfg::ControlFlowGraph,
        dataflow::framework::{AnalysisResults, DataFlowAnalysis, Direction},
    },
    utils::graph::{GraphBase, NodeId, Predecessors, Successors},
    Error, Result,
};

/// Solves one [`DataFlowAnalysis`] over one control-flow graph.
///
/// The worklist starts with every block: reverse postorder for forward problems, postorder
/// for backward ones, followed by unreachable blocks in layout order. A popped block merges
/// its neighbours' outputs into its input, applies the transfer function, and if its output
/// changed, queues the blocks that read that output.
///
/// The entry of a forward problem and the blocks without successors in a backward one take
/// the boundary value. Other forward blocks without predecessors are never entered, so they
/// take [`DataFlowAnalysis::unreached`].
///
/// # Examples
///
/// ```rust,ignore
/// let vars = VarTable::from_cfg(&cfg);
/// let results = DataFlowSolver::new(LiveVariables::new(&vars), 1_000).solve(&cfg)?;
/// let live_out = results.out_state(cfg.entry());
/// ```
pub struct DataFlowSolver<A: DataFlowAnalysis> {
    analysis: A,
    limit: usize,
    inputs: Vec<A::Lattice>,
    outputs: Vec<A::Lattice>,
    worklist: VecDeque<NodeId>,
    queued: Vec<bool>,
    iterations: usize,
}

impl<A: DataFlowAnalysis> DataFlowSolver<A> {
    /// Creates a solver that gives up after `limit` block visits.
    #[must_use]
    pub fn new(analysis: A, limit: usize) -> Self {
        Self {
            analysis,
            limit,
            inputs: Vec::new(),
            outputs: Vec::new(),
            worklist: VecDeque::new(),
            queued: Vec::new(),
            iterations: 0,
        }
    }

    /// Runs to a fixed point from the analysis' initial outputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IterationLimit`] if the visit bound is exceeded.
    pub fn solve(self, cfg: &ControlFlowGraph) -> Result<AnalysisResults<A::Lattice>> {
        let outputs = cfg
            .blocks()
            .map(|(node, block)| self.analysis.initial(node, block))
            .collect();
        self.run(cfg, outputs)
    }

    /// Runs to a fixed point starting from previously computed results.
    ///
    /// Seeding with a fixed point of the same analysis returns that fixed point unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IterationLimit`] if the visit bound is exceeded.
    pub fn solve_from(
        self,
        cfg: &ControlFlowGraph,
        previous: AnalysisResults<A::Lattice>,
    ) -> Result<AnalysisResults<A::Lattice>> {
        let (in_states, out_states) = previous.into_states();
        let outputs = match A::DIRECTION {
            Direction::Forward => out_states,
            Direction::Backward => in_states,
        };
        if outputs.len() != cfg.block_count() {
            return Err(malformed_error!(
                "seed covers {} blocks but the graph has {}",
                outputs.len(),
                cfg.block_count()
            ));
        }
        self.run(cfg, outputs)
    }

    fn run(
        mut self,
        cfg: &ControlFlowGraph,
        outputs: Vec<A::Lattice>,
    ) -> Result<AnalysisResults<A::Lattice>> {
        let count = cfg.block_count();
        self.inputs = vec![self.analysis.boundary(); count];
        self.outputs = outputs;
        self.queued = vec![false; count];

        let order = match A::DIRECTION {
            Direction::Forward => cfg.reverse_postorder(),
            Direction::Backward => cfg.postorder(),
        };
        for node in order.into_iter().chain(cfg.node_ids()) {
            self.enqueue(node);
        }

        while let Some(node) = self.worklist.pop_front() {
            self.queued[node.index()] = false;
            self.iterations += 1;
            if self.iterations > self.limit {
                return Err(Error::IterationLimit {
                    analysis: A::NAME,
                    limit: self.limit,
                });
            }

            if self.visit(cfg, node) {
                let dependents: Vec<NodeId> = match A::DIRECTION {
                    Direction::Forward => cfg.successors(node).collect(),
                    Direction::Backward => cfg.predecessors(node).collect(),
                };
                for dependent in dependents {
                    self.enqueue(dependent);
                }
            }
        }

        log::debug!(
            "{}: {} converged after {} block visits",
            cfg.function_name(),
            A::NAME,
            self.iterations
        );

        Ok(match A::DIRECTION {
            Direction::Forward => AnalysisResults::new(self.inputs, self.outputs, self.iterations),
            Direction::Backward => AnalysisResults::new(self.outputs, self.inputs, self.iterations),
        })
    }

    fn enqueue(&mut self, node: NodeId) {
        if !self.queued[node.index()] {
            self.queued[node.index()] = true;
            self.worklist.push_back(node);
        }
    }

    /// Recomputes input and output of `node`. Returns `true` if the output changed.
    fn visit(&mut self, cfg: &ControlFlowGraph, node: NodeId) -> bool {
        let Some(block) = cfg.block(node) else {
            return false;
        };

        let neighbours: Vec<NodeId> = match A::DIRECTION {
            Direction::Forward => cfg.predecessors(node).collect(),
            Direction::Backward => cfg.successors(node).collect(),
        };
        let boundary;
        let mut states: Vec<&A::Lattice> = neighbours
            .iter()
            .map(|n| &self.outputs[n.index()])
            .collect();

        let is_entry = A::DIRECTION == Direction::Forward && node == cfg.entry();
        if is_entry || (states.is_empty() && A::DIRECTION == Direction::Backward) {
            boundary = self.analysis.boundary();
            states.push(&boundary);
        } else if states.is_empty() {
            boundary = self.analysis.unreached();
            states.push(&boundary);
        }
        let input = self.analysis.merge(&states);

        let output = self.analysis.transfer(node, block, &input);
        self.inputs[node.index()] = input;

        if output == self.outputs[node.index()] {
            false
        } else {
            self.outputs[node.index()] = output;
            true
        }
    }
}
