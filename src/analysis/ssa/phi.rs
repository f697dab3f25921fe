//! Phi nodes under construction and their placement.
//!
//! A [`PhiNode`] is created with one incoming slot per CFG predecessor of its block. Renaming
//! fills each slot with the name reaching the end of that predecessor; slots that stay empty
//! (the variable is undefined along that edge) are dropped when the node is lowered back into
//! an [`Instruction::Phi`].

use crate::{
    analysis::{cfg::ControlFlowGraph, dominators::DominanceFrontier},
    ir::{Instruction, Type},
    utils::{
        graph::{NodeId, Predecessors},
        BitSet,
    },
    Error, Result,
};

/// One incoming edge of a phi node.
#[derive(Debug, Clone, PartialEq)]
pub struct PhiOperand {
    /// Predecessor block the value arrives from
    pub predecessor: NodeId,
    /// Renamed value live at the end of `predecessor`, once known
    pub value: Option<String>,
}

/// A phi node for one source variable at the head of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct PhiNode {
    variable: String,
    ty: Type,
    dest: String,
    operands: Vec<PhiOperand>,
}

impl PhiNode {
    /// Creates a phi for `variable` with an empty slot for every predecessor.
    #[must_use]
    pub fn new(
        variable: impl Into<String>,
        ty: Type,
        predecessors: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        let variable = variable.into();
        Self {
            dest: variable.clone(),
            variable,
            ty,
            operands: predecessors
                .into_iter()
                .map(|predecessor| PhiOperand {
                    predecessor,
                    value: None,
                })
                .collect(),
        }
    }

    /// The source variable this phi merges.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The destination; the source name until renaming assigns a version.
    #[must_use]
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// Sets the renamed destination.
    pub fn set_dest(&mut self, name: String) {
        self.dest = name;
    }

    /// All slots, filled or not, in predecessor order.
    #[must_use]
    pub fn operands(&self) -> &[PhiOperand] {
        &self.operands
    }

    /// Fills the slot of `predecessor`. Returns `false` if it has no slot.
    pub fn set_operand(&mut self, predecessor: NodeId, value: String) -> bool {
        match self
            .operands
            .iter_mut()
            .find(|operand| operand.predecessor == predecessor)
        {
            Some(operand) => {
                operand.value = Some(value);
                true
            }
            None => false,
        }
    }

    /// Lowers into an instruction, keeping only filled slots.
    #[must_use]
    pub fn to_instruction(&self, cfg: &ControlFlowGraph) -> Instruction {
        let (args, labels) = self
            .operands
            .iter()
            .filter_map(|operand| {
                operand
                    .value
                    .as_ref()
                    .map(|value| (value.clone(), cfg.block_name(operand.predecessor).to_string()))
            })
            .unzip();
        Instruction::Phi {
            dest: self.dest.clone(),
            ty: self.ty.clone(),
            args,
            labels,
        }
    }
}

/// Definition sites of one source variable.
#[derive(Debug, Clone)]
pub(crate) struct Definitions {
    pub(crate) variable: String,
    pub(crate) ty: Type,
    pub(crate) blocks: BitSet,
}

/// Places phi nodes at the iterated dominance frontier of every variable's definition sites.
///
/// Returns, per block, its phis in variable order. A phi is itself a definition, so every
/// block that receives one is processed as a further definition site of that variable.
///
/// # Errors
///
/// Returns [`Error::IterationLimit`] if more than `limit` worklist entries are processed.
pub(crate) fn place_phis(
    cfg: &ControlFlowGraph,
    frontier: &DominanceFrontier,
    definitions: &[Definitions],
    limit: usize,
) -> Result<Vec<Vec<PhiNode>>> {
    let mut phis: Vec<Vec<PhiNode>> = vec![Vec::new(); cfg.block_count()];
    let mut processed = 0usize;

    for def in definitions {
        let mut has_phi = BitSet::new(cfg.block_count());
        let mut queued = def.blocks.clone();
        let mut worklist: Vec<NodeId> = def.blocks.iter().map(NodeId::new).collect();

        while let Some(site) = worklist.pop() {
            processed += 1;
            if processed > limit {
                return Err(Error::IterationLimit {
                    analysis: "phi placement",
                    limit,
                });
            }

            for join in frontier.frontier(site) {
                if !has_phi.insert(join.index()) {
                    continue;
                }
                phis[join.index()].push(PhiNode::new(
                    def.variable.clone(),
                    def.ty.clone(),
                    cfg.predecessors(join),
                ));
                if queued.insert(join.index()) {
                    worklist.push(join);
                }
            }
        }
    }

    log::debug!(
        "{}: placed {} phi nodes for {} variables",
        cfg.function_name(),
        phis.iter().map(Vec::len).sum::<usize>(),
        definitions.len()
    );

    Ok(phis)
}
