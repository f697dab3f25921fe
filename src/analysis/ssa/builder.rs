//! SSA construction (Cytron et al.).
//!
//! Construction proceeds in three phases:
//!
//! 1. **Definition collection**: every variable's defining blocks; parameters define in the entry
//! 2. **Phi placement**: phis at the iterated dominance frontier of those blocks
//! 3. **Renaming**: a preorder walk of the dominator tree with per-variable version stacks
//!
//! The walk uses an explicit frame stack. Entering a block renames its phis and instructions
//! and fills its slot in every successor phi; the matching exit frame pops exactly the names
//! the block pushed. Blocks the tree walk never reaches are renamed afterwards, each as its own
//! root starting from the parameter baseline.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    analysis::{
        cfg::ControlFlowGraph,
        dominators::DominatorAnalysis,
        ssa::{
            phi::{place_phis, Definitions, PhiNode},
            stack::RenameStacks,
            SsaStats,
        },
    },
    ir::Instruction,
    utils::{
        graph::{GraphBase, NodeId, Successors},
        BitSet,
    },
    AnalysisConfig, Error, Result, UseBeforeDefPolicy,
};

enum Frame {
    Enter(NodeId),
    /// Source variables whose stacks grew while visiting the block
    Exit(Vec<String>),
}

/// Builder turning one function's CFG into SSA form.
pub struct SsaBuilder<'a> {
    cfg: &'a ControlFlowGraph,
    dominance: &'a DominatorAnalysis,
    config: &'a AnalysisConfig,
    phis: Vec<Vec<PhiNode>>,
    renamed: Vec<Vec<Instruction>>,
    stacks: RenameStacks,
    visited: BitSet,
    stats: SsaStats,
}

impl<'a> SsaBuilder<'a> {
    /// Builds the SSA instruction stream of `cfg`.
    ///
    /// Blocks are emitted in layout order as a label (omitted for synthetic blocks no phi
    /// refers to), then the block's phis, then its renamed instructions.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedIr`] if the function already contains phi nodes
    /// - [`Error::IterationLimit`] if phi placement exceeds its bound
    /// - [`Error::UseBeforeDefinition`] under [`UseBeforeDefPolicy::Reject`]
    /// - [`Error::InvariantViolation`] if a traversal leaves the version stacks unbalanced
    pub fn build(
        cfg: &'a ControlFlowGraph,
        dominance: &'a DominatorAnalysis,
        config: &'a AnalysisConfig,
    ) -> Result<(Vec<Instruction>, SsaStats)> {
        for (_, block) in cfg.blocks() {
            if block.instructions.iter().any(Instruction::is_phi) {
                return Err(Error::MalformedIr {
                    function: cfg.function_name().to_string(),
                    block: block.name.clone(),
                    message: "input is already in SSA form (contains phi nodes)".to_string(),
                });
            }
        }

        let definitions = collect_definitions(cfg);
        let limit = config.phi_insertions(cfg.block_count(), definitions.len());
        let phis = place_phis(cfg, dominance.frontier(), &definitions, limit)?;

        let stacks = RenameStacks::new(
            cfg.params().iter().map(|p| p.name.as_str()),
            variable_names(cfg),
        );

        let mut builder = Self {
            cfg,
            dominance,
            config,
            phis,
            renamed: vec![Vec::new(); cfg.block_count()],
            stacks,
            visited: BitSet::new(cfg.block_count()),
            stats: SsaStats::default(),
        };

        builder.rename_from(cfg.entry())?;
        for node in cfg.node_ids() {
            if !builder.visited.contains(node.index()) {
                log::debug!(
                    "{}: renaming unreachable block '{}' as its own root",
                    cfg.function_name(),
                    cfg.block_name(node)
                );
                builder.rename_from(node)?;
            }
        }

        Ok(builder.emit())
    }

    /// Renames every block dominated by `root` that has not been visited yet.
    fn rename_from(&mut self, root: NodeId) -> Result<()> {
        let baseline = self.stacks.depth();
        let mut frames = vec![Frame::Enter(root)];

        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Enter(node) => {
                    if !self.visited.insert(node.index()) {
                        continue;
                    }
                    let pushed = self.rename_block(node)?;
                    frames.push(Frame::Exit(pushed));
                    // reversed so the first child is entered first
                    for &child in self.dominance.tree().children(node).iter().rev() {
                        frames.push(Frame::Enter(child));
                    }
                }
                Frame::Exit(pushed) => {
                    for variable in pushed {
                        if !self.stacks.pop(&variable) {
                            return Err(self.violation(format!(
                                "version stack of '{variable}' emptied below its baseline"
                            )));
                        }
                    }
                }
            }
        }

        if self.stacks.depth() != baseline {
            return Err(self.violation(format!(
                "version stacks unbalanced after renaming from '{}': {} names before, {} after",
                self.cfg.block_name(root),
                baseline,
                self.stacks.depth()
            )));
        }
        Ok(())
    }

    /// Renames one block and fills its operand in successor phis.
    ///
    /// Returns the variables pushed, one entry per push.
    fn rename_block(&mut self, node: NodeId) -> Result<Vec<String>> {
        let cfg = self.cfg;
        let mut pushed = Vec::new();

        for phi in &mut self.phis[node.index()] {
            let name = self.stacks.push_fresh(phi.variable());
            phi.set_dest(name);
            pushed.push(phi.variable().to_string());
        }

        let Some(block) = cfg.block(node) else {
            return Ok(pushed);
        };

        let mut renamed = Vec::with_capacity(block.instructions.len());
        for original in &block.instructions {
            let mut instr = original.clone();

            for arg in instr.args_mut() {
                if let Some(current) = self.stacks.top(arg) {
                    *arg = current.to_string();
                    continue;
                }
                if self.config.use_before_def == UseBeforeDefPolicy::Reject {
                    return Err(Error::UseBeforeDefinition {
                        function: cfg.function_name().to_string(),
                        block: block.name.clone(),
                        variable: arg.clone(),
                    });
                }
                log::warn!(
                    "{}: '{}' read in block '{}' with no reaching definition",
                    cfg.function_name(),
                    arg,
                    block.name
                );
                self.stats.undefined_uses += 1;
            }

            if let Some(variable) = instr.dest().map(str::to_string) {
                instr.set_dest(self.stacks.push_fresh(&variable));
                pushed.push(variable);
                self.stats.renamed_definitions += 1;
            }
            renamed.push(instr);
        }
        self.renamed[node.index()] = renamed;

        for successor in cfg.successors(node) {
            for phi in &mut self.phis[successor.index()] {
                let value = self.stacks.top(phi.variable()).map(str::to_string);
                if let Some(value) = value {
                    phi.set_operand(node, value);
                }
            }
        }

        Ok(pushed)
    }

    fn emit(mut self) -> (Vec<Instruction>, SsaStats) {
        let cfg = self.cfg;
        let phis: Vec<Vec<Instruction>> = self
            .phis
            .iter()
            .map(|block| block.iter().map(|phi| phi.to_instruction(cfg)).collect())
            .collect();

        let named: FxHashSet<&str> = phis
            .iter()
            .flatten()
            .flat_map(Instruction::labels)
            .map(String::as_str)
            .collect();

        let mut instrs = Vec::new();
        for ((node, block), block_phis) in cfg.blocks().zip(phis.iter()) {
            if !block.synthetic || named.contains(block.name.as_str()) {
                instrs.push(Instruction::label(block.name.clone()));
            }
            instrs.extend(block_phis.iter().cloned());
            instrs.append(&mut self.renamed[node.index()]);
        }

        self.stats.phis = phis.iter().map(Vec::len).sum();
        (instrs, self.stats)
    }

    fn violation(&self, message: String) -> Error {
        Error::InvariantViolation {
            function: self.cfg.function_name().to_string(),
            message,
        }
    }
}

/// Defining blocks of every variable, in order of first definition. Parameters come first
/// and define in the entry block.
fn collect_definitions(cfg: &ControlFlowGraph) -> Vec<Definitions> {
    let count = cfg.block_count();
    let mut order: Vec<Definitions> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    let params = cfg
        .params()
        .iter()
        .map(|p| (cfg.entry(), p.name.as_str(), &p.ty));
    let dests = cfg.blocks().flat_map(|(node, block)| {
        block
            .instructions
            .iter()
            .filter_map(move |i| Some((node, i.dest()?, i.ty()?)))
    });

    for (node, variable, ty) in params.chain(dests) {
        let slot = *index.entry(variable.to_string()).or_insert_with(|| {
            order.push(Definitions {
                variable: variable.to_string(),
                ty: ty.clone(),
                blocks: BitSet::new(count),
            });
            order.len() - 1
        });
        order[slot].blocks.insert(node.index());
    }

    order
}

/// Every variable name mentioned by the function.
fn variable_names(cfg: &ControlFlowGraph) -> Vec<String> {
    let params = cfg.params().iter().map(|p| p.name.clone());
    let used = cfg.blocks().flat_map(|(_, block)| {
        block
            .instructions
            .iter()
            .flat_map(|i| i.dest().into_iter().chain(i.args().iter().map(String::as_str)))
            .map(str::to_string)
    });
    params.chain(used).collect()
}
