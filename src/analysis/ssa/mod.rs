//! Static Single Assignment (SSA) construction.
//!
//! Converts a function into a form where every variable is assigned exactly once and control
//! flow merges are represented by phi nodes. Construction follows Cytron et al.:
//!
//! 1. **Phi Placement**: insert phi nodes at the iterated dominance frontier of every
//!    variable's definition sites
//! 2. **Variable Renaming**: assign versions `<var>.<n>` walking the dominator tree
//!
//! # Architecture
//!
//! - [`PhiNode`] - Phi nodes with one incoming slot per predecessor, and their placement
//! - [`RenameStacks`] - Per-variable version stacks
//! - [`SsaBuilder`] - The construction driver
//!
//! # Parameters and undefined reads
//!
//! Function parameters count as definitions in the entry block and keep their source name
//! until reassigned. A read of a variable with no reaching definition is handled according to
//! [`crate::UseBeforeDefPolicy`]: passed through unchanged and counted in
//! [`SsaStats::undefined_uses`], or rejected.
//!
//! # Usage
//!
//! ```rust
//! use brilflow::{ssa::to_ssa, AnalysisConfig, Program};
//!
//! let program = Program::from_json_str(r#"{"functions": [{"name": "main", "instrs": [
//!     {"label": "entry"},
//!     {"dest": "c", "type": "bool", "op": "const", "value": true},
//!     {"op": "br", "args": ["c"], "labels": ["left", "right"]},
//!     {"label": "left"}, {"dest": "x", "type": "int", "op": "const", "value": 1},
//!     {"op": "jmp", "labels": ["merge"]},
//!     {"label": "right"}, {"dest": "x", "type": "int", "op": "const", "value": 2},
//!     {"op": "jmp", "labels": ["merge"]},
//!     {"label": "merge"}, {"op": "print", "args": ["x"]}
//! ]}]}"#)?;
//!
//! let ssa = to_ssa(&program.functions[0], &AnalysisConfig::default())?;
//! assert_eq!(ssa.stats.phis, 1);
//!
//! let phi = ssa.function.instrs.iter().find(|i| i.is_phi()).unwrap();
//! assert_eq!(phi.dest(), Some("x.1"));
//! assert_eq!(phi.args(), ["x.0", "x.2"]);
//! assert_eq!(phi.labels(), ["left", "right"]);
//! # Ok::<(), brilflow::Error>(())
//! ```
//!
//! # References
//!
//! - Cytron et al., "Efficiently Computing Static Single Assignment Form and the
//!   Control Dependence Graph", ACM TOPLAS 1991

mod builder;
mod phi;
mod stack;

pub use builder::SsaBuilder;
pub use phi::{PhiNode, PhiOperand};
pub use stack::RenameStacks;

use rayon::prelude::*;

use crate::{
    analysis::{cfg::ControlFlowGraph, dominators::DominatorAnalysis},
    ir::{Function, Program},
    AnalysisConfig, Result,
};

/// Counters describing one SSA conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SsaStats {
    /// Phi nodes emitted
    pub phis: usize,
    /// Instruction destinations given a fresh version
    pub renamed_definitions: usize,
    /// Reads left under their source name for lack of a reaching definition
    pub undefined_uses: usize,
}

impl SsaStats {
    /// Adds the counters of `other` to `self`.
    pub fn accumulate(&mut self, other: &SsaStats) {
        self.phis += other.phis;
        self.renamed_definitions += other.renamed_definitions;
        self.undefined_uses += other.undefined_uses;
    }
}

/// A function converted to SSA form.
#[derive(Debug, Clone)]
pub struct SsaOutput {
    /// The rewritten function; name, parameters and return type are unchanged
    pub function: Function,
    /// What the conversion did
    pub stats: SsaStats,
}

/// Converts one function to SSA form.
///
/// # Errors
///
/// Anything raised while building the CFG, computing dominators (including verification) or
/// running [`SsaBuilder::build`].
pub fn to_ssa(function: &Function, config: &AnalysisConfig) -> Result<SsaOutput> {
    let cfg = ControlFlowGraph::from_function(function)?;
    let dominance = DominatorAnalysis::compute(&cfg, config)?;
    let (instrs, stats) = SsaBuilder::build(&cfg, &dominance, config)?;

    log::debug!(
        "{}: {} phis, {} renamed definitions, {} undefined uses",
        function.name,
        stats.phis,
        stats.renamed_definitions,
        stats.undefined_uses
    );

    Ok(SsaOutput {
        function: Function {
            name: function.name.clone(),
            args: function.args.clone(),
            ty: function.ty.clone(),
            instrs,
        },
        stats,
    })
}

/// Converts every function of `program`, concurrently when [`AnalysisConfig::parallel`] is set.
///
/// # Errors
///
/// The first error raised by [`to_ssa`] in function order.
pub fn program_to_ssa(program: &Program, config: &AnalysisConfig) -> Result<Program> {
    program_to_ssa_with_stats(program, config).map(|(program, _)| program)
}

/// Like [`program_to_ssa`], also returning the summed [`SsaStats`].
///
/// # Errors
///
/// The first error raised by [`to_ssa`] in function order.
pub fn program_to_ssa_with_stats(
    program: &Program,
    config: &AnalysisConfig,
) -> Result<(Program, SsaStats)> {
    let outputs: Vec<Result<SsaOutput>> = if config.parallel {
        program
            .functions
            .par_iter()
            .map(|function| to_ssa(function, config))
            .collect()
    } else {
        program
            .functions
            .iter()
            .map(|function| to_ssa(function, config))
            .collect()
    };

    let mut functions = Vec::with_capacity(outputs.len());
    let mut total = SsaStats::default();
    for output in outputs {
        let output = output?;
        total.accumulate(&output.stats);
        functions.push(output.function);
    }

    Ok((Program { functions }, total))
}
