//! Program analysis for Bril functions.
//!
//! Everything here works on one function at a time and builds on the generic graph
//! infrastructure in `utils::graph`.
//!
//! # Architecture
//!
//! The analysis module is organized into focused sub-modules, each depending only on the
//! ones listed before it:
//!
//! - [`blocks`] - Partitioning an instruction stream into basic blocks
//! - [`cfg`] - Control flow graph construction and natural loops
//! - [`dataflow`] - The worklist solver with reaching definitions and live variables
//! - [`dominators`] - Dominator sets, tree, frontiers and verification
//! - [`ssa`] - SSA construction
//!
//! # Usage
//!
//! ```rust
//! use brilflow::{analysis::{cfg::ControlFlowGraph, dominators::DominatorAnalysis}, AnalysisConfig, Function};
//!
//! let function = Function::new("empty", Vec::new());
//! let cfg = ControlFlowGraph::from_function(&function)?;
//! let dominance = DominatorAnalysis::compute(&cfg, &AnalysisConfig::default())?;
//!
//! assert_eq!(cfg.block_count(), 1);
//! assert_eq!(dominance.tree().preorder(), vec![cfg.entry()]);
//! # Ok::<(), brilflow::Error>(())
//! ```

pub mod blocks;
pub mod cfg;
pub mod dataflow;
pub mod dominators;
pub mod ssa;

pub use crate::utils::{
    graph::{GraphBase, NodeId, Predecessors, RootedGraph, Successors},
    BitSet,
};
