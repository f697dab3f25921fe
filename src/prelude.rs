//! # brilflow Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the brilflow library. Import this module to get quick access to the program model,
//! the analyses and their configuration.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all brilflow operations
pub use crate::Error;

/// The result type used throughout brilflow
pub use crate::Result;

/// Bounds and policies shared by every analysis
pub use crate::{AnalysisConfig, UseBeforeDefPolicy};

// ================================================================================================
// Intermediate Representation
// ================================================================================================

/// Programs, functions and instructions
pub use crate::ir::{Function, Instruction, Literal, Param, Program, Type};

// ================================================================================================
// Control Flow
// ================================================================================================

/// Basic blocks and their formation
pub use crate::analysis::blocks::{form_blocks, BasicBlock};

/// The control-flow graph and natural loops
pub use crate::analysis::cfg::{find_loops, CfgEdgeKind, ControlFlowGraph, NaturalLoop};

/// Graph handles and adjacency traits
pub use crate::analysis::{BitSet, GraphBase, NodeId, Predecessors, RootedGraph, Successors};

// ================================================================================================
// Dataflow and Dominance
// ================================================================================================

/// The dataflow framework and its variable analyses
pub use crate::analysis::dataflow::{
    live_variables, reaching_definitions, DataFlowAnalysis, DataFlowSolver, Direction,
    LiveVariables, MeetSemiLattice, ReachingDefinitions, VarSet, VarTable, VariableFlow,
};

/// Dominator sets, tree and frontiers
pub use crate::analysis::dominators::{
    verify_dominators, DominanceFrontier, DominatorAnalysis, DominatorSets, DominatorTree,
};

// ================================================================================================
// SSA and Reports
// ================================================================================================

/// SSA construction
pub use crate::ssa::{program_to_ssa, to_ssa, SsaOutput, SsaStats};

/// Report modes
pub use crate::report::Mode;
