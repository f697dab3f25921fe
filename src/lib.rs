// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

//! # brilflow
//!
//! The analysis and transformation core of an optimizing compiler for
//! [Bril](https://capra.cs.cornell.edu/bril/), a small register-based intermediate representation
//! encoded as JSON. `brilflow` takes a function's flat instruction stream and provides:
//!
//! - **Basic blocks** - partition of the stream at labels and terminators
//! - **Control-flow graphs** - successor/predecessor adjacency between blocks
//! - **Dataflow analysis** - a direction-agnostic worklist solver with defined-variables and
//!   live-variables instances
//! - **Dominance** - dominator sets, dominance frontiers, dominator trees, and a verifier
//! - **SSA construction** - phi placement at iterated dominance frontiers and renaming over the
//!   dominator tree
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brilflow::prelude::*;
//!
//! let program = Program::from_reader(std::io::stdin())?;
//! let config = AnalysisConfig::default();
//!
//! for function in &program.functions {
//!     let cfg = ControlFlowGraph::from_function(function)?;
//!     let dominance = DominatorAnalysis::compute(&cfg, &config)?;
//!     println!("{}: {} blocks", function.name, cfg.block_count());
//!     println!("entry dominates {} blocks", dominance.tree().preorder().len());
//! }
//!
//! let ssa = brilflow::ssa::program_to_ssa(&program, &config)?;
//! ssa.to_writer_pretty(std::io::stdout())?;
//! # Ok::<(), brilflow::Error>(())
//! ```
//!
//! ## Architecture
//!
//! Data flows strictly upward through the modules:
//!
//! - [`ir`] - Programs, functions and instructions with their JSON wire format
//! - [`analysis::blocks`] - The basic block builder
//! - [`analysis::cfg`] - The control-flow graph and natural loop detection
//! - [`analysis::dataflow`] - The generic solver and its two analyses
//! - [`analysis::dominators`] - Dominator sets, frontiers, tree and verification
//! - [`analysis::ssa`] - SSA construction
//! - [`report`] - Deterministic textual reports for each analysis mode
//!
//! Every structure is computed fresh per function and exclusively owned by the caller; no
//! state is shared between functions, so program-level entry points may process functions in
//! parallel (see [`AnalysisConfig::parallel`]).

#[macro_use]
pub(crate) mod error;
pub(crate) mod utils;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use brilflow::prelude::*;
///
/// let program = Program::from_json_str(r#"{"functions": []}"#)?;
/// assert!(program.functions.is_empty());
/// # Ok::<(), brilflow::Error>(())
/// ```
pub mod prelude;

/// Analysis configuration shared by every pass.
pub mod config;

/// The Bril intermediate representation and its JSON encoding.
///
/// # Examples
///
/// ```rust
/// use brilflow::ir::{Instruction, Program};
///
/// let program = Program::from_json_str(r#"{
///     "functions": [{
///         "name": "main",
///         "instrs": [
///             {"dest": "x", "type": "int", "op": "const", "value": 1},
///             {"op": "print", "args": ["x"]}
///         ]
///     }]
/// }"#)?;
///
/// let main = &program.functions[0];
/// assert_eq!(main.instrs[0].dest(), Some("x"));
/// assert!(matches!(main.instrs[1], Instruction::Effect { .. }));
/// # Ok::<(), brilflow::Error>(())
/// ```
pub mod ir;

/// Program analysis: blocks, control flow, dataflow, dominance and SSA.
pub mod analysis;

/// Textual rendering of analysis results for each command mode.
pub mod report;

pub use analysis::ssa;

/// `brilflow` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `brilflow` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

pub use config::{AnalysisConfig, UseBeforeDefPolicy};
pub use ir::{Function, Instruction, Program};
pub use report::Mode;
