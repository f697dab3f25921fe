//! Control-flow graph construction and loop detection.
//!
//! [`ControlFlowGraph`] wraps the basic blocks of one function in a
//! [`DirectedGraph`](crate::utils::graph::DirectedGraph) whose edges record how control moves
//! ([`CfgEdgeKind`]). Successors come from the final instruction of each block:
//!
//! - `jmp` - its single label
//! - `br` - its two labels, merged into one edge when they coincide
//! - `ret` - none
//! - anything else - the next block in layout order, if there is one
//!
//! [`find_loops`] layers natural loop detection on top, given the dominator analysis.

mod edge;
mod graph;
mod loops;

pub use edge::CfgEdgeKind;
pub use graph::ControlFlowGraph;
pub use loops::{find_loops, NaturalLoop};
