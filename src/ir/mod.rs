//! Typed Bril IR.
//!
//! - [`Program`] / [`Function`] / [`Param`] - the program structure
//! - [`Instruction`] - labels, value operations, effect operations and phi nodes
//! - [`Type`] / [`Literal`] - operand types and constants

mod instruction;
mod program;

pub use instruction::{Instruction, Literal, Type, TERMINATORS};
pub use program::{Function, Param, Program};
