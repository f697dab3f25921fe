//! Basic block formation.
//!
//! [`form_blocks`] partitions a function's flat instruction stream into maximal straight-line
//! runs. A block starts at a label (which names it) or right after a terminator; blocks with
//! no label receive a synthetic `__bN` name that does not collide with any label of the
//! function. Label instructions themselves are consumed and never appear inside a block.

use rustc_hash::FxHashSet;

use crate::{
    ir::{Function, Instruction},
    Error, Result,
};

/// Prefix of synthesized block names.
pub const SYNTHETIC_PREFIX: &str = "__b";

/// A named, straight-line run of instructions.
///
/// A terminator (`jmp`, `br`, `ret`) can only be the last instruction. A block without one
/// falls through to the next block in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    /// Block name: the source label, or a synthesized `__bN`
    pub name: String,
    /// Instructions in program order, labels excluded
    pub instructions: Vec<Instruction>,
    /// `true` if the name was synthesized rather than taken from a label
    pub synthetic: bool,
}

impl BasicBlock {
    /// Creates a block named by a source label.
    #[must_use]
    pub fn labeled(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            instructions,
            synthetic: false,
        }
    }

    /// The final instruction if it is a terminator.
    #[must_use]
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.is_terminator())
    }

    /// Returns `true` if the block holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Destination variables written in this block, in program order (with repeats).
    pub fn definitions(&self) -> impl Iterator<Item = &str> + '_ {
        self.instructions.iter().filter_map(Instruction::dest)
    }
}

/// Hands out `__bN` names that avoid every label present in the function.
struct NameSupply<'a> {
    taken: &'a FxHashSet<&'a str>,
    next: usize,
}

impl NameSupply<'_> {
    fn fresh(&mut self) -> String {
        loop {
            let name = format!("{SYNTHETIC_PREFIX}{}", self.next);
            self.next += 1;
            if !self.taken.contains(name.as_str()) {
                return name;
            }
        }
    }
}

/// Partitions `function` into basic blocks in layout order.
///
/// The result is never empty: an empty function yields a single empty entry block. If the
/// first block would be the target of a jump or branch, an empty synthetic entry is
/// prepended so that the entry block has no predecessors.
///
/// # Errors
///
/// Returns [`Error::MalformedIr`] if the same label appears twice.
pub fn form_blocks(function: &Function) -> Result<Vec<BasicBlock>> {
    let mut labels: FxHashSet<&str> = FxHashSet::default();
    for label in function.instrs.iter().filter_map(Instruction::as_label) {
        if !labels.insert(label) {
            return Err(Error::MalformedIr {
                function: function.name.clone(),
                block: label.to_string(),
                message: "label defined more than once".to_string(),
            });
        }
    }

    let mut names = NameSupply {
        taken: &labels,
        next: 0,
    };
    let mut blocks: Vec<BasicBlock> = Vec::new();
    let mut label: Option<&str> = None;
    let mut current: Vec<Instruction> = Vec::new();

    for instr in &function.instrs {
        if let Some(next_label) = instr.as_label() {
            // an unlabeled empty run before a label is not a block
            if label.is_some() || !current.is_empty() {
                blocks.push(close(label.take(), std::mem::take(&mut current), &mut names));
            }
            label = Some(next_label);
            continue;
        }

        current.push(instr.clone());
        if instr.is_terminator() {
            blocks.push(close(label.take(), std::mem::take(&mut current), &mut names));
        }
    }

    if label.is_some() || !current.is_empty() || blocks.is_empty() {
        blocks.push(close(label, current, &mut names));
    }

    let entry_is_target = function.instrs.iter().any(|instr| {
        instr.is_terminator() && instr.labels().iter().any(|l| *l == blocks[0].name)
    });
    if entry_is_target {
        let entry = close(None, Vec::new(), &mut names);
        log::debug!(
            "{}: '{}' is a branch target, prepending entry block '{}'",
            function.name,
            blocks[0].name,
            entry.name
        );
        blocks.insert(0, entry);
    }

    Ok(blocks)
}

fn close(label: Option<&str>, instructions: Vec<Instruction>, names: &mut NameSupply) -> BasicBlock {
    match label {
        Some(name) => BasicBlock::labeled(name, instructions),
        None => BasicBlock {
            name: names.fresh(),
            instructions,
            synthetic: true,
        },
    }
}
