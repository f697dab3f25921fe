//! Interned variable names and sets over them.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{analysis::cfg::ControlFlowGraph, utils::BitSet};

/// Rendering of an empty variable set.
pub const EMPTY_SET: &str = "∅";

/// Dense numbering of every variable name mentioned in a function.
///
/// Parameters come first, then names in order of first appearance (destination before
/// arguments) across the blocks in layout order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarTable {
    names: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl VarTable {
    /// Interns the parameters and every destination and argument of `cfg`.
    #[must_use]
    pub fn from_cfg(cfg: &ControlFlowGraph) -> Self {
        let mut table = Self::default();
        for param in cfg.params() {
            table.intern(&param.name);
        }
        for (_, block) in cfg.blocks() {
            for instr in &block.instructions {
                if let Some(dest) = instr.dest() {
                    table.intern(dest);
                }
                for arg in instr.args() {
                    table.intern(arg);
                }
            }
        }
        table
    }

    /// Returns the id of `name`, adding it if new.
    pub fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    /// Id of `name`, if interned.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of variable `id`.
    #[must_use]
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no name is interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// An empty set over this table.
    #[must_use]
    pub fn empty_set(&self) -> VarSet {
        VarSet {
            bits: BitSet::new(self.len()),
        }
    }

    /// The set of the given names. Names not in the table are ignored.
    #[must_use]
    pub fn set_of<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> VarSet {
        let mut set = self.empty_set();
        for id in names.into_iter().filter_map(|n| self.get(n)) {
            set.bits.insert(id);
        }
        set
    }

    /// Members of `set` as names, sorted.
    #[must_use]
    pub fn names_of(&self, set: &VarSet) -> Vec<&str> {
        let mut names: Vec<&str> = set.ids().filter_map(|id| self.name(id)).collect();
        names.sort_unstable();
        names
    }

    /// `set` as sorted comma separated names, or [`EMPTY_SET`].
    #[must_use]
    pub fn render(&self, set: &VarSet) -> String {
        let names = self.names_of(set);
        if names.is_empty() {
            EMPTY_SET.to_string()
        } else {
            names.join(", ")
        }
    }
}

/// A set of variables of one [`VarTable`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VarSet {
    bits: BitSet,
}

impl VarSet {
    /// Adds variable `id`.
    pub fn insert(&mut self, id: usize) -> bool {
        self.bits.insert(id)
    }

    /// Removes variable `id`.
    pub fn remove(&mut self, id: usize) -> bool {
        self.bits.remove(id)
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        id < self.bits.capacity() && self.bits.contains(id)
    }

    /// In-place union. Returns `true` if `self` grew.
    pub fn union_with(&mut self, other: &Self) -> bool {
        self.bits.union_with(&other.bits)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.count()
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Member ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter()
    }
}

impl fmt::Debug for VarSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.bits, f)
    }
}
