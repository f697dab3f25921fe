//! Per-variable version stacks used during renaming.

use rustc_hash::{FxHashMap, FxHashSet};

/// Current SSA names of every source variable, innermost definition on top.
///
/// Fresh names take the form `<var>.<n>` with a per-variable counter that only moves
/// forward, so a name is never handed out twice even after it has been popped. Names already
/// used anywhere in the source function are skipped.
#[derive(Debug, Default)]
pub struct RenameStacks {
    stacks: FxHashMap<String, Vec<String>>,
    counters: FxHashMap<String, usize>,
    taken: FxHashSet<String>,
}

impl RenameStacks {
    /// Creates stacks holding `baseline` names under themselves, avoiding `taken` when
    /// generating fresh names.
    #[must_use]
    pub fn new<'a>(
        baseline: impl IntoIterator<Item = &'a str>,
        taken: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut stacks: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for name in baseline {
            stacks.insert(name.to_string(), vec![name.to_string()]);
        }
        Self {
            stacks,
            counters: FxHashMap::default(),
            taken: taken.into_iter().collect(),
        }
    }

    /// The name currently reaching a use of `variable`.
    #[must_use]
    pub fn top(&self, variable: &str) -> Option<&str> {
        self.stacks
            .get(variable)
            .and_then(|stack| stack.last())
            .map(String::as_str)
    }

    /// Pushes and returns a new version of `variable`.
    pub fn push_fresh(&mut self, variable: &str) -> String {
        let counter = self.counters.entry(variable.to_string()).or_insert(0);
        let name = loop {
            let candidate = format!("{variable}.{counter}");
            *counter += 1;
            if !self.taken.contains(&candidate) {
                break candidate;
            }
        };
        self.taken.insert(name.clone());
        self.stacks
            .entry(variable.to_string())
            .or_default()
            .push(name.clone());
        name
    }

    /// Pops the newest version of `variable`. Returns `false` if there was none.
    pub fn pop(&mut self, variable: &str) -> bool {
        self.stacks
            .get_mut(variable)
            .and_then(Vec::pop)
            .is_some()
    }

    /// Total number of names held across all stacks.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stacks.values().map(Vec::len).sum()
    }
}
