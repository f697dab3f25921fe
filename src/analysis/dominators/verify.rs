//! Independent check of computed dominator sets.
//!
//! `d` dominates `b` iff no path from the entry reaches `b` without passing through `d`.
//! One forward walk from the entry that refuses to enter `d` therefore finds exactly the
//! reachable blocks `d` does not dominate; every other reachable block must list `d`. The
//! walk keeps a visited set, so cycles and irreducible regions terminate, and the whole check
//! costs one walk per block.

use crate::{
    analysis::{cfg::ControlFlowGraph, dominators::sets::DominatorSets},
    utils::{
        graph::{GraphBase, NodeId, Successors},
        BitSet,
    },
    Error, Result,
};

/// Blocks reachable from the entry along paths that never visit `avoid`.
fn reached_avoiding(cfg: &ControlFlowGraph, avoid: NodeId) -> BitSet {
    let mut visited = BitSet::new(cfg.block_count());
    let entry = cfg.entry();
    if entry == avoid {
        return visited;
    }

    let mut stack = vec![entry];
    visited.insert(entry.index());
    while let Some(node) = stack.pop() {
        for succ in cfg.successors(node) {
            if succ != avoid && visited.insert(succ.index()) {
                stack.push(succ);
            }
        }
    }
    visited
}

/// Checks every reachable block's set for soundness and completeness, and that unreachable
/// blocks carry no set.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] naming the first offending block pair.
pub fn verify_dominators(cfg: &ControlFlowGraph, sets: &DominatorSets) -> Result<()> {
    let reachable = cfg.reachable();
    let violation = |message: String| Error::InvariantViolation {
        function: cfg.function_name().to_string(),
        message,
    };

    for b in cfg.node_ids() {
        match (sets.get(b).is_some(), reachable.contains(b.index())) {
            (false, true) => {
                return Err(violation(format!(
                    "reachable block '{}' has no dominator set",
                    cfg.block_name(b)
                )));
            }
            (true, false) => {
                return Err(violation(format!(
                    "unreachable block '{}' has a dominator set",
                    cfg.block_name(b)
                )));
            }
            _ => {}
        }
    }

    for d in cfg.node_ids() {
        let escapes = reached_avoiding(cfg, d);
        for b in cfg.node_ids() {
            let Some(claimed) = sets.get(b) else {
                continue;
            };
            let actual = d == b || !escapes.contains(b.index());
            let listed = claimed.contains(d.index());
            if actual != listed {
                let relation = if listed { "lists" } else { "omits" };
                return Err(violation(format!(
                    "dominator set of '{}' {} '{}' but a path from the entry disagrees",
                    cfg.block_name(b),
                    relation,
                    cfg.block_name(d)
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{Function, Instruction, Literal},
        AnalysisConfig,
    };

    fn irreducible() -> ControlFlowGraph {
        // entry branches into both halves of a two-block cycle
        ControlFlowGraph::from_function(&Function::new(
            "f",
            vec![
                Instruction::label("entry"),
                Instruction::constant("c", "bool", Literal::Bool(true)),
                Instruction::br("c", "x", "y"),
                Instruction::label("x"),
                Instruction::br("c", "y", "out"),
                Instruction::label("y"),
                Instruction::jmp("x"),
                Instruction::label("out"),
                Instruction::ret(None),
            ],
        ))
        .unwrap()
    }

    #[test]
    fn test_computed_sets_verify() {
        let cfg = irreducible();
        let limit = AnalysisConfig::default().dominator_passes(cfg.block_count());
        let sets = DominatorSets::compute(&cfg, &cfg.reachable(), limit).unwrap();
        verify_dominators(&cfg, &sets).unwrap();

        let x = cfg.node_by_name("x").unwrap();
        let y = cfg.node_by_name("y").unwrap();
        assert!(!sets.dominates(x, y));
        assert!(!sets.dominates(y, x));
    }

    #[test]
    fn test_walk_with_cycles_terminates() {
        let cfg = irreducible();
        let x = cfg.node_by_name("x").unwrap();
        let y = cfg.node_by_name("y").unwrap();
        let out = cfg.node_by_name("out").unwrap();

        let around_y = reached_avoiding(&cfg, y);
        assert!(around_y.contains(out.index()));
        assert!(!around_y.contains(y.index()));

        assert!(!reached_avoiding(&cfg, x).contains(out.index()));
        assert_eq!(reached_avoiding(&cfg, cfg.entry()).count(), 0);
    }

    #[test]
    fn test_wrong_sets_rejected() {
        let cfg = irreducible();
        let limit = AnalysisConfig::default().dominator_passes(cfg.block_count());
        let good = DominatorSets::compute(&cfg, &cfg.reachable(), limit).unwrap();
        let other = ControlFlowGraph::from_function(&Function::new(
            "g",
            vec![
                Instruction::label("entry"),
                Instruction::jmp("x"),
                Instruction::label("x"),
                Instruction::jmp("y"),
                Instruction::label("y"),
                Instruction::jmp("out"),
                Instruction::label("out"),
                Instruction::ret(None),
            ],
        ))
        .unwrap();
        // sets from the irreducible graph are incomplete for the chain x -> y
        let err = verify_dominators(&other, &good).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation { ref function, .. } if function == "g"));
    }

    #[test]
    fn test_long_chain_verifies() {
        let blocks = 1_000;
        let mut instrs = Vec::with_capacity(blocks * 2);
        for i in 0..blocks {
            instrs.push(Instruction::label(format!("b{i}")));
            if i + 1 < blocks {
                instrs.push(Instruction::jmp(&format!("b{}", i + 1)));
            } else {
                instrs.push(Instruction::ret(None));
            }
        }
        let cfg = ControlFlowGraph::from_function(&Function::new("chain", instrs)).unwrap();
        let limit = AnalysisConfig::default().dominator_passes(cfg.block_count());
        let sets = DominatorSets::compute(&cfg, &cfg.reachable(), limit).unwrap();
        verify_dominators(&cfg, &sets).unwrap();

        let last = cfg.node_by_name("b999").unwrap();
        assert_eq!(sets.dominators(last).count(), blocks);
    }
}
