//! Natural loop detection.
//!
//! A back edge `latch -> header` is an edge whose target dominates its source. The natural
//! loop of a header is the header plus every block that reaches one of its latches without
//! passing through the header. Loops sharing a header are merged.

use crate::{
    analysis::{cfg::ControlFlowGraph, dominators::DominatorAnalysis},
    utils::{
        graph::{GraphBase, NodeId, Predecessors, Successors},
        BitSet,
    },
};

/// A loop identified by its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalLoop {
    /// The single entry of the loop; dominates every block of the body.
    pub header: NodeId,
    /// Sources of back edges into the header, in block order.
    pub latches: Vec<NodeId>,
    /// Blocks of the loop, header included.
    pub body: BitSet,
    /// Number of other loops enclosing this one (0 = outermost).
    pub depth: usize,
}

impl NaturalLoop {
    /// Returns `true` if `node` belongs to the loop.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.body.capacity() && self.body.contains(node.index())
    }

    /// Number of blocks in the loop.
    #[must_use]
    pub fn size(&self) -> usize {
        self.body.count()
    }

    /// Body blocks in ascending block order.
    pub fn blocks(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.body.iter().map(NodeId::new)
    }
}

/// Finds every natural loop of `cfg`, ordered by header.
#[must_use]
pub fn find_loops(cfg: &ControlFlowGraph, dominance: &DominatorAnalysis) -> Vec<NaturalLoop> {
    let count = cfg.block_count();
    let mut by_header: Vec<Option<NaturalLoop>> = vec![None; count];

    for latch in cfg.node_ids().filter(|&n| dominance.is_reachable(n)) {
        for header in cfg.successors(latch) {
            if !dominance.dominates(header, latch) {
                continue;
            }
            let natural = by_header[header.index()].get_or_insert_with(|| NaturalLoop {
                header,
                latches: Vec::new(),
                body: BitSet::from_indices(count, [header.index()]),
                depth: 0,
            });
            natural.latches.push(latch);
            collect_body(cfg, dominance, natural, latch);
        }
    }

    let mut loops: Vec<NaturalLoop> = by_header.into_iter().flatten().collect();

    let depths: Vec<usize> = loops
        .iter()
        .map(|inner| {
            loops
                .iter()
                .filter(|outer| outer.header != inner.header && outer.contains(inner.header))
                .count()
        })
        .collect();
    for (natural, depth) in loops.iter_mut().zip(depths) {
        natural.depth = depth;
    }

    loops
}

// unreachable blocks jumping into the body are not part of the loop
fn collect_body(
    cfg: &ControlFlowGraph,
    dominance: &DominatorAnalysis,
    natural: &mut NaturalLoop,
    latch: NodeId,
) {
    let mut worklist = vec![latch];
    while let Some(node) = worklist.pop() {
        if natural.body.insert(node.index()) {
            worklist.extend(cfg.predecessors(node).filter(|&p| dominance.is_reachable(p)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{Function, Instruction, Literal},
        AnalysisConfig,
    };

    fn loops(instrs: Vec<Instruction>) -> (ControlFlowGraph, Vec<NaturalLoop>) {
        let cfg = ControlFlowGraph::from_function(&Function::new("f", instrs)).unwrap();
        let dom = DominatorAnalysis::compute(&cfg, &AnalysisConfig::default()).unwrap();
        let loops = find_loops(&cfg, &dom);
        (cfg, loops)
    }

    fn body_names(cfg: &ControlFlowGraph, natural: &NaturalLoop) -> Vec<String> {
        natural.blocks().map(|n| cfg.block_name(n).to_string()).collect()
    }

    #[test]
    fn test_no_loops_in_diamond() {
        let (_, found) = loops(vec![
            Instruction::constant("c", "bool", Literal::Bool(true)),
            Instruction::br("c", "a", "b"),
            Instruction::label("a"),
            Instruction::jmp("end"),
            Instruction::label("b"),
            Instruction::label("end"),
            Instruction::ret(None),
        ]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_nested_loops() {
        let (cfg, found) = loops(vec![
            Instruction::label("entry"),
            Instruction::constant("c", "bool", Literal::Bool(true)),
            Instruction::label("outer"),
            Instruction::label("inner"),
            Instruction::br("c", "inner", "latch"),
            Instruction::label("latch"),
            Instruction::br("c", "outer", "exit"),
            Instruction::label("exit"),
            Instruction::ret(None),
        ]);
        assert_eq!(found.len(), 2);

        let outer = &found[0];
        assert_eq!(cfg.block_name(outer.header), "outer");
        assert_eq!(body_names(&cfg, outer), vec!["outer", "inner", "latch"]);
        assert_eq!(outer.depth, 0);

        let inner = &found[1];
        assert_eq!(cfg.block_name(inner.header), "inner");
        assert_eq!(body_names(&cfg, inner), vec!["inner"]);
        assert_eq!(inner.latches, vec![inner.header]);
        assert_eq!(inner.depth, 1);
        assert!(!inner.contains(cfg.node_by_name("exit").unwrap()));
    }

    #[test]
    fn test_irreducible_cycle_is_not_natural() {
        let (_, found) = loops(vec![
            Instruction::constant("c", "bool", Literal::Bool(true)),
            Instruction::br("c", "x", "y"),
            Instruction::label("x"),
            Instruction::jmp("y"),
            Instruction::label("y"),
            Instruction::br("c", "x", "out"),
            Instruction::label("out"),
            Instruction::ret(None),
        ]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_unreachable_entry_into_body_ignored() {
        let (cfg, found) = loops(vec![
            Instruction::label("head"),
            Instruction::constant("c", "bool", Literal::Bool(true)),
            Instruction::br("c", "body", "out"),
            Instruction::label("body"),
            Instruction::jmp("head"),
            Instruction::label("stray"),
            Instruction::jmp("body"),
            Instruction::label("out"),
            Instruction::ret(None),
        ]);
        assert_eq!(found.len(), 1);
        assert_eq!(body_names(&cfg, &found[0]), vec!["head", "body"]);
        assert_eq!(found[0].size(), 2);
    }
}
