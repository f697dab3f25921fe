//! The control-flow graph of one function.

use rustc_hash::FxHashMap;

use crate::{
    analysis::{
        blocks::{form_blocks, BasicBlock},
        cfg::CfgEdgeKind,
    },
    ir::{Function, Instruction, Param},
    utils::{
        graph::{
            algorithms, DirectedGraph, GraphBase, NodeId, Predecessors, RootedGraph, Successors,
        },
        BitSet,
    },
    Error, Result,
};

/// Basic blocks of a function connected by their control transfers.
///
/// Node ids follow layout order: `NodeId::new(i)` is the `i`-th block, and node `0` is the
/// entry. The entry never has predecessors because [`form_blocks`] prepends a fresh block
/// whenever the first source block is a branch target.
///
/// Successor and predecessor lists are mutually consistent and free of duplicates; a `br`
/// whose two labels coincide contributes one edge.
///
/// # Examples
///
/// ```rust
/// use brilflow::{analysis::cfg::ControlFlowGraph, Program};
///
/// let program = Program::from_json_str(r#"{"functions": [{"name": "main", "instrs": [
///     {"dest": "c", "type": "bool", "op": "const", "value": true},
///     {"op": "br", "args": ["c"], "labels": ["then", "else"]},
///     {"label": "then"}, {"op": "jmp", "labels": ["end"]},
///     {"label": "else"}, {"op": "jmp", "labels": ["end"]},
///     {"label": "end"}, {"op": "ret"}
/// ]}]}"#)?;
///
/// let cfg = ControlFlowGraph::from_function(&program.functions[0])?;
/// assert_eq!(cfg.block_count(), 4);
/// let end = cfg.node_by_name("end").unwrap();
/// assert_eq!(cfg.predecessor_names(end), vec!["then", "else"]);
/// # Ok::<(), brilflow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    function: String,
    params: Vec<Param>,
    graph: DirectedGraph<BasicBlock, CfgEdgeKind>,
    by_name: FxHashMap<String, NodeId>,
}

impl ControlFlowGraph {
    /// Forms the blocks of `function` and connects them.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedIr`] for duplicate labels or a `jmp`/`br` missing its labels
    /// - [`Error::UndefinedBlock`] if a `jmp`, `br` or phi names an absent block
    pub fn from_function(function: &Function) -> Result<Self> {
        let blocks = form_blocks(function)?;
        Self::from_blocks(&function.name, function.args.clone(), blocks)
    }

    /// Connects already-formed blocks. The first block is the entry.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_function`], except duplicate labels are reported as
    /// [`Error::MalformedIr`] here too since names must be unique.
    pub fn from_blocks(function: &str, params: Vec<Param>, blocks: Vec<BasicBlock>) -> Result<Self> {
        let block_count = blocks.len();
        let mut graph = DirectedGraph::with_capacity(block_count);
        let mut by_name = FxHashMap::default();

        for block in blocks {
            let name = block.name.clone();
            let node = graph.add_node(block);
            if by_name.insert(name.clone(), node).is_some() {
                return Err(Error::MalformedIr {
                    function: function.to_string(),
                    block: name,
                    message: "block name defined more than once".to_string(),
                });
            }
        }

        let mut edges = Vec::with_capacity(block_count * 2);
        for (node, block) in graph.nodes() {
            let resolve = |target: &String| {
                by_name
                    .get(target)
                    .copied()
                    .ok_or_else(|| Error::UndefinedBlock {
                        function: function.to_string(),
                        block: block.name.clone(),
                        target: target.clone(),
                    })
            };

            for instr in block.instructions.iter().filter(|i| i.is_phi()) {
                for label in instr.labels() {
                    resolve(label)?;
                }
            }

            match block.terminator() {
                Some(Instruction::Effect { op, labels, .. }) if op == "jmp" => {
                    let target = labels.first().ok_or_else(|| missing_labels(function, block, op))?;
                    edges.push((node, resolve(target)?, CfgEdgeKind::Jump));
                }
                Some(Instruction::Effect { op, labels, .. }) if op == "br" => {
                    let [on_true, on_false] = labels.as_slice() else {
                        return Err(missing_labels(function, block, op));
                    };
                    edges.push((node, resolve(on_true)?, CfgEdgeKind::BranchTrue));
                    edges.push((node, resolve(on_false)?, CfgEdgeKind::BranchFalse));
                }
                Some(_) => {}
                None if node.index() + 1 < block_count => {
                    edges.push((node, NodeId::new(node.index() + 1), CfgEdgeKind::Fallthrough));
                }
                None => {}
            }
        }

        for (source, target, kind) in edges {
            graph.add_edge(source, target, kind)?;
        }

        log::debug!(
            "{function}: cfg with {} blocks and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            function: function.to_string(),
            params,
            graph,
            by_name,
        })
    }

    /// Name of the function this graph was built from.
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function
    }

    /// Formal parameters of the function.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// The entry block, always node `0`.
    #[must_use]
    pub const fn entry(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The block at `node`.
    #[must_use]
    pub fn block(&self, node: NodeId) -> Option<&BasicBlock> {
        self.graph.node(node)
    }

    /// All blocks in layout order.
    pub fn blocks(&self) -> impl Iterator<Item = (NodeId, &BasicBlock)> + '_ {
        self.graph.nodes()
    }

    /// Name of the block at `node`, or `""` for an id outside the graph.
    #[must_use]
    pub fn block_name(&self, node: NodeId) -> &str {
        self.graph.node(node).map_or("", |b| b.name.as_str())
    }

    /// Looks a block up by name.
    #[must_use]
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Outgoing edges of `node` with their kinds.
    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = (NodeId, CfgEdgeKind)> + '_ {
        self.graph.outgoing_edges(node).map(|(t, k)| (t, *k))
    }

    /// Successor block names of `node`, in edge order.
    #[must_use]
    pub fn successor_names(&self, node: NodeId) -> Vec<&str> {
        self.successors(node).map(|s| self.block_name(s)).collect()
    }

    /// Predecessor block names of `node`, in edge order.
    #[must_use]
    pub fn predecessor_names(&self, node: NodeId) -> Vec<&str> {
        self.predecessors(node).map(|p| self.block_name(p)).collect()
    }

    /// Blocks that leave the function: no successors.
    #[must_use]
    pub fn exits(&self) -> Vec<NodeId> {
        self.graph
            .node_ids()
            .filter(|&n| self.graph.out_degree(n) == 0)
            .collect()
    }

    /// Blocks reachable from the entry.
    #[must_use]
    pub fn reachable(&self) -> BitSet {
        algorithms::reachable(self, self.entry())
    }

    /// Reachable blocks in reverse postorder.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<NodeId> {
        algorithms::reverse_postorder(self, self.entry())
    }

    /// Reachable blocks in postorder.
    #[must_use]
    pub fn postorder(&self) -> Vec<NodeId> {
        algorithms::postorder(self, self.entry())
    }
}

fn missing_labels(function: &str, block: &BasicBlock, op: &str) -> Error {
    Error::MalformedIr {
        function: function.to_string(),
        block: block.name.clone(),
        message: format!("'{op}' without the required target labels"),
    }
}

impl GraphBase for ControlFlowGraph {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        self.graph.node_ids()
    }
}

impl Successors for ControlFlowGraph {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.graph.successors(node)
    }
}

impl Predecessors for ControlFlowGraph {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.graph.predecessors(node)
    }
}

impl RootedGraph for ControlFlowGraph {
    fn entry(&self) -> NodeId {
        NodeId::new(0)
    }
}
