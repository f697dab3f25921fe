//! The dominator tree.

use crate::{
    analysis::{cfg::ControlFlowGraph, dominators::sets::DominatorSets},
    utils::graph::NodeId,
};

/// Immediate-dominator tree over the reachable blocks, rooted at the entry.
///
/// The immediate dominator of `b` is its strict dominator with the largest dominator set:
/// strict dominators form a chain, and the one closest to `b` is dominated by all others.
/// Children are kept sorted by block name so every traversal of the tree is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominatorTree {
    root: NodeId,
    idom: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    depth: Vec<Option<usize>>,
}

impl DominatorTree {
    /// Derives the tree from converged dominator sets.
    #[must_use]
    pub fn build(cfg: &ControlFlowGraph, sets: &DominatorSets) -> Self {
        let count = cfg.block_count();
        let root = cfg.entry();
        let mut idom = vec![None; count];
        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); count];

        for index in 0..count {
            let node = NodeId::new(index);
            if node == root {
                continue;
            }
            let Some(dominators) = sets.get(node) else {
                continue;
            };

            let parent = dominators
                .iter()
                .map(NodeId::new)
                .filter(|&d| d != node)
                .max_by_key(|&d| sets.get(d).map_or(0, |s| s.count()));

            if let Some(parent) = parent {
                idom[index] = Some(parent);
                children[parent.index()].push(node);
            }
        }

        for list in &mut children {
            list.sort_by(|a, b| cfg.block_name(*a).cmp(cfg.block_name(*b)));
        }

        let mut tree = Self {
            root,
            idom,
            children,
            depth: vec![None; count],
        };

        if count > 0 {
            let mut stack = vec![(root, 0)];
            while let Some((node, depth)) = stack.pop() {
                tree.depth[node.index()] = Some(depth);
                stack.extend(tree.children[node.index()].iter().map(|&c| (c, depth + 1)));
            }
        }

        tree
    }

    /// The entry block.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Immediate dominator of `node`; `None` for the root and for unreachable blocks.
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        self.idom.get(node.index()).copied().flatten()
    }

    /// Blocks immediately dominated by `node`, sorted by name.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(node.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distance from the root; `None` for blocks outside the tree.
    #[must_use]
    pub fn depth(&self, node: NodeId) -> Option<usize> {
        self.depth.get(node.index()).copied().flatten()
    }

    /// Returns `true` if `node` is part of the tree, i.e. reachable.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.depth(node).is_some()
    }

    /// Walks the idom chain from `b` looking for `a`.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        let mut current = Some(b);
        while let Some(node) = current {
            if node == a {
                return true;
            }
            current = self.immediate_dominator(node);
        }
        false
    }

    /// Tree nodes in depth-first preorder, visiting children in name order.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        if self.depth.is_empty() {
            return order;
        }
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        order
    }
}
