//! Node identifiers.

use std::fmt;

/// Index of a node in a [`DirectedGraph`](super::DirectedGraph).
///
/// For control-flow graphs the index is the block's position in layout order, so it doubles
/// as an index into any per-block vector produced by an analysis.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Wraps a raw index.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// The raw index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_index_and_order() {
        let mut ids = vec![NodeId::new(3), NodeId::from(1), NodeId::new(2)];
        ids.sort();
        assert_eq!(ids.iter().map(|n| n.index()).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_node_id_formatting() {
        assert_eq!(format!("{:?}", NodeId::new(7)), "NodeId(7)");
        assert_eq!(NodeId::new(7).to_string(), "n7");
    }
}
