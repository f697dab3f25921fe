//! Control-flow edge classification.

use strum::Display;

/// How control moves along a CFG edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CfgEdgeKind {
    /// Target of a `jmp`.
    Jump,

    /// First label of a `br`, taken when the condition holds.
    BranchTrue,

    /// Second label of a `br`.
    BranchFalse,

    /// Implicit transfer to the next block in layout order.
    Fallthrough,
}

impl CfgEdgeKind {
    /// Returns `true` for the two arms of a `br`.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(self, Self::BranchTrue | Self::BranchFalse)
    }
}
