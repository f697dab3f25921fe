//! Lattice abstraction for dataflow values.

use std::fmt::Debug;

use crate::analysis::dataflow::varset::VarSet;

/// A value domain with a meet (confluence) operation.
///
/// `meet` must be commutative, associative and idempotent, and the transfer functions used
/// with it must be monotone for the solver to converge.
pub trait MeetSemiLattice: Clone + Debug + PartialEq {
    /// Combines two values flowing into the same program point.
    #[must_use]
    fn meet(&self, other: &Self) -> Self;
}

/// Variable sets for "may" problems: meet is union.
impl MeetSemiLattice for VarSet {
    fn meet(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.union_with(other);
        result
    }
}
