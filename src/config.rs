//! Analysis configuration.
//!
//! [`AnalysisConfig`] bundles the knobs shared by every pass in this crate: the defensive bounds
//! on each fixed-point computation, whether computed dominators are verified, and how SSA
//! renaming treats a read with no reaching definition.
//!
//! Iteration bounds are `Option<usize>`; `None` derives a bound from the size of the function
//! being analyzed, which is large enough for any monotone computation on that function.

use strum::{Display, EnumString};

/// What SSA renaming does when it meets a use whose variable has no reaching definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum UseBeforeDefPolicy {
    /// Keep the original source name and record the use in
    /// [`SsaStats::undefined_uses`](crate::ssa::SsaStats::undefined_uses).
    #[default]
    PassThrough,
    /// Fail the function with [`Error::UseBeforeDefinition`](crate::Error::UseBeforeDefinition).
    Reject,
}

/// Configuration shared by the CFG, dataflow, dominator and SSA passes.
///
/// # Examples
///
/// ```rust
/// use brilflow::{AnalysisConfig, UseBeforeDefPolicy};
///
/// let config = AnalysisConfig::strict();
/// assert!(config.verify_dominators);
/// assert_eq!(config.use_before_def, UseBeforeDefPolicy::Reject);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Maximum number of full passes of the dominator fixed point.
    pub dominator_pass_limit: Option<usize>,

    /// Maximum number of worklist pops during phi placement.
    pub phi_insertion_limit: Option<usize>,

    /// Maximum number of block visits made by the dataflow solver.
    pub dataflow_iteration_limit: Option<usize>,

    /// Run the ancestor-walk verifier over every computed dominator set.
    pub verify_dominators: bool,

    /// Treatment of uses without a reaching definition during SSA renaming.
    pub use_before_def: UseBeforeDefPolicy,

    /// Process the functions of a program concurrently.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dominator_pass_limit: None,
            phi_insertion_limit: None,
            dataflow_iteration_limit: None,
            verify_dominators: true,
            use_before_def: UseBeforeDefPolicy::PassThrough,
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Verification on, use-before-definition rejected.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            use_before_def: UseBeforeDefPolicy::Reject,
            ..Self::default()
        }
    }

    /// Verification off, use-before-definition passed through.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            verify_dominators: false,
            ..Self::default()
        }
    }

    /// Sets [`Self::use_before_def`].
    #[must_use]
    pub fn with_use_before_def(mut self, policy: UseBeforeDefPolicy) -> Self {
        self.use_before_def = policy;
        self
    }

    /// Sets [`Self::verify_dominators`].
    #[must_use]
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_dominators = verify;
        self
    }

    /// Sets [`Self::parallel`].
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Pass bound for the dominator fixed point over `blocks` blocks.
    ///
    /// Each productive pass removes at least one block from at least one set, so `n² + 1`
    /// passes always suffice.
    pub(crate) fn dominator_passes(&self, blocks: usize) -> usize {
        self.dominator_pass_limit
            .unwrap_or_else(|| blocks.saturating_mul(blocks).saturating_add(1))
    }

    /// Worklist bound for phi placement with `blocks` blocks and `variables` variables.
    pub(crate) fn phi_insertions(&self, blocks: usize, variables: usize) -> usize {
        self.phi_insertion_limit.unwrap_or_else(|| {
            blocks
                .saturating_add(1)
                .saturating_mul(variables.saturating_add(1))
                .saturating_mul(2)
        })
    }

    /// Visit bound for the dataflow solver with `blocks` blocks and `variables` variables.
    ///
    /// A block is revisited only when a neighbour's output grew or shrank, which can happen at
    /// most once per variable per edge direction.
    pub(crate) fn dataflow_iterations(&self, blocks: usize, variables: usize) -> usize {
        self.dataflow_iteration_limit.unwrap_or_else(|| {
            blocks
                .saturating_add(1)
                .saturating_mul(blocks.saturating_add(1))
                .saturating_mul(variables.saturating_add(1))
                .saturating_add(blocks)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_presets() {
        let default = AnalysisConfig::default();
        assert!(default.verify_dominators);
        assert!(default.parallel);
        assert_eq!(default.use_before_def, UseBeforeDefPolicy::PassThrough);

        let strict = AnalysisConfig::strict();
        assert!(strict.verify_dominators);
        assert_eq!(strict.use_before_def, UseBeforeDefPolicy::Reject);

        let lenient = AnalysisConfig::lenient();
        assert!(!lenient.verify_dominators);
        assert_eq!(lenient.use_before_def, UseBeforeDefPolicy::PassThrough);
    }

    #[test]
    fn test_config_builders() {
        let config = AnalysisConfig::default()
            .with_parallel(false)
            .with_verification(false)
            .with_use_before_def(UseBeforeDefPolicy::Reject);
        assert!(!config.parallel);
        assert!(!config.verify_dominators);
        assert_eq!(config.use_before_def, UseBeforeDefPolicy::Reject);
    }

    #[test]
    fn test_derived_limits() {
        let config = AnalysisConfig::default();
        assert_eq!(config.dominator_passes(4), 17);
        assert!(config.phi_insertions(4, 3) >= 4 * 3);
        assert!(config.dataflow_iterations(4, 3) >= 4);

        let bounded = AnalysisConfig {
            dominator_pass_limit: Some(2),
            ..AnalysisConfig::default()
        };
        assert_eq!(bounded.dominator_passes(100), 2);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "pass-through".parse::<UseBeforeDefPolicy>().unwrap(),
            UseBeforeDefPolicy::PassThrough
        );
        assert_eq!(
            "reject".parse::<UseBeforeDefPolicy>().unwrap(),
            UseBeforeDefPolicy::Reject
        );
        assert_eq!(UseBeforeDefPolicy::Reject.to_string(), "reject");
    }
}
