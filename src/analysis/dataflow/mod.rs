//! Iterative dataflow analysis.
//!
//! The framework is built around three pieces:
//!
//! - **Lattice** ([`MeetSemiLattice`]) - the value domain and its confluence
//! - **Analysis** ([`DataFlowAnalysis`]) - direction, boundary, seed and transfer function
//! - **Solver** ([`DataFlowSolver`]) - a worklist engine that works for either direction
//!
//! Two analyses over variable names ship with it:
//!
//! - [`ReachingDefinitions`] (forward) - which variables may have been assigned
//! - [`LiveVariables`] (backward) - which variables may still be read
//!
//! [`reaching_definitions`] and [`live_variables`] run them with bounds taken from an
//! [`AnalysisConfig`].
//!
//! # Example
//!
//! ```rust
//! use brilflow::{analysis::{cfg::ControlFlowGraph, dataflow::live_variables}, AnalysisConfig, Program};
//!
//! let program = Program::from_json_str(r#"{"functions": [{"name": "main", "instrs": [
//!     {"dest": "x", "type": "int", "op": "const", "value": 1},
//!     {"op": "jmp", "labels": ["use"]},
//!     {"label": "use"},
//!     {"op": "print", "args": ["x"]}
//! ]}]}"#)?;
//!
//! let cfg = ControlFlowGraph::from_function(&program.functions[0])?;
//! let live = live_variables(&cfg, &AnalysisConfig::default())?;
//! assert_eq!(live.render_out(cfg.entry()), "x");
//! assert_eq!(live.render_in(cfg.entry()), "∅");
//! # Ok::<(), brilflow::Error>(())
//! ```

mod framework;
mod lattice;
mod liveness;
mod reaching;
mod solver;
mod varset;

pub use framework::{AnalysisResults, DataFlowAnalysis, Direction};
pub use lattice::MeetSemiLattice;
pub use liveness::LiveVariables;
pub use reaching::ReachingDefinitions;
pub use solver::DataFlowSolver;
pub use varset::{VarSet, VarTable, EMPTY_SET};

use crate::{analysis::cfg::ControlFlowGraph, utils::graph::NodeId, AnalysisConfig, Result};

/// Per-block variable sets together with the table that names them.
#[derive(Debug, Clone)]
pub struct VariableFlow {
    vars: VarTable,
    results: AnalysisResults<VarSet>,
}

impl VariableFlow {
    /// The variable numbering.
    #[must_use]
    pub fn vars(&self) -> &VarTable {
        &self.vars
    }

    /// The raw per-block sets.
    #[must_use]
    pub fn results(&self) -> &AnalysisResults<VarSet> {
        &self.results
    }

    /// Sorted names at the entry of `node`.
    #[must_use]
    pub fn in_names(&self, node: NodeId) -> Vec<&str> {
        self.results
            .in_state(node)
            .map(|s| self.vars.names_of(s))
            .unwrap_or_default()
    }

    /// Sorted names at the exit of `node`.
    #[must_use]
    pub fn out_names(&self, node: NodeId) -> Vec<&str> {
        self.results
            .out_state(node)
            .map(|s| self.vars.names_of(s))
            .unwrap_or_default()
    }

    /// Entry set of `node` rendered as `a, b` or `∅`.
    #[must_use]
    pub fn render_in(&self, node: NodeId) -> String {
        self.results
            .in_state(node)
            .map_or_else(|| EMPTY_SET.to_string(), |s| self.vars.render(s))
    }

    /// Exit set of `node` rendered as `a, b` or `∅`.
    #[must_use]
    pub fn render_out(&self, node: NodeId) -> String {
        self.results
            .out_state(node)
            .map_or_else(|| EMPTY_SET.to_string(), |s| self.vars.render(s))
    }
}

/// Runs [`ReachingDefinitions`] over `cfg`.
///
/// # Errors
///
/// Returns [`crate::Error::IterationLimit`] if the solver does not converge within the
/// configured bound.
pub fn reaching_definitions(cfg: &ControlFlowGraph, config: &AnalysisConfig) -> Result<VariableFlow> {
    let vars = VarTable::from_cfg(cfg);
    let limit = config.dataflow_iterations(cfg.block_count(), vars.len());
    let results = DataFlowSolver::new(ReachingDefinitions::new(cfg, &vars), limit).solve(cfg)?;
    Ok(VariableFlow { vars, results })
}

/// Runs [`LiveVariables`] over `cfg`.
///
/// # Errors
///
/// Returns [`crate::Error::IterationLimit`] if the solver does not converge within the
/// configured bound.
pub fn live_variables(cfg: &ControlFlowGraph, config: &AnalysisConfig) -> Result<VariableFlow> {
    let vars = VarTable::from_cfg(cfg);
    let limit = config.dataflow_iterations(cfg.block_count(), vars.len());
    let results = DataFlowSolver::new(LiveVariables::new(&vars), limit).solve(cfg)?;
    Ok(VariableFlow { vars, results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{Function, Instruction, Literal, Param},
        Error,
    };

    fn cfg(function: Function) -> ControlFlowGraph {
        ControlFlowGraph::from_function(&function).unwrap()
    }

    fn node(cfg: &ControlFlowGraph, name: &str) -> NodeId {
        cfg.node_by_name(name).unwrap()
    }

    /// `x` assigned on both arms of a diamond, `y` only on the left.
    fn diamond() -> Function {
        Function::new(
            "diamond",
            vec![
                Instruction::label("entry"),
                Instruction::br("cond", "left", "right"),
                Instruction::label("left"),
                Instruction::constant("x", "int", Literal::Int(1)),
                Instruction::constant("y", "int", Literal::Int(2)),
                Instruction::jmp("merge"),
                Instruction::label("right"),
                Instruction::constant("x", "int", Literal::Int(3)),
                Instruction::jmp("merge"),
                Instruction::label("merge"),
                Instruction::effect("print", &["x"], &[]),
                Instruction::ret(None),
            ],
        )
        .with_params(vec![Param::new("cond", "bool")])
    }

    /// `i` counts up in a loop and is printed after it.
    fn counting_loop() -> Function {
        Function::new(
            "count",
            vec![
                Instruction::label("entry"),
                Instruction::constant("i", "int", Literal::Int(0)),
                Instruction::constant("one", "int", Literal::Int(1)),
                Instruction::label("header"),
                Instruction::value("c", "bool", "lt", &["i", "n"]),
                Instruction::br("c", "body", "exit"),
                Instruction::label("body"),
                Instruction::value("i", "int", "add", &["i", "one"]),
                Instruction::jmp("header"),
                Instruction::label("exit"),
                Instruction::effect("print", &["i"], &[]),
            ],
        )
        .with_params(vec![Param::new("n", "int")])
    }

    #[test]
    fn test_reaching_definitions_diamond() {
        let cfg = cfg(diamond());
        let flow = reaching_definitions(&cfg, &AnalysisConfig::default()).unwrap();

        assert_eq!(flow.in_names(node(&cfg, "entry")), vec!["cond"]);
        assert_eq!(flow.out_names(node(&cfg, "left")), vec!["cond", "x", "y"]);
        assert_eq!(flow.out_names(node(&cfg, "right")), vec!["cond", "x"]);
        assert_eq!(flow.in_names(node(&cfg, "merge")), vec!["cond", "x", "y"]);
        assert_eq!(flow.render_out(node(&cfg, "merge")), "cond, x, y");
    }

    #[test]
    fn test_live_variables_diamond() {
        let cfg = cfg(diamond());
        let flow = live_variables(&cfg, &AnalysisConfig::default()).unwrap();

        assert_eq!(flow.in_names(node(&cfg, "merge")), vec!["x"]);
        assert_eq!(flow.render_out(node(&cfg, "merge")), "∅");
        assert_eq!(flow.out_names(node(&cfg, "left")), vec!["x"]);
        assert!(flow.in_names(node(&cfg, "left")).is_empty());
        assert_eq!(flow.in_names(node(&cfg, "entry")), vec!["cond"]);
    }

    #[test]
    fn test_live_variables_loop() {
        let cfg = cfg(counting_loop());
        let flow = live_variables(&cfg, &AnalysisConfig::default()).unwrap();

        assert_eq!(flow.in_names(node(&cfg, "header")), vec!["i", "n", "one"]);
        assert_eq!(flow.out_names(node(&cfg, "body")), vec!["i", "n", "one"]);
        assert_eq!(flow.in_names(node(&cfg, "exit")), vec!["i"]);
        assert_eq!(flow.in_names(node(&cfg, "entry")), vec!["n"]);
    }

    #[test]
    fn test_read_then_write_stays_live() {
        let cfg = cfg(Function::new(
            "f",
            vec![
                Instruction::value("x", "int", "add", &["x", "y"]),
                Instruction::ret(Some("x")),
            ],
        ));
        let flow = live_variables(&cfg, &AnalysisConfig::default()).unwrap();
        assert_eq!(flow.in_names(cfg.entry()), vec!["x", "y"]);
    }

    #[test]
    fn test_solver_idempotent_on_fixed_point() {
        let cfg = cfg(counting_loop());
        let vars = VarTable::from_cfg(&cfg);

        let live = DataFlowSolver::new(LiveVariables::new(&vars), 1_000)
            .solve(&cfg)
            .unwrap();
        let again = DataFlowSolver::new(LiveVariables::new(&vars), 1_000)
            .solve_from(&cfg, live.clone())
            .unwrap();
        assert_eq!(live, again);
        assert_eq!(again.iterations(), cfg.block_count());

        let defined = DataFlowSolver::new(ReachingDefinitions::new(&cfg, &vars), 1_000)
            .solve(&cfg)
            .unwrap();
        let again = DataFlowSolver::new(ReachingDefinitions::new(&cfg, &vars), 1_000)
            .solve_from(&cfg, defined.clone())
            .unwrap();
        assert_eq!(defined, again);
    }

    #[test]
    fn test_iteration_limit() {
        let cfg = cfg(counting_loop());
        let config = AnalysisConfig {
            dataflow_iteration_limit: Some(2),
            ..AnalysisConfig::default()
        };
        let err = live_variables(&cfg, &config).unwrap_err();
        assert!(matches!(
            err,
            Error::IterationLimit { analysis: "live variables", limit: 2 }
        ));
    }

    #[test]
    fn test_unreachable_block_covered() {
        let cfg = cfg(Function::new(
            "f",
            vec![
                Instruction::constant("a", "int", Literal::Int(1)),
                Instruction::ret(None),
                Instruction::label("dead"),
                Instruction::effect("print", &["a"], &[]),
            ],
        ));
        let dead = node(&cfg, "dead");
        let defined = reaching_definitions(&cfg, &AnalysisConfig::default()).unwrap();
        assert!(defined.in_names(dead).is_empty());
        let live = live_variables(&cfg, &AnalysisConfig::default()).unwrap();
        assert_eq!(live.in_names(dead), vec!["a"]);
        assert_eq!(live.results().block_count(), 2);
    }

    #[test]
    fn test_parameters_do_not_reach_unreachable_islands() {
        let cfg = cfg(Function::new(
            "islands",
            vec![
                Instruction::label("entry"),
                Instruction::ret(None),
                Instruction::label("island"),
                Instruction::constant("z", "int", Literal::Int(4)),
                Instruction::jmp("shore"),
                Instruction::label("shore"),
                Instruction::effect("print", &["c", "z"], &[]),
            ],
        )
        .with_params(vec![Param::new("c", "bool")]));

        let defined = reaching_definitions(&cfg, &AnalysisConfig::default()).unwrap();
        assert_eq!(defined.in_names(cfg.entry()), vec!["c"]);
        assert!(defined.in_names(node(&cfg, "island")).is_empty());
        assert_eq!(defined.out_names(node(&cfg, "island")), vec!["z"]);
        assert_eq!(defined.in_names(node(&cfg, "shore")), vec!["z"]);

        let live = live_variables(&cfg, &AnalysisConfig::default()).unwrap();
        assert_eq!(live.in_names(node(&cfg, "island")), vec!["c"]);
    }
}
