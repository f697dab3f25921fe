//! Deterministic text reports, one per analysis mode.
//!
//! Every report lists functions in program order under an `@name` header, and blocks in
//! layout order indented by two spaces. Name sets are sorted and joined with `, `; an empty
//! set prints as `∅`. Blocks without a path from the entry print `unreachable` in the
//! dominance reports.
//!
//! ```text
//! @main
//!   entry: entry
//!   left: entry, left
//!   merge: entry, merge
//! ```
//!
//! [`Mode::Ssa`] is the exception: it produces the converted program as pretty JSON.

use std::io::Write;

use rayon::prelude::*;
use strum::{Display, EnumIter, EnumString};

use crate::{
    analysis::{
        cfg::{find_loops, ControlFlowGraph},
        dataflow::{live_variables, reaching_definitions, VariableFlow, EMPTY_SET},
        dominators::DominatorAnalysis,
        GraphBase, NodeId,
    },
    ir::{Function, Program},
    ssa::program_to_ssa,
    AnalysisConfig, Result,
};

/// The analysis a report shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Successors of every block, with edge kinds
    Cfg,
    /// Dominator set of every block
    Dom,
    /// Dominator tree children of every block
    Tree,
    /// Dominance frontier of every block
    Front,
    /// Live variables at block entry and exit
    Live,
    /// Defined (reaching) variables at block entry and exit
    Defined,
    /// Natural loops
    Loops,
    /// The program converted to SSA form, as JSON
    Ssa,
}

impl Mode {
    /// Returns `true` if the mode produces JSON rather than a text report.
    #[must_use]
    pub fn is_json(self) -> bool {
        self == Mode::Ssa
    }
}

/// Renders the report of `mode` for one function.
///
/// For [`Mode::Ssa`] this is the converted function as pretty JSON.
///
/// # Errors
///
/// Any error raised by the analyses the mode runs.
pub fn render_function(function: &Function, mode: Mode, config: &AnalysisConfig) -> Result<String> {
    let build_cfg = || ControlFlowGraph::from_function(function);
    let mut lines = vec![format!("@{}", function.name)];

    match mode {
        Mode::Ssa => {
            let ssa = crate::ssa::to_ssa(function, config)?;
            return Ok(serde_json::to_string_pretty(&ssa.function)?);
        }
        Mode::Cfg => cfg_lines(&build_cfg()?, &mut lines),
        Mode::Dom | Mode::Tree | Mode::Front => {
            let cfg = build_cfg()?;
            let dominance = DominatorAnalysis::compute(&cfg, config)?;
            dominance_lines(&cfg, &dominance, mode, &mut lines);
        }
        Mode::Live => {
            let cfg = build_cfg()?;
            flow_lines(&cfg, &live_variables(&cfg, config)?, &mut lines);
        }
        Mode::Defined => {
            let cfg = build_cfg()?;
            flow_lines(&cfg, &reaching_definitions(&cfg, config)?, &mut lines);
        }
        Mode::Loops => {
            let cfg = build_cfg()?;
            let dominance = DominatorAnalysis::compute(&cfg, config)?;
            loop_lines(&cfg, &dominance, &mut lines);
        }
    }

    Ok(lines.join("\n"))
}

/// Renders the report of `mode` for every function of `program`.
///
/// # Errors
///
/// The first error in function order.
pub fn render_program(program: &Program, mode: Mode, config: &AnalysisConfig) -> Result<String> {
    if mode == Mode::Ssa {
        let ssa = program_to_ssa(program, config)?;
        return Ok(serde_json::to_string_pretty(&ssa)?);
    }

    let reports: Vec<Result<String>> = if config.parallel {
        program
            .functions
            .par_iter()
            .map(|function| render_function(function, mode, config))
            .collect()
    } else {
        program
            .functions
            .iter()
            .map(|function| render_function(function, mode, config))
            .collect()
    };

    let reports = reports.into_iter().collect::<Result<Vec<_>>>()?;
    Ok(reports.join("\n"))
}

/// Writes [`render_program`] to `writer`, followed by a newline.
///
/// # Errors
///
/// Analysis errors, or [`crate::Error::FileError`] if writing fails.
pub fn write_report<W: Write>(
    program: &Program,
    mode: Mode,
    config: &AnalysisConfig,
    mut writer: W,
) -> Result<()> {
    let report = render_program(program, mode, config)?;
    writeln!(writer, "{report}")?;
    Ok(())
}

fn join_or_empty<S: AsRef<str>>(names: &[S]) -> String {
    if names.is_empty() {
        EMPTY_SET.to_string()
    } else {
        names.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
    }
}

fn sorted_names(cfg: &ControlFlowGraph, nodes: impl Iterator<Item = NodeId>) -> Vec<&str> {
    let mut names: Vec<&str> = nodes.map(|n| cfg.block_name(n)).collect();
    names.sort_unstable();
    names
}

fn cfg_lines(cfg: &ControlFlowGraph, lines: &mut Vec<String>) {
    for node in cfg.node_ids() {
        let targets: Vec<String> = cfg
            .outgoing_edges(node)
            .map(|(target, kind)| format!("{} ({kind})", cfg.block_name(target)))
            .collect();
        lines.push(format!(
            "  {} -> {}",
            cfg.block_name(node),
            join_or_empty(&targets)
        ));
    }
}

fn dominance_lines(
    cfg: &ControlFlowGraph,
    dominance: &DominatorAnalysis,
    mode: Mode,
    lines: &mut Vec<String>,
) {
    for node in cfg.node_ids() {
        let name = cfg.block_name(node);
        if !dominance.is_reachable(node) {
            lines.push(format!("  {name}: unreachable"));
            continue;
        }
        let names = match mode {
            Mode::Dom => sorted_names(cfg, dominance.sets().dominators(node)),
            Mode::Tree => sorted_names(cfg, dominance.tree().children(node).iter().copied()),
            _ => sorted_names(cfg, dominance.frontier().frontier(node)),
        };
        lines.push(format!("  {name}: {}", join_or_empty(&names)));
    }
}

fn flow_lines(cfg: &ControlFlowGraph, flow: &VariableFlow, lines: &mut Vec<String>) {
    for node in cfg.node_ids() {
        lines.push(format!("  {}:", cfg.block_name(node)));
        lines.push(format!("    in:  {}", flow.render_in(node)));
        lines.push(format!("    out: {}", flow.render_out(node)));
    }
}

fn loop_lines(cfg: &ControlFlowGraph, dominance: &DominatorAnalysis, lines: &mut Vec<String>) {
    let loops = find_loops(cfg, dominance);
    if loops.is_empty() {
        lines.push("  no loops".to_string());
        return;
    }
    for natural in loops {
        let latches = sorted_names(cfg, natural.latches.iter().copied());
        let body = sorted_names(cfg, natural.blocks());
        lines.push(format!(
            "  loop {}: depth {}, latches {}, body {}",
            cfg.block_name(natural.header),
            natural.depth,
            join_or_empty(&latches),
            join_or_empty(&body)
        ));
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    const DIAMOND: &str = r#"{"functions": [{"name": "main", "instrs": [
        {"label": "entry"},
        {"dest": "c", "type": "bool", "op": "const", "value": true},
        {"op": "br", "args": ["c"], "labels": ["b1", "b2"]},
        {"label": "b1"}, {"dest": "x", "type": "int", "op": "const", "value": 1},
        {"op": "jmp", "labels": ["merge"]},
        {"label": "b2"}, {"dest": "x", "type": "int", "op": "const", "value": 2},
        {"op": "jmp", "labels": ["merge"]},
        {"label": "merge"}, {"op": "print", "args": ["x"]}, {"op": "ret"}
    ]}]}"#;

    fn report(mode: Mode) -> String {
        let program = Program::from_json_str(DIAMOND).unwrap();
        render_program(&program, mode, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_mode_names() {
        let names: Vec<String> = Mode::iter().map(|m| m.to_string()).collect();
        assert_eq!(
            names,
            vec!["cfg", "dom", "tree", "front", "live", "defined", "loops", "ssa"]
        );
        assert_eq!("front".parse::<Mode>().unwrap(), Mode::Front);
        assert!("frontier".parse::<Mode>().is_err());
        assert!(Mode::Ssa.is_json());
        assert!(!Mode::Dom.is_json());
    }

    #[test]
    fn test_dom_report() {
        assert_eq!(
            report(Mode::Dom),
            "@main\n  entry: entry\n  b1: b1, entry\n  b2: b2, entry\n  merge: entry, merge"
        );
    }

    #[test]
    fn test_tree_and_front_reports() {
        assert_eq!(
            report(Mode::Tree),
            "@main\n  entry: b1, b2, merge\n  b1: ∅\n  b2: ∅\n  merge: ∅"
        );
        assert_eq!(
            report(Mode::Front),
            "@main\n  entry: ∅\n  b1: merge\n  b2: merge\n  merge: ∅"
        );
    }

    #[test]
    fn test_cfg_report() {
        let text = report(Mode::Cfg);
        assert!(text.contains("  entry -> b1 (branch_true), b2 (branch_false)"));
        assert!(text.contains("  b1 -> merge (jump)"));
        assert!(text.contains("  merge -> ∅"));
    }

    #[test]
    fn test_flow_reports() {
        let live = report(Mode::Live);
        assert!(live.contains("  merge:\n    in:  x\n    out: ∅"));
        let defined = report(Mode::Defined);
        assert!(defined.contains("  merge:\n    in:  c, x\n    out: c, x"));
    }

    #[test]
    fn test_loops_and_unreachable() {
        let program = Program::from_json_str(
            r#"{"functions": [{"name": "spin", "instrs": [
                {"label": "top"}, {"op": "jmp", "labels": ["top"]},
                {"label": "dead"}, {"op": "ret"}
            ]}]}"#,
        )
        .unwrap();
        let config = AnalysisConfig::default();

        let loops = render_program(&program, Mode::Loops, &config).unwrap();
        assert!(loops.contains("  loop top: depth 0, latches top, body top"));

        let dom = render_program(&program, Mode::Dom, &config).unwrap();
        assert!(dom.contains("  dead: unreachable"));
    }

    #[test]
    fn test_ssa_report_is_json() {
        let json = report(Mode::Ssa);
        let parsed = Program::from_json_str(&json).unwrap();
        assert_eq!(parsed.functions[0].name, "main");
        assert!(parsed.functions[0].has_phis());
    }

    #[test]
    fn test_render_single_function() {
        let program = Program::from_json_str(DIAMOND).unwrap();
        let main = &program.functions[0];
        let config = AnalysisConfig::default();

        let ssa = render_function(main, Mode::Ssa, &config).unwrap();
        assert!(!ssa.starts_with('@'));
        let converted: Function = serde_json::from_str(&ssa).unwrap();
        assert!(converted.has_phis());

        let front = render_function(main, Mode::Front, &config).unwrap();
        assert_eq!(front, report(Mode::Front));
    }

    #[test]
    fn test_write_report_appends_newline() {
        let program = Program::from_json_str(DIAMOND).unwrap();
        let mut out = Vec::new();
        write_report(&program, Mode::Front, &AnalysisConfig::default(), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("merge: ∅\n"));
    }
}
