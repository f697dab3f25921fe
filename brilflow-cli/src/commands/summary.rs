use anyhow::Context;
use brilflow::{
    analysis::{
        cfg::{find_loops, ControlFlowGraph},
        dominators::DominatorAnalysis,
    },
    ssa::SsaBuilder,
    AnalysisConfig, Program,
};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct FunctionSummary {
    name: String,
    blocks: usize,
    edges: usize,
    reachable: usize,
    loops: usize,
    phis: usize,
    undefined_uses: usize,
}

/// One row per function, each built from a single CFG and dominator computation.
fn summarize(program: &Program, config: &AnalysisConfig) -> anyhow::Result<Vec<FunctionSummary>> {
    let mut rows = Vec::with_capacity(program.functions.len());
    for function in &program.functions {
        let cfg = ControlFlowGraph::from_function(function)
            .with_context(|| format!("cannot build CFG for {}", function.name))?;
        let dominance = DominatorAnalysis::compute(&cfg, config)
            .with_context(|| format!("dominator analysis failed for {}", function.name))?;
        let (_, stats) = SsaBuilder::build(&cfg, &dominance, config)
            .with_context(|| format!("SSA construction failed for {}", function.name))?;

        rows.push(FunctionSummary {
            name: function.name.clone(),
            blocks: cfg.block_count(),
            edges: cfg.edge_count(),
            reachable: cfg.reachable().count(),
            loops: find_loops(&cfg, &dominance).len(),
            phis: stats.phis,
            undefined_uses: stats.undefined_uses,
        });
    }
    Ok(rows)
}

pub fn run(program: &Program, config: &AnalysisConfig, global: &GlobalOptions) -> anyhow::Result<()> {
    let rows = summarize(program, config)?;

    print_output(&rows, global, |rows| {
        let mut tw = TabWriter::new(&[
            ("Function", Align::Left),
            ("Blocks", Align::Right),
            ("Edges", Align::Right),
            ("Reachable", Align::Right),
            ("Loops", Align::Right),
            ("Phis", Align::Right),
            ("Undefined", Align::Right),
        ]);
        for row in rows {
            tw.row(vec![
                row.name.clone(),
                row.blocks.to_string(),
                row.edges.to_string(),
                row.reachable.to_string(),
                row.loops.to_string(),
                row.phis.to_string(),
                row.undefined_uses.to_string(),
            ]);
        }
        tw.print();
    })
}
