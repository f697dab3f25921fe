use std::path::PathBuf;

use brilflow::Mode;
use clap::Parser;

/// brilflow - control-flow, dataflow, dominator and SSA analysis for Bril programs
#[derive(Debug, Parser)]
#[command(name = "brilflow", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Analysis to run: cfg, dom, tree, front, live, defined, loops, or ssa.
    #[arg(value_name = "MODE")]
    pub mode: Mode,

    /// Bril JSON program to read. Reads stdin when omitted.
    #[arg(value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Analyze only the function with this name.
    #[arg(long, value_name = "NAME")]
    pub function: Option<String>,

    /// Print a per-function summary table on stderr after the report.
    #[arg(long)]
    pub summary: bool,
}

/// Options shared by every mode.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit the summary as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Fail on reads of variables that have no reaching definition.
    #[arg(long)]
    pub strict: bool,

    /// Skip the ancestor-walk check of computed dominators.
    #[arg(long)]
    pub no_verify: bool,

    /// Analyze functions one after another instead of concurrently.
    #[arg(long)]
    pub sequential: bool,
}
