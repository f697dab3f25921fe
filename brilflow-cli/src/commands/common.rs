use std::{fs::File, io::BufReader, path::Path};

use anyhow::{bail, Context};
use brilflow::{AnalysisConfig, Program, UseBeforeDefPolicy};

use crate::app::GlobalOptions;

/// Read a program from `path`, or stdin when no path is given, keeping only `function` if set.
pub fn load_program(path: Option<&Path>, function: Option<&str>) -> anyhow::Result<Program> {
    let mut program = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open program: {}", path.display()))?;
            Program::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse program: {}", path.display()))?
        }
        None => Program::from_reader(std::io::stdin().lock())
            .context("failed to parse program from stdin")?,
    };

    if let Some(name) = function {
        program.functions.retain(|f| f.name == name);
        if program.functions.is_empty() {
            bail!("no function named '{name}' in the program");
        }
    }
    Ok(program)
}

/// Translate command-line flags into an analysis configuration.
pub fn analysis_config(opts: &GlobalOptions) -> AnalysisConfig {
    let policy = if opts.strict {
        UseBeforeDefPolicy::Reject
    } else {
        UseBeforeDefPolicy::PassThrough
    };
    AnalysisConfig::default()
        .with_use_before_def(policy)
        .with_verification(!opts.no_verify)
        .with_parallel(!opts.sequential)
}
