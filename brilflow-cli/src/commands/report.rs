use std::io::Write;

use anyhow::Context;
use brilflow::{report::write_report, AnalysisConfig, Mode, Program};

pub fn run(program: &Program, mode: Mode, config: &AnalysisConfig) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(program, mode, config, &mut out)
        .with_context(|| format!("{mode} analysis failed"))?;
    out.flush()?;
    Ok(())
}
