mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // brilflow warnings on stderr; --verbose enables debug; RUST_LOG overrides
    let level = if cli.global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_module("brilflow", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let program = commands::common::load_program(cli.path.as_deref(), cli.function.as_deref())?;
    let config = commands::common::analysis_config(&cli.global);

    commands::report::run(&program, cli.mode, &config)?;
    if cli.summary {
        commands::summary::run(&program, &config, &cli.global)?;
    }
    Ok(())
}
