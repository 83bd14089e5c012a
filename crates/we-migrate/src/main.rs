//! we-migrate: convert Weex `.we` components to Vue single-file components.

mod cli;
mod config;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use config::{MigrateConfig, Settings};
use miette::Result;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = MigrateConfig::load(&args.config)?;
    let settings = Settings::resolve(args, config);
    let report = orchestrator::run(&settings)?;

    print!("{}", report.render(settings.format));

    if report.summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
