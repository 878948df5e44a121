//! scrollback - bounded scrollback history for interactive line editors
//!
//! This is the entry point for the `scrollback` command-line tool.
//! It initializes logging and reports errors on stderr.

use clap::Parser;
use scrollback::cli::{self, Cli};
use scrollback::error::Result;
use std::process;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli::load_config(cli)?;

    // RUST_LOG wins over the configured level; `config --validate` reports
    // a bad level, so fall back to "warn" here
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli, config)
}
