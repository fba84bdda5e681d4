//! `cem` CLI entry point.

use clap::Parser;
use cem_analyzer::cli::{self, Cli, Commands, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

fn init_tracing(dev: bool) {
    // CEM_LOG takes precedence; otherwise warnings only, or debug with --dev.
    let default = if dev { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("CEM_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.dev);

    let result = match &cli.command {
        Commands::Analyze(args) => cli::run_analyze(args, cli.dev),
        Commands::Bundle(args) => cli::run_bundle(args, cli.dev),
        Commands::Merge(args) => cli::run_merge(args),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
