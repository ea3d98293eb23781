//! Logweave CLI entry point.

use clap::Parser;
use logweave::cli::{self, Cli, Commands, ScanAction, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("logweave=debug")
    } else {
        EnvFilter::try_from_env("LOGWEAVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_ERROR);
        }
    };

    let result = match &cli.command {
        Commands::Insert(args) => cli::run_insert(args, &config),
        Commands::Resolve(args) => cli::run_resolve(args),
        Commands::List(args) => cli::run_scan(args, &config, ScanAction::List),
        Commands::Clean(args) => cli::run_scan(args, &config, ScanAction::Clean),
        Commands::Correct(args) => cli::run_scan(args, &config, ScanAction::Correct),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
