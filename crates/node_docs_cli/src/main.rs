//! node-docs: generate markdown documentation for a node repository

mod docs;

use clap::Parser;
use std::process;

fn main() {
    let cli = docs::Cli::parse();
    init_tracing(cli.quiet);

    if let Err(e) = docs::run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// `NODE_DOCS_LOG` sets the filter; otherwise `info`, or `error` when quiet.
fn init_tracing(quiet: bool) {
    use tracing_subscriber::EnvFilter;
    let fallback = if quiet { "error" } else { "info" };
    let filter =
        EnvFilter::try_from_env("NODE_DOCS_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
