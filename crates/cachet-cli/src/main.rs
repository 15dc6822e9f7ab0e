mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::List => commands::list::run(&cli.config)?,
        Commands::Verify(args) => commands::verify::run(&cli.config, &args.cache)?,
        Commands::Ping(args) => commands::ping::run(&cli.config, &args.cache)?,
    }
    Ok(())
}
