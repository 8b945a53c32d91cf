//! Scribe CLI - Command-line interface for the scribe audit trail.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;
mod storage;

use commands::{Cli, Commands};

fn main() -> Result<()> {
    // Logs go to stderr so command output stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("scribe {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let logger = commands::open_logger(&cli.store)?;

    match cli.command {
        Commands::Record(args) => commands::record::run(&args, &logger),
        Commands::Events(args) => commands::events::run(&args, &logger),
        Commands::Logs(args) => commands::logs::run(&args, &logger),
        Commands::Clear(args) => commands::clear::run(&args, &logger),
        Commands::Replay(args) => commands::replay::run(&args, &logger),
        Commands::Version => Ok(()),
    }
}
