//! qna CLI - Entry point
//!
//! Usage: qna <command> [options]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qnakb::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.global.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let global = cli.global;

    // Run command
    match cli.command {
        Commands::Create(args) => qnakb::cli::create::run(args, &global).await,
        Commands::Add(args) => qnakb::cli::add::run(args, &global).await,
        Commands::Update(args) => qnakb::cli::update::run(args, &global).await,
        Commands::Train(args) => qnakb::cli::train::run(args, &global).await,
        Commands::Ask(args) => qnakb::cli::ask::run(args, &global).await,
        Commands::Publish(args) => qnakb::cli::publish::run(args, &global).await,
        Commands::Delete(args) => qnakb::cli::delete::run(args, &global).await,
        Commands::DeleteEntries(args) => qnakb::cli::delete::run_entries(args, &global).await,
    }
}
