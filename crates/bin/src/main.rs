use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("biosession=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage = &cli.storage;
    let format = cli.format;

    match &cli.command {
        Commands::List => commands::accounts::list(storage, format).await,
        Commands::Active => commands::accounts::active(storage, format).await,
        Commands::Remove(args) => commands::accounts::remove(storage, args, format).await,
        Commands::Clear(args) => commands::accounts::clear(storage, args, format).await,
        Commands::Backend => commands::backend::run(storage, format).await,
    }
}
