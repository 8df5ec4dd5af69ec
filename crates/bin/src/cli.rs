//! CLI argument definitions for the Biosession binary.

use std::path::PathBuf;

use biosession::storage::{Platform, selector::DEFAULT_SERVICE_NAME};
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Inspect and manage cached biometric sessions on this device
#[derive(Parser, Debug)]
#[command(name = "biosession")]
#[command(about = "Biosession: inspect and manage cached biometric sessions")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List cached accounts, most recently used first
    List,
    /// Show the active account, if its session is still live
    Active,
    /// Forget one account and its credential
    Remove(RemoveArgs),
    /// Forget every account and credential
    Clear(ClearArgs),
    /// Show which storage backend is selected
    Backend,
}

/// Where sessions are stored
#[derive(clap::Args, Debug)]
pub struct StorageArgs {
    /// Data directory for the general key-value store (biosession.json)
    #[arg(short = 'D', long, global = true, env = "BIOSESSION_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Platform family to select storage for (web, android, apple, desktop).
    /// Defaults to the platform this binary was built for.
    #[arg(long, global = true, env = "BIOSESSION_PLATFORM")]
    pub platform: Option<Platform>,

    /// Keyring service name for the secure store
    #[arg(long, global = true, default_value = DEFAULT_SERVICE_NAME, env = "BIOSESSION_SERVICE")]
    pub service: String,
}

/// Arguments for the remove command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// User id of the account to forget
    pub user_id: String,
}

/// Arguments for the clear command
#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation check
    #[arg(short, long)]
    pub yes: bool,
}
