use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Naiad river-network training-data preparation.
#[derive(Parser)]
#[command(
    name = "naiad",
    version,
    about = "Prepare pretrain/fine-tune training arrays for river-network models"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Prepare standardized driver (feature) arrays.
    PrepX(PrepXArgs),
    /// Prepare weighted target arrays aligned to an existing X bundle.
    PrepY(PrepYArgs),
}

/// Arguments for the `prep-x` subcommand.
#[derive(clap::Args)]
pub struct PrepXArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "naiad.toml")]
    pub config: PathBuf,

    /// Override the X bundle output directory from config.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the `prep-y` subcommand.
#[derive(clap::Args)]
pub struct PrepYArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "naiad.toml")]
    pub config: PathBuf,

    /// Override the Y bundle output directory from config.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Override the exclusion-rule file from config.
    #[arg(long)]
    pub exclude: Option<PathBuf>,
}
