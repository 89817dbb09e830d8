//! CLI module for fiche
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `lookup` - Geocode an address and reconcile its DPE and DVF records
//! - `prepare` - Clean a raw DVF export into the lookup table
//! - `normalize` - Print the normalized form of an address
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Build the transaction table once
//! fiche prepare full_2023.csv --output dvf_ok.csv
//!
//! # Interactive lookup
//! ADEME_TOKEN=... fiche lookup "8 boulevard du port, Amiens"
//!
//! # Scripted lookup
//! fiche lookup "8 boulevard du port, Amiens" --non-interactive --json
//! ```

pub mod chooser;
pub mod completions;
pub mod config;
pub mod lookup;
pub mod normalize;
pub mod output;
pub mod prepare;

pub use chooser::{Console, StdinChooser};
pub use completions::handle_completions;
pub use config::handle_config_init;
pub use lookup::handle_lookup;
pub use normalize::handle_normalize;
pub use prepare::handle_prepare;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// fiche - property record lookup from public French datasets
#[derive(Parser, Debug)]
#[command(
    name = "fiche",
    version,
    about = "Reconcile energy diagnostics (DPE) and property sales (DVF) for an address"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up an address
    Lookup(LookupArgs),
    /// Build the transaction table from a raw DVF export
    Prepare(PrepareArgs),
    /// Print the normalized form of an address
    Normalize(NormalizeArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Address to look up (prompted for when omitted)
    pub address: Option<String>,

    /// Path to configuration file
    #[arg(short, long, default_value = "fiche.toml")]
    pub config: PathBuf,

    /// Override the transaction table path
    #[arg(long)]
    pub dvf: Option<PathBuf>,

    /// Match diagnostics on the address text instead of coordinates
    #[arg(long)]
    pub by_address: bool,

    /// Skip the parcel lookup
    #[arg(long)]
    pub no_parcels: bool,

    /// Always take the first option instead of prompting
    #[arg(long)]
    pub non_interactive: bool,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FICHE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Raw DVF CSV export
    pub input: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = "dvf_ok.csv")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Address words, joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub address: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "fiche.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
