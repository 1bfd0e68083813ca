//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, cost::CostArgs, duty::DutyArgs, init::InitArgs,
    tariff::TariffCommands,
};
use crate::core::Role;

#[derive(Parser)]
#[command(name = "usuppli")]
#[command(author, version, about = "Usuppli landed-cost toolkit")]
#[command(long_about = "Estimate landed cost, duty, and margin for supply-chain products and manage the global tariff table.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .usuppli/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Role for tariff table access (overrides config and USUPPLI_ROLE)
    #[arg(long, global = true, value_enum)]
    pub role: Option<Role>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new Usuppli workspace
    Init(InitArgs),

    /// Landed cost, profit, and margin for a product file
    Cost(CostArgs),

    /// Resolve the effective duty rate for a country
    Duty(DutyArgs),

    /// Global tariff table management
    #[command(subcommand)]
    Tariff(TariffCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
