//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page through a JSON HTTP endpoint
#[derive(Parser, Debug)]
#[command(name = "pagewise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Endpoint URL, overrides `source.url`
    #[arg(short, long, global = true)]
    pub url: Option<String>,

    /// Page size, 0 for a single unbounded request
    #[arg(short, long, global = true)]
    pub limit: Option<usize>,

    /// Dot path to the records array in each response
    #[arg(long, global = true)]
    pub records_path: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load pages until the source is exhausted and print every item
    Fetch {
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Drive a paginator interactively from stdin
    Shell,

    /// Print the resolved configuration
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one item per line)
    Json,
    /// Human-readable output
    Pretty,
}
