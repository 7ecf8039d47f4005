use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "episode-server", version, about = "Episode source resolver and media relay")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags that take precedence over the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// RON configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Address the HTTP service listens on, e.g. `0.0.0.0:8787`.
    #[arg(long, global = true)]
    pub listen: Option<String>,

    /// Base URL of the catalog service.
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    /// Base URL of the bypass service.
    #[arg(long, global = true)]
    pub bypass: Option<String>,

    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service.
    Serve,
    /// Collect the best direct link of every episode of a series.
    Harvest {
        /// Series session identifier.
        #[arg(long)]
        session: String,
        /// Number of catalog pages; discovered from the first page when omitted.
        #[arg(long)]
        pages: Option<u32>,
        /// Write the bare link list to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve one episode and print its ranked sources.
    Sources {
        #[arg(long)]
        session: String,
        /// Episode session identifier.
        #[arg(long)]
        episode: String,
    },
}
