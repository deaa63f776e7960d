//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "qbatch",
    version,
    about = "Batch preparation for neural question retrieval models",
    long_about = "Qbatch reads a question corpus, encodes it against a pretrained embedding \
                  vocabulary, parses relevance annotations, and assembles the padded \
                  title/body matrices and hinge-loss triples a retrieval model trains on."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/qbatch/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build training batches and print per-batch summaries
    Batches {
        /// Override the configured random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print summaries in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Build the single-batch variant used by the domain classifier
    DomainBatch {
        /// Override the configured random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the summary in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Build evaluation units and print per-unit summaries
    Eval {
        /// Print summaries in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
