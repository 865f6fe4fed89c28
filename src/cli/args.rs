//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--project <path>`: Project directory holding `crosswire.toml`
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Crosswire - configuration propagation between infrastructure modules
#[derive(Parser, Debug)]
#[command(name = "cw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project directory holding crosswire.toml (default: current directory)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The project directory to resolve configuration from.
    pub fn project_dir(&self) -> PathBuf {
        self.project.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Shells supported for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Provision a stage's store and shared resources
    #[command(
        name = "bootstrap",
        long_about = "Provision a stage's config store and shared resources.\n\n\
            Runs the foundation module: ensures the stage's store table, shared \
            cryptographic key, and shared log sink exist, then publishes their \
            identifiers as ordinary outputs under producer 'foundation'. Every \
            resource has a deterministic stage-scoped identity, so re-running \
            for the same stage converges instead of duplicating.",
        after_help = "\
WORKFLOW EXAMPLES:
    # First command to run against a new stage
    cw bootstrap --stage dev

    # Safe to re-run; overwrites foundation outputs in place
    cw bootstrap --stage dev"
    )]
    Bootstrap {
        /// Stage to bootstrap
        #[arg(long)]
        stage: String,
    },

    /// Resolve configuration references from a stage's store
    #[command(
        name = "get",
        long_about = "Resolve one or more 'producer.property' references.\n\n\
            References are parsed before any network call (a malformed reference \
            fails immediately), deduplicated, fetched in batches, and validated \
            as a set: if any requested reference is absent the whole command \
            fails and names the missing references and the store queried.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Read one value
    cw get foundation.createdAt --stage dev

    # Read several at once (one batched fetch)
    cw get net.vpcId net.subnetIds foundation.sharedKeyArn --stage dev"
    )]
    Get {
        /// References to resolve ("<producer>.<property>")
        #[arg(required = true)]
        references: Vec<String>,

        /// Stage whose store to query
        #[arg(long)]
        stage: String,
    },

    /// Publish outputs for a producer from a values file
    #[command(
        name = "publish",
        long_about = "Publish configuration outputs for a producer.\n\n\
            Reads a JSON array of {property, value, type} entries, validates \
            each value against its declared type, and writes them through the \
            batching writer (chunks of at most 25, strictly in order, abort on \
            first failure). Intended for publishing values produced outside a \
            module synthesis run.",
        after_help = "\
VALUES FILE FORMAT:
    [
      {\"property\": \"vpcId\", \"value\": \"vpc-123\", \"type\": \"string\"},
      {\"property\": \"apiUrl\", \"value\": \"https://api.example.com\", \"type\": \"url\"}
    ]"
    )]
    Publish {
        /// Producer name to publish under
        #[arg(long)]
        producer: String,

        /// Path to the JSON values file
        #[arg(long)]
        from: PathBuf,

        /// Stage whose store to write
        #[arg(long)]
        stage: String,
    },

    /// Show a module's descriptor
    #[command(
        name = "describe",
        long_about = "Show a module's local descriptor: its required inputs and \
            the output schema it has declared. The descriptor mirrors schema \
            only, never live values."
    )]
    Describe {
        /// Module directory holding crosswire.module.json
        #[arg(long)]
        module: PathBuf,
    },

    /// Generate shell completion scripts
    #[command(name = "completion")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
