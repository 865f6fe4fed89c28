//! cli
//!
//! Command-line interface layer for Crosswire.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT talk to the store or filesystem directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! the library layers ([`crate::share`], [`crate::lifecycle`],
//! [`crate::foundation`]); the async runtime lives only here, at the
//! dispatch boundary.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;

use crate::ui::output::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    let project_dir = cli.project_dir();

    let runtime = tokio::runtime::Runtime::new()?;
    match cli.command {
        args::Command::Bootstrap { stage } => {
            runtime.block_on(commands::bootstrap(&project_dir, &stage, verbosity))
        }
        args::Command::Get { references, stage } => {
            runtime.block_on(commands::get(&project_dir, &references, &stage, verbosity))
        }
        args::Command::Publish {
            producer,
            from,
            stage,
        } => runtime.block_on(commands::publish(
            &project_dir,
            &producer,
            &from,
            &stage,
            verbosity,
        )),
        args::Command::Describe { module } => commands::describe(&module),
        args::Command::Completion { shell } => commands::completion(shell),
    }
}
