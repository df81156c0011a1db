//! # Versioned Docs CLI
//!
//! Binary entry point for the `versioned-docs` command-line tool. It parses
//! arguments with `clap` and dispatches to the command handlers in
//! `commands`; all build logic lives in the `versioned_docs` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
