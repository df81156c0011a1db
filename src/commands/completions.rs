//! # Completions Command Implementation
//!
//! This module implements the `completions` subcommand. It prints a shell
//! completion script generated by `clap_complete` from the [`Cli`]
//! definition, so every subcommand and flag completes without a
//! hand-maintained script.
//!
//! ## Installing
//!
//! | Shell      | Where the script goes                                      |
//! |------------|------------------------------------------------------------|
//! | bash       | `~/.local/share/bash-completion/completions/versioned-docs` |
//! | zsh        | `_versioned-docs` in a directory on `fpath`                 |
//! | fish       | `~/.config/fish/completions/versioned-docs.fish`            |
//! | powershell | dot-source the output from `$PROFILE`                       |
//! | elvish     | `eval` the output from `rc.elv`                             |
//!
//! ```bash
//! versioned-docs completions bash > ~/.local/share/bash-completion/completions/versioned-docs
//! versioned-docs completions zsh > ~/.zfunc/_versioned-docs
//! ```
//!
//! Regenerate the script after upgrading so new flags are offered.

use anyhow::Result;
use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};
use std::io::{self, Write};

use crate::cli::Cli;

/// Shells a completion script can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::PowerShell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Write the completion script for `shell` to `out`.
///
/// The binary name comes from the `Cli` definition so the script always
/// matches the command it completes.
pub fn write_completions(shell: CompletionShell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(Shell::from(shell), &mut cmd, bin_name, out);
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_completions(args.shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}
