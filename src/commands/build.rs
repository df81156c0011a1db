//! # Build Command Implementation
//!
//! This module implements the `build` subcommand, which builds one site per
//! listed version into the output directory.
//!
//! ## Flow
//!
//! 1. Resolve the repository root and effective settings.
//! 2. Load the base site configuration and the version list. Any failure
//!    here is a setup error: nothing is checked out and no output directory
//!    is created.
//! 3. Run the orchestrator with the system `git` and the configured builder.
//! 4. Print one line per version and the summary (or the whole result as
//!    JSON with `--json`).
//!
//! Failing versions do not fail the command unless `--strict` is given.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::env;

use versioned_docs::builder::CommandBuilder;
use versioned_docs::checkout::{ExecutionMode, SystemGit};
use versioned_docs::config::BuildConfig;
use versioned_docs::defaults::BUILD_ENVIRONMENT_VAR;
use versioned_docs::manifest::read_versions;
use versioned_docs::orchestrator::{Orchestrator, RestorePolicy};
use versioned_docs::output::{emoji, outcome_line, summary_line, OutputConfig};

use super::{ProjectArgs, COMMAND_LINE};

/// Build the documentation site of every listed version
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Builder command line; output and config flags are appended
    #[arg(long, value_name = "COMMAND")]
    pub builder: Option<String>,

    /// Branch to return to when running unattended
    #[arg(long, value_name = "BRANCH")]
    pub base_branch: Option<String>,

    /// How the return point is found (interactive or unattended).
    ///
    /// Defaults to unattended when BUILD_ENVIRONMENT is `jenkins` or `ci`.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ExecutionMode>,

    /// When to check the return point out again (per-version or end-of-run)
    #[arg(long, value_name = "POLICY")]
    pub restore: Option<RestorePolicy>,

    /// Skip `git submodule update` after each checkout
    #[arg(long)]
    pub no_submodules: bool,

    /// Print the build result as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Exit with an error if any version failed to build
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `build` command.
pub fn execute(args: BuildArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let project = args.project.resolve()?;
    let root = project.root;
    let mut settings = project.settings;

    if let Some(builder) = args.builder {
        settings.builder = builder;
    }
    if let Some(branch) = args.base_branch {
        settings.base_branch = branch;
    }
    if let Some(restore) = args.restore {
        settings.restore = restore;
    }
    if args.no_submodules {
        settings.update_submodules = false;
    }
    settings.validate(COMMAND_LINE)?;

    let mode = args.mode.unwrap_or_else(|| {
        ExecutionMode::from_build_environment(env::var(BUILD_ENVIRONMENT_VAR).ok().as_deref())
    });
    log::debug!("Execution mode: {:?}", mode);

    let site_config = settings.site_config_path(&root);
    let base = BuildConfig::load(&site_config)
        .with_context(|| format!("Cannot use site configuration {}", site_config.display()))?;
    let versions = read_versions(&settings.version_source(&root), &base)?;

    let builder = CommandBuilder::from_command_line(&settings.builder, &root)?
        .with_flags(&settings.site_dir_flag, &settings.config_flag);
    let orchestrator = Orchestrator::new(
        settings.orchestrator_config(&root, mode),
        Box::new(SystemGit::new(&root)),
        Box::new(builder),
    );

    if !args.json {
        println!(
            "{} Building {} versions into {}",
            emoji(&out, "📚", "[BUILD]"),
            versions.len(),
            orchestrator.config().staging_root.display()
        );
    }

    let result = orchestrator.run(&base, &versions)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for outcome in &result.versions {
            println!("{}", outcome_line(&out, outcome));
        }
        println!("{}", summary_line(&out, &result));
    }

    if args.strict && result.failed > 0 {
        bail!(
            "{} of {} versions failed to build",
            result.failed,
            result.total()
        );
    }

    Ok(())
}
