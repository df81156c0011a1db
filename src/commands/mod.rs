//! # CLI Command Implementations
//!
//! Each subcommand of `versioned-docs` lives in its own file with an `Args`
//! struct derived with `clap` and an `execute` function that calls into the
//! `versioned_docs` library.
//!
//! Commands that work on a repository share [`ProjectArgs`], which resolves
//! the working directory and layers command-line overrides on top of the
//! `.versioned-docs.yaml` settings.

pub mod build;
pub mod clean;
pub mod completions;
pub mod versions;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use versioned_docs::settings::{Settings, VersionsFrom};

/// Options shared by every command that operates on a repository.
#[derive(Args, Debug, Default)]
pub struct ProjectArgs {
    /// Path to the tool settings file.
    ///
    /// Defaults to `.versioned-docs.yaml` in the working directory, if present.
    #[arg(short, long, value_name = "FILE", env = "VERSIONED_DOCS_SETTINGS")]
    pub config: Option<PathBuf>,

    /// Repository root to build from.
    ///
    /// If not provided, it defaults to the current working directory.
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Base site configuration passed to the builder (default: mkdocs.yml)
    #[arg(long, value_name = "FILE")]
    pub site_config: Option<PathBuf>,

    /// Manifest listing the versions to build, one per line
    #[arg(short, long, value_name = "FILE", conflicts_with = "from_config")]
    pub manifest: Option<PathBuf>,

    /// Read versions from `extra.versions` in the site configuration
    #[arg(long)]
    pub from_config: bool,

    /// Output directory holding one subtree per version (default: version)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Origin reported when settings overridden by flags fail validation.
pub const COMMAND_LINE: &str = "command-line options";

/// A repository root together with its effective settings.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub settings: Settings,
}

impl ProjectArgs {
    /// Resolve the repository root and apply overrides to its settings.
    pub fn resolve(&self) -> Result<Project> {
        let root = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        // Staged paths are handed to the builder, which runs elsewhere
        let root = root
            .canonicalize()
            .with_context(|| format!("Working directory '{}' is not accessible", root.display()))?;

        let mut settings = Settings::discover(self.config.as_deref(), &root)?;
        if let Some(site_config) = &self.site_config {
            settings.site_config = site_config.clone();
        }
        if let Some(manifest) = &self.manifest {
            settings.manifest = manifest.clone();
            settings.versions_from = VersionsFrom::Manifest;
        }
        if self.from_config {
            settings.versions_from = VersionsFrom::Config;
        }
        if let Some(output) = &self.output {
            settings.output_dir = output.clone();
        }
        settings.validate(COMMAND_LINE)?;

        Ok(Project { root, settings })
    }
}
