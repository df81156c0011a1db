//! # Versions Command Implementation
//!
//! Prints the version list a `build` would use, with the `latest` alias
//! applied, without checking anything out. Useful to check a manifest or the
//! `extra.versions` field before a long build.

use anyhow::{Context, Result};
use clap::Args;

use versioned_docs::config::BuildConfig;
use versioned_docs::manifest::{read_manifest, versions_from_config, VersionList, VersionSource};
use versioned_docs::output::{emoji, OutputConfig};

use super::{Project, ProjectArgs};

/// Print the resolved version list
#[derive(Args, Debug)]
pub struct VersionsArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the `versions` command.
pub fn execute(args: VersionsArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let project = args.project.resolve()?;
    let versions = load_versions(&project)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(versions.as_slice())?);
        return Ok(());
    }

    println!(
        "{} {} versions, in build order:",
        emoji(&out, "📋", "[LIST]"),
        versions.len()
    );
    let width = versions
        .iter()
        .map(|v| v.display_name.len())
        .max()
        .unwrap_or(0);
    for spec in &versions {
        println!("  {:<width$}  {}", spec.display_name, spec.id, width = width);
    }
    Ok(())
}

/// The manifest source does not need the site config to exist.
fn load_versions(project: &Project) -> Result<VersionList> {
    match project.settings.version_source(&project.root) {
        VersionSource::Manifest(path) => Ok(read_manifest(&path)?),
        VersionSource::ConfigField => {
            let site_config = project.settings.site_config_path(&project.root);
            let base = BuildConfig::load(&site_config).with_context(|| {
                format!("Cannot use site configuration {}", site_config.display())
            })?;
            Ok(versions_from_config(&base)?)
        }
    }
}
