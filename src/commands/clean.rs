//! # Clean Command Implementation
//!
//! Removes the output directory of a previous build. Running it when there
//! is nothing to remove is not an error.

use anyhow::Result;
use clap::Args;

use versioned_docs::output::{emoji, OutputConfig};
use versioned_docs::staging::StagingRoot;

use super::ProjectArgs;

/// Remove the build output directory
#[derive(Args, Debug)]
pub struct CleanArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Execute the `clean` command.
pub fn execute(args: CleanArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let project = args.project.resolve()?;
    let staging = StagingRoot::new(project.settings.output_path(&project.root));

    if !staging.path().exists() {
        println!(
            "{} Nothing to clean at {}",
            emoji(&out, "✨", "[OK]"),
            staging.path().display()
        );
        return Ok(());
    }

    staging.clean()?;
    println!(
        "{} Removed {}",
        emoji(&out, "🧹", "[OK]"),
        staging.path().display()
    );
    Ok(())
}
