//! Default values for versioned-docs settings.
//!
//! This module provides centralized default values used across the settings
//! loader and the CLI, ensuring consistency and avoiding duplication.

/// Tool settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = ".versioned-docs.yaml";

/// Base site configuration consumed by the builder.
pub const SITE_CONFIG: &str = "mkdocs.yml";

/// Newline-delimited list of revisions to build.
pub const MANIFEST: &str = "versions.txt";

/// Output root; holds one subtree per built version.
pub const OUTPUT_DIR: &str = "version";

/// Documentation sources inside the working tree.
pub const DOCS_DIR: &str = "src";

/// Auxiliary code examples, absent in older revisions.
pub const EXAMPLES_DIR: &str = "code-examples";

/// Version-independent theme overrides, present on the base branch only.
pub const THEME_DIR: &str = "theme";

/// Builder command line, before the output and config flags are appended.
pub const BUILDER: &str = "mkdocs build";

pub const SITE_DIR_FLAG: &str = "-d";

pub const CONFIG_FLAG: &str = "-f";

/// Return branch used when running unattended.
pub const BASE_BRANCH: &str = "master";

/// Display name given to the first version in the list.
pub const LATEST_ALIAS: &str = "latest";

/// Name of the builder output directory inside a version subtree.
pub const SITE_SUBDIR: &str = "site";

/// Environment variable read by the CLI to pick the execution mode.
pub const BUILD_ENVIRONMENT_VAR: &str = "BUILD_ENVIRONMENT";
