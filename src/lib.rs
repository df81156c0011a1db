//! # Versioned Documentation Builder
//!
//! This library builds one static documentation site per version of a
//! repository, using a single shared working tree. It is designed to be used
//! by the `versioned-docs` command-line tool but the orchestrator can be
//! driven directly, with any [`checkout::VcsOperations`] and
//! [`builder::SiteBuilder`] implementation.
//!
//! ## Quick Example
//!
//! ```
//! use versioned_docs::config::BuildConfig;
//! use versioned_docs::manifest::{parse_manifest, VersionList};
//!
//! // The first manifest entry is always published as "latest"
//! let versions = VersionList::new(parse_manifest("v2.0\nv1.1\n\nv1.0\n"), "versions.txt").unwrap();
//! assert_eq!(versions.display_names(), vec!["latest", "v1.1", "v1.0"]);
//!
//! // The site config is kept as an open YAML document
//! let config = BuildConfig::from_yaml_str("site_name: Guide\n", "mkdocs.yml").unwrap();
//! assert!(config.get("site_name").is_some());
//! ```
//!
//! ## Core Concepts
//!
//! - **Versions (`manifest`)**: The ordered list of revisions to build, read
//!   from a manifest file or from the site config's `extra.versions` field.
//! - **Site config (`config`)**: The builder's YAML config, patched per
//!   version with the version list, docs location and theme directory.
//! - **Checkouts (`checkout`, `git`)**: Moves the shared working tree between
//!   revisions and back to where the run started.
//! - **Staging (`staging`)**: Per-version copies of the sources, so each
//!   build reads a frozen snapshot rather than the live tree.
//! - **Builds (`builder`)**: The external site generator, invoked once per
//!   version.
//! - **Orchestration (`orchestrator`)**: The sequential per-version state
//!   machine tying all of the above together.
//!
//! Tool-level settings (`.versioned-docs.yaml`) live in `settings`.

pub mod builder;
pub mod checkout;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod settings;
pub mod staging;
