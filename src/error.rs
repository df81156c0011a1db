//! # Error Handling
//!
//! This module defines the error types for `versioned-docs`. It uses the
//! `thiserror` library to describe every anticipated failure with enough
//! context to diagnose it without re-running the build.
//!
//! ## Key Components
//!
//! - **`Error`**: Every failure raised by the library. Setup-phase variants
//!   (manifest, settings, base config, output cleanup) abort a run before any
//!   version is attempted. The remaining variants (`GitCommand`, `Builder`,
//!   `Filesystem`, `Io`) describe what went wrong inside a single step.
//!
//! - **`Step`**: The per-version step in which a failure occurred.
//!
//! - **`VersionFailure`**: A step failure tied to the version it happened in.
//!   The orchestrator converts every per-version `Error` into one of these,
//!   counts it and moves on to the next version. It never escapes a run.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Main error type for versioned-docs operations
#[derive(Error, Debug)]
pub enum Error {
    /// The version manifest could not be read.
    #[error("Manifest read error for {path}: {message}")]
    ManifestRead { path: String, message: String },

    /// The version list resolved to nothing.
    #[error("No versions to build: {origin} is empty")]
    EmptyVersionList {
        /// Where the versions were read from (manifest path or config field)
        origin: String,
    },

    /// A version entry cannot be used as-is.
    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    /// The base site configuration could not be loaded or is malformed.
    #[error("Configuration error in {path}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        path: String,
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The tool settings file could not be loaded.
    #[error("Settings error in {path}: {message}")]
    Settings { path: String, message: String },

    /// The output root could not be removed or recreated.
    #[error("Output cleanup error for {path}: {message}")]
    OutputCleanup { path: String, message: String },

    /// A git command failed or could not be spawned.
    #[error("Git command failed: {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// The site builder exited unsuccessfully or could not be spawned.
    #[error("Builder command failed: {command}{}\n{stderr}", status.map(|c| format!(" (exit code {})", c)).unwrap_or_default())]
    Builder {
        command: String,
        /// Exit code, when the process ran to completion
        status: Option<i32>,
        stderr: String,
    },

    /// An error occurred with a filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The per-version step a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Checkout,
    Submodules,
    ConfigWrite,
    Staging,
    Restore,
    Build,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Checkout => "checkout",
            Step::Submodules => "submodule update",
            Step::ConfigWrite => "config write",
            Step::Staging => "source staging",
            Step::Restore => "restore",
            Step::Build => "build",
        };
        f.write_str(name)
    }
}

/// A failure confined to one version of the run.
#[derive(Error, Debug)]
#[error("{step} failed for version {version}: {source}")]
pub struct VersionFailure {
    /// The revision identifier of the failing version
    pub version: String,
    pub step: Step,
    #[source]
    pub source: Error,
}

impl VersionFailure {
    pub fn new(version: &str, step: Step, source: Error) -> Self {
        Self {
            version: version.to_string(),
            step,
            source,
        }
    }
}
