//! # Tool Settings
//!
//! Settings for a versioned build live in an optional `.versioned-docs.yaml`
//! file at the repository root. Every key is optional:
//!
//! ```yaml
//! site_config: mkdocs.yml
//! versions_from: manifest   # or `config` to read extra.versions
//! manifest: versions.txt
//! output_dir: version
//! docs_dir: src
//! examples_dir: code-examples   # null disables examples staging
//! theme_dir: theme
//! builder: mkdocs build
//! site_dir_flag: -d
//! config_flag: -f
//! base_branch: master
//! update_submodules: true
//! restore: per-version      # or end-of-run
//! ```
//!
//! Command-line flags override the file, and the file overrides the values in
//! [`crate::defaults`]. Relative paths are resolved against the repository
//! root when the orchestrator configuration is built.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checkout::ExecutionMode;
use crate::defaults;
use crate::error::{Error, Result};
use crate::manifest::VersionSource;
use crate::orchestrator::{OrchestratorConfig, RestorePolicy};
use crate::staging::SourceLayout;

/// Where the version list comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionsFrom {
    #[default]
    Manifest,
    Config,
}

/// Settings for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub site_config: PathBuf,
    pub versions_from: VersionsFrom,
    pub manifest: PathBuf,
    pub output_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub examples_dir: Option<PathBuf>,
    pub theme_dir: PathBuf,
    pub builder: String,
    pub site_dir_flag: String,
    pub config_flag: String,
    pub base_branch: String,
    pub update_submodules: bool,
    pub restore: RestorePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_config: PathBuf::from(defaults::SITE_CONFIG),
            versions_from: VersionsFrom::Manifest,
            manifest: PathBuf::from(defaults::MANIFEST),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            docs_dir: PathBuf::from(defaults::DOCS_DIR),
            examples_dir: Some(PathBuf::from(defaults::EXAMPLES_DIR)),
            theme_dir: PathBuf::from(defaults::THEME_DIR),
            builder: defaults::BUILDER.to_string(),
            site_dir_flag: defaults::SITE_DIR_FLAG.to_string(),
            config_flag: defaults::CONFIG_FLAG.to_string(),
            base_branch: defaults::BASE_BRANCH.to_string(),
            update_submodules: true,
            restore: RestorePolicy::PerVersion,
        }
    }
}

impl Settings {
    /// Parse settings from a YAML string.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        // An empty or comment-only file means "all defaults"
        let settings: Option<Settings> =
            serde_yaml::from_str(content).map_err(|e| Error::Settings {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        let settings = settings.unwrap_or_default();
        settings.validate(origin)?;
        Ok(settings)
    }

    /// Load settings from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::Settings {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Load `explicit` if given, otherwise the default settings file under
    /// `repo_root` if it exists, otherwise built-in defaults.
    pub fn discover(explicit: Option<&Path>, repo_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let default_path = repo_root.join(defaults::SETTINGS_FILE);
        if default_path.is_file() {
            log::debug!("Loading settings from {}", default_path.display());
            Self::from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check the path and command settings.
    ///
    /// Run again after command-line overrides are applied: the output
    /// directory is wiped on every build, so it must stay a dedicated
    /// subdirectory of the repository that holds no sources.
    pub fn validate(&self, origin: &str) -> Result<()> {
        let invalid = |message: String| Error::Settings {
            path: origin.to_string(),
            message,
        };
        let relative = |key: &str, dir: &Path| {
            normalized(dir).ok_or_else(|| {
                invalid(format!(
                    "{} must be a relative path inside the repository, got '{}'",
                    key,
                    dir.display()
                ))
            })
        };

        let output = relative("output_dir", &self.output_dir)?;
        if output.starts_with(".git") {
            return Err(invalid(format!(
                "output_dir cannot be inside .git, got '{}'",
                self.output_dir.display()
            )));
        }

        let mut staged = vec![("docs_dir", relative("docs_dir", &self.docs_dir)?)];
        if let Some(examples) = &self.examples_dir {
            staged.push(("examples_dir", relative("examples_dir", examples)?));
        }
        // The theme may live outside the repository; only guard it when it
        // is a plain relative path
        let theme = normalized(&self.theme_dir).map(|theme| ("theme_dir", theme));

        for (key, dir) in &staged {
            if dir.starts_with(defaults::SITE_SUBDIR) {
                return Err(invalid(format!(
                    "{} cannot be '{}', the builder writes its output there",
                    key,
                    defaults::SITE_SUBDIR
                )));
            }
        }
        for (key, dir) in staged.iter().chain(theme.iter()) {
            if output.starts_with(dir) || dir.starts_with(&output) {
                return Err(invalid(format!(
                    "output_dir '{}' overlaps {} '{}'; the output directory is removed on every build",
                    self.output_dir.display(),
                    key,
                    dir.display()
                )));
            }
        }

        if self.builder.trim().is_empty() {
            return Err(invalid("builder command cannot be empty".to_string()));
        }
        if self.base_branch.trim().is_empty() {
            return Err(invalid("base_branch cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Where the version list is read from, resolved against `repo_root`.
    pub fn version_source(&self, repo_root: &Path) -> VersionSource {
        match self.versions_from {
            VersionsFrom::Manifest => VersionSource::Manifest(repo_root.join(&self.manifest)),
            VersionsFrom::Config => VersionSource::ConfigField,
        }
    }

    pub fn site_config_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.site_config)
    }

    pub fn output_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.output_dir)
    }

    /// Build the orchestrator configuration for a run in `repo_root`.
    pub fn orchestrator_config(&self, repo_root: &Path, mode: ExecutionMode) -> OrchestratorConfig {
        OrchestratorConfig {
            repo_root: repo_root.to_path_buf(),
            staging_root: self.output_path(repo_root),
            layout: SourceLayout {
                docs_dir: self.docs_dir.clone(),
                examples_dir: self.examples_dir.clone(),
            },
            theme_dir: repo_root.join(&self.theme_dir),
            mode,
            base_branch: self.base_branch.clone(),
            restore_policy: self.restore,
            update_submodules: self.update_submodules,
        }
    }
}

/// `path` without `.` components, if it is relative, free of `..` and
/// names at least one directory.
fn normalized(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!out.as_os_str().is_empty()).then_some(out)
}
