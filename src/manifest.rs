//! # Version Source Reader
//!
//! Produces the ordered list of versions a run builds. Versions come either
//! from a newline-delimited manifest file or from the `extra.versions` field
//! of the base site configuration.
//!
//! Order matters: it is the order the switcher displays versions in, and the
//! first version is published under the `latest` alias. The alias only
//! changes the display name; checkout still uses the real revision id.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;

use crate::config::BuildConfig;
use crate::defaults::LATEST_ALIAS;
use crate::error::{Error, Result};

/// A single version to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSpec {
    /// Revision (tag, branch or commit) to check out
    pub id: String,
    /// Name used for output paths and in the switcher
    pub display_name: String,
}

impl VersionSpec {
    /// Create a version whose display name is its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
        }
    }

    /// Override the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }
}

/// Where the version list is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// A newline-delimited manifest file
    Manifest(PathBuf),
    /// The `extra.versions` field of the base config
    ConfigField,
}

/// A validated, non-empty, ordered list of versions with the `latest` alias
/// applied to the first entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionList {
    specs: Vec<VersionSpec>,
}

impl VersionList {
    /// Validate `specs` and apply the `latest` alias.
    ///
    /// `origin` names where the list came from and only appears in errors.
    pub fn new(mut specs: Vec<VersionSpec>, origin: &str) -> Result<Self> {
        let Some(first) = specs.first_mut() else {
            return Err(Error::EmptyVersionList {
                origin: origin.to_string(),
            });
        };
        first.display_name = LATEST_ALIAS.to_string();

        let mut seen = HashSet::new();
        for spec in &specs {
            // Git never accepts these as revisions and reads them as options
            if spec.id.starts_with('-') {
                return Err(Error::InvalidVersion {
                    version: spec.id.clone(),
                    message: "version id cannot start with '-'".to_string(),
                });
            }
            validate_display_name(spec)?;
            if !seen.insert(spec.display_name.as_str()) {
                return Err(Error::InvalidVersion {
                    version: spec.id.clone(),
                    message: format!(
                        "display name '{}' is used by more than one version",
                        spec.display_name
                    ),
                });
            }
        }

        Ok(Self { specs })
    }

    /// Display names in build order, `latest` first.
    ///
    /// This is the list every per-version config exposes to the switcher.
    pub fn display_names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.display_name.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VersionSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Never true for a list built through `new`.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn as_slice(&self) -> &[VersionSpec] {
        &self.specs
    }
}

impl<'a> IntoIterator for &'a VersionList {
    type Item = &'a VersionSpec;
    type IntoIter = std::slice::Iter<'a, VersionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn validate_display_name(spec: &VersionSpec) -> Result<()> {
    let name = spec.display_name.as_str();
    let problem = if name.is_empty() {
        Some("display name is empty")
    } else if name == "." || name == ".." {
        Some("display name cannot be a relative path component")
    } else if name.contains(['/', '\\']) {
        Some("display name cannot contain path separators")
    } else {
        None
    };

    match problem {
        Some(message) => Err(Error::InvalidVersion {
            version: spec.id.clone(),
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}

/// Split manifest text into version ids.
///
/// Accepts `\n`, `\r\n` and `\r` line endings. Lines are trimmed and blank
/// lines are discarded.
pub fn parse_manifest(text: &str) -> Vec<VersionSpec> {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(VersionSpec::new)
        .collect()
}

/// Read and validate a manifest file.
pub fn read_manifest(path: &Path) -> Result<VersionList> {
    let text = fs::read_to_string(path).map_err(|e| Error::ManifestRead {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    VersionList::new(parse_manifest(&text), &path.display().to_string())
}

/// Read versions from the `extra.versions` field of the base config.
///
/// Entries are either a scalar id or a mapping with `id` and an optional
/// `name`.
pub fn versions_from_config(config: &BuildConfig) -> Result<VersionList> {
    const ORIGIN: &str = "extra.versions";

    let entries = match config.versions_field() {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(seq)) => seq.iter().map(parse_entry).collect::<Result<_>>()?,
        Some(other) => {
            return Err(Error::Config {
                path: config.origin().to_string(),
                message: format!("{} must be a list, found {}", ORIGIN, value_kind(other)),
                hint: None,
            })
        }
    };
    VersionList::new(entries, ORIGIN)
}

fn parse_entry(value: &Value) -> Result<VersionSpec> {
    match value {
        Value::Mapping(map) => {
            let id = map
                .get("id")
                .and_then(scalar_to_string)
                .ok_or_else(|| Error::InvalidVersion {
                    version: format!("{:?}", value),
                    message: "version mapping needs an 'id' field".to_string(),
                })?;
            let spec = VersionSpec::new(id);
            Ok(match map.get("name").and_then(scalar_to_string) {
                Some(name) => spec.with_display_name(name),
                None => spec,
            })
        }
        other => scalar_to_string(other)
            .map(VersionSpec::new)
            .ok_or_else(|| Error::InvalidVersion {
                version: format!("{:?}", other),
                message: format!("expected a string or mapping, found {}", value_kind(other)),
            }),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        // Unquoted tags such as `1.2` parse as numbers
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Resolve the version list from the configured source.
pub fn read_versions(source: &VersionSource, config: &BuildConfig) -> Result<VersionList> {
    match source {
        VersionSource::Manifest(path) => read_manifest(path),
        VersionSource::ConfigField => versions_from_config(config),
    }
}
