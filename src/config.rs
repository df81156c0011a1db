//! # Base Site Configuration and Patching
//!
//! This module owns the builder's site configuration (an `mkdocs.yml`
//! style YAML document). The document is loaded once per run as a
//! [`BuildConfig`]; every version then gets its own patched copy from
//! [`BuildConfig::patched`], which leaves the base untouched.
//!
//! ## Patched Keys
//!
//! Only three keys are rewritten; everything else is emitted as it was read:
//!
//! - `extra.versions`: the full display-name list for the switcher
//! - `docs_dir`: the version's staged source directory
//! - `theme.custom_dir`: the shared theme directory on the base branch
//!
//! A bare `theme: <name>` string is expanded to a mapping so that
//! `custom_dir` can be attached to it.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// A site configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    document: Mapping,
    /// Path or label the document was loaded from, for error messages
    origin: String,
}

/// Per-version values written into a patched config.
#[derive(Debug, Clone, Copy)]
pub struct ConfigPatch<'a> {
    /// Full ordered display-name list, `latest` first
    pub versions: &'a [String],
    pub docs_dir: &'a Path,
    pub theme_dir: &'a Path,
}

impl BuildConfig {
    /// Load the base configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.display().to_string(),
            message: format!("cannot read file: {}", e),
            hint: None,
        })?;
        Self::from_yaml_str(&content, &path.display().to_string())
    }

    /// Parse a configuration document from a YAML string.
    pub fn from_yaml_str(content: &str, origin: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| Error::Config {
            path: origin.to_string(),
            message: e.to_string(),
            hint: None,
        })?;

        let document = match value {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => {
                return Err(Error::Config {
                    path: origin.to_string(),
                    message: "top level of the document must be a mapping".to_string(),
                    hint: Some("The builder config is a set of `key: value` pairs".to_string()),
                })
            }
        };

        Ok(Self {
            document,
            origin: origin.to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    /// The raw `extra.versions` value, if present.
    pub fn versions_field(&self) -> Option<&Value> {
        self.document
            .get("extra")
            .and_then(Value::as_mapping)
            .and_then(|extra| extra.get("versions"))
    }

    /// Produce the configuration for one version.
    pub fn patched(&self, patch: ConfigPatch<'_>) -> BuildConfig {
        let mut document = self.document.clone();

        let versions = patch
            .versions
            .iter()
            .map(|name| Value::String(name.clone()))
            .collect();
        child_mapping(&mut document, "extra").insert("versions".into(), Value::Sequence(versions));

        document.insert("docs_dir".into(), path_value(patch.docs_dir));

        let theme = theme_mapping(&mut document);
        theme.insert("custom_dir".into(), path_value(patch.theme_dir));

        BuildConfig {
            document,
            origin: self.origin.clone(),
        }
    }

    /// Serialize the document as YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    /// Write the document to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml_string()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }
        fs::write(path, yaml).map_err(|e| Error::Filesystem {
            message: format!("Failed to write config '{}': {}", path.display(), e),
        })
    }
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

/// Get `key` as a mapping, replacing any non-mapping value.
fn child_mapping<'a>(document: &'a mut Mapping, key: &str) -> &'a mut Mapping {
    let needs_reset = !matches!(document.get(key), Some(Value::Mapping(_)));
    if needs_reset {
        document.insert(key.into(), Value::Mapping(Mapping::new()));
    }
    match document.get_mut(key) {
        Some(Value::Mapping(map)) => map,
        _ => unreachable!("{} was just set to a mapping", key),
    }
}

/// Get `theme` as a mapping, keeping a bare theme name as `name`.
fn theme_mapping(document: &mut Mapping) -> &mut Mapping {
    let bare_name = match document.get("theme") {
        Some(Value::String(name)) => Some(name.clone()),
        _ => None,
    };
    if let Some(name) = bare_name {
        let mut theme = Mapping::new();
        theme.insert("name".into(), Value::String(name));
        document.insert("theme".into(), Value::Mapping(theme));
    }
    child_mapping(document, "theme")
}
