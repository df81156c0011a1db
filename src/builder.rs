//! Build invocation for the external static-site generator.
//!
//! The generator is opaque: it gets an output directory and a config file
//! and its exit code is the only success signal.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::defaults::{CONFIG_FLAG, SITE_DIR_FLAG};
use crate::error::{Error, Result};

/// Renders one version of the site.
pub trait SiteBuilder {
    fn build(&self, site_dir: &Path, config_file: &Path) -> Result<()>;
}

/// Runs the builder as an external command.
///
/// The final command line is
/// `<program> <args...> <site_dir_flag> <site_dir> <config_flag> <config_file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    program: String,
    args: Vec<String>,
    site_dir_flag: String,
    config_flag: String,
    working_dir: PathBuf,
}

impl CommandBuilder {
    /// Parse a whitespace-separated command line such as `mkdocs build`.
    pub fn from_command_line(command_line: &str, working_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| Error::Builder {
            command: command_line.to_string(),
            status: None,
            stderr: "builder command is empty".to_string(),
        })?;

        Ok(Self {
            program,
            args: parts.collect(),
            site_dir_flag: SITE_DIR_FLAG.to_string(),
            config_flag: CONFIG_FLAG.to_string(),
            working_dir: working_dir.into(),
        })
    }

    pub fn with_flags(mut self, site_dir_flag: &str, config_flag: &str) -> Self {
        self.site_dir_flag = site_dir_flag.to_string();
        self.config_flag = config_flag.to_string();
        self
    }

    /// The full argument vector for one build, program excluded.
    pub fn arguments(&self, site_dir: &Path, config_file: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(self.site_dir_flag.clone());
        args.push(site_dir.display().to_string());
        args.push(self.config_flag.clone());
        args.push(config_file.display().to_string());
        args
    }

    fn describe(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SiteBuilder for CommandBuilder {
    fn build(&self, site_dir: &Path, config_file: &Path) -> Result<()> {
        let args = self.arguments(site_dir, config_file);
        let command = self.describe(&args);
        log::debug!("Running {}", command);

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|e| Error::Builder {
                command: command.clone(),
                status: None,
                stderr: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{}", stdout.trim_end());
        }

        if !output.status.success() {
            return Err(Error::Builder {
                command,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Ok(())
    }
}
