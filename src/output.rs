//! # Terminal Output
//!
//! Human-readable reporting for the `versioned-docs` CLI. Colors and emoji
//! follow the `--color` flag and the usual environment conventions:
//!
//! - `--color=never|always|auto`
//! - `NO_COLOR` disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` disables colors
//! - `CLICOLOR_FORCE=1` forces colors even in non-TTY
//! - `TERM=dumb` disables colors
//!
//! Machine-readable output (`--json`) bypasses this module entirely.

use std::env;

use console::style;

use crate::orchestrator::{BuildResult, VersionOutcome, VersionState};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` flag against the environment.
    ///
    /// `always` and `never` are absolute; anything else auto-detects.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colors, even if empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Pick the emoji when colors are enabled, the plain marker otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// One report line for a finished version.
pub fn outcome_line(config: &OutputConfig, outcome: &VersionOutcome) -> String {
    let label = if outcome.display_name == outcome.id {
        outcome.id.clone()
    } else {
        format!("{} ({})", outcome.display_name, outcome.id)
    };

    match outcome.state {
        VersionState::Built => format!("{} {}", emoji(config, "✅", "[OK]"), label),
        _ => {
            let step = outcome
                .failed_step
                .map(|s| s.to_string())
                .unwrap_or_else(|| outcome.state.to_string());
            let reason = outcome.error.as_deref().unwrap_or("unknown error");
            let line = format!(
                "{} {}: {} failed: {}",
                emoji(config, "❌", "[FAIL]"),
                label,
                step,
                reason
            );
            if config.use_color {
                style(line).red().to_string()
            } else {
                line
            }
        }
    }
}

/// The run summary, highlighted when anything failed.
pub fn summary_line(config: &OutputConfig, result: &BuildResult) -> String {
    let summary = result.summary();
    if !config.use_color {
        return summary;
    }
    if result.failed == 0 {
        style(summary).green().bold().to_string()
    } else {
        style(summary).yellow().bold().to_string()
    }
}
