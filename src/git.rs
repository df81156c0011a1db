//! Thin wrappers around the system `git` command.
//!
//! Every function runs `git` in the given working tree and turns a non-zero
//! exit into [`Error::GitCommand`] carrying git's stderr.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Run `git <args>` in `repo_dir` and return trimmed stdout.
fn run_git(repo_dir: &Path, args: &[&str]) -> Result<String> {
    let command = args.join(" ");
    log::debug!("git {} (in {})", command, repo_dir.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        // Checkout refuses to clobber local edits; say how to get past it
        let stderr = if stderr.contains("would be overwritten by checkout") {
            format!("{}\nStash or commit your changes before building versions.", stderr)
        } else {
            stderr
        };

        return Err(Error::GitCommand { command, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Name of the checked-out branch, or the commit hash when HEAD is detached.
pub fn current_ref(repo_dir: &Path) -> Result<String> {
    let branch = run_git(repo_dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    if branch != "HEAD" && !branch.is_empty() {
        return Ok(branch);
    }
    run_git(repo_dir, &["rev-parse", "HEAD"])
}

/// Switch the working tree to the commit named by `ref_name`.
///
/// The name must resolve to a commit. A name that is also a path in the
/// work tree is never treated as one, and names starting with `-` are
/// refused before git sees them.
pub fn checkout(repo_dir: &Path, ref_name: &str) -> Result<()> {
    let command = format!("checkout --quiet {} --", ref_name);
    let not_a_commit = |stderr: String| Error::GitCommand {
        command: command.clone(),
        stderr,
    };

    if ref_name.is_empty() || ref_name.starts_with('-') {
        return Err(not_a_commit(format!(
            "'{}' is not a valid revision name",
            ref_name
        )));
    }
    let commit = format!("{}^{{commit}}", ref_name);
    run_git(repo_dir, &["rev-parse", "--verify", "--quiet", &commit]).map_err(|_| {
        not_a_commit(format!("'{}' is not a commit, tag or branch", ref_name))
    })?;

    run_git(repo_dir, &["checkout", "--quiet", ref_name, "--"]).map(|_| ())
}

/// Initialize and update submodules to the commits recorded at HEAD.
pub fn update_submodules(repo_dir: &Path, recursive: bool, force: bool) -> Result<()> {
    let mut args = vec!["submodule", "update", "--init"];
    if recursive {
        args.push("--recursive");
    }
    if force {
        args.push("--force");
    }
    run_git(repo_dir, &args).map(|_| ())
}
