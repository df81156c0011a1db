//! # Checkout Coordination
//!
//! This module provides the [`CheckoutCoordinator`], which owns every change
//! the orchestrator makes to the working tree: it records where the run
//! started, moves the tree to each version and brings it back.
//!
//! ## Design
//!
//! Version control is reached through the [`VcsOperations`] trait so that
//! the coordinator logic can be exercised without a real repository. The
//! default implementation, [`SystemGit`], shells out to `git` via the
//! functions in [`crate::git`].
//!
//! ## Return Point
//!
//! In [`ExecutionMode::Interactive`] the return point is whatever branch is
//! checked out when the run starts. In [`ExecutionMode::Unattended`] (CI
//! runners, which often start on a detached HEAD) detection is skipped and
//! the configured base branch is used instead.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Version-control capability used by the orchestrator.
pub trait VcsOperations {
    /// Name of the checked-out branch (or commit, when detached).
    fn current_ref(&self) -> Result<String>;

    /// Switch the working tree to `ref_name`.
    fn checkout(&self, ref_name: &str) -> Result<()>;

    /// Bring submodules in line with the checked-out revision.
    fn update_submodules(&self, recursive: bool, force: bool) -> Result<()>;
}

/// [`VcsOperations`] backed by the system `git` binary.
#[derive(Debug, Clone)]
pub struct SystemGit {
    repo_dir: PathBuf,
}

impl SystemGit {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }
}

impl VcsOperations for SystemGit {
    fn current_ref(&self) -> Result<String> {
        crate::git::current_ref(&self.repo_dir)
    }

    fn checkout(&self, ref_name: &str) -> Result<()> {
        crate::git::checkout(&self.repo_dir, ref_name)
    }

    fn update_submodules(&self, recursive: bool, force: bool) -> Result<()> {
        crate::git::update_submodules(&self.repo_dir, recursive, force)
    }
}

/// How the run was started; decides how the return point is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Operator-attended run: detect the current branch
    #[default]
    Interactive,
    /// CI run: return to the fixed base branch
    Unattended,
}

impl ExecutionMode {
    /// Map a `BUILD_ENVIRONMENT` style value to a mode.
    ///
    /// `jenkins` and `ci` select unattended mode; anything else, including
    /// no value, is interactive.
    pub fn from_build_environment(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "jenkins" || v == "ci" => ExecutionMode::Unattended,
            _ => ExecutionMode::Interactive,
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interactive" => Ok(ExecutionMode::Interactive),
            "unattended" => Ok(ExecutionMode::Unattended),
            other => Err(format!(
                "unknown execution mode '{}' (expected interactive or unattended)",
                other
            )),
        }
    }
}

/// The ref to return to, captured once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutState {
    /// Detected ref; `None` when the mode dictates the fixed base branch
    pub original_ref: Option<String>,
}

/// Drives checkouts and restores for one run.
pub struct CheckoutCoordinator {
    vcs: Box<dyn VcsOperations>,
    mode: ExecutionMode,
    base_branch: String,
}

impl CheckoutCoordinator {
    pub fn new(vcs: Box<dyn VcsOperations>, mode: ExecutionMode, base_branch: &str) -> Self {
        Self {
            vcs,
            mode,
            base_branch: base_branch.to_string(),
        }
    }

    /// Record where the run has to come back to.
    pub fn capture_return_point(&self) -> Result<CheckoutState> {
        let original_ref = match self.mode {
            ExecutionMode::Interactive => Some(self.vcs.current_ref()?),
            ExecutionMode::Unattended => None,
        };
        Ok(CheckoutState { original_ref })
    }

    /// The ref [`restore`](Self::restore) will switch to.
    pub fn return_ref<'a>(&'a self, state: &'a CheckoutState) -> &'a str {
        state.original_ref.as_deref().unwrap_or(&self.base_branch)
    }

    pub fn checkout(&self, ref_name: &str) -> Result<()> {
        self.vcs.checkout(ref_name)
    }

    pub fn update_submodules(&self, recursive: bool, force: bool) -> Result<()> {
        self.vcs.update_submodules(recursive, force)
    }

    /// Switch back to the captured return point.
    pub fn restore(&self, state: &CheckoutState) -> Result<()> {
        self.vcs.checkout(self.return_ref(state))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::error::Error;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// Recorded call against [`MockVcs`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum VcsCall {
        CurrentRef,
        Checkout(String),
        UpdateSubmodules,
    }

    /// Mock version control for testing.
    ///
    /// Every call is recorded in order. Refs listed in `failing_checkouts`
    /// fail to check out; refs in `failing_submodules` check out but fail
    /// their submodule update. An optional hook runs after each successful
    /// checkout so tests can rewrite the working tree per revision.
    #[derive(Clone, Default)]
    pub struct MockVcs {
        pub calls: Arc<Mutex<Vec<VcsCall>>>,
        pub current: Arc<Mutex<String>>,
        pub failing_checkouts: HashSet<String>,
        pub failing_submodules: HashSet<String>,
        pub on_checkout: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    }

    impl MockVcs {
        pub fn on_branch(branch: &str) -> Self {
            Self {
                current: Arc::new(Mutex::new(branch.to_string())),
                ..Self::default()
            }
        }

        pub fn failing_checkout(mut self, ref_name: &str) -> Self {
            self.failing_checkouts.insert(ref_name.to_string());
            self
        }

        pub fn failing_submodules(mut self, ref_name: &str) -> Self {
            self.failing_submodules.insert(ref_name.to_string());
            self
        }

        pub fn with_checkout_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
            self.on_checkout = Some(Arc::new(hook));
            self
        }

        pub fn calls(&self) -> Vec<VcsCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn checkouts(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    VcsCall::Checkout(r) => Some(r),
                    _ => None,
                })
                .collect()
        }
    }

    impl VcsOperations for MockVcs {
        fn current_ref(&self) -> Result<String> {
            self.calls.lock().unwrap().push(VcsCall::CurrentRef);
            Ok(self.current.lock().unwrap().clone())
        }

        fn checkout(&self, ref_name: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(VcsCall::Checkout(ref_name.to_string()));
            if self.failing_checkouts.contains(ref_name) {
                return Err(Error::GitCommand {
                    command: format!("checkout --quiet {} --", ref_name),
                    stderr: format!("error: pathspec '{}' did not match", ref_name),
                });
            }
            *self.current.lock().unwrap() = ref_name.to_string();
            if let Some(hook) = &self.on_checkout {
                hook(ref_name);
            }
            Ok(())
        }

        fn update_submodules(&self, _recursive: bool, _force: bool) -> Result<()> {
            self.calls.lock().unwrap().push(VcsCall::UpdateSubmodules);
            let current = self.current.lock().unwrap().clone();
            if self.failing_submodules.contains(&current) {
                return Err(Error::GitCommand {
                    command: "submodule update --init --recursive --force".to_string(),
                    stderr: "fatal: could not read from remote repository".to_string(),
                });
            }
            Ok(())
        }
    }
}
