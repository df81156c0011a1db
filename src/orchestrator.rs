//! # Versioned Build Orchestration
//!
//! The orchestrator builds every version in the list, one at a time, against
//! a single shared working tree.
//!
//! ## Run
//!
//! 1. **Clean output**: the staging root is removed and recreated empty.
//! 2. **Capture return point**: the branch to come back to is recorded.
//! 3. **Per version**, strictly in list order:
//!    `Pending → CheckedOut → SubmodulesReady → Configured → Staged →
//!    Restored → Built`, or `Failed` from any step.
//!
//! Only the first two steps can fail the run. A failing version is logged,
//! counted and skipped; the next version starts from a restored tree.
//!
//! ## Restore Policy
//!
//! With [`RestorePolicy::PerVersion`] the tree goes back to the return point
//! after the sources are staged and before the builder runs. The theme only
//! exists on the base branch, and the builder reads nothing else from the
//! live tree. [`RestorePolicy::EndOfRun`] defers the restore until all
//! versions are done, building each version with its own revision checked
//! out.
//!
//! Versions are never processed concurrently: the working tree and the
//! staging root are both mutated in place.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::builder::SiteBuilder;
use crate::checkout::{CheckoutCoordinator, CheckoutState, ExecutionMode, VcsOperations};
use crate::config::{BuildConfig, ConfigPatch};
use crate::error::{Error, Result, Step, VersionFailure};
use crate::manifest::{VersionList, VersionSpec};
use crate::staging::{SourceLayout, StagingRoot};

/// When the working tree goes back to the return point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestorePolicy {
    /// After staging each version, before its build
    #[default]
    PerVersion,
    /// Once, after the last version
    EndOfRun,
}

impl FromStr for RestorePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "per-version" => Ok(RestorePolicy::PerVersion),
            "end-of-run" => Ok(RestorePolicy::EndOfRun),
            other => Err(format!(
                "unknown restore policy '{}' (expected per-version or end-of-run)",
                other
            )),
        }
    }
}

/// Where a version is in its build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionState {
    Pending,
    CheckedOut,
    SubmodulesReady,
    Configured,
    Staged,
    Restored,
    Built,
    Failed,
}

impl VersionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, VersionState::Built | VersionState::Failed)
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionState::Pending => "pending",
            VersionState::CheckedOut => "checked out",
            VersionState::SubmodulesReady => "submodules ready",
            VersionState::Configured => "configured",
            VersionState::Staged => "staged",
            VersionState::Restored => "restored",
            VersionState::Built => "built",
            VersionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Final record for one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionOutcome {
    pub id: String,
    pub display_name: String,
    pub state: VersionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tally of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    pub succeeded: usize,
    pub failed: usize,
    /// One entry per version, in build order
    pub versions: Vec<VersionOutcome>,
}

impl BuildResult {
    fn from_outcomes(versions: Vec<VersionOutcome>) -> Self {
        let succeeded = versions
            .iter()
            .filter(|o| o.state == VersionState::Built)
            .count();
        Self {
            succeeded,
            failed: versions.len() - succeeded,
            versions,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn summary(&self) -> String {
        format!(
            "Documentation built: {} versions success, {} failed.",
            self.succeeded, self.failed
        )
    }
}

/// Everything a run needs to know besides the version list.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Root of the working tree the VCS operates on
    pub repo_root: PathBuf,
    pub staging_root: PathBuf,
    pub layout: SourceLayout,
    /// Shared theme directory written to `theme.custom_dir`
    pub theme_dir: PathBuf,
    pub mode: ExecutionMode,
    /// Return branch in unattended mode
    pub base_branch: String,
    pub restore_policy: RestorePolicy,
    pub update_submodules: bool,
}

/// Runs the versioned build.
pub struct Orchestrator {
    config: OrchestratorConfig,
    checkout: CheckoutCoordinator,
    builder: Box<dyn SiteBuilder>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        vcs: Box<dyn VcsOperations>,
        builder: Box<dyn SiteBuilder>,
    ) -> Self {
        let checkout = CheckoutCoordinator::new(vcs, config.mode, &config.base_branch);
        Self {
            config,
            checkout,
            builder,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn staging(&self) -> StagingRoot {
        StagingRoot::new(&self.config.staging_root)
    }

    /// Remove the output of a previous run. Safe to call repeatedly.
    pub fn clean_output(&self) -> Result<()> {
        self.staging().clean()
    }

    /// Build every version in `versions` from the `base` site config.
    ///
    /// Returns an error only if setup fails; per-version failures are
    /// reported in the result.
    pub fn run(&self, base: &BuildConfig, versions: &VersionList) -> Result<BuildResult> {
        let staging = self.staging();
        staging.prepare()?;

        let state = self.checkout.capture_return_point()?;
        log::info!(
            "Building {} versions; returning to '{}' after checkouts",
            versions.len(),
            self.checkout.return_ref(&state)
        );

        let run = RunContext {
            base,
            display_names: versions.display_names(),
            staging: &staging,
            state: &state,
        };

        let mut outcomes = Vec::with_capacity(versions.len());
        for (index, spec) in versions.iter().enumerate() {
            log::info!(
                "[{}/{}] {} ({})",
                index + 1,
                versions.len(),
                spec.display_name,
                spec.id
            );
            outcomes.push(self.process_version(&run, spec));
        }

        if self.config.restore_policy == RestorePolicy::EndOfRun {
            if let Err(e) = self.checkout.restore(&state) {
                log::error!(
                    "Could not return to '{}' after the run: {}",
                    self.checkout.return_ref(&state),
                    e
                );
            }
        }

        let result = BuildResult::from_outcomes(outcomes);
        log::info!("{}", result.summary());
        Ok(result)
    }

    fn process_version(&self, run: &RunContext<'_>, spec: &VersionSpec) -> VersionOutcome {
        let mut state = VersionState::Pending;
        let result = self.advance(run, spec, &mut state);

        let (failed_step, error) = match result {
            Ok(()) => (None, None),
            Err(failure) => {
                log::error!("{}. Version {} is not built.", failure, spec.id);
                state = VersionState::Failed;
                (Some(failure.step), Some(failure.source.to_string()))
            }
        };

        VersionOutcome {
            id: spec.id.clone(),
            display_name: spec.display_name.clone(),
            state,
            failed_step,
            error,
        }
    }

    /// Drive one version to `Built`, leaving `state` at the last state reached.
    fn advance(
        &self,
        run: &RunContext<'_>,
        spec: &VersionSpec,
        state: &mut VersionState,
    ) -> std::result::Result<(), VersionFailure> {
        self.checkout
            .checkout(&spec.id)
            .map_err(fail_at(spec, Step::Checkout))?;
        transition(spec, state, VersionState::CheckedOut);

        if let Err(failure) = self.prepare_sources(run, spec, state) {
            if matches!(failure.step, Step::ConfigWrite | Step::Staging) {
                run.staging.discard(&spec.display_name);
            }
            self.restore_after_failure(run.state, spec);
            return Err(failure);
        }

        if self.config.restore_policy == RestorePolicy::PerVersion {
            self.checkout
                .restore(run.state)
                .map_err(fail_at(spec, Step::Restore))?;
            transition(spec, state, VersionState::Restored);
        }

        self.builder
            .build(
                &run.staging.site_dir(&spec.display_name),
                &run.staging.config_path(&spec.display_name),
            )
            .map_err(fail_at(spec, Step::Build))?;
        transition(spec, state, VersionState::Built);

        Ok(())
    }

    /// Steps that run with the version's revision checked out.
    fn prepare_sources(
        &self,
        run: &RunContext<'_>,
        spec: &VersionSpec,
        state: &mut VersionState,
    ) -> std::result::Result<(), VersionFailure> {
        let name = spec.display_name.as_str();

        if self.config.update_submodules {
            self.checkout
                .update_submodules(true, true)
                .map_err(fail_at(spec, Step::Submodules))?;
        }
        transition(spec, state, VersionState::SubmodulesReady);

        let docs_dir = run.staging.staged_docs_dir(name, &self.config.layout);
        let patched = run.base.patched(ConfigPatch {
            versions: &run.display_names,
            docs_dir: &docs_dir,
            theme_dir: &self.config.theme_dir,
        });
        patched
            .write_to(&run.staging.config_path(name))
            .map_err(fail_at(spec, Step::ConfigWrite))?;
        transition(spec, state, VersionState::Configured);

        run.staging
            .stage_sources(name, &self.config.repo_root, &self.config.layout)
            .map_err(fail_at(spec, Step::Staging))?;
        transition(spec, state, VersionState::Staged);

        Ok(())
    }

    /// Put the tree back after a failure past checkout, unless restoring is
    /// deferred to the end of the run.
    fn restore_after_failure(&self, checkout_state: &CheckoutState, spec: &VersionSpec) {
        if self.config.restore_policy == RestorePolicy::EndOfRun {
            return;
        }
        if let Err(e) = self.checkout.restore(checkout_state) {
            log::error!(
                "Could not return to '{}' after {} failed: {}",
                self.checkout.return_ref(checkout_state),
                spec.id,
                e
            );
        }
    }
}

/// Values shared by every version of one run.
struct RunContext<'a> {
    base: &'a BuildConfig,
    display_names: Vec<String>,
    staging: &'a StagingRoot,
    state: &'a CheckoutState,
}

fn fail_at(spec: &VersionSpec, step: Step) -> impl FnOnce(Error) -> VersionFailure + '_ {
    move |e| VersionFailure::new(&spec.id, step, e)
}

fn transition(spec: &VersionSpec, state: &mut VersionState, next: VersionState) {
    log::debug!("{}: {} -> {}", spec.id, state, next);
    *state = next;
}
