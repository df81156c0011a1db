//! # Source Staging
//!
//! The staging root is the per-run scratch directory. It is wiped at the
//! start of every run and holds one subtree per version:
//!
//! ```text
//! <root>/<name>/<name>.yml       patched builder config
//! <root>/<name>/<docs dir>/      copy of the documentation sources
//! <root>/<name>/<examples dir>/  copy of the code examples, when present
//! <root>/<name>/site/            builder output
//! ```
//!
//! Sources are copied while the version's revision is checked out, so the
//! builder never reads the live working tree. Staged directories keep their
//! working-tree relative paths, which keeps relative links between the docs
//! and the examples intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::defaults::SITE_SUBDIR;
use crate::error::{Error, Result};

/// Staged source locations for one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedSources {
    pub docs_dir: PathBuf,
    /// `None` when the revision has no examples directory
    pub examples_dir: Option<PathBuf>,
}

/// What to copy out of the working tree, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub docs_dir: PathBuf,
    pub examples_dir: Option<PathBuf>,
}

/// The staging root and the paths derived from it.
#[derive(Debug, Clone)]
pub struct StagingRoot {
    root: PathBuf,
}

impl StagingRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Remove the staging root. Succeeds if it is already absent.
    pub fn clean(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::OutputCleanup {
                path: self.root.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Clean and recreate an empty staging root.
    pub fn prepare(&self) -> Result<()> {
        self.clean()?;
        fs::create_dir_all(&self.root).map_err(|e| Error::OutputCleanup {
            path: self.root.display().to_string(),
            message: format!("cannot create directory: {}", e),
        })
    }

    pub fn version_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Per-version config file, named after the display name.
    pub fn config_path(&self, name: &str) -> PathBuf {
        self.version_dir(name).join(format!("{}.yml", name))
    }

    pub fn site_dir(&self, name: &str) -> PathBuf {
        self.version_dir(name).join(SITE_SUBDIR)
    }

    /// Where the docs for `name` are staged under `layout`.
    pub fn staged_docs_dir(&self, name: &str, layout: &SourceLayout) -> PathBuf {
        self.version_dir(name).join(&layout.docs_dir)
    }

    /// Copy the sources of the checked-out revision into the version subtree.
    ///
    /// The docs directory must exist; the examples directory is copied only
    /// if present.
    pub fn stage_sources(
        &self,
        name: &str,
        working_tree: &Path,
        layout: &SourceLayout,
    ) -> Result<StagedSources> {
        let docs_src = working_tree.join(&layout.docs_dir);
        if !docs_src.is_dir() {
            return Err(Error::Filesystem {
                message: format!(
                    "Documentation directory '{}' does not exist at this revision",
                    docs_src.display()
                ),
            });
        }
        let docs_dir = self.staged_docs_dir(name, layout);
        copy_dir_recursive(&docs_src, &docs_dir)?;

        let examples_dir = match &layout.examples_dir {
            Some(rel) if working_tree.join(rel).is_dir() => {
                let dest = self.version_dir(name).join(rel);
                copy_dir_recursive(&working_tree.join(rel), &dest)?;
                Some(dest)
            }
            Some(rel) => {
                log::debug!(
                    "No {} directory at this revision of {}, skipping",
                    rel.display(),
                    name
                );
                None
            }
            None => None,
        };

        Ok(StagedSources {
            docs_dir,
            examples_dir,
        })
    }

    /// Remove the subtree of a version that failed before staging finished.
    ///
    /// Errors are logged, not returned: the version is already failing.
    pub fn discard(&self, name: &str) {
        let dir = self.version_dir(name);
        if let Err(e) = fs::remove_dir_all(&dir) {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("Could not remove partial staging '{}': {}", dir.display(), e);
            }
        }
    }
}

/// Recursively copy `src` into `dst`, skipping `.git` entries.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    let fs_error = |action: &str, path: &Path, e: &dyn std::fmt::Display| Error::Filesystem {
        message: format!("Failed to {} '{}': {}", action, path.display(), e),
    };

    let walker = WalkDir::new(src)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| fs_error("walk", src, &e))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| fs_error("relativize", entry.path(), &e))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| fs_error("create directory", &target, &e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| fs_error("copy", entry.path(), &e))?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link = fs::read_link(src).map_err(|e| Error::Filesystem {
        message: format!("Failed to read link '{}': {}", src.display(), e),
    })?;
    std::os::unix::fs::symlink(&link, dst).map_err(|e| Error::Filesystem {
        message: format!("Failed to link '{}': {}", dst.display(), e),
    })
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map(|_| ()).map_err(|e| Error::Filesystem {
        message: format!("Failed to copy '{}': {}", src.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout() -> SourceLayout {
        SourceLayout {
            docs_dir: PathBuf::from("src"),
            examples_dir: Some(PathBuf::from("code-examples")),
        }
    }

    fn working_tree(with_examples: bool) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/guides")).unwrap();
        fs::write(temp.path().join("src/index.md"), "# Home").unwrap();
        fs::write(temp.path().join("src/guides/start.md"), "# Start").unwrap();
        if with_examples {
            fs::create_dir_all(temp.path().join("code-examples")).unwrap();
            fs::write(temp.path().join("code-examples/main.rs"), "fn main() {}").unwrap();
        }
        temp
    }

    #[test]
    fn test_clean_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let staging = StagingRoot::new(temp.path().join("version"));

        staging.clean().unwrap();
        staging.clean().unwrap();
        assert!(!staging.path().exists());
    }

    #[test]
    fn test_prepare_removes_stale_output() {
        let temp = TempDir::new().unwrap();
        let staging = StagingRoot::new(temp.path().join("version"));
        fs::create_dir_all(staging.path().join("old/site")).unwrap();
        fs::write(staging.path().join("old/site/index.html"), "stale").unwrap();

        staging.prepare().unwrap();

        assert!(staging.path().is_dir());
        assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_paths_are_keyed_by_display_name() {
        let staging = StagingRoot::new("/out/version");
        assert_eq!(
            staging.config_path("latest"),
            PathBuf::from("/out/version/latest/latest.yml")
        );
        assert_eq!(
            staging.site_dir("v0.9"),
            PathBuf::from("/out/version/v0.9/site")
        );
        assert_eq!(
            staging.staged_docs_dir("v0.9", &layout()),
            PathBuf::from("/out/version/v0.9/src")
        );
    }

    #[test]
    fn test_stage_sources_copies_docs_and_examples() {
        let tree = working_tree(true);
        let out = TempDir::new().unwrap();
        let staging = StagingRoot::new(out.path().join("version"));
        staging.prepare().unwrap();

        let staged = staging.stage_sources("latest", tree.path(), &layout()).unwrap();

        assert_eq!(
            fs::read_to_string(staged.docs_dir.join("guides/start.md")).unwrap(),
            "# Start"
        );
        let examples = staged.examples_dir.unwrap();
        assert!(examples.join("main.rs").is_file());
        assert_eq!(examples, staging.version_dir("latest").join("code-examples"));
    }

    #[test]
    fn test_stage_sources_without_examples_directory() {
        let tree = working_tree(false);
        let out = TempDir::new().unwrap();
        let staging = StagingRoot::new(out.path().join("version"));
        staging.prepare().unwrap();

        let staged = staging.stage_sources("v0.8", tree.path(), &layout()).unwrap();

        assert!(staged.examples_dir.is_none());
        assert!(!staging.version_dir("v0.8").join("code-examples").exists());
        assert!(staged.docs_dir.join("index.md").is_file());
    }

    #[test]
    fn test_stage_sources_missing_docs_fails() {
        let tree = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let staging = StagingRoot::new(out.path().join("version"));
        staging.prepare().unwrap();

        let err = staging.stage_sources("v0.1", tree.path(), &layout()).unwrap_err();
        assert!(err.to_string().contains("does not exist at this revision"));
    }

    #[test]
    fn test_copy_skips_git_entries() {
        let tree = working_tree(false);
        fs::write(tree.path().join("src/.git"), "gitdir: ../.git/modules/src").unwrap();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("copy");

        copy_dir_recursive(&tree.path().join("src"), &dest).unwrap();

        assert!(dest.join("index.md").exists());
        assert!(!dest.join(".git").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_preserves_symlinks() {
        let tree = working_tree(false);
        std::os::unix::fs::symlink("index.md", tree.path().join("src/home.md")).unwrap();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("copy");

        copy_dir_recursive(&tree.path().join("src"), &dest).unwrap();

        assert_eq!(
            fs::read_link(dest.join("home.md")).unwrap(),
            PathBuf::from("index.md")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_link_reports_its_path() {
        let tree = working_tree(false);
        let out = TempDir::new().unwrap();
        let not_a_link = tree.path().join("src/index.md");

        let err = copy_symlink(&not_a_link, &out.path().join("index.md")).unwrap_err();

        assert!(matches!(err, Error::Filesystem { .. }));
        assert!(err.to_string().contains("Failed to read link"));
        assert!(err.to_string().contains(&not_a_link.display().to_string()));
    }

    #[test]
    fn test_discard_removes_version_subtree() {
        let out = TempDir::new().unwrap();
        let staging = StagingRoot::new(out.path().join("version"));
        fs::create_dir_all(staging.version_dir("v1")).unwrap();

        staging.discard("v1");
        staging.discard("never-created");

        assert!(!staging.version_dir("v1").exists());
    }
}
