//! Shared test utilities for the CLI end-to-end tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new()
//!     .with_site_config(configs::SITE)
//!     .with_file("versions.txt", "v2\nv1\n");
//! fixture.command().arg("versions").assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common YAML and script snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Minimal base site configuration.
    pub const SITE: &str = r#"site_name: Demo Docs
theme:
  name: material
"#;

    /// Site configuration that carries its own version list.
    pub const SITE_WITH_VERSIONS: &str = r#"site_name: Demo Docs
extra:
  versions:
    - v3
    - id: v2
      name: two
    - 1.5
"#;

    /// Stand-in for `mkdocs build`: honours `-d` and `-f`, copies the
    /// config next to a rendered `index.html`.
    pub const FAKE_BUILDER: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -d) out="$2"; shift 2 ;;
    -f) cfg="$2"; shift 2 ;;
    *) shift ;;
  esac
done
mkdir -p "$out"
cp "$cfg" "$out/config.yml"
echo built > "$out/index.html"
"#;

    /// Builder that always fails with a diagnostic on stderr.
    pub const FAILING_BUILDER: &str = "#!/bin/sh\necho 'nav entry missing' >&2\nexit 1\n";
}

/// A temporary repository root for driving the `versioned-docs` binary.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write the base `mkdocs.yml`.
    pub fn with_site_config(self, content: &str) -> Self {
        self.with_file("mkdocs.yml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versioned-docs");
        cmd.current_dir(self.path())
            .env_remove("BUILD_ENVIRONMENT")
            .env_remove("VERSIONED_DOCS_SETTINGS")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run `git` in the fixture, panicking on failure.
    #[allow(dead_code)]
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Commit everything in the tree and tag the commit.
    #[allow(dead_code)]
    pub fn commit_and_tag(&self, message: &str, tag: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "--quiet", "-m", message]);
        self.git(&["tag", tag]);
    }

    /// Turn the fixture into a git repository on `master` with two tagged
    /// doc revisions:
    ///
    /// - `v1`: `src/index.md` only
    /// - `v2`: updated docs plus a `code-examples/` directory
    ///
    /// `master` additionally carries `theme/`. `versions.txt` (`v2`, `v1`)
    /// and the fake builder `fake-builder.sh` are left untracked.
    #[allow(dead_code)]
    pub fn with_versioned_repo(self) -> Self {
        self.git(&["init", "--quiet"]);
        self.git(&["symbolic-ref", "HEAD", "refs/heads/master"]);
        self.git(&["config", "user.email", "docs@example.com"]);
        self.git(&["config", "user.name", "Docs Bot"]);
        self.git(&["config", "commit.gpgsign", "false"]);

        let fixture = self
            .with_site_config(configs::SITE)
            .with_file("src/index.md", "# v1 docs\n");
        fixture.commit_and_tag("docs for v1", "v1");

        let fixture = fixture
            .with_file("src/index.md", "# v2 docs\n")
            .with_file("code-examples/hello.sh", "echo hello\n");
        fixture.commit_and_tag("docs for v2", "v2");

        let fixture = fixture.with_file("theme/main.html", "{% extends \"base.html\" %}\n");
        fixture.git(&["add", "-A"]);
        fixture.git(&["commit", "--quiet", "-m", "theme"]);

        // Untracked, so tests can rewrite them without blocking checkouts
        fixture
            .with_file("versions.txt", "v2\nv1\n")
            .with_file("fake-builder.sh", configs::FAKE_BUILDER)
    }

    /// Currently checked-out branch.
    #[allow(dead_code)]
    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("src/index.md", "# Home");
        assert!(fixture.path().join("src/index.md").exists());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        for config in [configs::SITE, configs::SITE_WITH_VERSIONS] {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }
}
