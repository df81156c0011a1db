//! End-to-end tests for the `versioned-docs clean` command.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_clean_removes_output_directory() {
    let fixture = TestFixture::new()
        .with_file("version/latest/latest.yml", "site_name: Demo\n")
        .with_file("version/latest/site/index.html", "<html></html>");

    fixture
        .command()
        .args(["--color", "never", "clean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Removed"));

    fixture.child("version").assert(predicate::path::missing());
}

#[test]
fn test_clean_is_idempotent() {
    let fixture = TestFixture::new();

    for _ in 0..2 {
        fixture
            .command()
            .args(["--color", "never", "clean"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing to clean"));
    }
}

#[test]
fn test_clean_respects_output_flag_and_settings() {
    let fixture = TestFixture::new()
        .with_file(".versioned-docs.yaml", "output_dir: public\n")
        .with_file("public/latest/site/index.html", "")
        .with_file("dist/v1/site/index.html", "")
        .with_file("version/keep.txt", "");

    fixture.command().arg("clean").assert().success();
    fixture.child("public").assert(predicate::path::missing());
    fixture.child("dist").assert(predicate::path::exists());

    fixture
        .command()
        .args(["clean", "--output", "dist"])
        .assert()
        .success();
    fixture.child("dist").assert(predicate::path::missing());
    fixture.child("version/keep.txt").assert(predicate::path::exists());
}

#[test]
fn test_clean_refuses_output_outside_a_subdirectory() {
    let fixture = TestFixture::new()
        .with_site_config(configs::SITE)
        .with_file("src/index.md", "# Home\n");

    // clap itself refuses an empty path; the rest fail settings validation
    for output in ["", ".", "..", "src"] {
        fixture
            .command()
            .args(["clean", "--output", output])
            .assert()
            .failure()
            .stderr(predicate::str::contains("output"));
    }

    fixture.child("mkdocs.yml").assert(predicate::path::is_file());
    fixture.child("src/index.md").assert(predicate::path::is_file());
}
