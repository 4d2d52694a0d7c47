// harness_run.rs — End-to-end runs of the ut-testcon binary.
//
// Each test points HOME at a fresh temp dir and runs the real binary:
//
//   1. Full run: every case passes, the sandbox is created and removed
//   2. Stale sandbox from an interrupted run is scrubbed and removed
//   3. --list prints the selected names without touching the sandbox
//   4. Missing primary directory: fatal, location printed, exit failure
//   5. Explicit config file that does not exist: fatal
//   6. --list still resolves the sandbox first
//   7. A config file's template decides where the sandbox goes

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

fn home_with_projects() -> TempDir {
    let home = tempdir().unwrap();
    fs::create_dir_all(home.path().join("Projects/FmtTest")).unwrap();
    home
}

fn ut_testcon(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ut-testcon"))
        .args(args)
        .env("HOME", home)
        .env_remove("UT_TESTCON_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn sandbox(home: &Path) -> std::path::PathBuf {
    home.join("Projects/FmtTest/ut-testcon")
}

#[test]
fn full_run_passes_and_cleans_up() {
    let home = home_with_projects();

    let output = ut_testcon(home.path(), &["--terse-output", "--no-color"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("0 failed"));
    assert!(!stdout.contains('\x1b'));
    assert!(!sandbox(home.path()).exists());
    assert!(home.path().join("Projects/FmtTest").is_dir());
}

#[test]
fn stale_sandbox_is_scrubbed() {
    let home = home_with_projects();
    let stale = sandbox(home.path()).join("old/src");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join("a.cpp"), "int a;").unwrap();

    let output = ut_testcon(home.path(), &["sandbox_starts_empty", "--gtest_color=no"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("[       OK ] sandbox_starts_empty"));
    assert!(!sandbox(home.path()).exists());
}

#[test]
fn list_prints_selected_names() {
    let home = home_with_projects();

    let output = ut_testcon(home.path(), &["--list", "scoped_write"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        ["scoped_write_round_trips", "scoped_write_rejects_outside_path"]
    );
    assert!(!sandbox(home.path()).exists());
}

#[test]
fn missing_primary_directory_is_fatal() {
    let home = tempdir().unwrap();

    let output = ut_testcon(home.path(), &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("primary directory does not exist"));
    assert!(stderr.contains("main.rs ("));
    assert!(stderr.trim_end().ends_with("The test has terminated!"));
}

#[test]
fn missing_config_file_is_fatal() {
    let home = home_with_projects();
    let config = home.path().join("nope.toml");

    let output = ut_testcon(home.path(), &["--config", config.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("cannot read config file"));
    assert!(stderr.contains("The test has terminated!"));
    assert!(!sandbox(home.path()).exists());
}

#[test]
fn list_requires_resolvable_sandbox() {
    let home = tempdir().unwrap();

    let output = ut_testcon(home.path(), &["--list"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stdout.is_empty(), "stdout: {}", stdout);
    assert!(stderr.contains("primary directory does not exist"));
}

#[test]
fn config_template_chooses_sandbox() {
    let home = tempdir().unwrap();
    fs::create_dir_all(home.path().join("scratch")).unwrap();
    let config = home.path().join("harness.toml");
    fs::write(&config, "sandbox_template = \"$HOME/scratch/ut-testcon\"\n").unwrap();

    let output = ut_testcon(
        home.path(),
        &["sandbox_starts_empty", "--config", config.to_str().unwrap()],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stdout: {} stderr: {}", stdout, stderr);
    assert!(stderr.contains("scratch/ut-testcon"));
    assert!(!home.path().join("scratch/ut-testcon").exists());
    assert!(home.path().join("scratch").is_dir());
}
