//! Integration tests for the `ph` binary
//!
//! These tests write a project script into a scratch directory and run the
//! built binary against it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Get the path to the ph binary
fn get_ph_binary() -> PathBuf {
    let target_dir = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target"));

    let bin_name = if cfg!(windows) { "ph.exe" } else { "ph" };
    target_dir.join("debug").join(bin_name)
}

fn create_project(script: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Failed to create test directory");
    fs::write(dir.path().join("project.ph"), script).expect("Failed to write project.ph");
    dir
}

fn run_ph(dir: &Path, args: &[&str]) -> Option<Output> {
    let ph = get_ph_binary();
    if !ph.exists() {
        eprintln!("Skipping test: ph binary not found at {:?}", ph);
        return None;
    }
    Some(
        Command::new(&ph)
            .args(args)
            .current_dir(dir)
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute ph"),
    )
}

const CHAINS_PROJECT: &str = r#"
project_name("chains");
project_version(0, 1);
project_options(#{ build: "Run the build chains" });

fn run() {
    chain(["echo one > a.txt", "echo two >> a.txt"]);
    chain(["echo three > b.txt"]);
}
"#;

#[cfg(unix)]
#[test]
fn test_run_chains() {
    let project = create_project(CHAINS_PROJECT);
    let Some(output) = run_ph(project.path(), &["--build"]) else {
        return;
    };

    assert!(
        output.status.success(),
        "ph failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let a = fs::read_to_string(project.path().join("a.txt")).unwrap();
    assert_eq!(a.lines().collect::<Vec<_>>(), vec!["one", "two"]);
    assert!(project.path().join("b.txt").exists());
}

#[test]
fn test_no_options_lists_declared_options() {
    let project = create_project(CHAINS_PROJECT);
    let Some(output) = run_ph(project.path(), &[]) else {
        return;
    };

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("chains version 0.1"), "stdout: {}", stdout);
    assert!(stdout.contains("[--build:value] Run the build chains"));
    // run() must not be called without options
    assert!(!project.path().join("a.txt").exists());
}

#[test]
fn test_help_flag_lists_declared_options() {
    let project = create_project(CHAINS_PROJECT);
    for flag in ["--help", "-h"] {
        let Some(output) = run_ph(project.path(), &[flag]) else {
            return;
        };

        assert!(output.status.success(), "{} failed", flag);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("[--build:value] Run the build chains"), "stdout: {}", stdout);
        assert!(!project.path().join("a.txt").exists());
    }
}

#[cfg(unix)]
#[test]
fn test_failed_step_sets_exit_code() {
    let project = create_project(
        r#"
fn run() {
    chain(["true", "true"]);
    chain(["false", "echo ran > after.txt"]);
}
"#,
    );
    let Some(output) = run_ph(project.path(), &["--go"]) else {
        return;
    };

    assert_eq!(output.status.code(), Some(1));
    // The default policy keeps going after a failure
    assert!(project.path().join("after.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_abort_chain_policy_from_settings() {
    let project = create_project(
        r#"
fn run() {
    chain(["false", "echo ran > after.txt"]);
}
"#,
    );
    fs::write(
        project.path().join("ph.toml"),
        "[scheduler]\non_failure = \"abort-chain\"\n",
    )
    .unwrap();
    let Some(output) = run_ph(project.path(), &["--go"]) else {
        return;
    };

    assert_eq!(output.status.code(), Some(1));
    assert!(!project.path().join("after.txt").exists());
}

#[test]
fn test_missing_project_file() {
    let dir = tempfile::tempdir().unwrap();
    let Some(output) = run_ph(dir.path(), &["nothere.ph"]) else {
        return;
    };

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid project file was specified"), "stderr: {}", stderr);
}

#[test]
fn test_script_error_reported() {
    let project = create_project(r#"project_version(1, "beta");"#);
    let Some(output) = run_ph(project.path(), &[]) else {
        return;
    };

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid version number"), "stderr: {}", stderr);
}

#[cfg(unix)]
#[test]
fn test_option_values_reach_script() {
    let project = create_project(
        r#"
fn run() {
    chain(["echo " + get_option("mode", "debug") + " > mode.txt"]);
}
"#,
    );
    let Some(output) = run_ph(project.path(), &["--mode:release"]) else {
        return;
    };

    assert!(output.status.success());
    let mode = fs::read_to_string(project.path().join("mode.txt")).unwrap();
    assert_eq!(mode.trim(), "release");
}

#[cfg(unix)]
#[test]
fn test_report_written_as_json() {
    let project = create_project(
        r#"
fn run() {
    chain(["true", "false"]);
}
"#,
    );
    let report = project.path().join("report.json");
    let report_arg = format!("--report:{}", report.display());
    let Some(output) = run_ph(project.path(), &["--go", &report_arg]) else {
        return;
    };

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json[0]["commands"][1], "false");
    assert_eq!(json[0]["outcomes"][0]["status"], "exited");
    assert_eq!(json[0]["outcomes"][1]["code"], 1);
}
