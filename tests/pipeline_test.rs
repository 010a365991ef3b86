//! End-to-end tests through the library API: script, synthesis, scheduler.

use ph::config::PhConfig;
use ph::platform::Platform;
use ph::project::{BuildApi, Project, Session, project_root};
use std::fs;

fn load(dir: &std::path::Path, script: &str, settings: &str) -> Project {
    let path = dir.join("project.ph");
    fs::write(&path, script).unwrap();

    let root = project_root(&path).unwrap();
    let config = PhConfig::parse(settings).unwrap();
    let toolchain = config.toolchain(Platform::Linux).unwrap();
    let session = Session::new(toolchain, root.to_string_lossy(), config.scheduler(&root))
        .with_options([("build".to_string(), "on".to_string())].into());
    Project::load(&path, BuildApi::new(session)).unwrap()
}

#[cfg(unix)]
#[test]
fn test_cython_chain_runs_with_stub_tools() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = load(
        dir.path(),
        r#"
fn run() {
    cython(#{ source: "./spam.pyx", output: "build/spam", directives: #{ boundscheck: false } });
    dispatch();
}
"#,
        "[toolchain]\ncython = \"true\"\ncc = \"true\"\n",
    );
    project.run().unwrap();

    let reports = project.api().reports();
    assert_eq!(reports.len(), 1);
    let commands = &reports[0].commands;
    assert!(commands[0].starts_with("true -X boundscheck=False "));
    assert!(commands[0].ends_with("/spam.c"));
    assert!(commands[1].contains("/build/spam.so -shared -fPIC"));
    assert!(reports[0].is_done());
    assert_eq!(reports[0].failed_steps(), 0);
}

#[test]
fn test_synthesis_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let script = r#"
fn run() {
    compile(#{ source: "./main.c", output: "main", includes: ["./inc"], libraries: ["m"] });
}
"#;
    let mut first = load(dir.path(), script, "");
    first.run().unwrap();
    let mut second = load(dir.path(), script, "");
    second.run().unwrap();

    assert_eq!(first.api().reports(), second.api().reports());
    let command = &first.api().reports()[0].commands[0];
    assert!(command.starts_with("gcc "), "{}", command);
    assert!(command.contains("/main.c -o "));
    assert!(command.ends_with("/inc -lm"), "{}", command);
}

#[cfg(unix)]
#[test]
fn test_delete_removes_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("spam.c"), "").unwrap();
    fs::write(dir.path().join("eggs.c"), "").unwrap();
    fs::write(dir.path().join("keep.pyx"), "").unwrap();

    let mut project = load(
        dir.path(),
        r#"
fn run() {
    let removed = delete("./*.c");
    chain(["echo " + removed]);
}
"#,
        "",
    );
    project.run().unwrap();

    assert!(!dir.path().join("spam.c").exists());
    assert!(!dir.path().join("eggs.c").exists());
    assert!(dir.path().join("keep.pyx").exists());
    assert_eq!(project.api().reports()[0].commands, vec!["echo 2"]);
}
