//! # ph CLI Entry Point
//!
//! Loads the project script, hands it the command-line options and drains
//! the chains it registers.
//!
//! Without options the project's description and declared options are
//! listed; with options the script's `run()` is called.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;

use ph::cli::{self, Cli, Invocation};
use ph::config;
use ph::platform::Platform;
use ph::project::{self, BuildApi, Project, Session};
use ph::scheduler::ChainReport;
use ph::ui;

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_utf8_console() {}

fn main() {
    enable_utf8_console();

    let cli = Cli::parse();
    let invocation = cli::parse_args(&cli.args);

    let code = match run(&invocation) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            ui::error(&format!("{:#}", e));
            1
        }
    };
    std::process::exit(code);
}

/// Returns whether every step that ran succeeded.
fn run(invocation: &Invocation) -> Result<bool> {
    ui::banner();

    let project_file = match project::locate_project_file(invocation.project_file.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            ui::usage("ph");
            return Err(e.into());
        }
    };
    let root = project::project_root(&project_file)?;

    let settings = config::load_config(&root)?;
    let toolchain = settings.toolchain(Platform::detect())?;
    let scheduler = settings.scheduler(&root);

    let options = invocation
        .script_options()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let session = Session::new(toolchain, root.to_string_lossy(), scheduler)
        .with_options(options)
        .with_observer(Box::new(ui::ConsoleObserver::new()));

    let mut project = Project::load(&project_file, BuildApi::new(session))?;
    let meta = project.meta();
    ui::project_info(&meta);

    if invocation.script_options().next().is_none() || invocation.wants_help() {
        ui::usage("ph");
        ui::list_options(&meta);
    } else {
        project.run()?;
    }

    // Chains registered after the script's last dispatch() still have to run
    project.api().dispatch();

    let reports = project.api().reports();
    ui::print_summary(&reports);
    if let Some(path) = invocation.report_path() {
        write_report(Path::new(path), &reports)?;
        ui::log(&format!("Chain report written to {}", path));
    }

    Ok(reports.iter().all(|r| r.failed_steps() == 0))
}

fn write_report(path: &Path, reports: &[ChainReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports).context("Failed to serialize chain report")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
