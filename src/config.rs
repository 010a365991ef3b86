//! Settings file (`ph.toml`).
//!
//! Looked up next to the project file first, then at `~/.ph/config.toml`.
//! Every key is optional; a missing file means defaults everywhere.
//!
//! ```toml
//! [scheduler]
//! poll_interval_ms = 10
//! on_failure = "abort-chain"
//!
//! [toolchain]
//! target = "windows"
//! cc = "clang"
//! cython = "cython3"
//!
//! [python]
//! include = "/usr/include/python3.12"
//! lib = "python3.12"
//! ```

use crate::platform::Platform;
use crate::scheduler::{FailurePolicy, Scheduler};
use crate::synth::Toolchain;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "ph.toml";

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PhConfig {
    pub scheduler: SchedulerConfig,
    pub toolchain: ToolchainConfig,
    pub python: PythonConfig,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    pub poll_interval_ms: Option<u64>,
    pub on_failure: Option<FailurePolicy>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Target platform name, for path conventions and artifact extensions
    pub target: Option<String>,
    pub cc: Option<String>,
    pub cython: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PythonConfig {
    pub include: Option<String>,
    pub lib: Option<String>,
    pub lib_dir: Option<String>,
}

impl PhConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse ph.toml")
    }

    /// Resolve the synthesizer's view of the target.
    pub fn toolchain(&self, host: Platform) -> Result<Toolchain> {
        let platform = match &self.toolchain.target {
            Some(name) => Platform::by_name(name).ok_or_else(|| {
                anyhow!(
                    "Unknown target '{}' in ph.toml (expected windows, linux or mac)",
                    name
                )
            })?,
            None => host,
        };

        let mut toolchain = Toolchain::new(platform);
        toolchain.cc = self.toolchain.cc.clone();
        if let Some(cython) = &self.toolchain.cython {
            toolchain.cython = cython.clone();
        }
        if let Some(include) = &self.python.include {
            toolchain.python.include = Some(include.clone());
        }
        if let Some(lib) = &self.python.lib {
            toolchain.python.lib = Some(lib.clone());
        }
        if let Some(lib_dir) = &self.python.lib_dir {
            toolchain.python.lib_dir = Some(lib_dir.clone());
        }
        Ok(toolchain)
    }

    /// Build a scheduler running steps from `working_dir`.
    pub fn scheduler(&self, working_dir: &Path) -> Scheduler {
        let mut scheduler = Scheduler::new()
            .with_working_dir(working_dir)
            .with_policy(self.scheduler.on_failure.unwrap_or_default());
        if let Some(ms) = self.scheduler.poll_interval_ms {
            scheduler = scheduler.with_poll_interval(Duration::from_millis(ms.max(1)));
        }
        scheduler
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ph").join("config.toml"))
}

/// Load `ph.toml` from `project_dir`, falling back to the user config.
pub fn load_config(project_dir: &Path) -> Result<PhConfig> {
    let candidates = std::iter::once(project_dir.join(CONFIG_FILE)).chain(user_config_path());

    for path in candidates {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            return PhConfig::parse(&content)
                .with_context(|| format!("Invalid settings in {}", path.display()));
        }
    }

    Ok(PhConfig::default())
}
