//! Concurrent chain scheduler.
//!
//! A chain is an ordered list of shell commands. Every registered chain has
//! at most one process running at a time; distinct chains run side by side.
//! The scheduler is a single-threaded poll loop: each tick launches the next
//! step of every idle chain, polls every running process without blocking,
//! advances the chains whose process exited, then sleeps for the poll
//! interval.
//!
//! ```text
//! Pending(0) -> Running(0) -> Pending(1) -> ... -> Done
//! ```
//!
//! Step failures never abort [`Scheduler::run_all`]. They are recorded as
//! [`StepOutcome`]s and, depending on the [`FailurePolicy`], either ignored
//! (the chain proceeds) or used to skip the rest of that chain.

mod chain;
mod observer;

pub use chain::{Chain, ChainReport, StepOutcome};
pub use observer::{Observer, Silent};

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::{Duration, Instant};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What happens to the rest of a chain after one of its steps fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Run the remaining steps anyway
    #[default]
    Continue,
    /// Mark the remaining steps as skipped
    AbortChain,
}

/// Totals for one [`Scheduler::run_all`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub chains: usize,
    pub steps_run: usize,
    pub failed_steps: usize,
    pub ticks: u64,
    pub elapsed: Duration,
}

impl Summary {
    pub fn success(&self) -> bool {
        self.failed_steps == 0
    }
}

struct ChainState {
    chain: Chain,
    outcomes: Vec<StepOutcome>,
    active: Option<Child>,
}

impl ChainState {
    fn completed(&self) -> usize {
        self.outcomes.len()
    }

    fn is_done(&self) -> bool {
        self.outcomes.len() == self.chain.len()
    }
}

pub struct Scheduler {
    chains: Vec<ChainState>,
    registered: HashSet<Chain>,
    poll_interval: Duration,
    policy: FailurePolicy,
    working_dir: Option<PathBuf>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            chains: Vec::new(),
            registered: HashSet::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            policy: FailurePolicy::default(),
            working_dir: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run every step from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Register a chain. Returns `false` if the same command sequence is
    /// already registered (running, pending or done); nothing changes then.
    pub fn register(&mut self, chain: impl Into<Chain>) -> bool {
        let chain = chain.into();
        if !self.registered.insert(chain.clone()) {
            return false;
        }
        self.chains.push(ChainState {
            chain,
            outcomes: Vec::new(),
            active: None,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Number of steps not yet completed across all chains.
    pub fn pending_steps(&self) -> usize {
        self.chains
            .iter()
            .map(|c| c.chain.len() - c.completed())
            .sum()
    }

    /// Drive every registered chain to completion.
    ///
    /// Blocks until each chain's progress equals its length. Chains that
    /// were already done are left untouched, so this can be called again
    /// after registering more chains.
    pub fn run_all(&mut self, observer: &mut dyn Observer) -> Summary {
        let start = Instant::now();
        let mut summary = Summary {
            chains: self.chains.len(),
            ..Default::default()
        };
        observer.started(self.pending_steps());

        while self.chains.iter().any(|c| !c.is_done()) {
            summary.ticks += 1;
            self.launch_idle(observer, &mut summary);
            self.poll_running(observer, &mut summary);

            if self.chains.iter().any(|c| !c.is_done()) {
                std::thread::sleep(self.poll_interval);
            }
        }

        summary.elapsed = start.elapsed();
        observer.completed(&summary);
        summary
    }

    fn launch_idle(&mut self, observer: &mut dyn Observer, summary: &mut Summary) {
        let policy = self.policy;
        for (idx, state) in self.chains.iter_mut().enumerate() {
            if state.is_done() || state.active.is_some() {
                continue;
            }

            let step = state.completed();
            let command = &state.chain[step];
            observer.launched(idx, step, command);

            match spawn_shell(command, self.working_dir.as_deref()) {
                Ok(child) => state.active = Some(child),
                Err(e) => {
                    let outcome = StepOutcome::Error {
                        message: e.to_string(),
                    };
                    record(idx, state, outcome, policy, observer, summary);
                }
            }
        }
    }

    fn poll_running(&mut self, observer: &mut dyn Observer, summary: &mut Summary) {
        let policy = self.policy;
        for (idx, state) in self.chains.iter_mut().enumerate() {
            let Some(child) = state.active.as_mut() else {
                continue;
            };

            let outcome = match child.try_wait() {
                Ok(Some(status)) => StepOutcome::from(status),
                Ok(None) => continue,
                Err(e) => StepOutcome::Error {
                    message: e.to_string(),
                },
            };

            state.active = None;
            record(idx, state, outcome, policy, observer, summary);
        }
    }

    pub fn reports(&self) -> Vec<ChainReport> {
        self.chains
            .iter()
            .map(|c| ChainReport {
                commands: c.chain.commands().to_vec(),
                outcomes: c.outcomes.clone(),
            })
            .collect()
    }
}

// Advance a chain by exactly one step.
fn record(
    idx: usize,
    state: &mut ChainState,
    outcome: StepOutcome,
    policy: FailurePolicy,
    observer: &mut dyn Observer,
    summary: &mut Summary,
) {
    let step = state.completed();
    let failed = outcome.is_failure();

    summary.steps_run += 1;
    if failed {
        summary.failed_steps += 1;
    }
    observer.finished(idx, step, &outcome);
    state.outcomes.push(outcome);

    if failed && policy == FailurePolicy::AbortChain {
        while !state.is_done() {
            let skipped = state.completed();
            observer.finished(idx, skipped, &StepOutcome::Skipped);
            state.outcomes.push(StepOutcome::Skipped);
        }
    }
}

fn spawn_shell(command: &str, working_dir: Option<&Path>) -> std::io::Result<Child> {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", command]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", command]);
        c
    };
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }
    cmd.spawn()
}
