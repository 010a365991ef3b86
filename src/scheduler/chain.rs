use serde::Serialize;
use std::ops::Deref;
use std::process::ExitStatus;

/// An ordered, immutable sequence of shell commands.
///
/// Chains are compared and hashed by their commands, so the same sequence
/// registered twice is the same chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Chain(Vec<String>);

impl Chain {
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Chain(steps.into_iter().map(Into::into).collect())
    }

    pub fn commands(&self) -> &[String] {
        &self.0
    }
}

impl Deref for Chain {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Chain {
    fn from(steps: Vec<String>) -> Self {
        Chain(steps)
    }
}

impl From<&[&str]> for Chain {
    fn from(steps: &[&str]) -> Self {
        Chain::new(steps.iter().copied())
    }
}

/// What happened to one step of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The process exited with this code
    Exited { code: i32 },
    /// The process was terminated without an exit code
    Signalled,
    /// The shell could not be started or waited on
    Error { message: String },
    /// Not run: an earlier step of the chain failed under `abort-chain`
    Skipped,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Exited { code: 0 })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success() && !matches!(self, StepOutcome::Skipped)
    }
}

impl From<ExitStatus> for StepOutcome {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => StepOutcome::Exited { code },
            None => StepOutcome::Signalled,
        }
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepOutcome::Exited { code: 0 } => write!(f, "ok"),
            StepOutcome::Exited { code } => write!(f, "exit {}", code),
            StepOutcome::Signalled => write!(f, "killed by signal"),
            StepOutcome::Error { message } => write!(f, "error: {}", message),
            StepOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Snapshot of a chain's commands and the outcomes recorded so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    pub commands: Vec<String>,
    pub outcomes: Vec<StepOutcome>,
}

impl ChainReport {
    pub fn completed_steps(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_done(&self) -> bool {
        self.outcomes.len() == self.commands.len()
    }

    pub fn failed_steps(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }
}
