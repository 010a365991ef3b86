use super::{StepOutcome, Summary};

/// Hook into the scheduler's lifecycle events.
///
/// `chain` is the registration index of the chain, `step` the index of the
/// command within it.
pub trait Observer {
    /// A drain begins with this many steps left to run.
    fn started(&mut self, _pending_steps: usize) {}

    fn launched(&mut self, _chain: usize, _step: usize, _command: &str) {}

    fn finished(&mut self, _chain: usize, _step: usize, _outcome: &StepOutcome) {}

    fn completed(&mut self, _summary: &Summary) {}
}

/// Observer that ignores every event.
pub struct Silent;

impl Observer for Silent {}
