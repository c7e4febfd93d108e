//! Step count abort.

use diagnos_blackboard::Session;

use super::AbortStrategy;
use crate::model::{Path, SearchModel};

/// Aborts after a number of visited search-tree nodes.
///
/// # Example
///
/// ```
/// use diagnos_costbenefit::StepCountAbort;
///
/// // Abort after 1000 steps
/// let abort = StepCountAbort::new(1000);
/// assert_eq!(abort.limit(), 1000);
/// ```
#[derive(Debug, Clone)]
pub struct StepCountAbort {
    limit: u64,
    steps: u64,
}

impl StepCountAbort {
    pub fn new(limit: u64) -> Self {
        Self { limit, steps: 0 }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Default for StepCountAbort {
    fn default() -> Self {
        Self::new(diagnos_config::DEFAULT_STEP_LIMIT)
    }
}

impl AbortStrategy for StepCountAbort {
    fn init(&mut self, _model: &SearchModel) {
        self.steps = 0;
    }

    fn next_step(&mut self, _path: &Path, _session: &Session) -> bool {
        self.steps += 1;
        self.steps >= self.limit
    }
}
