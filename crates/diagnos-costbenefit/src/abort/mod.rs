//! Cooperative cancellation of planner runs.

mod composite;
mod external;
mod step_count;
mod time;

use std::fmt::Debug;

use diagnos_blackboard::Session;

use crate::model::{Path, SearchModel};

pub use composite::AnyAbort;
pub use external::ExternalAbort;
pub use step_count::StepCountAbort;
pub use time::TimeAbort;

/// Decides when a running search should stop.
///
/// The planner calls [`init`](AbortStrategy::init) once per search and
/// [`next_step`](AbortStrategy::next_step) at every visited search-tree
/// node. Returning `true` aborts the search; the best path found so far
/// stays the result.
pub trait AbortStrategy: Send + Debug {
    fn init(&mut self, model: &SearchModel);

    /// Returns true if the search should abort.
    fn next_step(&mut self, path: &Path, session: &Session) -> bool;
}

/// Abort strategy built from an [`AbortConfig`](diagnos_config::AbortConfig):
/// a step limit plus an optional time limit.
pub type ConfiguredAbort = AnyAbort<(StepCountAbort, TimeAbort)>;

impl ConfiguredAbort {
    pub fn from_config(config: &diagnos_config::AbortConfig) -> Self {
        let time = config
            .time_limit()
            .map_or_else(TimeAbort::unlimited, TimeAbort::new);
        AnyAbort((StepCountAbort::new(config.step_limit()), time))
    }
}

#[cfg(test)]
mod tests;
