//! Search algorithms the controller can run on a [`SearchModel`].

use std::fmt::Debug;
use std::time::Duration;

use diagnos_blackboard::Session;
use diagnos_config::PlannerConfig;
use diagnos_core::Result;

use crate::abort::{AbortStrategy, ConfiguredAbort, StepCountAbort};
use crate::ids::IterativeDeepeningSearch;
use crate::model::SearchModel;

/// Outcome of one search run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStatistics {
    /// Visited search-tree nodes.
    pub steps: u64,
    /// Deepest completed or started iteration.
    pub depth: usize,
    /// Whether the abort strategy stopped the search.
    pub aborted: bool,
    pub elapsed: Duration,
}

impl SearchStatistics {
    /// Visited nodes per second.
    pub fn steps_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.steps as f64 / secs
        } else {
            0.0
        }
    }
}

/// Fills the min paths of a model's targets.
pub trait SearchAlgorithm: Send + Sync + Debug {
    /// Searches paths for the targets of `model`, starting at the state of
    /// `session`. The session itself is never modified.
    fn search(&self, session: &Session, model: &mut SearchModel) -> Result<SearchStatistics>;
}

/// Iterative deepening with a fresh copy of the abort strategy `A` per
/// search.
///
/// # Example
///
/// ```
/// use diagnos_costbenefit::{IterativeDeepeningAlgorithm, StepCountAbort};
///
/// let algorithm = IterativeDeepeningAlgorithm::new(StepCountAbort::new(500))
///     .with_allow_revisits(false)
///     .with_max_depth(6);
/// assert_eq!(algorithm.max_depth(), Some(6));
/// ```
#[derive(Debug, Clone)]
pub struct IterativeDeepeningAlgorithm<A = StepCountAbort> {
    abort: A,
    allow_revisits: bool,
    max_depth: Option<usize>,
}

impl<A: AbortStrategy + Clone> IterativeDeepeningAlgorithm<A> {
    pub fn new(abort: A) -> Self {
        Self {
            abort,
            allow_revisits: false,
            max_depth: None,
        }
    }

    pub fn with_allow_revisits(mut self, allow_revisits: bool) -> Self {
        self.allow_revisits = allow_revisits;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn allow_revisits(&self) -> bool {
        self.allow_revisits
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}

impl IterativeDeepeningAlgorithm<ConfiguredAbort> {
    /// Builds the algorithm from search and abort settings.
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            abort: ConfiguredAbort::from_config(&config.abort),
            allow_revisits: config.search.allow_revisits,
            max_depth: config.search.max_depth,
        }
    }
}

impl Default for IterativeDeepeningAlgorithm<StepCountAbort> {
    fn default() -> Self {
        Self::new(StepCountAbort::default())
    }
}

impl<A> SearchAlgorithm for IterativeDeepeningAlgorithm<A>
where
    A: AbortStrategy + Clone + Sync,
{
    fn search(&self, session: &Session, model: &mut SearchModel) -> Result<SearchStatistics> {
        let mut search = IterativeDeepeningSearch::new(session, model, self.abort.clone())
            .with_allow_revisits(self.allow_revisits);
        if let Some(max_depth) = self.max_depth {
            search = search.with_max_depth(max_depth);
        }
        search.run()
    }
}
