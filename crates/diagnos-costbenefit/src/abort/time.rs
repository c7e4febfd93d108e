//! Time-based abort.

use std::time::{Duration, Instant};

use diagnos_blackboard::Session;

use super::AbortStrategy;
use crate::model::{Path, SearchModel};

/// Aborts once a search has run for a time limit.
///
/// The clock starts in [`init`](AbortStrategy::init).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use diagnos_costbenefit::TimeAbort;
///
/// let abort = TimeAbort::new(Duration::from_secs(2));
///
/// // Or use convenience constructors
/// let abort = TimeAbort::seconds(2);
/// let abort = TimeAbort::millis(500);
/// ```
#[derive(Debug, Clone)]
pub struct TimeAbort {
    limit: Option<Duration>,
    started: Option<Instant>,
}

impl TimeAbort {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit: Some(limit),
            started: None,
        }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Never aborts.
    pub fn unlimited() -> Self {
        Self {
            limit: None,
            started: None,
        }
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }
}

impl AbortStrategy for TimeAbort {
    fn init(&mut self, _model: &SearchModel) {
        self.started = Some(Instant::now());
    }

    fn next_step(&mut self, _path: &Path, _session: &Session) -> bool {
        let Some(limit) = self.limit else {
            return false;
        };
        let started = *self.started.get_or_insert_with(Instant::now);
        started.elapsed() >= limit
    }
}
