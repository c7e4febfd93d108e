//! External abort via a shared flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use diagnos_blackboard::Session;

use super::AbortStrategy;
use crate::model::{Path, SearchModel};

/// Aborts when an external flag is set.
///
/// Allows other threads to stop a running search.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use diagnos_costbenefit::ExternalAbort;
///
/// let flag = Arc::new(AtomicBool::new(false));
/// let abort = ExternalAbort::new(Arc::clone(&flag));
///
/// // Later, from anywhere:
/// flag.store(true, Ordering::SeqCst);
/// ```
#[derive(Debug, Clone)]
pub struct ExternalAbort {
    flag: Arc<AtomicBool>,
}

impl ExternalAbort {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    pub fn flag(&self) -> &Arc<AtomicBool> {
        &self.flag
    }
}

impl AbortStrategy for ExternalAbort {
    fn init(&mut self, _model: &SearchModel) {}

    fn next_step(&mut self, _path: &Path, _session: &Session) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
