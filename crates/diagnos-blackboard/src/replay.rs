//! Replaying recorded fact histories.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::fact::Fact;
use crate::session::{Session, SessionId};

/// Concurrency-safe set of sessions currently being rebuilt.
///
/// Owned by the application and handed to whatever needs to know, e.g. a
/// planner that must stay quiet while a session history is replayed.
#[derive(Debug, Default)]
pub struct RebuildRegistry {
    sessions: Mutex<HashSet<SessionId>>,
}

impl RebuildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a session as being rebuilt until the guard is dropped.
    pub fn begin(&self, session: SessionId) -> RebuildGuard<'_> {
        self.lock().insert(session);
        RebuildGuard {
            registry: self,
            session,
        }
    }

    pub fn is_rebuilding(&self, session: SessionId) -> bool {
        self.lock().contains(&session)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<SessionId>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the rebuild mark on drop.
#[derive(Debug)]
pub struct RebuildGuard<'a> {
    registry: &'a RebuildRegistry,
    session: SessionId,
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.session);
    }
}

/// Re-applies a recorded fact history inside one propagation frame while the
/// session is marked as being rebuilt. Returns the number of facts applied.
pub fn replay(
    session: &mut Session,
    facts: impl IntoIterator<Item = Fact>,
    registry: &RebuildRegistry,
) -> usize {
    let _guard = registry.begin(session.id());
    let applied = session.propagate(|s| {
        let mut applied = 0;
        for fact in facts {
            s.add_fact(fact);
            applied += 1;
        }
        applied
    });
    info!(event = "session_replayed", session = %session.id(), facts = applied);
    applied
}
