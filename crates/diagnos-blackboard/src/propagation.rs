//! Frame counter and per-contributor pending changes.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use diagnos_core::ObjectId;

use crate::contributor::ContributorId;
use crate::fact::PropagationEntry;

/// Collects value changes per contributor while frames are open.
///
/// Frames nest. Opening the first frame allocates the pending maps, and only
/// closing the outermost frame lets the session distribute them. Changes to
/// the same object are folded: a change back to the original value cancels
/// the pending entry, any other change extends it.
#[derive(Debug, Clone)]
pub struct PropagationController {
    depth: usize,
    // Indexed by contributor id, `None` for contributors that do not listen.
    pending: Vec<Option<BTreeMap<ObjectId, PropagationEntry>>>,
    listening: Vec<bool>,
}

impl PropagationController {
    /// Creates a controller for contributors flagged in `listening`.
    pub fn new(listening: Vec<bool>) -> Self {
        Self {
            depth: 0,
            pending: Vec::new(),
            listening,
        }
    }

    pub fn open_frame(&mut self) {
        if self.depth == 0 && self.pending.is_empty() {
            self.pending = self
                .listening
                .iter()
                .map(|&listening| listening.then(BTreeMap::new))
                .collect();
        }
        self.depth += 1;
    }

    /// Leaves a frame. Returns true if it was the outermost one.
    pub fn leave_frame(&mut self) -> bool {
        debug_assert!(self.depth > 0, "leave_frame without open_frame");
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 && !self.has_pending() {
            self.pending.clear();
        }
        self.depth == 0
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn in_frame(&self) -> bool {
        self.depth > 0
    }

    /// Folds a change into every listening contributor's pending map.
    pub fn report(&mut self, entry: PropagationEntry) {
        if self.pending.is_empty() {
            return;
        }
        for pending in self.pending.iter_mut().flatten() {
            match pending.entry(entry.object()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry.clone());
                }
                Entry::Occupied(mut slot) => {
                    if slot.get().old_value() == entry.new_value() {
                        slot.remove();
                    } else {
                        slot.get_mut().set_new_value(entry.new_value().clone());
                    }
                }
            }
        }
    }

    /// Takes the pending entries of the first contributor in `order` that
    /// has any.
    pub fn next_batch(
        &mut self,
        order: &[ContributorId],
    ) -> Option<(ContributorId, Vec<PropagationEntry>)> {
        for &id in order {
            let Some(Some(pending)) = self.pending.get_mut(id.index()) else {
                continue;
            };
            if pending.is_empty() {
                continue;
            }
            let batch = std::mem::take(pending).into_values().collect();
            return Some((id, batch));
        }
        None
    }

    /// Pending entries of one contributor.
    pub fn pending(&self, contributor: ContributorId) -> Vec<&PropagationEntry> {
        match self.pending.get(contributor.index()) {
            Some(Some(pending)) => pending.values().collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .iter()
            .flatten()
            .any(|pending| !pending.is_empty())
    }

    pub fn is_listening(&self, contributor: ContributorId) -> bool {
        self.listening
            .get(contributor.index())
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use diagnos_core::Value;

    use super::*;
    use crate::test_utils::contributor_id;

    fn entry(old: Value, new: Value) -> PropagationEntry {
        PropagationEntry::new(ObjectId::from_index(0), old, new)
    }

    fn a() -> Value {
        Value::choice("A")
    }
    fn b() -> Value {
        Value::choice("B")
    }
    fn c() -> Value {
        Value::choice("C")
    }

    #[test]
    fn test_annihilation() {
        let mut controller = PropagationController::new(vec![true]);
        controller.open_frame();
        controller.report(entry(a(), b()));
        controller.report(entry(b(), a()));

        assert!(!controller.has_pending());
        assert!(controller.leave_frame());
    }

    #[test]
    fn test_chaining() {
        let mut controller = PropagationController::new(vec![true]);
        controller.open_frame();
        controller.report(entry(a(), b()));
        controller.report(entry(b(), c()));

        let (id, batch) = controller.next_batch(&[contributor_id(0)]).unwrap();
        assert_eq!(id, contributor_id(0));
        assert_eq!(batch, vec![entry(a(), c())]);
        assert!(controller.next_batch(&[contributor_id(0)]).is_none());
    }

    #[test]
    fn test_nested_frames_only_finish_at_outermost() {
        let mut controller = PropagationController::new(vec![true]);
        controller.open_frame();
        controller.open_frame();
        assert_eq!(controller.depth(), 2);
        assert!(!controller.leave_frame());
        assert!(controller.leave_frame());
        assert!(!controller.in_frame());
    }

    #[test]
    fn test_silent_contributors_receive_nothing() {
        let mut controller = PropagationController::new(vec![false, true]);
        controller.open_frame();
        controller.report(entry(a(), b()));

        assert!(controller.pending(contributor_id(0)).is_empty());
        assert_eq!(controller.pending(contributor_id(1)).len(), 1);

        let order = [contributor_id(0), contributor_id(1)];
        let (id, _) = controller.next_batch(&order).unwrap();
        assert_eq!(id, contributor_id(1));
    }
}
