//! Bookkeeping of one planning run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Path, Target};
use crate::strategy::{CostFunction, DefaultCostFunction};

/// Index of a target inside its [`SearchModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(usize);

impl TargetId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Targets of one planning run plus the best results found so far.
///
/// Benefits only rise and min paths only get cheaper while the model lives,
/// so the best cost/benefit ratio only improves.
#[derive(Debug)]
pub struct SearchModel {
    targets: Vec<Target>,
    blocked: Vec<(Target, String)>,
    best_benefit: Option<TargetId>,
    best_cost_benefit: Option<TargetId>,
    cost_function: Arc<dyn CostFunction>,
    aborted: Arc<AtomicBool>,
}

impl SearchModel {
    pub fn new(cost_function: Arc<dyn CostFunction>) -> Self {
        Self {
            targets: Vec::new(),
            blocked: Vec::new(),
            best_benefit: None,
            best_cost_benefit: None,
            cost_function,
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Adds a target and returns its id. A target with the same QContainers
    /// is reused.
    pub fn add_target(&mut self, target: Target) -> TargetId {
        if let Some(index) = self
            .targets
            .iter()
            .position(|existing| existing.same_qcontainers(&target))
        {
            return TargetId(index);
        }
        self.targets.push(target);
        TargetId(self.targets.len() - 1)
    }

    /// Keeps a target out of planning, remembering why.
    pub fn block_target(&mut self, target: Target, reason: impl Into<String>) {
        self.blocked.push((target, reason.into()));
    }

    pub fn blocked_targets(&self) -> &[(Target, String)] {
        &self.blocked
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, id: TargetId) -> &Target {
        &self.targets[id.0]
    }

    pub fn target_ids(&self) -> impl Iterator<Item = TargetId> {
        (0..self.targets.len()).map(TargetId)
    }

    /// Raises the benefit of a target to `benefit` if that is higher.
    pub fn maximize_benefit(&mut self, id: TargetId, benefit: f64) {
        if self.targets[id.0].raise_benefit(benefit) {
            self.check_target(id);
        }
    }

    /// Records `path` as min path of the target if it is strictly cheaper.
    pub fn offer_path(&mut self, id: TargetId, path: &Path) -> bool {
        let improved = self.targets[id.0].offer_path(path);
        if improved {
            self.check_target(id);
        }
        improved
    }

    /// Updates the best benefit target, and the best cost/benefit target if
    /// the target has been reached.
    pub fn check_target(&mut self, id: TargetId) {
        let target = &self.targets[id.0];
        let better_benefit = self
            .best_benefit
            .map_or(true, |best| target.benefit() > self.targets[best.0].benefit());
        if better_benefit {
            self.best_benefit = Some(id);
        }

        let target = &self.targets[id.0];
        if target.min_path().is_some() {
            let better_ratio = self.best_cost_benefit.map_or(true, |best| {
                target.cost_benefit() < self.targets[best.0].cost_benefit()
            });
            if better_ratio {
                self.best_cost_benefit = Some(id);
            }
        }
    }

    /// Highest benefit of any target, 0 without targets.
    pub fn best_benefit(&self) -> f64 {
        self.best_benefit
            .map_or(0.0, |id| self.targets[id.0].benefit())
    }

    pub fn best_benefit_target(&self) -> Option<&Target> {
        self.best_benefit.map(|id| &self.targets[id.0])
    }

    /// Best cost/benefit ratio of a reached target, `f64::MAX` if none.
    pub fn best_cost_benefit(&self) -> f64 {
        self.best_cost_benefit
            .map_or(f64::MAX, |id| self.targets[id.0].cost_benefit())
    }

    pub fn best_cost_benefit_target(&self) -> Option<&Target> {
        self.best_cost_benefit.map(|id| &self.targets[id.0])
    }

    pub fn best_cost_benefit_id(&self) -> Option<TargetId> {
        self.best_cost_benefit
    }

    /// Min path of the best cost/benefit target.
    pub fn best_path(&self) -> Option<&Path> {
        self.best_cost_benefit_target().and_then(Target::min_path)
    }

    /// Highest benefit among targets without a min path.
    pub fn best_unreached_benefit(&self) -> f64 {
        self.targets
            .iter()
            .filter(|t| t.min_path().is_none())
            .map(Target::benefit)
            .fold(0.0, f64::max)
    }

    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn is_any_target_reached(&self) -> bool {
        self.best_cost_benefit.is_some()
    }

    pub fn all_targets_reached(&self) -> bool {
        self.targets.iter().all(|t| t.min_path().is_some())
    }

    pub fn cost_function(&self) -> &dyn CostFunction {
        self.cost_function.as_ref()
    }

    /// Marks the search as aborted. The best path found so far stays valid.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Shared flag that aborts a running search when set.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.aborted)
    }
}

impl Default for SearchModel {
    fn default() -> Self {
        Self::new(Arc::new(DefaultCostFunction))
    }
}

#[cfg(test)]
mod tests {
    use diagnos_core::ObjectId;

    use super::*;

    fn qc(index: usize) -> ObjectId {
        ObjectId::from_index(index)
    }

    fn path(steps: &[(usize, f64)]) -> Path {
        let mut path = Path::new();
        for &(index, cost) in steps {
            path.push(qc(index), cost);
        }
        path
    }

    #[test]
    fn test_empty_model() {
        let model = SearchModel::default();
        assert!(!model.has_targets());
        assert_eq!(model.best_benefit(), 0.0);
        assert_eq!(model.best_cost_benefit(), f64::MAX);
        assert_eq!(model.best_unreached_benefit(), 0.0);
        assert!(model.best_path().is_none());
    }

    #[test]
    fn test_duplicate_targets_are_merged() {
        let mut model = SearchModel::default();
        let a = model.add_target(Target::new(vec![qc(1), qc(2)]));
        let b = model.add_target(Target::new(vec![qc(2), qc(1)]));
        assert_eq!(a, b);
        assert_eq!(model.targets().len(), 1);
    }

    #[test]
    fn test_check_target_with_combined_target() {
        let mut model = SearchModel::default();
        let t = model.add_target(Target::new(vec![qc(1), qc(2)]));
        model.maximize_benefit(t, 5.0);
        assert_eq!(model.best_benefit(), 5.0);
        assert!(!model.is_any_target_reached());

        assert!(model.offer_path(t, &path(&[(1, 2.0), (2, 3.0)])));
        assert_eq!(model.best_cost_benefit_id(), Some(t));
        assert_eq!(model.best_cost_benefit(), 1.0);
        assert!(model.all_targets_reached());
    }

    #[test]
    fn test_best_ratio_prefers_cheaper_per_benefit() {
        let mut model = SearchModel::default();
        let expensive = model.add_target(Target::single(qc(1)));
        let cheap = model.add_target(Target::single(qc(2)));
        model.maximize_benefit(expensive, 10.0);
        model.maximize_benefit(cheap, 2.0);

        model.offer_path(expensive, &path(&[(1, 30.0)]));
        assert_eq!(model.best_cost_benefit(), 3.0);
        assert_eq!(model.best_unreached_benefit(), 2.0);

        model.offer_path(cheap, &path(&[(2, 2.0)]));
        assert_eq!(model.best_cost_benefit_id(), Some(cheap));
        assert_eq!(model.best_benefit_target().map(Target::benefit), Some(10.0));
    }

    #[test]
    fn test_benefit_is_never_lowered() {
        let mut model = SearchModel::default();
        let t = model.add_target(Target::single(qc(1)));
        model.maximize_benefit(t, 4.0);
        model.maximize_benefit(t, 1.0);
        assert_eq!(model.target(t).benefit(), 4.0);
    }

    #[test]
    fn test_abort_handle_is_shared() {
        let model = SearchModel::default();
        let handle = model.abort_handle();
        assert!(!model.is_aborted());
        handle.store(true, Ordering::SeqCst);
        assert!(model.is_aborted());
    }
}
