//! Per-session state of the cost-benefit controller.

use std::collections::BTreeSet;

use diagnos_blackboard::Fact;
use diagnos_core::ObjectId;

use crate::algorithm::SearchStatistics;
use crate::model::SearchModel;

/// The active path of one session and the results of the last search.
#[derive(Debug, Default)]
pub struct CostBenefitState {
    pub(crate) sequence: Option<Vec<ObjectId>>,
    // Position in `sequence`, `None` before the first container is active.
    pub(crate) index: Option<usize>,
    // One indication fact per sequence position.
    pub(crate) indicated_facts: Vec<Fact>,
    pub(crate) solutions: BTreeSet<ObjectId>,
    pub(crate) model: Option<SearchModel>,
    pub(crate) statistics: Option<SearchStatistics>,
}

impl CostBenefitState {
    /// QContainers of the active path.
    pub fn sequence(&self) -> Option<&[ObjectId]> {
        self.sequence.as_deref()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The QContainer currently being administered.
    pub fn current(&self) -> Option<ObjectId> {
        let sequence = self.sequence.as_ref()?;
        sequence.get(self.index?).copied()
    }

    pub fn has_path(&self) -> bool {
        self.sequence.is_some()
    }

    /// Possible solutions when the path was planned.
    pub fn solutions(&self) -> &BTreeSet<ObjectId> {
        &self.solutions
    }

    pub fn last_model(&self) -> Option<&SearchModel> {
        self.model.as_ref()
    }

    pub fn last_statistics(&self) -> Option<&SearchStatistics> {
        self.statistics.as_ref()
    }
}
