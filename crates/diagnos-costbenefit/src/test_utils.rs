//! Test utilities for the planner.

use std::collections::{BTreeSet, HashMap};

use diagnos_blackboard::Session;
use diagnos_core::{ObjectId, Value};

use crate::strategy::StrategicSupport;

/// Strategic support with a fixed set of solutions and questions.
///
/// A solution is no longer possible once one of its eliminating answers was
/// given. Unanswered questions discriminate while at least two solutions
/// remain. The entropy of a target is the sum of its QContainers' benefits
/// (1.0 unless configured).
#[derive(Debug, Default)]
pub struct FixedStrategicSupport {
    solutions: BTreeSet<ObjectId>,
    questions: BTreeSet<ObjectId>,
    eliminations: Vec<(ObjectId, Value, ObjectId)>,
    benefits: HashMap<ObjectId, f64>,
}

impl FixedStrategicSupport {
    pub fn new(
        solutions: impl IntoIterator<Item = ObjectId>,
        questions: impl IntoIterator<Item = ObjectId>,
    ) -> Self {
        Self {
            solutions: solutions.into_iter().collect(),
            questions: questions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Answering `question` with `value` rules out `solution`.
    pub fn with_elimination(mut self, question: ObjectId, value: Value, solution: ObjectId) -> Self {
        self.eliminations.push((question, value, solution));
        self
    }

    pub fn with_benefit(mut self, qcontainer: ObjectId, benefit: f64) -> Self {
        self.benefits.insert(qcontainer, benefit);
        self
    }
}

impl StrategicSupport for FixedStrategicSupport {
    fn possible_solutions(&self, session: &Session) -> BTreeSet<ObjectId> {
        self.solutions
            .iter()
            .copied()
            .filter(|&solution| {
                !self.eliminations.iter().any(|(question, value, eliminated)| {
                    *eliminated == solution && session.value(*question) == value
                })
            })
            .collect()
    }

    fn discriminating_questions(
        &self,
        solutions: &BTreeSet<ObjectId>,
        session: &Session,
    ) -> BTreeSet<ObjectId> {
        if solutions.len() < 2 {
            return BTreeSet::new();
        }
        self.questions
            .iter()
            .copied()
            .filter(|&question| !session.value(question).is_answered())
            .collect()
    }

    fn entropy(
        &self,
        qcontainers: &[ObjectId],
        _solutions: &BTreeSet<ObjectId>,
        _session: &Session,
    ) -> f64 {
        qcontainers
            .iter()
            .map(|qc| self.benefits.get(qc).copied().unwrap_or(1.0))
            .sum()
    }
}
