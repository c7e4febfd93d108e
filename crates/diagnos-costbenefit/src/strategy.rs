//! Pluggable collaborators of the planner.
//!
//! [`StrategicSupport`] is supplied by solution-scoring engines,
//! [`CostFunction`] prices a QContainer, [`TargetFunction`] turns
//! discriminating questions into [`Target`]s and [`SolutionsRater`] decides
//! whether a search is worth running at all.

use std::collections::BTreeSet;
use std::fmt::Debug;

use diagnos_blackboard::Session;
use diagnos_core::{KnowledgeBase, ObjectId};

use crate::model::Target;

/// Information about the solutions still to be discriminated.
pub trait StrategicSupport: Send + Sync + Debug {
    /// Solutions that are currently possible.
    fn possible_solutions(&self, session: &Session) -> BTreeSet<ObjectId>;

    /// Questions whose answers would discriminate between `solutions`.
    fn discriminating_questions(
        &self,
        solutions: &BTreeSet<ObjectId>,
        session: &Session,
    ) -> BTreeSet<ObjectId>;

    /// Information gain of administering the QContainers of a target.
    fn entropy(
        &self,
        qcontainers: &[ObjectId],
        solutions: &BTreeSet<ObjectId>,
        session: &Session,
    ) -> f64;
}

/// Prices the administration of a QContainer.
pub trait CostFunction: Send + Sync + Debug {
    fn costs(&self, qcontainer: ObjectId, session: &Session) -> f64;
}

/// Reads the static cost property of the QContainer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCostFunction;

impl CostFunction for DefaultCostFunction {
    fn costs(&self, qcontainer: ObjectId, session: &Session) -> f64 {
        session
            .knowledge_base()
            .get(qcontainer)
            .map_or(0.0, |object| object.static_cost())
    }
}

/// Builds targets from discriminating questions.
pub trait TargetFunction: Send + Sync + Debug {
    fn targets(
        &self,
        session: &Session,
        questions: &BTreeSet<ObjectId>,
        solutions: &BTreeSet<ObjectId>,
        support: &dyn StrategicSupport,
    ) -> Vec<Target>;
}

/// One single-container target per QContainer holding a discriminating
/// question.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTargetFunction;

impl TargetFunction for DefaultTargetFunction {
    fn targets(
        &self,
        session: &Session,
        questions: &BTreeSet<ObjectId>,
        _solutions: &BTreeSet<ObjectId>,
        _support: &dyn StrategicSupport,
    ) -> Vec<Target> {
        let kb: &KnowledgeBase = session.knowledge_base();
        let containers: BTreeSet<ObjectId> = questions
            .iter()
            .flat_map(|&question| kb.parent_qcontainers(question))
            .collect();
        containers.into_iter().map(Target::single).collect()
    }
}

/// Decides whether the possible solutions are worth discriminating.
pub trait SolutionsRater: Send + Sync + Debug {
    fn check(&self, solutions: &BTreeSet<ObjectId>, session: &Session) -> bool;
}

/// Accepts every set of solutions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSolutionsRater;

impl SolutionsRater for DefaultSolutionsRater {
    fn check(&self, _solutions: &BTreeSet<ObjectId>, _session: &Session) -> bool {
        true
    }
}
