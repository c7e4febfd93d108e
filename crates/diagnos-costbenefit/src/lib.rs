//! diagnos cost-benefit - test sequencing for diagnostic sessions
//!
//! This crate plans which QContainers to administer next:
//! - `Node`, `Path`, `Target` and `SearchModel` describe one planning run
//! - `StrategicSupport`, `CostFunction`, `TargetFunction` and `SolutionsRater`
//!   plug in scoring
//! - `IterativeDeepeningSearch` finds the best cost/benefit path on a
//!   simulated copy of the session, bounded by an `AbortStrategy`
//! - `StateTransitionContributor` applies QContainer effects in live sessions
//! - `CostBenefitController` plans, indicates and advances paths

pub mod abort;
pub mod algorithm;
pub mod controller;
pub mod ids;
pub mod model;
pub mod strategy;
pub mod transition;

#[cfg(test)]
pub mod test_utils;

pub use abort::{
    AbortStrategy, AnyAbort, ConfiguredAbort, ExternalAbort, StepCountAbort, TimeAbort,
};
pub use algorithm::{IterativeDeepeningAlgorithm, SearchAlgorithm, SearchStatistics};
pub use controller::{
    blocked_qcontainers, is_ok_question, CostBenefitController, CostBenefitControllerBuilder, CostBenefitState,
    MANUAL_TARGET_BENEFIT,
};
pub use ids::IterativeDeepeningSearch;
pub use model::{Node, Path, SearchModel, Target, TargetId};
pub use strategy::{
    CostFunction, DefaultCostFunction, DefaultSolutionsRater, DefaultTargetFunction,
    SolutionsRater, StrategicSupport, TargetFunction,
};
pub use transition::{fire, retract, StateTransitionContributor};
