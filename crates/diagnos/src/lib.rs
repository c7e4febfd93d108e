//! diagnos - a diagnostic reasoning kernel
//!
//! Knowledge bases describe questions grouped into QContainers, the
//! solutions they discriminate and the state transitions of the device under
//! test. A [`Session`] collects facts from contributors on a blackboard and
//! propagates every change. The [`CostBenefitController`] plans which
//! QContainers to administer next.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use diagnos::prelude::*;
//!
//! let mut builder = KnowledgeBase::builder("demo");
//! let lab = builder.qcontainer("Lab", 2.0, None).unwrap();
//! builder
//!     .one_choice("crp", [Choice::normal("low"), Choice::new("high")], Some(lab))
//!     .unwrap();
//! let kb = Arc::new(builder.build());
//!
//! let registry = ContributorRegistry::builder()
//!     .with(UserContributor)
//!     .with(StateTransitionContributor)
//!     .with(CostBenefitController::builder().with_manual_mode(true).build())
//!     .build();
//! let mut session = Session::new(kb, Arc::new(registry)).unwrap();
//! session.answer_choice("crp", "high").unwrap();
//! assert!(session.is_done(lab));
//! ```

pub mod logging;

pub use diagnos_blackboard::{
    merge, replay, Blackboard, Contributor, ContributorId, ContributorKind, ContributorRegistry,
    Fact, PropagationEntry, RebuildRegistry, Session, SessionId, Source, UserContributor,
};
pub use diagnos_config::{AbortConfig, ConfigError, PlannerConfig, SearchConfig};
pub use diagnos_core::{
    Choice, Condition, ConditionalValueSetter, DiagnosError, Indication, IndicationState,
    KnowledgeBase, ObjectId, QuestionKind, Result, StateTransition, Truth, Value,
    ValueTransition,
};

/// The cost-benefit planner.
pub mod costbenefit {
    pub use diagnos_costbenefit::*;
}

pub use diagnos_costbenefit::{
    CostBenefitController, CostFunction, Path, SearchStatistics, StateTransitionContributor,
    StrategicSupport, Target, TargetFunction,
};

pub mod prelude {
    pub use super::{
        Choice, Condition, ContributorRegistry, CostBenefitController, DiagnosError,
        IndicationState, KnowledgeBase, ObjectId, PlannerConfig, Session,
        StateTransitionContributor, StrategicSupport, Target, UserContributor, Value,
    };
}
