//! Knowledge base fixtures.
//!
//! All fixtures panic on construction errors; they are only used by tests.

use std::sync::Arc;

use diagnos_blackboard::{Contributor, ContributorRegistry, Session, UserContributor};
use diagnos_core::{
    Choice, Condition, ConditionalValueSetter, KnowledgeBase, StateTransition, Value,
    ValueTransition,
};

/// One-choice question `weekday` with the choices Monday..Sunday.
pub fn weekday_kb() -> Arc<KnowledgeBase> {
    let mut builder = KnowledgeBase::builder("weekday");
    builder
        .one_choice(
            "weekday",
            [
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday",
            ]
            .map(Choice::new),
            None,
        )
        .unwrap();
    Arc::new(builder.build())
}

/// Three independent batches without preconditions.
///
/// | QContainer | cost | question |
/// |------------|------|----------|
/// | `Q1`       | 2.0  | `q1`     |
/// | `Q2`       | 3.0  | `q2`     |
/// | `Q3`       | 7.0  | `q3`     |
///
/// Every question offers `normal` (the normal choice) and `abnormal`.
/// Solutions are `Flu` and `Cold`.
pub fn two_batch_kb() -> Arc<KnowledgeBase> {
    let mut builder = KnowledgeBase::builder("two-batch");
    for (container, cost, question) in [("Q1", 2.0, "q1"), ("Q2", 3.0, "q2"), ("Q3", 7.0, "q3")] {
        let qc = builder.qcontainer(container, cost, None).unwrap();
        builder
            .one_choice(
                question,
                [Choice::normal("normal"), Choice::new("abnormal")],
                Some(qc),
            )
            .unwrap();
    }
    builder.solution("Flu").unwrap();
    builder.solution("Cold").unwrap();
    Arc::new(builder.build())
}

/// A device with a lid that has to be opened before measuring.
///
/// | QContainer | cost | questions  | precondition | effect        |
/// |------------|------|------------|--------------|---------------|
/// | `Open`     | 1.0  | `open_ok`  | -            | `lid = open`  |
/// | `Measure`  | 4.0  | `pressure` | `lid = open` | -             |
/// | `Close`    | 1.0  | `close_ok` | `lid = open` | `lid = closed`|
/// | `Inspect`  | 10.0 | `visual`   | -            | (none)        |
///
/// `lid` is a state question outside of any QContainer. `open_ok` and
/// `close_ok` are OK questions with the single normal choice `ok`.
/// Solutions are `Leak` and `Blockage`.
pub fn state_machine_kb() -> Arc<KnowledgeBase> {
    let mut builder = KnowledgeBase::builder("state-machine");
    let lid = builder
        .one_choice("lid", [Choice::new("open"), Choice::new("closed")], None)
        .unwrap();
    let lid_open = || Condition::equal(lid, Value::choice("open"));

    let open = builder.qcontainer("Open", 1.0, None).unwrap();
    builder
        .one_choice("open_ok", [Choice::normal("ok")], Some(open))
        .unwrap();
    builder
        .state_transition(StateTransition::new(
            open,
            None,
            vec![ValueTransition::new(
                lid,
                vec![ConditionalValueSetter::always(Value::choice("open"))],
            )],
        ))
        .unwrap();

    let measure = builder.qcontainer("Measure", 4.0, None).unwrap();
    builder
        .one_choice(
            "pressure",
            [Choice::normal("normal"), Choice::new("high")],
            Some(measure),
        )
        .unwrap();
    builder
        .state_transition(StateTransition::new(measure, Some(lid_open()), vec![]))
        .unwrap();

    let close = builder.qcontainer("Close", 1.0, None).unwrap();
    builder
        .one_choice("close_ok", [Choice::normal("ok")], Some(close))
        .unwrap();
    builder
        .state_transition(StateTransition::new(
            close,
            Some(lid_open()),
            vec![ValueTransition::new(
                lid,
                vec![ConditionalValueSetter::always(Value::choice("closed"))],
            )],
        ))
        .unwrap();

    let inspect = builder.qcontainer("Inspect", 10.0, None).unwrap();
    builder
        .one_choice(
            "visual",
            [Choice::normal("clean"), Choice::new("dirty")],
            Some(inspect),
        )
        .unwrap();

    builder.solution("Leak").unwrap();
    builder.solution("Blockage").unwrap();
    Arc::new(builder.build())
}

/// Live session with only the [`UserContributor`] registered.
pub fn session_for(kb: &Arc<KnowledgeBase>) -> Session {
    session_with(kb, Vec::new())
}

/// Live session with [`UserContributor`] followed by `contributors`.
pub fn session_with(kb: &Arc<KnowledgeBase>, contributors: Vec<Arc<dyn Contributor>>) -> Session {
    let builder = contributors
        .into_iter()
        .fold(ContributorRegistry::builder().with(UserContributor), |b, c| {
            b.with_shared(c)
        });
    Session::new(Arc::clone(kb), Arc::new(builder.build())).unwrap()
}
