//! Tests for sessions and propagation distribution.

use std::sync::Arc;

use diagnos_core::{DiagnosError, Value};

use super::*;
use crate::PropagationEntry;
use crate::test_utils::{session_with, weekday_kb, StubContributor};

#[test]
fn test_weekday_different_sources() {
    let (kb, weekday) = weekday_kb();
    let mut session = session_with(kb, vec![]);
    let user = session.contributor_id(UserContributor::NAME).unwrap();

    let monday = Fact::new(weekday, Value::choice("Monday"), Source::named("S1"), user);
    let tuesday = Fact::new(weekday, Value::choice("Tuesday"), Source::named("S2"), user);

    assert_eq!(session.value(weekday), &Value::Undefined);
    session.add_fact(monday);
    assert_eq!(session.value(weekday), &Value::choice("Monday"));
    session.add_fact(tuesday.clone());
    assert_eq!(session.value(weekday), &Value::choice("Tuesday"));
    session.remove_fact(&tuesday);
    assert_eq!(session.value(weekday), &Value::choice("Monday"));
}

#[test]
fn test_weekday_same_source() {
    let (kb, weekday) = weekday_kb();
    let mut session = session_with(kb, vec![]);
    let user = session.contributor_id(UserContributor::NAME).unwrap();

    let monday = Fact::new(weekday, Value::choice("Monday"), Source::named("S1"), user);
    let tuesday = Fact::new(weekday, Value::choice("Tuesday"), Source::named("S1"), user);

    session.add_fact(monday);
    session.add_fact(tuesday.clone());
    session.remove_fact(&tuesday);
    assert_eq!(session.value(weekday), &Value::Undefined);
}

#[test]
fn test_annihilated_changes_are_not_distributed() {
    let (kb, weekday) = weekday_kb();
    let recorder = Arc::new(StubContributor::new("recorder", 5));
    let mut session = session_with(kb, vec![Arc::clone(&recorder)]);

    session.propagate(|s| {
        let first = s.answer(weekday, Value::choice("Monday")).unwrap();
        s.remove_fact(&first);
    });

    assert!(recorder.received().is_empty());
}

#[test]
fn test_chained_changes_are_distributed_once() {
    let (kb, weekday) = weekday_kb();
    let recorder = Arc::new(StubContributor::new("recorder", 5));
    let mut session = session_with(kb, vec![Arc::clone(&recorder)]);

    session.propagate(|s| {
        s.answer(weekday, Value::choice("Monday")).unwrap();
        s.answer(weekday, Value::choice("Tuesday")).unwrap();
    });

    assert_eq!(
        recorder.received(),
        vec![PropagationEntry::new(
            weekday,
            Value::Undefined,
            Value::choice("Tuesday")
        )]
    );
}

#[test]
fn test_cascade_reaches_fixed_point() {
    let (kb, _) = weekday_kb();
    let a = kb.search_question("a").unwrap();
    let b = kb.search_question("b").unwrap();
    let copier = Arc::new(StubContributor::new("copier", 3).with_cascade(a, b));
    let recorder = Arc::new(StubContributor::new("recorder", 5));
    let mut session = session_with(kb, vec![Arc::clone(&copier), Arc::clone(&recorder)]);

    session.answer_choice("a", "B").unwrap();

    assert_eq!(session.value(b), &Value::choice("B"));
    let seen: Vec<ObjectId> = recorder.received().iter().map(|e| e.object()).collect();
    assert!(seen.contains(&a));
    assert!(seen.contains(&b));
    assert!(recorder.post_calls() >= 1);

    let user = session.contributor_id(UserContributor::NAME).unwrap();
    session.remove_object_facts(a, user);
    assert_eq!(session.value(b), &Value::Undefined);
}

#[test]
fn test_failing_contributor_does_not_stop_others() {
    let (kb, weekday) = weekday_kb();
    let failing = Arc::new(StubContributor::new("failing", 1).failing());
    let recorder = Arc::new(StubContributor::new("recorder", 5));
    let mut session = session_with(kb, vec![Arc::clone(&failing), Arc::clone(&recorder)]);

    session.answer(weekday, Value::choice("Friday")).unwrap();

    assert_eq!(failing.batches().len(), 1);
    assert_eq!(recorder.batches().len(), 1);
    assert_eq!(session.value(weekday), &Value::choice("Friday"));
}

#[test]
fn test_retract_restores_previous_values() {
    let (kb, weekday) = weekday_kb();
    let mut session = session_with(kb, vec![]);
    session.answer(weekday, Value::choice("Monday")).unwrap();

    let user = session.contributor_id(UserContributor::NAME).unwrap();
    let a = session.knowledge_base().search_question("a").unwrap();
    let simulated = vec![
        Fact::new(weekday, Value::choice("Sunday"), Source::Simulation(1), user),
        Fact::new(a, Value::choice("C"), Source::Simulation(1), user),
    ];
    session.propagate(|s| {
        for fact in simulated.iter().cloned() {
            s.add_fact(fact);
        }
    });
    assert_eq!(session.value(weekday), &Value::choice("Sunday"));

    session.retract_facts(&simulated);
    assert_eq!(session.value(weekday), &Value::choice("Monday"));
    assert_eq!(session.value(a), &Value::Undefined);
}

#[test]
fn test_search_copy_skips_strategic_contributors() {
    let (kb, weekday) = weekday_kb();
    let planner =
        Arc::new(StubContributor::new("planner", 9).with_kind(ContributorKind::Strategic));
    let mut session = session_with(kb, vec![Arc::clone(&planner)]);
    session.answer_choice("weekday", "Wednesday").unwrap();
    assert_eq!(planner.batches().len(), 1);

    let mut copy = session.search_copy().unwrap();
    assert!(copy.is_simulation());
    assert_ne!(copy.id(), session.id());
    assert_eq!(copy.value(weekday), &Value::choice("Wednesday"));

    copy.answer_choice("weekday", "Thursday").unwrap();
    assert_eq!(planner.batches().len(), 1);
    assert_eq!(session.value(weekday), &Value::choice("Wednesday"));
}

#[test]
fn test_answer_validates_objects() {
    let (kb, _) = weekday_kb();
    let mut session = session_with(kb, vec![]);

    assert!(matches!(
        session.answer_choice("weekday", "Holiday"),
        Err(DiagnosError::UnknownChoice { .. })
    ));
    assert!(matches!(
        session.answer_choice("month", "May"),
        Err(DiagnosError::UnknownObject(_))
    ));
}

#[test]
fn test_session_objects() {
    let (kb, _) = weekday_kb();
    let mut session = session_with(kb, vec![]);
    let user = session.contributor_id(UserContributor::NAME).unwrap();

    assert!(session.object::<u32>(user).is_err());
    session.insert_object(user, 7_u32);
    assert_eq!(*session.object::<u32>(user).unwrap(), 7);
    assert!(session.object::<String>(user).is_err());

    let doubled = session
        .with_object::<u32, _>(user, |value, s| {
            *value *= 2;
            s.is_simulation()
        })
        .unwrap();
    assert!(!doubled);
    assert_eq!(*session.object::<u32>(user).unwrap(), 14);
}
