//! Firing state transitions.

use std::collections::BTreeSet;

use diagnos_blackboard::{
    Contributor, ContributorId, ContributorKind, Fact, PropagationEntry, Session, Source,
};
use diagnos_core::{ObjectId, Result, StateTransition, Value};
use tracing::debug;

/// Applies the post transitions of a QContainer.
///
/// Each value transition sets the value of its first setter whose condition
/// holds. All setters are evaluated against the state before firing, then
/// the facts are added in one propagation frame. Returns the added facts so
/// they can be retracted.
pub fn fire(
    transition: &StateTransition,
    session: &mut Session,
    contributor: ContributorId,
    source: &Source,
) -> Vec<Fact> {
    let facts: Vec<Fact> = transition
        .post_transitions()
        .iter()
        .filter_map(|vt| {
            vt.setters()
                .iter()
                .find(|setter| {
                    setter
                        .condition()
                        .map_or(true, |c| c.eval(session.blackboard()).is_true())
                })
                .map(|setter| {
                    Fact::new(vt.question(), setter.value().clone(), source.clone(), contributor)
                })
        })
        .collect();
    session.propagate(|s| {
        for fact in &facts {
            s.add_fact(fact.clone());
        }
    });
    facts
}

/// Removes the facts a previous [`fire`] of `transition` added under
/// `source`, in one propagation frame.
pub fn retract(
    transition: &StateTransition,
    session: &mut Session,
    contributor: ContributorId,
    source: &Source,
) {
    session.propagate(|s| {
        for vt in transition.post_transitions() {
            s.remove_fact(&Fact::new(
                vt.question(),
                Value::Undefined,
                source.clone(),
                contributor,
            ));
        }
    });
}

/// Fires the transition of a QContainer once all its questions are answered,
/// and retracts the effects when that stops being true.
///
/// Only acts in live sessions; the planner fires transitions itself while
/// simulating.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateTransitionContributor;

impl StateTransitionContributor {
    pub const NAME: &'static str = "state-transition";
    pub const PRIORITY: u32 = 4;
}

impl Contributor for StateTransitionContributor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> ContributorKind {
        ContributorKind::Problemsolver
    }

    fn priority(&self) -> u32 {
        Self::PRIORITY
    }

    fn propagate(
        &self,
        session: &mut Session,
        me: ContributorId,
        changes: &[PropagationEntry],
    ) -> Result<()> {
        if session.is_simulation() {
            return Ok(());
        }
        let kb = std::sync::Arc::clone(session.knowledge_base());
        let containers: BTreeSet<ObjectId> = changes
            .iter()
            .filter(|change| kb.get(change.object()).is_some_and(|o| o.is_question()))
            .flat_map(|change| kb.parent_qcontainers(change.object()))
            .collect();

        session.propagate(|s| {
            for qc in containers {
                let Some(transition) = kb.state_transition(qc) else {
                    continue;
                };
                let source = Source::Object(qc);
                // The setters must see the state without the previous firing.
                retract(transition, s, me, &source);
                if s.is_done(qc) {
                    let facts = fire(transition, s, me, &source);
                    debug!(
                        event = "transition_fired",
                        session = %s.id(),
                        qcontainer = kb.object(qc).name(),
                        facts = facts.len(),
                    );
                }
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use diagnos_blackboard::UserContributor;
    use diagnos_core::{
        Choice, Condition, ConditionalValueSetter, KnowledgeBase, Value, ValueTransition,
    };
    use diagnos_test::kb::{session_for, session_with, state_machine_kb};

    use super::*;

    #[test]
    fn test_fire_and_retract() {
        let kb = state_machine_kb();
        let mut session = session_for(&kb);
        let lid = kb.search_question("lid").unwrap();
        let open = kb.search_qcontainer("Open").unwrap();
        let user = session.contributor_id(UserContributor::NAME).unwrap();

        let transition = kb.state_transition(open).unwrap().clone();
        let facts = fire(&transition, &mut session, user, &Source::Simulation(1));
        assert_eq!(facts.len(), 1);
        assert_eq!(session.value(lid), &Value::choice("open"));

        session.retract_facts(&facts);
        assert!(session.value(lid).is_undefined());
    }

    #[test]
    fn test_setters_see_state_before_firing() {
        let mut builder = KnowledgeBase::builder("swap");
        let a = builder
            .one_choice("a", [Choice::new("x"), Choice::new("y")], None)
            .unwrap();
        let b = builder
            .one_choice("b", [Choice::new("x"), Choice::new("y")], None)
            .unwrap();
        let qc = builder.qcontainer("Swap", 1.0, None).unwrap();
        let copy = |from, to| {
            ValueTransition::new(
                to,
                vec![
                    ConditionalValueSetter::new(
                        Value::choice("y"),
                        Some(Condition::equal(from, Value::choice("x"))),
                    ),
                    ConditionalValueSetter::always(Value::choice("x")),
                ],
            )
        };
        let transition = StateTransition::new(qc, None, vec![copy(a, b), copy(b, a)]);
        let kb = Arc::new(builder.build());
        let mut session = session_for(&kb);
        session.answer_choice("a", "x").unwrap();
        session.answer_choice("b", "x").unwrap();
        let user = session.contributor_id(UserContributor::NAME).unwrap();

        fire(&transition, &mut session, user, &Source::Simulation(1));

        // Both setters saw a = x and b = x.
        assert_eq!(session.value(a), &Value::choice("y"));
        assert_eq!(session.value(b), &Value::choice("y"));
    }

    #[test]
    fn test_contributor_fires_when_done() {
        let kb = state_machine_kb();
        let lid = kb.search_question("lid").unwrap();
        let mut session = session_with(&kb, vec![Arc::new(StateTransitionContributor)]);

        session.answer_choice("open_ok", "ok").unwrap();
        assert_eq!(session.value(lid), &Value::choice("open"));

        session.answer_choice("close_ok", "ok").unwrap();
        assert_eq!(session.value(lid), &Value::choice("closed"));
    }

    #[test]
    fn test_contributor_retracts_when_undone() {
        let kb = state_machine_kb();
        let lid = kb.search_question("lid").unwrap();
        let mut session = session_with(&kb, vec![Arc::new(StateTransitionContributor)]);

        let answer = session.answer_choice("open_ok", "ok").unwrap();
        assert_eq!(session.value(lid), &Value::choice("open"));

        session.remove_fact(&answer);
        assert!(session.value(lid).is_undefined());
    }

    #[test]
    fn test_contributor_refires_from_state_before_first_firing() {
        let mut builder = KnowledgeBase::builder("toggle");
        let lid = builder
            .one_choice("lid", [Choice::new("open"), Choice::new("closed")], None)
            .unwrap();
        let toggle = builder.qcontainer("Toggle", 1.0, None).unwrap();
        builder
            .one_choice("toggle_ok", [Choice::normal("ok")], Some(toggle))
            .unwrap();
        builder
            .one_choice("note", [Choice::new("a"), Choice::new("b")], Some(toggle))
            .unwrap();
        builder.state_transition(StateTransition::new(
            toggle,
            None,
            vec![ValueTransition::new(
                lid,
                vec![
                    ConditionalValueSetter::new(
                        Value::choice("closed"),
                        Some(Condition::equal(lid, Value::choice("open"))),
                    ),
                    ConditionalValueSetter::always(Value::choice("open")),
                ],
            )],
        ))
        .unwrap();
        let kb = Arc::new(builder.build());
        let mut session = session_with(&kb, vec![Arc::new(StateTransitionContributor)]);

        session.answer_choice("toggle_ok", "ok").unwrap();
        session.answer_choice("note", "a").unwrap();
        assert_eq!(session.value(lid), &Value::choice("open"));

        // Changing an answer re-fires from the state before the first firing.
        session.answer_choice("note", "b").unwrap();
        assert_eq!(session.value(lid), &Value::choice("open"));
    }

    #[test]
    fn test_contributor_ignores_search_copies() {
        let kb = state_machine_kb();
        let lid = kb.search_question("lid").unwrap();
        let session = session_with(&kb, vec![Arc::new(StateTransitionContributor)]);
        let mut copy = session.search_copy().unwrap();

        copy.answer_choice("open_ok", "ok").unwrap();
        assert!(copy.value(lid).is_undefined());
    }
}
