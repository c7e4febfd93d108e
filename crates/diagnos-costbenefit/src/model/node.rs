//! QContainer nodes of the search graph.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use diagnos_blackboard::{ContributorId, Fact, Session, Source};
use diagnos_core::{KnowledgeBase, ObjectId, StateTransition, Truth, Value};
use tracing::trace;

use crate::strategy::CostFunction;

/// One QContainer with its activation precondition, static cost and
/// post-execution effects. Nodes compare by QContainer.
#[derive(Debug, Clone)]
pub struct Node {
    qcontainer: ObjectId,
    name: String,
    questions: Vec<ObjectId>,
    transition: Option<StateTransition>,
    static_cost: f64,
}

impl Node {
    pub fn new(kb: &KnowledgeBase, qcontainer: ObjectId) -> Self {
        let object = kb.object(qcontainer);
        Self {
            qcontainer,
            name: object.name().to_string(),
            questions: kb.questions_of(qcontainer),
            transition: kb.state_transition(qcontainer).cloned(),
            static_cost: object.static_cost(),
        }
    }

    pub fn qcontainer(&self) -> ObjectId {
        self.qcontainer
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Questions below the QContainer, in depth-first order.
    pub fn questions(&self) -> &[ObjectId] {
        &self.questions
    }

    pub fn transition(&self) -> Option<&StateTransition> {
        self.transition.as_ref()
    }

    pub fn static_cost(&self) -> f64 {
        self.static_cost
    }

    /// Returns true if administering the QContainer changes state values.
    pub fn has_effects(&self) -> bool {
        self.transition.as_ref().is_some_and(StateTransition::has_effects)
    }

    /// Evaluates the activation condition. Indeterminate results count as
    /// not applicable. Nodes without a condition are always applicable.
    pub fn is_applicable(&self, session: &Session) -> bool {
        let Some(condition) = self
            .transition
            .as_ref()
            .and_then(StateTransition::activation_condition)
        else {
            return true;
        };
        match condition.eval(session.blackboard()) {
            Truth::True => true,
            Truth::False | Truth::Indeterminate(_) => false,
        }
    }

    /// Cost of the QContainer in the given session, never negative.
    pub fn costs(&self, cost_function: &dyn CostFunction, session: &Session) -> f64 {
        cost_function.costs(self.qcontainer, session).max(0.0)
    }

    /// Answers every unanswered question with its normal value.
    ///
    /// Questions without a normal choice are skipped. Returns the created
    /// facts so that the caller can retract them.
    pub fn set_normal_values(
        &self,
        session: &mut Session,
        contributor: ContributorId,
        source: &Source,
    ) -> Vec<Fact> {
        let kb = Arc::clone(session.knowledge_base());
        let mut facts = Vec::new();
        session.propagate(|s| {
            for &question in &self.questions {
                if s.value(question).is_answered() {
                    continue;
                }
                let Some(value) = kb.normal_value(question) else {
                    trace!(
                        event = "no_normal_value",
                        qcontainer = %self.name,
                        question = kb.object(question).name(),
                    );
                    continue;
                };
                let fact = Fact::new(question, value, source.clone(), contributor);
                s.add_fact(fact.clone());
                facts.push(fact);
            }
        });
        facts
    }

    /// Values the questions are expected to have after administering the
    /// QContainer: the current value if answered, else the normal value.
    pub fn expected_values(&self, session: &Session) -> Vec<(ObjectId, Value)> {
        let kb = session.knowledge_base();
        self.questions
            .iter()
            .filter_map(|&question| {
                let current = session.value(question);
                if current.is_answered() {
                    Some((question, current.clone()))
                } else {
                    kb.normal_value(question).map(|value| (question, value))
                }
            })
            .collect()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.qcontainer == other.qcontainer
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qcontainer.hash(state);
    }
}
