//! Condition/action rules with truth maintenance.
//!
//! A rule stores a fact while its condition is true and removes it as soon
//! as the condition no longer holds. Each rule is its own [`Source`], so
//! several rules may derive values for the same object.

use std::sync::atomic::{AtomicUsize, Ordering};

use diagnos_blackboard::{
    Contributor, ContributorId, ContributorKind, Fact, PropagationEntry, Session, Source,
};
use diagnos_core::{Condition, ObjectId, Result, Value};

/// `if condition then object = value`.
#[derive(Debug, Clone)]
pub struct Rule {
    condition: Condition,
    object: ObjectId,
    value: Value,
}

impl Rule {
    pub fn new(condition: Condition, object: ObjectId, value: Value) -> Self {
        Self {
            condition,
            object,
            value,
        }
    }
}

/// Problem solver evaluating a fixed list of [`Rule`]s.
#[derive(Debug)]
pub struct RuleContributor {
    name: String,
    priority: u32,
    rules: Vec<Rule>,
    evaluations: AtomicUsize,
}

impl RuleContributor {
    pub const NAME: &'static str = "rules";

    pub fn new(rules: Vec<Rule>) -> Self {
        Self::named(Self::NAME, 3, rules)
    }

    pub fn named(name: &str, priority: u32, rules: Vec<Rule>) -> Self {
        Self {
            name: name.to_string(),
            priority,
            rules,
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Number of rule evaluations over all sessions.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }

    fn source(index: usize) -> Source {
        Source::named(format!("rule-{index}"))
    }

    fn is_active(session: &Session, me: ContributorId, rule: &Rule, source: &Source) -> bool {
        session
            .blackboard()
            .facts(rule.object)
            .iter()
            .any(|fact| fact.contributor() == me && fact.source() == source)
    }

    fn check(&self, session: &mut Session, me: ContributorId, index: usize) {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        let rule = &self.rules[index];
        let source = Self::source(index);
        let holds = rule.condition.eval(session.blackboard()).is_true();
        let active = Self::is_active(session, me, rule, &source);
        let fact = Fact::new(rule.object, rule.value.clone(), source, me);
        match (holds, active) {
            (true, false) => session.add_fact(fact),
            (false, true) => session.remove_fact(&fact),
            _ => {}
        }
    }
}

impl Contributor for RuleContributor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ContributorKind {
        ContributorKind::Problemsolver
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn init(&self, session: &mut Session, me: ContributorId) -> Result<()> {
        session.propagate(|s| {
            for index in 0..self.rules.len() {
                self.check(s, me, index);
            }
        });
        Ok(())
    }

    fn propagate(
        &self,
        session: &mut Session,
        me: ContributorId,
        changes: &[PropagationEntry],
    ) -> Result<()> {
        session.propagate(|s| {
            for (index, rule) in self.rules.iter().enumerate() {
                let terminals = rule.condition.terminal_objects();
                if changes.iter().any(|c| terminals.contains(&c.object())) {
                    self.check(s, me, index);
                }
            }
        });
        Ok(())
    }
}
