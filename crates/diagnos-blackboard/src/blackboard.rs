//! Per-session store of facts and merged values.

use std::collections::HashMap;
use std::sync::Arc;

use diagnos_core::{Indication, ObjectId, Value, ValueLookup};

use crate::contributor::{ContributorId, ContributorRegistry};
use crate::fact::{Fact, PropagationEntry};

static UNDEFINED: Value = Value::Undefined;

/// All facts stored for one object plus their cached merged value.
#[derive(Debug, Clone, Default)]
struct FactAggregator {
    facts: Vec<Fact>,
    merged: Value,
    owner: Option<ContributorId>,
}

/// Mapping from object to merged value.
///
/// Each contributor merges its own facts with its merge policy. The
/// per-contributor results are then combined: when every contributor holds
/// an indication the strongest one wins, otherwise the contributor with the
/// lowest priority number owns the object. The merged value depends only on
/// the stored facts.
#[derive(Debug, Clone)]
pub struct Blackboard {
    registry: Arc<ContributorRegistry>,
    aggregators: HashMap<ObjectId, FactAggregator>,
}

impl Blackboard {
    pub fn new(registry: Arc<ContributorRegistry>) -> Self {
        Self {
            registry,
            aggregators: HashMap::new(),
        }
    }

    /// Stores a fact, replacing a fact with the same contributor and source.
    ///
    /// Returns the change of the merged value, if any.
    pub fn add_fact(&mut self, fact: Fact) -> Option<PropagationEntry> {
        let object = fact.object();
        let aggregator = self.aggregators.entry(object).or_default();
        aggregator.facts.retain(|stored| !stored.same_key(&fact));
        aggregator.facts.push(fact);
        self.refresh(object)
    }

    /// Removes the fact with the same object, contributor and source.
    pub fn remove_fact(&mut self, fact: &Fact) -> Option<PropagationEntry> {
        let aggregator = self.aggregators.get_mut(&fact.object())?;
        let before = aggregator.facts.len();
        aggregator.facts.retain(|stored| !stored.same_key(fact));
        if aggregator.facts.len() == before {
            return None;
        }
        self.refresh(fact.object())
    }

    /// Removes every fact of a contributor for an object.
    pub fn remove_object_facts(
        &mut self,
        object: ObjectId,
        contributor: ContributorId,
    ) -> Option<PropagationEntry> {
        let aggregator = self.aggregators.get_mut(&object)?;
        let before = aggregator.facts.len();
        aggregator
            .facts
            .retain(|stored| stored.contributor() != contributor);
        if aggregator.facts.len() == before {
            return None;
        }
        self.refresh(object)
    }

    fn refresh(&mut self, object: ObjectId) -> Option<PropagationEntry> {
        let aggregator = self.aggregators.get(&object)?;
        let (merged, owner) = merge_all(&self.registry, &aggregator.facts);
        let old = if aggregator.facts.is_empty() {
            self.aggregators.remove(&object).map(|a| a.merged)
        } else {
            self.aggregators.get_mut(&object).map(|a| {
                a.owner = owner;
                std::mem::replace(&mut a.merged, merged.clone())
            })
        }
        .unwrap_or_default();
        let entry = PropagationEntry::new(object, old, merged);
        entry.has_changed().then_some(entry)
    }

    /// Current merged value, [`Value::Undefined`] if no fact is stored.
    pub fn value(&self, object: ObjectId) -> &Value {
        self.aggregators
            .get(&object)
            .map_or(&UNDEFINED, |a| &a.merged)
    }

    /// Current indication of a QContainer, neutral if none is stored.
    pub fn indication(&self, object: ObjectId) -> Indication {
        self.value(object).as_indication().unwrap_or_default()
    }

    /// Stored facts in insertion order.
    pub fn facts(&self, object: ObjectId) -> &[Fact] {
        self.aggregators
            .get(&object)
            .map_or(&[], |a| a.facts.as_slice())
    }

    /// Merged value of one contributor's facts for an object.
    pub fn contributor_value(&self, object: ObjectId, contributor: ContributorId) -> Value {
        let facts: Vec<&Fact> = self
            .facts(object)
            .iter()
            .filter(|f| f.contributor() == contributor)
            .collect();
        if facts.is_empty() {
            return Value::Undefined;
        }
        self.registry.get(contributor).merge(&facts)
    }

    /// Contributors holding at least one fact for the object.
    pub fn contributors_for(&self, object: ObjectId) -> Vec<ContributorId> {
        let mut result: Vec<ContributorId> =
            self.facts(object).iter().map(Fact::contributor).collect();
        result.sort();
        result.dedup();
        result
    }

    /// The contributor whose value currently wins for the object.
    pub fn owner(&self, object: ObjectId) -> Option<ContributorId> {
        self.aggregators.get(&object).and_then(|a| a.owner)
    }

    /// Objects with a defined merged value.
    pub fn valued_objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.aggregators
            .iter()
            .filter(|(_, a)| !a.merged.is_undefined())
            .map(|(id, _)| *id)
    }

    pub fn registry(&self) -> &Arc<ContributorRegistry> {
        &self.registry
    }

    /// Number of objects with stored facts.
    pub fn len(&self) -> usize {
        self.aggregators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregators.is_empty()
    }
}

impl ValueLookup for Blackboard {
    fn value(&self, object: ObjectId) -> &Value {
        Blackboard::value(self, object)
    }
}

fn merge_all(registry: &ContributorRegistry, facts: &[Fact]) -> (Value, Option<ContributorId>) {
    let mut merged: Vec<(ContributorId, Value)> = Vec::new();
    for &id in registry.by_priority() {
        let own: Vec<&Fact> = facts.iter().filter(|f| f.contributor() == id).collect();
        if own.is_empty() {
            continue;
        }
        let value = registry.get(id).merge(&own);
        if !value.is_undefined() {
            merged.push((id, value));
        }
    }

    let all_indications = merged
        .iter()
        .all(|(_, value)| matches!(value, Value::Indication(_)));
    if all_indications {
        let mut best: Option<(ContributorId, Indication)> = None;
        for (id, value) in &merged {
            if let Some(indication) = value.as_indication() {
                best = match best {
                    Some((best_id, current)) if current.strongest(indication) == current => {
                        Some((best_id, current))
                    }
                    _ => Some((*id, indication)),
                };
            }
        }
        return match best {
            Some((id, indication)) => (Value::Indication(indication), Some(id)),
            None => (Value::Undefined, None),
        };
    }

    merged
        .into_iter()
        .next()
        .map_or((Value::Undefined, None), |(id, value)| (value, Some(id)))
}
