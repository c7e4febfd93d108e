//! Merge policies contributors can use for their own facts.

use diagnos_core::{ChoiceSet, Value};

use crate::fact::Fact;

/// The most recently inserted fact wins.
pub fn last_wins(facts: &[&Fact]) -> Value {
    facts
        .last()
        .map(|fact| fact.value().clone())
        .unwrap_or_default()
}

/// Unites all choice values. Falls back to [`last_wins`] if any fact holds
/// something other than choices.
pub fn union_choices(facts: &[&Fact]) -> Value {
    let mut union = ChoiceSet::new();
    for fact in facts {
        match fact.value() {
            Value::Choices(set) => union = union.union(set),
            _ => return last_wins(facts),
        }
    }
    if union.is_empty() {
        Value::Undefined
    } else {
        Value::Choices(union)
    }
}

/// Keeps the most specific indication, independent of insertion order.
pub fn strongest_indication(facts: &[&Fact]) -> Value {
    facts
        .iter()
        .filter_map(|fact| fact.value().as_indication())
        .reduce(|a, b| a.strongest(b))
        .map(Value::Indication)
        .unwrap_or_else(|| last_wins(facts))
}

#[cfg(test)]
mod tests {
    use diagnos_core::{IndicationState, ObjectId};

    use super::*;
    use crate::fact::Source;
    use crate::test_utils::contributor_id;

    fn fact(value: Value, source: &str) -> Fact {
        Fact::new(
            ObjectId::from_index(0),
            value,
            Source::named(source),
            contributor_id(0),
        )
    }

    #[test]
    fn test_last_wins_keeps_latest() {
        let a = fact(Value::choice("a"), "s1");
        let b = fact(Value::choice("b"), "s2");
        assert_eq!(last_wins(&[&a, &b]), Value::choice("b"));
        assert_eq!(last_wins(&[]), Value::Undefined);
    }

    #[test]
    fn test_union_is_order_independent() {
        let a = fact(Value::choices(["red"]), "s1");
        let b = fact(Value::choices(["green", "blue"]), "s2");

        let forward = union_choices(&[&a, &b]);
        let backward = union_choices(&[&b, &a]);
        assert_eq!(forward, backward);
        assert_eq!(forward, Value::choices(["red", "green", "blue"]));
    }

    #[test]
    fn test_strongest_indication_is_order_independent() {
        let indicated = fact(Value::indication(IndicationState::Indicated, 2.0), "s1");
        let contra = fact(
            Value::indication(IndicationState::ContraIndicated, 0.0),
            "s2",
        );
        let early = fact(Value::indication(IndicationState::Indicated, 1.0), "s3");

        let orders: [[&Fact; 3]; 3] = [
            [&indicated, &contra, &early],
            [&contra, &early, &indicated],
            [&early, &indicated, &contra],
        ];
        for order in orders {
            assert_eq!(
                strongest_indication(&order),
                Value::indication(IndicationState::ContraIndicated, 0.0)
            );
        }
        assert_eq!(
            strongest_indication(&[&indicated, &early]),
            Value::indication(IndicationState::Indicated, 1.0)
        );
    }
}
