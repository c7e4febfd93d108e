//! Three-valued condition evaluation.
//!
//! Conditions evaluate to [`Truth::True`], [`Truth::False`] or
//! [`Truth::Indeterminate`]. Indeterminate results carry the reason: the
//! referenced question was not answered yet, or it was answered "unknown".
//! Callers decide how to treat indeterminate results by pattern matching.

use crate::terminology::ObjectId;
use crate::value::Value;

/// Read access to the current value of terminology objects.
pub trait ValueLookup {
    /// Returns the current value, [`Value::Undefined`] if none exists.
    fn value(&self, object: ObjectId) -> &Value;
}

/// Why a condition could not be decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indeterminate {
    /// A referenced question has no value yet.
    NoAnswer,
    /// A referenced question was answered "unknown".
    UnknownAnswer,
}

/// Result of evaluating a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Truth {
    True,
    False,
    Indeterminate(Indeterminate),
}

impl Truth {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }

    pub fn is_true(self) -> bool {
        self == Truth::True
    }

    pub fn is_false(self) -> bool {
        self == Truth::False
    }

    pub fn is_indeterminate(self) -> bool {
        matches!(self, Truth::Indeterminate(_))
    }

    /// Collapses indeterminate results to `false`.
    pub fn or_false(self) -> bool {
        self.is_true()
    }

    fn negate(self) -> Self {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            other => other,
        }
    }
}

/// Comparison operator for numeric conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumOp {
    Less,
    LessEqual,
    Equal,
    GreaterEqual,
    Greater,
}

impl NumOp {
    fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            NumOp::Less => lhs < rhs,
            NumOp::LessEqual => lhs <= rhs,
            NumOp::Equal => lhs == rhs,
            NumOp::GreaterEqual => lhs >= rhs,
            NumOp::Greater => lhs > rhs,
        }
    }
}

/// A boolean condition over question values.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The question has the given value. For choice values every choice of
    /// the condition must be selected.
    Equal { question: ObjectId, value: Value },
    /// Numeric comparison against a threshold.
    Num {
        question: ObjectId,
        op: NumOp,
        threshold: f64,
    },
    /// The question is answered with something other than "unknown".
    Known(ObjectId),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn equal(question: ObjectId, value: Value) -> Self {
        Condition::Equal { question, value }
    }

    pub fn num(question: ObjectId, op: NumOp, threshold: f64) -> Self {
        Condition::Num {
            question,
            op,
            threshold,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    /// Evaluates the condition against the given values.
    pub fn eval(&self, values: &impl ValueLookup) -> Truth {
        match self {
            Condition::Equal { question, value } => {
                match answered(values.value(*question)) {
                    Ok(actual) => Truth::from_bool(matches_value(actual, value)),
                    Err(reason) => Truth::Indeterminate(reason),
                }
            }
            Condition::Num {
                question,
                op,
                threshold,
            } => match answered(values.value(*question)) {
                Ok(actual) => Truth::from_bool(
                    actual.as_num().is_some_and(|n| op.apply(n, *threshold)),
                ),
                Err(reason) => Truth::Indeterminate(reason),
            },
            Condition::Known(question) => match values.value(*question) {
                Value::Undefined => Truth::Indeterminate(Indeterminate::NoAnswer),
                Value::Unknown => Truth::False,
                _ => Truth::True,
            },
            Condition::And(terms) => {
                let mut pending = None;
                for term in terms {
                    match term.eval(values) {
                        Truth::False => return Truth::False,
                        Truth::Indeterminate(reason) => {
                            pending.get_or_insert(reason);
                        }
                        Truth::True => {}
                    }
                }
                pending.map_or(Truth::True, Truth::Indeterminate)
            }
            Condition::Or(terms) => {
                let mut pending = None;
                for term in terms {
                    match term.eval(values) {
                        Truth::True => return Truth::True,
                        Truth::Indeterminate(reason) => {
                            pending.get_or_insert(reason);
                        }
                        Truth::False => {}
                    }
                }
                pending.map_or(Truth::False, Truth::Indeterminate)
            }
            Condition::Not(term) => term.eval(values).negate(),
        }
    }

    /// Returns every question referenced by this condition.
    pub fn terminal_objects(&self) -> Vec<ObjectId> {
        let mut result = Vec::new();
        self.collect_terminals(&mut result);
        result
    }

    fn collect_terminals(&self, result: &mut Vec<ObjectId>) {
        match self {
            Condition::Equal { question, .. }
            | Condition::Num { question, .. }
            | Condition::Known(question) => {
                if !result.contains(question) {
                    result.push(*question);
                }
            }
            Condition::And(terms) | Condition::Or(terms) => {
                for term in terms {
                    term.collect_terminals(result);
                }
            }
            Condition::Not(term) => term.collect_terminals(result),
        }
    }
}

fn answered(value: &Value) -> Result<&Value, Indeterminate> {
    match value {
        Value::Undefined => Err(Indeterminate::NoAnswer),
        Value::Unknown => Err(Indeterminate::UnknownAnswer),
        other => Ok(other),
    }
}

fn matches_value(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Choices(actual), Value::Choices(expected)) => expected.is_subset(actual),
        _ => actual == expected,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Values(HashMap<ObjectId, Value>);

    impl ValueLookup for Values {
        fn value(&self, object: ObjectId) -> &Value {
            static UNDEFINED: Value = Value::Undefined;
            self.0.get(&object).unwrap_or(&UNDEFINED)
        }
    }

    fn values(entries: &[(u32, Value)]) -> Values {
        Values(
            entries
                .iter()
                .map(|(id, v)| (ObjectId::from_index(*id as usize), v.clone()))
                .collect(),
        )
    }

    fn q(id: u32) -> ObjectId {
        ObjectId::from_index(id as usize)
    }

    #[test]
    fn test_equal_reports_reason_for_missing_answers() {
        let cond = Condition::equal(q(0), Value::choice("yes"));

        assert_eq!(
            cond.eval(&values(&[])),
            Truth::Indeterminate(Indeterminate::NoAnswer)
        );
        assert_eq!(
            cond.eval(&values(&[(0, Value::Unknown)])),
            Truth::Indeterminate(Indeterminate::UnknownAnswer)
        );
        assert_eq!(cond.eval(&values(&[(0, Value::choice("yes"))])), Truth::True);
        assert_eq!(cond.eval(&values(&[(0, Value::choice("no"))])), Truth::False);
    }

    #[test]
    fn test_equal_on_multiple_choice_is_containment() {
        let cond = Condition::equal(q(0), Value::choice("red"));
        let state = values(&[(0, Value::choices(["red", "green"]))]);

        assert!(cond.eval(&state).is_true());
    }

    #[test]
    fn test_and_false_dominates_indeterminate() {
        let cond = Condition::And(vec![
            Condition::equal(q(0), Value::choice("yes")),
            Condition::equal(q(1), Value::choice("yes")),
        ]);

        let state = values(&[(1, Value::choice("no"))]);
        assert_eq!(cond.eval(&state), Truth::False);

        let state = values(&[(1, Value::choice("yes"))]);
        assert!(cond.eval(&state).is_indeterminate());
    }

    #[test]
    fn test_or_true_dominates_indeterminate() {
        let cond = Condition::Or(vec![
            Condition::equal(q(0), Value::choice("yes")),
            Condition::equal(q(1), Value::choice("yes")),
        ]);

        assert!(cond.eval(&values(&[(1, Value::choice("yes"))])).is_true());
        assert!(cond
            .eval(&values(&[(1, Value::choice("no"))]))
            .is_indeterminate());
        assert!(cond
            .eval(&values(&[(0, Value::choice("no")), (1, Value::choice("no"))]))
            .is_false());
    }

    #[test]
    fn test_not_keeps_indeterminate() {
        let cond = Condition::not(Condition::equal(q(0), Value::choice("yes")));

        assert!(cond.eval(&values(&[])).is_indeterminate());
        assert!(cond.eval(&values(&[(0, Value::choice("no"))])).is_true());
    }

    #[test]
    fn test_num_and_known() {
        let cond = Condition::num(q(0), NumOp::GreaterEqual, 38.0);
        assert!(cond.eval(&values(&[(0, Value::Num(38.5))])).is_true());
        assert!(cond.eval(&values(&[(0, Value::Num(36.9))])).is_false());

        let known = Condition::Known(q(0));
        assert!(known.eval(&values(&[(0, Value::Unknown)])).is_false());
        assert!(known.eval(&values(&[])).is_indeterminate());
    }

    #[test]
    fn test_terminal_objects_are_unique() {
        let cond = Condition::And(vec![
            Condition::equal(q(0), Value::choice("a")),
            Condition::Or(vec![Condition::Known(q(1)), Condition::Known(q(0))]),
        ]);

        assert_eq!(cond.terminal_objects(), vec![q(0), q(1)]);
    }
}
