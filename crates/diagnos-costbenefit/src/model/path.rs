//! Sequences of QContainers with cumulative costs.

use std::fmt;

use diagnos_core::ObjectId;
use smallvec::SmallVec;

/// An ordered sequence of QContainers.
///
/// Paths grow and shrink like a stack. Each element remembers the cost of
/// the path up to and including it, so popping restores the previous cost
/// exactly. Negative step costs are clamped to zero, which keeps the cost of
/// an extended path at least the cost of its prefix.
///
/// # Example
///
/// ```
/// use diagnos_core::ObjectId;
/// use diagnos_costbenefit::Path;
///
/// let mut path = Path::new();
/// path.push(ObjectId::from_index(1), 2.0);
/// path.push(ObjectId::from_index(2), 3.0);
/// assert_eq!(path.cost(), 5.0);
///
/// path.pop();
/// assert_eq!(path.cost(), 2.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    qcontainers: SmallVec<[ObjectId; 8]>,
    cumulative: SmallVec<[f64; 8]>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, qcontainer: ObjectId, cost: f64) {
        let total = self.cost() + cost.max(0.0);
        self.qcontainers.push(qcontainer);
        self.cumulative.push(total);
    }

    pub fn pop(&mut self) -> Option<ObjectId> {
        self.cumulative.pop();
        self.qcontainers.pop()
    }

    /// Total cost, 0 for the empty path.
    pub fn cost(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn contains(&self, qcontainer: ObjectId) -> bool {
        self.qcontainers.contains(&qcontainer)
    }

    pub fn last(&self) -> Option<ObjectId> {
        self.qcontainers.last().copied()
    }

    pub fn len(&self) -> usize {
        self.qcontainers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qcontainers.is_empty()
    }

    pub fn qcontainers(&self) -> &[ObjectId] {
        &self.qcontainers
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.qcontainers.iter().copied()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.qcontainers.iter().map(ToString::to_string).collect();
        write!(f, "[{}] ({})", names.join(", "), self.cost())
    }
}
