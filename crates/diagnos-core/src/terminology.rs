//! Terminology objects: questions, QContainers (test batches) and solutions.
//!
//! Objects live in an arena owned by the [`KnowledgeBase`](crate::KnowledgeBase)
//! and are referenced through [`ObjectId`] handles. Parent/child links are kept
//! in separate index maps so that no object owns another.

use std::fmt;

/// Handle of a terminology object inside its knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A selectable answer of a choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    name: String,
    /// Marks the expected answer used when simulating a test batch.
    normal: bool,
}

impl Choice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            normal: false,
        }
    }

    /// Creates a choice flagged as the normal (default) answer.
    pub fn normal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            normal: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_normal(&self) -> bool {
        self.normal
    }
}

/// The answer domain of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    OneChoice(Vec<Choice>),
    MultipleChoice(Vec<Choice>),
    Num,
    Text,
    Date,
}

impl QuestionKind {
    /// Choices of a choice question, empty for other kinds.
    pub fn choices(&self) -> &[Choice] {
        match self {
            QuestionKind::OneChoice(choices) | QuestionKind::MultipleChoice(choices) => choices,
            _ => &[],
        }
    }
}

/// The kind of a terminology object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Question(QuestionKind),
    QContainer,
    Solution,
}

impl ObjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Question(_) => "question",
            ObjectKind::QContainer => "qcontainer",
            ObjectKind::Solution => "solution",
        }
    }
}

/// Persisted properties of a terminology object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    /// Static cost of administering a QContainer.
    pub cost: Option<f64>,
    /// The answer of this question stays valid for the whole session, so
    /// QContainers needing another value cannot be planned.
    pub check_once: bool,
    /// The QContainer stays on the agenda once indicated.
    pub permanently_relevant: bool,
}

/// A named object of the diagnostic terminology.
#[derive(Debug, Clone)]
pub struct TerminologyObject {
    id: ObjectId,
    name: String,
    kind: ObjectKind,
    properties: Properties,
}

impl TerminologyObject {
    pub(crate) fn new(id: ObjectId, name: String, kind: ObjectKind, properties: Properties) -> Self {
        Self {
            id,
            name,
            kind,
            properties,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub fn is_question(&self) -> bool {
        matches!(self.kind, ObjectKind::Question(_))
    }

    pub fn is_qcontainer(&self) -> bool {
        matches!(self.kind, ObjectKind::QContainer)
    }

    pub fn is_solution(&self) -> bool {
        matches!(self.kind, ObjectKind::Solution)
    }

    /// Answer domain if this object is a question.
    pub fn question_kind(&self) -> Option<&QuestionKind> {
        match &self.kind {
            ObjectKind::Question(kind) => Some(kind),
            _ => None,
        }
    }

    /// Static cost property, 0 when not set.
    pub fn static_cost(&self) -> f64 {
        self.properties.cost.unwrap_or(0.0)
    }
}

impl fmt::Display for TerminologyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
