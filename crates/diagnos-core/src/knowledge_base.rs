//! Knowledge base: terminology arena plus knowledge registry.
//!
//! # Example
//!
//! ```
//! use diagnos_core::{KnowledgeBase, Choice, Value};
//!
//! let mut builder = KnowledgeBase::builder("demo");
//! let exam = builder.qcontainer("Exam", 2.0, None).unwrap();
//! let fever = builder
//!     .one_choice("fever", [Choice::normal("no"), Choice::new("yes")], Some(exam))
//!     .unwrap();
//! let kb = builder.build();
//!
//! assert_eq!(kb.search_question("fever").unwrap(), fever);
//! assert_eq!(kb.questions_of(exam), vec![fever]);
//! assert_eq!(kb.choice_value(fever, "yes").unwrap(), Value::choice("yes"));
//! ```

use std::collections::HashMap;

use crate::error::{DiagnosError, Result};
use crate::knowledge::{KnowledgeRegistry, KnowledgeSlice, StateTransition};
use crate::terminology::{
    Choice, ObjectId, ObjectKind, Properties, QuestionKind, TerminologyObject,
};
use crate::value::Value;

/// Read-mostly store of the diagnostic terminology, shared by sessions.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    name: String,
    objects: Vec<TerminologyObject>,
    by_name: HashMap<String, ObjectId>,
    parents: Vec<Vec<ObjectId>>,
    children: Vec<Vec<ObjectId>>,
    knowledge: KnowledgeRegistry,
}

impl KnowledgeBase {
    pub fn builder(name: impl Into<String>) -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder {
            kb: KnowledgeBase {
                name: name.into(),
                objects: Vec::new(),
                by_name: HashMap::new(),
                parents: Vec::new(),
                children: Vec::new(),
                knowledge: KnowledgeRegistry::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the object behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle was created by another knowledge base.
    pub fn object(&self, id: ObjectId) -> &TerminologyObject {
        &self.objects[id.index()]
    }

    pub fn get(&self, id: ObjectId) -> Option<&TerminologyObject> {
        self.objects.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = &TerminologyObject> {
        self.objects.iter()
    }

    pub fn search(&self, name: &str) -> Option<ObjectId> {
        self.by_name.get(name).copied()
    }

    pub fn search_question(&self, name: &str) -> Result<ObjectId> {
        self.search_kind(name, "question", TerminologyObject::is_question)
    }

    pub fn search_qcontainer(&self, name: &str) -> Result<ObjectId> {
        self.search_kind(name, "qcontainer", TerminologyObject::is_qcontainer)
    }

    pub fn search_solution(&self, name: &str) -> Result<ObjectId> {
        self.search_kind(name, "solution", TerminologyObject::is_solution)
    }

    fn search_kind(
        &self,
        name: &str,
        expected: &'static str,
        check: fn(&TerminologyObject) -> bool,
    ) -> Result<ObjectId> {
        let id = self
            .search(name)
            .ok_or_else(|| DiagnosError::UnknownObject(name.to_string()))?;
        if check(self.object(id)) {
            Ok(id)
        } else {
            Err(DiagnosError::WrongKind {
                name: name.to_string(),
                expected,
            })
        }
    }

    pub fn questions(&self) -> impl Iterator<Item = &TerminologyObject> {
        self.objects.iter().filter(|o| o.is_question())
    }

    pub fn qcontainers(&self) -> impl Iterator<Item = &TerminologyObject> {
        self.objects.iter().filter(|o| o.is_qcontainer())
    }

    pub fn solutions(&self) -> impl Iterator<Item = &TerminologyObject> {
        self.objects.iter().filter(|o| o.is_solution())
    }

    pub fn parents(&self, id: ObjectId) -> &[ObjectId] {
        &self.parents[id.index()]
    }

    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        &self.children[id.index()]
    }

    /// All questions below `root` in depth-first order, without duplicates.
    pub fn questions_of(&self, root: ObjectId) -> Vec<ObjectId> {
        let mut result = Vec::new();
        let mut visited = vec![false; self.objects.len()];
        self.collect_questions(root, &mut result, &mut visited);
        result
    }

    fn collect_questions(&self, id: ObjectId, result: &mut Vec<ObjectId>, visited: &mut [bool]) {
        if std::mem::replace(&mut visited[id.index()], true) {
            return;
        }
        if self.object(id).is_question() {
            result.push(id);
        }
        for &child in self.children(id) {
            self.collect_questions(child, result, visited);
        }
    }

    /// All QContainers containing `id`, directly or through other objects.
    pub fn parent_qcontainers(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut result = Vec::new();
        let mut stack: Vec<ObjectId> = self.parents(id).to_vec();
        let mut visited = vec![false; self.objects.len()];
        while let Some(parent) = stack.pop() {
            if std::mem::replace(&mut visited[parent.index()], true) {
                continue;
            }
            if self.object(parent).is_qcontainer() {
                result.push(parent);
            }
            stack.extend_from_slice(self.parents(parent));
        }
        result
    }

    /// Builds the value selecting `choice` of a choice question.
    pub fn choice_value(&self, question: ObjectId, choice: &str) -> Result<Value> {
        let object = self.object(question);
        let kind = object.question_kind().ok_or_else(|| DiagnosError::WrongKind {
            name: object.name().to_string(),
            expected: "question",
        })?;
        if kind.choices().iter().any(|c| c.name() == choice) {
            Ok(Value::choice(choice))
        } else {
            Err(DiagnosError::UnknownChoice {
                question: object.name().to_string(),
                choice: choice.to_string(),
            })
        }
    }

    /// The normal (default) answer of a choice question, if it defines one.
    pub fn normal_value(&self, question: ObjectId) -> Option<Value> {
        self.object(question)
            .question_kind()?
            .choices()
            .iter()
            .find(|c| c.is_normal())
            .map(|c| Value::choice(c.name()))
    }

    pub fn knowledge(&self) -> &KnowledgeRegistry {
        &self.knowledge
    }

    pub fn state_transition(&self, qcontainer: ObjectId) -> Option<&StateTransition> {
        self.knowledge.state_transition(qcontainer)
    }
}

/// Builder for [`KnowledgeBase`].
#[derive(Debug)]
pub struct KnowledgeBaseBuilder {
    kb: KnowledgeBase,
}

impl KnowledgeBaseBuilder {
    fn add(
        &mut self,
        name: impl Into<String>,
        kind: ObjectKind,
        properties: Properties,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        let name = name.into();
        if self.kb.by_name.contains_key(&name) {
            return Err(DiagnosError::DuplicateObject(name));
        }
        let id = ObjectId::from_index(self.kb.objects.len());
        self.kb.by_name.insert(name.clone(), id);
        self.kb
            .objects
            .push(TerminologyObject::new(id, name, kind, properties));
        self.kb.parents.push(Vec::new());
        self.kb.children.push(Vec::new());
        if let Some(parent) = parent {
            self.link(parent, id)?;
        }
        Ok(id)
    }

    /// Adds a QContainer with a static cost.
    pub fn qcontainer(
        &mut self,
        name: impl Into<String>,
        cost: f64,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        self.add(
            name,
            ObjectKind::QContainer,
            Properties {
                cost: Some(cost),
                ..Properties::default()
            },
            parent,
        )
    }

    pub fn question(
        &mut self,
        name: impl Into<String>,
        kind: QuestionKind,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        self.add(name, ObjectKind::Question(kind), Properties::default(), parent)
    }

    pub fn one_choice(
        &mut self,
        name: impl Into<String>,
        choices: impl IntoIterator<Item = Choice>,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        let choices = choices.into_iter().collect();
        self.question(name, QuestionKind::OneChoice(choices), parent)
    }

    pub fn multiple_choice(
        &mut self,
        name: impl Into<String>,
        choices: impl IntoIterator<Item = Choice>,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        let choices = choices.into_iter().collect();
        self.question(name, QuestionKind::MultipleChoice(choices), parent)
    }

    pub fn solution(&mut self, name: impl Into<String>) -> Result<ObjectId> {
        self.add(name, ObjectKind::Solution, Properties::default(), None)
    }

    /// Adds `child` below `parent`. Objects may have several parents.
    pub fn link(&mut self, parent: ObjectId, child: ObjectId) -> Result<()> {
        let len = self.kb.objects.len();
        if parent.index() >= len || child.index() >= len {
            return Err(DiagnosError::InvalidState(format!(
                "cannot link {parent} -> {child}: unknown handle"
            )));
        }
        if !self.kb.children[parent.index()].contains(&child) {
            self.kb.children[parent.index()].push(child);
            self.kb.parents[child.index()].push(parent);
        }
        Ok(())
    }

    /// Marks a question as answered once per session.
    pub fn check_once(&mut self, question: ObjectId) -> Result<()> {
        self.properties_of(question, "question", |o| o.is_question())?
            .check_once = true;
        Ok(())
    }

    /// Marks a QContainer as permanently relevant.
    pub fn permanently_relevant(&mut self, qcontainer: ObjectId) -> Result<()> {
        self.properties_of(qcontainer, "qcontainer", |o| o.is_qcontainer())?
            .permanently_relevant = true;
        Ok(())
    }

    fn properties_of(
        &mut self,
        id: ObjectId,
        expected: &'static str,
        is_kind: impl Fn(&TerminologyObject) -> bool,
    ) -> Result<&mut Properties> {
        let object = self
            .kb
            .objects
            .get_mut(id.index())
            .ok_or_else(|| DiagnosError::UnknownObject(id.to_string()))?;
        if !is_kind(object) {
            return Err(DiagnosError::WrongKind {
                name: object.name().to_string(),
                expected,
            });
        }
        Ok(object.properties_mut())
    }

    /// Registers the state transition of a QContainer.
    pub fn state_transition(&mut self, transition: StateTransition) -> Result<()> {
        let owner = transition.qcontainer();
        match self.kb.get(owner) {
            Some(object) if object.is_qcontainer() => {}
            Some(object) => {
                return Err(DiagnosError::WrongKind {
                    name: object.name().to_string(),
                    expected: "qcontainer",
                })
            }
            None => return Err(DiagnosError::UnknownObject(owner.to_string())),
        }
        self.kb
            .knowledge
            .insert(KnowledgeSlice::StateTransition(transition));
        Ok(())
    }

    pub fn build(self) -> KnowledgeBase {
        self.kb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{ConditionalValueSetter, ValueTransition};

    fn sample() -> (KnowledgeBase, ObjectId, ObjectId, ObjectId) {
        let mut builder = KnowledgeBase::builder("sample");
        let root = builder.qcontainer("Root", 0.0, None).unwrap();
        let exam = builder.qcontainer("Exam", 3.5, Some(root)).unwrap();
        let q = builder
            .one_choice("ok", [Choice::normal("ok")], Some(exam))
            .unwrap();
        (builder.build(), root, exam, q)
    }

    #[test]
    fn test_search_by_kind() {
        let (kb, _, exam, q) = sample();

        assert_eq!(kb.search_qcontainer("Exam").unwrap(), exam);
        assert_eq!(kb.search_question("ok").unwrap(), q);
        assert!(matches!(
            kb.search_question("Exam"),
            Err(DiagnosError::WrongKind { .. })
        ));
        assert!(matches!(
            kb.search_solution("missing"),
            Err(DiagnosError::UnknownObject(_))
        ));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut builder = KnowledgeBase::builder("dup");
        builder.solution("flu").unwrap();
        assert!(matches!(
            builder.solution("flu"),
            Err(DiagnosError::DuplicateObject(_))
        ));
    }

    #[test]
    fn test_hierarchy_navigation() {
        let (kb, root, exam, q) = sample();

        assert_eq!(kb.children(root), &[exam]);
        assert_eq!(kb.parents(q), &[exam]);
        assert_eq!(kb.questions_of(root), vec![q]);

        let mut containers = kb.parent_qcontainers(q);
        containers.sort();
        assert_eq!(containers, vec![root, exam]);
    }

    #[test]
    fn test_static_cost_and_normal_value() {
        let (kb, root, exam, q) = sample();

        assert_eq!(kb.object(exam).static_cost(), 3.5);
        assert_eq!(kb.object(root).static_cost(), 0.0);
        assert_eq!(kb.normal_value(q), Some(Value::choice("ok")));
    }

    #[test]
    fn test_session_properties() {
        let mut builder = KnowledgeBase::builder("props");
        let exam = builder.qcontainer("Exam", 2.0, None).unwrap();
        let q = builder
            .one_choice("gender", [Choice::new("f"), Choice::new("m")], Some(exam))
            .unwrap();
        builder.check_once(q).unwrap();
        builder.permanently_relevant(exam).unwrap();
        assert!(matches!(
            builder.check_once(exam),
            Err(DiagnosError::WrongKind { .. })
        ));
        let kb = builder.build();

        assert!(kb.object(q).properties().check_once);
        assert!(kb.object(exam).properties().permanently_relevant);
        assert_eq!(kb.object(exam).static_cost(), 2.0);
        assert!(!kb.object(exam).properties().check_once);
    }

    #[test]
    fn test_unknown_choice() {
        let (kb, _, _, q) = sample();
        assert!(matches!(
            kb.choice_value(q, "broken"),
            Err(DiagnosError::UnknownChoice { .. })
        ));
    }

    #[test]
    fn test_state_transition_registration() {
        let mut builder = KnowledgeBase::builder("st");
        let exam = builder.qcontainer("Exam", 1.0, None).unwrap();
        let state = builder
            .one_choice("state", [Choice::new("open"), Choice::new("closed")], None)
            .unwrap();
        builder
            .state_transition(StateTransition::new(
                exam,
                None,
                vec![ValueTransition::new(
                    state,
                    vec![ConditionalValueSetter::always(Value::choice("open"))],
                )],
            ))
            .unwrap();
        assert!(builder
            .state_transition(StateTransition::new(state, None, vec![]))
            .is_err());

        let kb = builder.build();
        let st = kb.state_transition(exam).unwrap();
        assert!(st.has_effects());
        assert_eq!(kb.knowledge().state_transitions().count(), 1);
    }
}
