//! Strategic contributor that plans and administers QContainer paths.
//!
//! After every propagation the controller checks the agenda. If no
//! QContainer is indicated and still open, it builds a [`SearchModel`] from
//! its strategic supports, searches the best path and indicates the path's
//! QContainers. While the path is being answered it advances to the next
//! QContainer, and it drops the path when the possible solutions change or a
//! QContainer of the path gets contra-indicated.

mod state;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use diagnos_blackboard::{
    merge, Contributor, ContributorId, ContributorKind, Fact, PropagationEntry, RebuildRegistry,
    Session, Source,
};
use diagnos_config::PlannerConfig;
use diagnos_core::{
    DiagnosError, IndicationState, KnowledgeBase, ObjectId, QuestionKind, Result, Value,
    ValueLookup,
};
use tracing::{debug, info};

use crate::algorithm::{IterativeDeepeningAlgorithm, SearchAlgorithm};
use crate::model::{Node, Path, SearchModel, Target};
use crate::strategy::{
    CostFunction, DefaultCostFunction, DefaultSolutionsRater, DefaultTargetFunction,
    SolutionsRater, StrategicSupport, TargetFunction,
};
use crate::transition::{self, StateTransitionContributor};

pub use state::CostBenefitState;

/// Benefit given to explicitly requested targets.
pub const MANUAL_TARGET_BENEFIT: f64 = 1e10;

/// Plans cost-efficient QContainer sequences and indicates them.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use diagnos_blackboard::{ContributorRegistry, UserContributor};
/// use diagnos_costbenefit::{CostBenefitController, StateTransitionContributor};
///
/// let controller = CostBenefitController::builder()
///     .with_manual_mode(true)
///     .build();
/// let registry = ContributorRegistry::builder()
///     .with(UserContributor)
///     .with(StateTransitionContributor)
///     .with(controller)
///     .build();
/// assert_eq!(registry.len(), 3);
/// ```
#[derive(Debug)]
pub struct CostBenefitController {
    supports: Vec<Arc<dyn StrategicSupport>>,
    cost_function: Arc<dyn CostFunction>,
    target_function: Arc<dyn TargetFunction>,
    algorithm: Arc<dyn SearchAlgorithm>,
    solutions_rater: Arc<dyn SolutionsRater>,
    manual_mode: bool,
    rebuilds: Arc<RebuildRegistry>,
}

impl CostBenefitController {
    pub const NAME: &'static str = "cost-benefit";
    pub const PRIORITY: u32 = 6;

    pub fn builder() -> CostBenefitControllerBuilder {
        CostBenefitControllerBuilder::default()
    }

    /// Controller with search, abort and manual mode settings from `config`.
    pub fn from_config(
        config: &PlannerConfig,
        supports: Vec<Arc<dyn StrategicSupport>>,
    ) -> Self {
        supports
            .into_iter()
            .fold(Self::builder(), CostBenefitControllerBuilder::with_shared_support)
            .with_algorithm(IterativeDeepeningAlgorithm::from_config(config))
            .with_manual_mode(config.manual_mode)
            .build()
    }

    pub fn is_manual_mode(&self) -> bool {
        self.manual_mode
    }

    /// The controller's state in a session.
    pub fn state(session: &Session) -> Result<&CostBenefitState> {
        let me = session.contributor_id(Self::NAME)?;
        session.object::<CostBenefitState>(me)
    }

    /// Plans a path to the given targets and activates it.
    ///
    /// Targets containing a blocked QContainer are skipped, see
    /// [`blocked_qcontainers`].
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosError::NoPathFound`] if no target is reachable.
    pub fn plan_to(&self, session: &mut Session, targets: Vec<Target>) -> Result<Path> {
        let me = session.contributor_id(Self::NAME)?;
        session.propagate(|s| {
            s.with_object(me, |state: &mut CostBenefitState, s| {
                self.reset_path(state, s);
                let mut model = SearchModel::new(Arc::clone(&self.cost_function));
                let blocked = blocked_qcontainers(s);
                for target in targets {
                    if let Some(reason) = blocking_reason(&target, s, &blocked, false) {
                        model.block_target(target, reason);
                        continue;
                    }
                    let id = model.add_target(target);
                    model.maximize_benefit(id, MANUAL_TARGET_BENEFIT);
                }
                let statistics = self.algorithm.search(s, &mut model)?;
                let path = model.best_path().cloned();
                state.model = Some(model);
                state.statistics = Some(statistics);

                let path = path.ok_or(DiagnosError::NoPathFound)?;
                self.activate_path(state, s, me, &path);
                self.activate_next(state, s, me);
                Ok(path)
            })
        })?
    }

    /// Drops the active path and its indications.
    pub fn reset(&self, session: &mut Session) -> Result<()> {
        let me = session.contributor_id(Self::NAME)?;
        session.propagate(|s| {
            s.with_object(me, |state: &mut CostBenefitState, s| self.reset_path(state, s))
        })
    }

    fn possible_solutions(&self, session: &Session) -> BTreeSet<ObjectId> {
        self.supports
            .iter()
            .flat_map(|support| support.possible_solutions(session))
            .collect()
    }

    fn calculate_new_path(
        &self,
        state: &mut CostBenefitState,
        session: &mut Session,
        me: ContributorId,
    ) -> Result<()> {
        self.reset_path(state, session);
        let solutions = self.possible_solutions(session);
        let mut model = SearchModel::new(Arc::clone(&self.cost_function));
        let blocked = blocked_qcontainers(session);

        for support in &self.supports {
            let questions = support.discriminating_questions(&solutions, session);
            let targets =
                self.target_function
                    .targets(session, &questions, &solutions, support.as_ref());
            for target in targets {
                if let Some(reason) = blocking_reason(&target, session, &blocked, true) {
                    model.block_target(target, reason);
                    continue;
                }
                let benefit = support.entropy(target.qcontainers(), &solutions, session);
                if benefit <= 0.0 {
                    continue;
                }
                let id = model.add_target(target);
                model.maximize_benefit(id, benefit);
            }
        }

        debug!(
            event = "model_built",
            session = %session.id(),
            solutions = solutions.len(),
            targets = model.targets().len(),
            blocked = model.blocked_targets().len(),
        );

        if model.best_benefit() != 0.0 {
            if self.solutions_rater.check(&solutions, session) {
                state.statistics = Some(self.algorithm.search(session, &mut model)?);
            } else {
                debug!(event = "solutions_rejected", session = %session.id());
            }
        }
        state.solutions = solutions;
        let path = model.best_path().cloned();
        state.model = Some(model);
        if let Some(path) = path {
            self.activate_path(state, session, me, &path);
            self.activate_next(state, session, me);
        }
        Ok(())
    }

    fn activate_path(
        &self,
        state: &mut CostBenefitState,
        session: &mut Session,
        me: ContributorId,
        path: &Path,
    ) {
        let kb = Arc::clone(session.knowledge_base());
        session.propagate(|s| {
            for (rank, qc) in path.iter().enumerate() {
                make_ok_questions_undone(&kb, s, qc);
                let fact = Fact::new(
                    qc,
                    Value::indication(IndicationState::MultipleIndicated, rank as f64),
                    Source::named(format!("step-{rank}")),
                    me,
                );
                s.add_fact(fact.clone());
                state.indicated_facts.push(fact);
            }
        });
        state.sequence = Some(path.qcontainers().to_vec());
        state.index = None;

        let names: Vec<&str> = path.iter().map(|qc| kb.object(qc).name()).collect();
        info!(
            event = "path_activated",
            session = %session.id(),
            path = ?names,
            cost = path.cost(),
        );
    }

    /// Moves to the next QContainer of the path once the current one is
    /// done. QContainers that are already done get their transition fired
    /// and are skipped.
    fn activate_next(&self, state: &mut CostBenefitState, session: &mut Session, me: ContributorId) {
        let kb = Arc::clone(session.knowledge_base());
        let firing = session
            .contributors()
            .find(StateTransitionContributor::NAME)
            .unwrap_or(me);
        loop {
            let Some(sequence) = state.sequence.clone() else {
                return;
            };
            if let Some(index) = state.index {
                let current = sequence[index];
                if !session.is_done(current) {
                    if !Node::new(&kb, current).is_applicable(session) {
                        self.reset_path(state, session);
                    }
                    return;
                }
                if let Some(fact) = state.indicated_facts.get(index) {
                    session.remove_fact(fact);
                }
            }

            let next = state.index.map_or(0, |index| index + 1);
            if next >= sequence.len() {
                self.reset_path(state, session);
                return;
            }
            state.index = Some(next);
            let qc = sequence[next];
            if sequence[..next].contains(&qc) {
                make_ok_questions_undone(&kb, session, qc);
            }
            if !Node::new(&kb, qc).is_applicable(session) {
                self.reset_path(state, session);
                return;
            }
            if !session.is_done(qc) {
                debug!(
                    event = "qcontainer_activated",
                    session = %session.id(),
                    qcontainer = kb.object(qc).name(),
                    index = next,
                );
                return;
            }
            if let Some(st) = kb.state_transition(qc) {
                let source = Source::Object(qc);
                transition::retract(st, session, firing, &source);
                transition::fire(st, session, firing, &source);
            }
        }
    }

    fn reset_path(&self, state: &mut CostBenefitState, session: &mut Session) {
        if !state.indicated_facts.is_empty() {
            let facts = std::mem::take(&mut state.indicated_facts);
            session.retract_facts(&facts);
        }
        if state.sequence.take().is_some() {
            debug!(event = "path_reset", session = %session.id());
        }
        state.index = None;
    }

    fn on_changes(
        &self,
        state: &mut CostBenefitState,
        session: &mut Session,
        me: ContributorId,
        changes: &[PropagationEntry],
    ) {
        let Some(sequence) = state.sequence.clone() else {
            return;
        };
        let kb = Arc::clone(session.knowledge_base());
        let mut done_in_path = false;
        for change in changes {
            let object = kb.object(change.object());
            if object.is_qcontainer()
                && sequence.contains(&object.id())
                && session.indication(object.id()).is_contra_indicated()
            {
                self.reset_path(state, session);
                return;
            }
            if object.is_question() && change.new_value().is_answered() {
                done_in_path |= kb
                    .parent_qcontainers(object.id())
                    .into_iter()
                    .any(|qc| sequence.contains(&qc) && session.is_done(qc));
            }
        }
        if !done_in_path {
            return;
        }
        if self.possible_solutions(session) != state.solutions {
            debug!(event = "solutions_changed", session = %session.id());
            self.reset_path(state, session);
        } else {
            self.activate_next(state, session, me);
        }
    }

    /// Another contributor (or the active path) indicated a QContainer that
    /// is not done yet.
    fn has_open_indication(session: &Session) -> bool {
        let kb = session.knowledge_base();
        kb.qcontainers().any(|qc| {
            session.indication(qc.id()).is_relevant() && !session.is_done(qc.id())
        })
    }
}

impl Contributor for CostBenefitController {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> ContributorKind {
        ContributorKind::Strategic
    }

    fn priority(&self) -> u32 {
        Self::PRIORITY
    }

    fn merge(&self, facts: &[&Fact]) -> Value {
        merge::strongest_indication(facts)
    }

    fn init(&self, session: &mut Session, me: ContributorId) -> Result<()> {
        session.insert_object(me, CostBenefitState::default());
        Ok(())
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
        session.with_object(me, |state: &mut CostBenefitState, s| {
            self.on_changes(state, s, me, changes)
        })
    }

    fn post_propagate(&self, session: &mut Session, me: ContributorId) -> Result<()> {
        if self.manual_mode
            || session.is_simulation()
            || self.rebuilds.is_rebuilding(session.id())
            || Self::has_open_indication(session)
        {
            return Ok(());
        }
        session.with_object(me, |state: &mut CostBenefitState, s| {
            self.calculate_new_path(state, s, me)
        })?
    }
}

/// Builder for [`CostBenefitController`].
#[derive(Debug)]
pub struct CostBenefitControllerBuilder {
    supports: Vec<Arc<dyn StrategicSupport>>,
    cost_function: Arc<dyn CostFunction>,
    target_function: Arc<dyn TargetFunction>,
    algorithm: Arc<dyn SearchAlgorithm>,
    solutions_rater: Arc<dyn SolutionsRater>,
    manual_mode: bool,
    rebuilds: Arc<RebuildRegistry>,
}

impl Default for CostBenefitControllerBuilder {
    fn default() -> Self {
        Self {
            supports: Vec::new(),
            cost_function: Arc::new(DefaultCostFunction),
            target_function: Arc::new(DefaultTargetFunction),
            algorithm: Arc::new(IterativeDeepeningAlgorithm::default()),
            solutions_rater: Arc::new(DefaultSolutionsRater),
            manual_mode: false,
            rebuilds: Arc::new(RebuildRegistry::new()),
        }
    }
}

impl CostBenefitControllerBuilder {
    pub fn with_support<S: StrategicSupport + 'static>(self, support: S) -> Self {
        self.with_shared_support(Arc::new(support))
    }

    pub fn with_shared_support(mut self, support: Arc<dyn StrategicSupport>) -> Self {
        self.supports.push(support);
        self
    }

    pub fn with_cost_function<C: CostFunction + 'static>(mut self, cost_function: C) -> Self {
        self.cost_function = Arc::new(cost_function);
        self
    }

    pub fn with_target_function<T: TargetFunction + 'static>(mut self, target_function: T) -> Self {
        self.target_function = Arc::new(target_function);
        self
    }

    pub fn with_algorithm<A: SearchAlgorithm + 'static>(mut self, algorithm: A) -> Self {
        self.algorithm = Arc::new(algorithm);
        self
    }

    /// Gate checked before each automatic search.
    pub fn with_solutions_rater<R: SolutionsRater + 'static>(mut self, rater: R) -> Self {
        self.solutions_rater = Arc::new(rater);
        self
    }

    pub fn with_manual_mode(mut self, manual_mode: bool) -> Self {
        self.manual_mode = manual_mode;
        self
    }

    /// Shares the registry used to replay session histories, so that no
    /// planning happens during a replay.
    pub fn with_rebuild_registry(mut self, rebuilds: Arc<RebuildRegistry>) -> Self {
        self.rebuilds = rebuilds;
        self
    }

    pub fn build(self) -> CostBenefitController {
        CostBenefitController {
            supports: self.supports,
            cost_function: self.cost_function,
            target_function: self.target_function,
            algorithm: self.algorithm,
            solutions_rater: self.solutions_rater,
            manual_mode: self.manual_mode,
            rebuilds: self.rebuilds,
        }
    }
}

/// Values that check-once questions keep for the rest of the session.
/// Every other question reads as unanswered.
struct FinalValues<'a> {
    session: &'a Session,
}

static UNDEFINED: Value = Value::Undefined;

impl ValueLookup for FinalValues<'_> {
    fn value(&self, object: ObjectId) -> &Value {
        let check_once = self
            .session
            .knowledge_base()
            .get(object)
            .is_some_and(|o| o.is_question() && o.properties().check_once);
        if check_once {
            self.session.value(object)
        } else {
            &UNDEFINED
        }
    }
}

/// QContainers no plan may contain, with the reason:
/// - contra-indicated QContainers
/// - permanently relevant QContainers
/// - QContainers whose activation condition is false under the final values
///   of the check-once questions
pub fn blocked_qcontainers(session: &Session) -> BTreeMap<ObjectId, &'static str> {
    let kb = session.knowledge_base();
    let finals = FinalValues { session };
    let mut blocked = BTreeMap::new();
    for qc in kb.qcontainers() {
        let id = qc.id();
        let reason = if session.indication(id).is_contra_indicated() {
            "is contra-indicated"
        } else if qc.properties().permanently_relevant {
            "is permanently relevant"
        } else if kb
            .state_transition(id)
            .and_then(|st| st.activation_condition())
            .is_some_and(|c| c.eval(&finals).is_false())
        {
            "needs a different check-once answer"
        } else {
            continue;
        };
        blocked.insert(id, reason);
    }
    blocked
}

/// Why a target may not be planned for, if at all.
fn blocking_reason(
    target: &Target,
    session: &Session,
    blocked: &BTreeMap<ObjectId, &'static str>,
    skip_done: bool,
) -> Option<String> {
    let kb = session.knowledge_base();
    if let Some((qc, reason)) = target
        .qcontainers()
        .iter()
        .find_map(|qc| blocked.get(qc).map(|reason| (*qc, *reason)))
    {
        return Some(format!("{} {reason}", kb.object(qc).name()));
    }
    if skip_done && target.qcontainers().iter().all(|&qc| session.is_done(qc)) {
        return Some("already done".to_string());
    }
    None
}

/// One-choice questions whose only choice is named `ok` (optionally with a
/// `prefix#`), compared case-insensitively.
pub fn is_ok_question(kb: &KnowledgeBase, question: ObjectId) -> bool {
    match kb.object(question).question_kind() {
        Some(QuestionKind::OneChoice(choices)) if choices.len() == 1 => {
            let name = choices[0].name().to_lowercase();
            name == "ok" || name.ends_with("#ok")
        }
        _ => false,
    }
}

/// Removes every fact of the OK questions below `qcontainer`, so the
/// QContainer counts as not done again.
fn make_ok_questions_undone(kb: &KnowledgeBase, session: &mut Session, qcontainer: ObjectId) {
    for question in kb.questions_of(qcontainer) {
        if !is_ok_question(kb, question) {
            continue;
        }
        for contributor in session.blackboard().contributors_for(question) {
            session.remove_object_facts(question, contributor);
        }
    }
}
