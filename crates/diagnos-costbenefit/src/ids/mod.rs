//! Iterative deepening search for cheap paths to targets.
//!
//! The search reruns a depth-bounded depth-first search with growing bounds
//! on one simulated copy of the session. Every simulated step is undone
//! before its next sibling is tried, so the copy is back at the original
//! state after each iteration.
//!
//! # Node sets
//!
//! - **Final nodes**: the QContainers of all targets, ordered by descending
//!   name. Paths end with a final node.
//! - **Successor nodes**: QContainers whose state transition has effects
//!   and that are not contra-indicated, plus the members of combined
//!   targets. Ordered by ascending static cost, then descending name.
//!
//! # Termination
//!
//! Deepening stops once the cheapest explored prefix plus the cheapest final
//! node can no longer beat the best cost/benefit ratio, neither for an
//! unreached target nor for a reached one. It also stops once the depth
//! exceeds the number of successors plus the final step (twice the
//! successors when revisits are allowed), or when no prefix can be extended.
//! Deepening does not stop as soon as every target has some path, and the
//! bound is not taken from the best benefit of unreached targets alone, since
//! either shortcut can miss a cheaper path at a greater depth.

use std::sync::Arc;
use std::time::Instant;

use diagnos_blackboard::{ContributorId, Session, Source, UserContributor};
use diagnos_core::{ObjectId, Result};
use tracing::{debug, info};

use crate::abort::AbortStrategy;
use crate::algorithm::SearchStatistics;
use crate::model::{Node, Path, SearchModel, TargetId};
use crate::transition;

/// Unwinds the recursion once the model is aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Aborted;

/// One search run over a [`SearchModel`].
///
/// Results are written into the model: every reached target keeps the
/// cheapest path found for it, and the model tracks the best cost/benefit
/// target. An aborted search leaves the best results found so far.
#[derive(Debug)]
pub struct IterativeDeepeningSearch<'a, A> {
    original: &'a Session,
    model: &'a mut SearchModel,
    abort: A,
    allow_revisits: bool,
    max_depth: Option<usize>,
    finals: Arc<[Node]>,
    successors: Arc<[Node]>,
    steps: u64,
    // Cheapest path one step beyond the current depth bound.
    min_searched: Option<f64>,
}

impl<'a, A: AbortStrategy> IterativeDeepeningSearch<'a, A> {
    pub fn new(original: &'a Session, model: &'a mut SearchModel, abort: A) -> Self {
        let kb = original.knowledge_base();

        let mut final_ids: Vec<ObjectId> = model
            .targets()
            .iter()
            .flat_map(|t| t.qcontainers().iter().copied())
            .collect();
        final_ids.sort();
        final_ids.dedup();
        let mut finals: Vec<Node> = final_ids.into_iter().map(|qc| Node::new(kb, qc)).collect();
        finals.sort_by(|a, b| b.name().cmp(a.name()));

        let combined: Vec<ObjectId> = model
            .targets()
            .iter()
            .filter(|t| t.is_combined())
            .flat_map(|t| t.qcontainers().iter().copied())
            .collect();
        let mut successors: Vec<Node> = kb
            .qcontainers()
            .map(|object| Node::new(kb, object.id()))
            .filter(|node| {
                combined.contains(&node.qcontainer())
                    || (node.has_effects()
                        && !original.indication(node.qcontainer()).is_contra_indicated())
            })
            .collect();
        successors.sort_by(|a, b| {
            a.static_cost()
                .total_cmp(&b.static_cost())
                .then_with(|| b.name().cmp(a.name()))
        });

        Self {
            original,
            model,
            abort,
            allow_revisits: false,
            max_depth: None,
            finals: finals.into(),
            successors: successors.into(),
            steps: 0,
            min_searched: None,
        }
    }

    pub fn with_allow_revisits(mut self, allow_revisits: bool) -> Self {
        self.allow_revisits = allow_revisits;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn finals(&self) -> &[Node] {
        &self.finals
    }

    pub fn successors(&self) -> &[Node] {
        &self.successors
    }

    /// Runs the search to completion or abort.
    ///
    /// # Errors
    ///
    /// Fails only if the simulated session cannot be created.
    pub fn run(mut self) -> Result<SearchStatistics> {
        let started = Instant::now();
        self.abort.init(&*self.model);

        info!(
            event = "search_start",
            session = %self.original.id(),
            targets = self.model.targets().len(),
            finals = self.finals.len(),
            successors = self.successors.len(),
        );

        let mut statistics = SearchStatistics::default();
        if !self.model.has_targets() || self.model.best_benefit() <= 0.0 {
            statistics.elapsed = started.elapsed();
            self.log_end(&statistics);
            return Ok(statistics);
        }

        let mut copy = self.original.search_copy()?;
        let simulator = copy.contributor_id(UserContributor::NAME)?;
        let mut path = Path::new();
        // Without revisits a path holds each successor at most once before
        // its final node. With revisits each successor may appear twice.
        let depth_bound = if self.allow_revisits {
            2 * self.successors.len() + 1
        } else {
            self.successors.len() + 1
        };

        let mut depth = 0;
        loop {
            depth += 1;
            if self.max_depth.is_some_and(|max| depth > max) || depth > depth_bound {
                depth -= 1;
                break;
            }
            self.min_searched = None;
            if self
                .find_cheapest_path(depth, &mut path, &mut copy, simulator)
                .is_err()
            {
                statistics.aborted = true;
                break;
            }

            debug!(
                event = "search_depth",
                depth = depth,
                steps = self.steps,
                best_cost_benefit = self.model.best_cost_benefit(),
            );

            if self.cannot_improve() {
                break;
            }
        }

        statistics.steps = self.steps;
        statistics.depth = depth;
        statistics.elapsed = started.elapsed();
        self.log_end(&statistics);
        Ok(statistics)
    }

    fn log_end(&self, statistics: &SearchStatistics) {
        let best = self
            .model
            .best_path()
            .map_or_else(|| "none".to_string(), ToString::to_string);
        info!(
            event = "search_end",
            session = %self.original.id(),
            reason = if statistics.aborted { "aborted" } else { "done" },
            duration_ms = statistics.elapsed.as_millis() as u64,
            steps = statistics.steps,
            depth = statistics.depth,
            speed = statistics.steps_per_second() as u64,
            best_path = best,
        );
    }

    /// Deeper paths cost at least the cheapest explored prefix plus the
    /// cheapest final node. Since no target has more than the best benefit,
    /// this bounds the ratio of reached and unreached targets alike.
    fn cannot_improve(&self) -> bool {
        let Some(min_searched) = self.min_searched else {
            return true;
        };
        let cheapest_final = self
            .finals
            .iter()
            .map(|node| node.costs(self.model.cost_function(), self.original))
            .min_by(f64::total_cmp)
            .unwrap_or(0.0);
        let bound = (min_searched + cheapest_final) / self.model.best_benefit();
        self.model.best_cost_benefit() <= bound
    }

    fn admissible(&self, node: &Node, path: &Path, session: &Session) -> bool {
        (self.allow_revisits || !path.contains(node.qcontainer())) && node.is_applicable(session)
    }

    fn find_cheapest_path(
        &mut self,
        depth: usize,
        path: &mut Path,
        copy: &mut Session,
        simulator: ContributorId,
    ) -> std::result::Result<(), Aborted> {
        if depth == 1 {
            let finals = Arc::clone(&self.finals);
            for node in finals.iter() {
                if !self.admissible(node, path, copy) {
                    continue;
                }
                self.next_step(path)?;
                path.push(node.qcontainer(), node.costs(self.model.cost_function(), copy));
                self.minimize_path(path);
                path.pop();
            }
            let successors = Arc::clone(&self.successors);
            for node in successors.iter() {
                if !self.admissible(node, path, copy) {
                    continue;
                }
                // Extending the prefix is a step of its own, even though it
                // is only priced here and expanded one iteration later.
                self.next_step(path)?;
                path.push(node.qcontainer(), node.costs(self.model.cost_function(), copy));
                let cost = path.cost();
                path.pop();
                if self.min_searched.map_or(true, |min| cost < min) {
                    self.min_searched = Some(cost);
                }
            }
            return Ok(());
        }

        let successors = Arc::clone(&self.successors);
        for node in successors.iter() {
            if !self.admissible(node, path, copy) {
                continue;
            }
            let cost = node.costs(self.model.cost_function(), copy);
            if (path.cost() + cost) / self.model.best_benefit() > self.model.best_cost_benefit() {
                continue;
            }
            self.next_step(path)?;
            path.push(node.qcontainer(), cost);

            let source = Source::Simulation(path.len());
            let mut undo = node.set_normal_values(copy, simulator, &source);
            if let Some(st) = node.transition() {
                undo.extend(transition::fire(st, copy, simulator, &source));
            }
            let result = self.find_cheapest_path(depth - 1, path, copy, simulator);
            copy.retract_facts(&undo);
            path.pop();
            result?;
        }
        Ok(())
    }

    /// Offers `path` to every target it reaches through its last node.
    fn minimize_path(&mut self, path: &Path) {
        let Some(last) = path.last() else {
            return;
        };
        let reached: Vec<TargetId> = self
            .model
            .target_ids()
            .filter(|&id| {
                let target = self.model.target(id);
                target.qcontainers().contains(&last) && target.is_reached(path)
            })
            .collect();
        for id in reached {
            self.model.offer_path(id, path);
        }
    }

    fn next_step(&mut self, path: &Path) -> std::result::Result<(), Aborted> {
        self.steps += 1;
        if self.abort.next_step(path, self.original) {
            self.model.abort();
        }
        if self.model.is_aborted() {
            return Err(Aborted);
        }
        Ok(())
    }
}
