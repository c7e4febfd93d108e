//! Discriminating goals of one planning run.

use std::fmt;

use diagnos_core::ObjectId;

use super::Path;

/// A set of QContainers whose administration resolves outstanding
/// hypotheses, with its benefit and the cheapest path reaching it.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    qcontainers: Vec<ObjectId>,
    benefit: f64,
    min_path: Option<Path>,
}

impl Target {
    pub fn new(qcontainers: Vec<ObjectId>) -> Self {
        Self {
            qcontainers,
            benefit: 0.0,
            min_path: None,
        }
    }

    pub fn single(qcontainer: ObjectId) -> Self {
        Self::new(vec![qcontainer])
    }

    pub fn qcontainers(&self) -> &[ObjectId] {
        &self.qcontainers
    }

    /// Targets with more than one QContainer.
    pub fn is_combined(&self) -> bool {
        self.qcontainers.len() > 1
    }

    pub fn benefit(&self) -> f64 {
        self.benefit
    }

    pub(crate) fn raise_benefit(&mut self, benefit: f64) -> bool {
        if benefit > self.benefit {
            self.benefit = benefit;
            true
        } else {
            false
        }
    }

    pub fn min_path(&self) -> Option<&Path> {
        self.min_path.as_ref()
    }

    /// Replaces the min path if `path` is strictly cheaper.
    pub(crate) fn offer_path(&mut self, path: &Path) -> bool {
        match &self.min_path {
            Some(current) if current.cost() <= path.cost() => false,
            _ => {
                self.min_path = Some(path.clone());
                true
            }
        }
    }

    /// All QContainers of the target occur in `path`.
    pub fn is_reached(&self, path: &Path) -> bool {
        self.qcontainers.iter().all(|&qc| path.contains(qc))
    }

    /// Cost of the min path, infinite while unreached.
    pub fn costs(&self) -> f64 {
        self.min_path.as_ref().map_or(f64::INFINITY, Path::cost)
    }

    /// Ratio of min path cost to benefit, lower is better.
    pub fn cost_benefit(&self) -> f64 {
        self.costs() / self.benefit
    }

    /// Same QContainers regardless of order.
    pub(crate) fn same_qcontainers(&self, other: &Target) -> bool {
        self.qcontainers.len() == other.qcontainers.len()
            && self.qcontainers.iter().all(|qc| other.qcontainers.contains(qc))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.qcontainers.iter().map(ToString::to_string).collect();
        write!(f, "{{{}}} benefit={}", names.join(", "), self.benefit)
    }
}
