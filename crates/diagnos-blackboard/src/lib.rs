//! diagnos blackboard - facts, merging and propagation
//!
//! This crate provides the session engine:
//! - `Fact` and `Source`, stored per object on a `Blackboard`
//! - `Contributor` trait, merge policies and the `ContributorRegistry`
//! - `PropagationController` with nested frames and change folding
//! - `Session` with per-contributor private state and search copies
//! - `RebuildRegistry` and `replay` for re-applying fact histories

pub mod blackboard;
pub mod contributor;
pub mod fact;
pub mod merge;
pub mod propagation;
pub mod replay;
pub mod session;
pub mod user;

#[cfg(test)]
pub mod test_utils;

pub use blackboard::Blackboard;
pub use contributor::{
    Contributor, ContributorId, ContributorKind, ContributorRegistry, ContributorRegistryBuilder,
};
pub use fact::{Fact, PropagationEntry, Source};
pub use propagation::PropagationController;
pub use replay::{replay, RebuildGuard, RebuildRegistry};
pub use session::{Session, SessionId};
pub use user::UserContributor;
