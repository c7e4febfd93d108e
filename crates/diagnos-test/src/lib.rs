//! Shared test fixtures for diagnos crates.
//!
//! This crate provides knowledge bases and contributors for testing.
//! It does NOT depend on `diagnos-costbenefit`, so planner strategy stubs
//! live next to the planner's own tests.
//!
//! - [`kb`] - Weekday, two-batch and state machine knowledge bases
//! - [`rules`] - Condition/action rules with truth maintenance
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! diagnos-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use diagnos_test::kb::{session_for, two_batch_kb};
//! use diagnos_test::rules::{Rule, RuleContributor};
//! ```

pub mod kb;
pub mod rules;

pub use kb::{session_for, session_with, state_machine_kb, two_batch_kb, weekday_kb};
pub use rules::{Rule, RuleContributor};
