#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Reviewer selection for `revassign`.
//!
//! Selection is a pure draw over a snapshot of candidates the caller fetched.
//! Nothing here touches storage; the caller persists the outcome.

mod engine;
mod rng;

pub use engine::{
    MAX_REVIEWERS, ReviewerAssigner, assign_reviewers, creation_pool, pick_replacement,
    reassignment_pool, replace_reviewer,
};
pub use rng::RngSource;
