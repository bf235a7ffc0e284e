#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Directory models for `revassign`.
//!
//! Users belong to exactly one team, and pull requests reference users by id.

pub mod pr;
pub mod stats;
pub mod team;
pub mod user;

pub use pr::{PrStatus, PullRequest, PullRequestShort};
pub use stats::{PrStats, ReviewerStats};
pub use team::Team;
pub use user::User;
