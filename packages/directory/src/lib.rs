#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Directory storage for `revassign`.
//!
//! The [`DirectoryStore`] trait is the only seam between the reviewer
//! assignment logic and persistence. Each call is atomic on its own; callers
//! that need a read-modify-write sequence must serialize it themselves or use
//! [`DirectoryStore::replace_reviewers`], which compares before it swaps.

mod memory;
mod store;

pub use memory::MemoryStore;
pub use revassign_directory_models as models;
pub use store::{DirectoryStore, StoreError};
