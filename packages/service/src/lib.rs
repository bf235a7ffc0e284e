#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Pull request lifecycle and team directory logic for `revassign`.
//!
//! Every store call is bounded by [`ServiceConfig::store_timeout`], and every
//! create/merge/reassign on a pull request runs under a lock keyed by its id
//! so that the read-pick-write sequence of a reassignment cannot interleave
//! with another one.

mod config;
mod error;
mod locks;
mod pr;
mod team;
mod user;

#[cfg(test)]
mod testing;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use revassign_assignment::{ReviewerAssigner, RngSource};
use revassign_directory::{DirectoryStore, StoreError};

pub use config::ServiceConfig;
pub use error::{DomainError, ErrorCode, ServiceError};
pub use pr::{PullRequestService, Reassignment};
pub use team::TeamService;
pub use user::UserService;

/// Store handle with a bounded call duration.
#[derive(Clone)]
pub(crate) struct TimedStore {
    inner: Arc<dyn DirectoryStore>,
    timeout: Duration,
}

impl TimedStore {
    pub(crate) fn new(inner: Arc<dyn DirectoryStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub(crate) fn get(&self) -> &dyn DirectoryStore {
        self.inner.as_ref()
    }

    /// Await a store call, turning an elapsed deadline into
    /// [`StoreError::Timeout`].
    pub(crate) async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>> + Send,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .unwrap_or_else(|_| {
                log::error!("Store call exceeded {:?}", self.timeout);
                Err(StoreError::Timeout(self.timeout))
            })
    }
}

/// All services sharing one store and one random source.
pub struct ReviewService {
    pub teams: TeamService,
    pub users: UserService,
    pub pull_requests: PullRequestService,
    store: TimedStore,
}

impl ReviewService {
    #[must_use]
    pub fn new(store: Arc<dyn DirectoryStore>, rng: RngSource, config: &ServiceConfig) -> Self {
        let store = TimedStore::new(store, config.store_timeout);
        let assigner = Arc::new(ReviewerAssigner::new(rng));

        Self {
            teams: TeamService::new(store.clone()),
            users: UserService::new(store.clone()),
            pull_requests: PullRequestService::new(
                store.clone(),
                assigner,
                config.reassign_attempts,
            ),
            store,
        }
    }

    /// Whether the store answers within the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns the store error if the round trip fails.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.call(self.store.get().ping()).await
    }
}
