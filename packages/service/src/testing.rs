use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use revassign_assignment::RngSource;
use revassign_directory::models::{PrStats, PrStatus, PullRequest, ReviewerStats, Team, User};
use revassign_directory::{DirectoryStore, MemoryStore, StoreError};

use crate::{ReviewService, ServiceConfig};

/// Delegates to a [`MemoryStore`], optionally stalling every call and
/// failing the next `conflicts` reviewer swaps.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub delay: Option<Duration>,
    pub conflicts: AtomicUsize,
}

impl FlakyStore {
    async fn stall(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DirectoryStore for FlakyStore {
    async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        self.stall().await;
        self.inner.get_user(user_id).await
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError> {
        self.stall().await;
        self.inner.set_user_active(user_id, is_active).await
    }

    async fn get_active_users_in_team(&self, team_name: &str) -> Result<Vec<User>, StoreError> {
        self.stall().await;
        self.inner.get_active_users_in_team(team_name).await
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool, StoreError> {
        self.stall().await;
        self.inner.team_exists(team_name).await
    }

    async fn create_team(&self, team_name: &str, members: &[User]) -> Result<Team, StoreError> {
        self.stall().await;
        self.inner.create_team(team_name, members).await
    }

    async fn get_team(&self, team_name: &str) -> Result<Team, StoreError> {
        self.stall().await;
        self.inner.get_team(team_name).await
    }

    async fn pull_request_exists(&self, pull_request_id: &str) -> Result<bool, StoreError> {
        self.stall().await;
        self.inner.pull_request_exists(pull_request_id).await
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), StoreError> {
        self.stall().await;
        self.inner.create_pull_request(pr).await
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, StoreError> {
        self.stall().await;
        self.inner.get_pull_request(pull_request_id).await
    }

    async fn replace_reviewers(
        &self,
        pull_request_id: &str,
        expected: &[String],
        reviewers: &[String],
    ) -> Result<PullRequest, StoreError> {
        self.stall().await;
        if self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::ReviewersChanged(pull_request_id.to_string()));
        }
        self.inner
            .replace_reviewers(pull_request_id, expected, reviewers)
            .await
    }

    async fn set_status(
        &self,
        pull_request_id: &str,
        status: PrStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<PullRequest, StoreError> {
        self.stall().await;
        self.inner
            .set_status(pull_request_id, status, merged_at)
            .await
    }

    async fn pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequest>, StoreError> {
        self.stall().await;
        self.inner.pull_requests_by_reviewer(user_id).await
    }

    async fn reviewer_stats(&self) -> Result<Vec<ReviewerStats>, StoreError> {
        self.stall().await;
        self.inner.reviewer_stats().await
    }

    async fn pull_request_stats(&self) -> Result<PrStats, StoreError> {
        self.stall().await;
        self.inner.pull_request_stats().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.stall().await;
        Ok(())
    }
}

pub fn service_with(store: Arc<dyn DirectoryStore>, seed: u64) -> ReviewService {
    ReviewService::new(store, RngSource::seeded(seed), &ServiceConfig::default())
}

pub fn service(seed: u64) -> ReviewService {
    service_with(Arc::new(MemoryStore::new()), seed)
}

pub fn member(user_id: &str, is_active: bool) -> User {
    User::new(user_id, user_id.to_uppercase(), "", is_active)
}

/// Team "core": `author` plus active reviewers `r1`..`r4`.
pub async fn core_team(service: &ReviewService) {
    service
        .teams
        .create(
            "core",
            vec![
                member("author", true),
                member("r1", true),
                member("r2", true),
                member("r3", true),
                member("r4", true),
            ],
        )
        .await
        .unwrap();
}
