use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use revassign_directory_models::{PrStats, PrStatus, PullRequest, ReviewerStats, Team, User};

/// Errors that can occur when talking to a directory store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No user with the given id.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// No team with the given name.
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    /// No pull request with the given id.
    #[error("Pull request not found: {0}")]
    PullRequestNotFound(String),

    /// A team with the given name already exists.
    #[error("Team already exists: {0}")]
    TeamExists(String),

    /// A pull request with the given id already exists.
    #[error("Pull request already exists: {0}")]
    PullRequestExists(String),

    /// The stored reviewer set no longer matches what the caller read.
    #[error("Reviewers of pull request {0} changed concurrently")]
    ReviewersChanged(String),

    /// The store did not answer in time.
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    /// Failed to create the snapshot directory.
    #[error("Failed to create snapshot directory: {0}")]
    CreateDir(std::io::Error),

    /// Failed to read the snapshot.
    #[error("Failed to read snapshot: {0}")]
    Read(std::io::Error),

    /// Failed to write the snapshot.
    #[error("Failed to write snapshot: {0}")]
    Write(std::io::Error),

    /// Failed to parse the snapshot.
    #[error("Failed to parse snapshot: {0}")]
    Parse(serde_json::Error),

    /// Failed to serialize the snapshot.
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(serde_json::Error),

    /// Could not determine data directory.
    #[error("Could not determine XDG data directory")]
    NoDataDir,
}

impl StoreError {
    /// Whether the error reports a missing user, team or pull request.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::TeamNotFound(_) | Self::PullRequestNotFound(_)
        )
    }
}

/// Persistence contract used by the assignment and lifecycle logic.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// # Errors
    ///
    /// * [`StoreError::UserNotFound`] if the id is unknown
    async fn get_user(&self, user_id: &str) -> Result<User, StoreError>;

    /// # Errors
    ///
    /// * [`StoreError::UserNotFound`] if the id is unknown
    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError>;

    /// Active members of the team, ordered by user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn get_active_users_in_team(&self, team_name: &str) -> Result<Vec<User>, StoreError>;

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn team_exists(&self, team_name: &str) -> Result<bool, StoreError>;

    /// Create the team and upsert every member into it.
    ///
    /// # Errors
    ///
    /// * [`StoreError::TeamExists`] if the name is taken
    async fn create_team(&self, team_name: &str, members: &[User]) -> Result<Team, StoreError>;

    /// # Errors
    ///
    /// * [`StoreError::TeamNotFound`] if the name is unknown
    async fn get_team(&self, team_name: &str) -> Result<Team, StoreError>;

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn pull_request_exists(&self, pull_request_id: &str) -> Result<bool, StoreError>;

    /// # Errors
    ///
    /// * [`StoreError::PullRequestExists`] if the id is taken
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// * [`StoreError::PullRequestNotFound`] if the id is unknown
    async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, StoreError>;

    /// Swap the reviewer list, provided it still equals `expected`.
    ///
    /// # Errors
    ///
    /// * [`StoreError::PullRequestNotFound`] if the id is unknown
    /// * [`StoreError::ReviewersChanged`] if the stored list differs from `expected`
    async fn replace_reviewers(
        &self,
        pull_request_id: &str,
        expected: &[String],
        reviewers: &[String],
    ) -> Result<PullRequest, StoreError>;

    /// # Errors
    ///
    /// * [`StoreError::PullRequestNotFound`] if the id is unknown
    async fn set_status(
        &self,
        pull_request_id: &str,
        status: PrStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<PullRequest, StoreError>;

    /// Pull requests the user currently reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn pull_requests_by_reviewer(&self, user_id: &str)
    -> Result<Vec<PullRequest>, StoreError>;

    /// Assignment counts per reviewer, highest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn reviewer_stats(&self) -> Result<Vec<ReviewerStats>, StoreError>;

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn pull_request_stats(&self) -> Result<PrStats, StoreError>;

    /// Cheap round trip used by readiness checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(StoreError::UserNotFound("u".to_string()).is_not_found());
        assert!(StoreError::PullRequestNotFound("p".to_string()).is_not_found());
        assert!(!StoreError::Timeout(Duration::from_millis(5)).is_not_found());
    }
}
