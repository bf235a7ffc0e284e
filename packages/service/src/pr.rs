use std::sync::Arc;

use chrono::Utc;

use revassign_assignment::{ReviewerAssigner, replace_reviewer};
use revassign_directory::StoreError;
use revassign_directory::models::{PrStatus, PullRequest, PullRequestShort};

use crate::TimedStore;
use crate::error::{DomainError, ErrorCode, ServiceError, require_id};
use crate::locks::KeyedLocks;

/// Outcome of a successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

/// Pull request lifecycle: `OPEN` on creation, `MERGED` for good.
pub struct PullRequestService {
    store: TimedStore,
    assigner: Arc<ReviewerAssigner>,
    locks: KeyedLocks,
    reassign_attempts: usize,
}

impl PullRequestService {
    pub(crate) fn new(
        store: TimedStore,
        assigner: Arc<ReviewerAssigner>,
        reassign_attempts: usize,
    ) -> Self {
        Self {
            store,
            assigner,
            locks: KeyedLocks::new(),
            reassign_attempts: reassign_attempts.max(1),
        }
    }

    /// Open a pull request and assign up to two reviewers from the author's
    /// team. An empty candidate pool leaves the pull request unreviewed.
    ///
    /// # Errors
    ///
    /// * `INVALID_INPUT` if an id is blank
    /// * `PR_EXISTS` if the id is taken
    /// * `NOT_FOUND` if the author is unknown
    pub async fn create(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> Result<PullRequest, ServiceError> {
        require_id("pull_request_id", pull_request_id)?;
        require_id("author_id", author_id)?;

        let _guard = self.locks.lock(pull_request_id).await;
        let store = self.store.get();

        if self
            .store
            .call(store.pull_request_exists(pull_request_id))
            .await?
        {
            return Err(pr_exists().into());
        }

        let author = self
            .store
            .call(store.get_user(author_id))
            .await
            .map_err(|e| ServiceError::from_lookup(e, "author not found"))?;

        let team_members = self
            .store
            .call(store.get_active_users_in_team(&author.team_name))
            .await?;

        let reviewers = self.assigner.assign(author_id, &team_members);

        let pr = PullRequest::open(
            pull_request_id,
            pull_request_name,
            author_id,
            reviewers,
            Utc::now(),
        );

        self.store
            .call(store.create_pull_request(&pr))
            .await
            .map_err(|e| match e {
                StoreError::PullRequestExists(_) => ServiceError::Domain(pr_exists()),
                e => ServiceError::Store(e),
            })?;

        log::info!(
            "Created pull request {pull_request_id} by {author_id} with reviewers {:?}",
            pr.assigned_reviewers
        );

        Ok(pr)
    }

    /// Mark the pull request merged. Merging a merged pull request returns it
    /// unchanged, merge timestamp included.
    ///
    /// # Errors
    ///
    /// * `INVALID_INPUT` if the id is blank
    /// * `NOT_FOUND` if the pull request is unknown
    pub async fn merge(&self, pull_request_id: &str) -> Result<PullRequest, ServiceError> {
        require_id("pull_request_id", pull_request_id)?;

        let _guard = self.locks.lock(pull_request_id).await;
        let pr = self.load(pull_request_id).await?;

        if pr.is_merged() {
            log::debug!("Pull request {pull_request_id} already merged");
            return Ok(pr);
        }

        let pr = self
            .store
            .call(
                self.store
                    .get()
                    .set_status(pull_request_id, PrStatus::Merged, Some(Utc::now())),
            )
            .await?;

        log::info!("Merged pull request {pull_request_id}");

        Ok(pr)
    }

    /// Replace `old_reviewer_id` with a random active member of that
    /// reviewer's team who is neither the author nor already assigned.
    ///
    /// Preconditions are checked in order and the first failure wins.
    ///
    /// # Errors
    ///
    /// * `INVALID_INPUT` if an id is blank
    /// * `NOT_FOUND` if the pull request or the old reviewer is unknown
    /// * `PR_MERGED` if the pull request is merged
    /// * `NOT_ASSIGNED` if `old_reviewer_id` is not a current reviewer
    /// * `NO_CANDIDATE` if nobody is eligible; nothing is changed
    pub async fn reassign(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment, ServiceError> {
        require_id("pull_request_id", pull_request_id)?;
        require_id("old_user_id", old_reviewer_id)?;

        let _guard = self.locks.lock(pull_request_id).await;

        let mut attempt = 1;
        loop {
            match self.try_reassign(pull_request_id, old_reviewer_id).await {
                Err(ServiceError::Store(StoreError::ReviewersChanged(_)))
                    if attempt < self.reassign_attempts =>
                {
                    log::warn!(
                        "Reviewers of {pull_request_id} changed underneath reassignment \
                         (attempt {attempt}/{}), retrying",
                        self.reassign_attempts
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn try_reassign(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment, ServiceError> {
        let store = self.store.get();
        let pr = self.load(pull_request_id).await?;

        if pr.is_merged() {
            return Err(DomainError::new(
                ErrorCode::PrMerged,
                "cannot reassign on merged PR",
            )
            .into());
        }

        if !pr.has_reviewer(old_reviewer_id) {
            return Err(DomainError::new(
                ErrorCode::NotAssigned,
                "reviewer is not assigned to this PR",
            )
            .into());
        }

        let old_reviewer = self
            .store
            .call(store.get_user(old_reviewer_id))
            .await
            .map_err(|e| ServiceError::from_lookup(e, "old reviewer not found"))?;

        let team_members = self
            .store
            .call(store.get_active_users_in_team(&old_reviewer.team_name))
            .await?;

        let Some(replaced_by) = self
            .assigner
            .replacement(&pr, old_reviewer_id, &team_members)
        else {
            log::warn!(
                "No replacement for {old_reviewer_id} on {pull_request_id} in team {}",
                old_reviewer.team_name
            );
            return Err(DomainError::new(
                ErrorCode::NoCandidate,
                "no active replacement candidate in team",
            )
            .into());
        };

        let reviewers = replace_reviewer(&pr.assigned_reviewers, old_reviewer_id, &replaced_by);
        let pull_request = self
            .store
            .call(store.replace_reviewers(pull_request_id, &pr.assigned_reviewers, &reviewers))
            .await?;

        log::info!("Reassigned {pull_request_id}: {old_reviewer_id} -> {replaced_by}");

        Ok(Reassignment {
            pull_request,
            replaced_by,
        })
    }

    /// # Errors
    ///
    /// * `INVALID_INPUT` if the id is blank
    /// * `NOT_FOUND` if the pull request is unknown
    pub async fn get(&self, pull_request_id: &str) -> Result<PullRequest, ServiceError> {
        require_id("pull_request_id", pull_request_id)?;
        self.load(pull_request_id).await
    }

    /// Pull requests the user currently reviews, newest first. An unknown
    /// user simply has none.
    ///
    /// # Errors
    ///
    /// * `INVALID_INPUT` if the id is blank
    pub async fn reviews_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, ServiceError> {
        require_id("user_id", user_id)?;

        let prs = self
            .store
            .call(self.store.get().pull_requests_by_reviewer(user_id))
            .await?;

        Ok(prs.iter().map(PullRequest::to_short).collect())
    }

    async fn load(&self, pull_request_id: &str) -> Result<PullRequest, ServiceError> {
        self.store
            .call(self.store.get().get_pull_request(pull_request_id))
            .await
            .map_err(|e| ServiceError::from_lookup(e, "PR not found"))
    }
}

fn pr_exists() -> DomainError {
    DomainError::new(ErrorCode::PrExists, "PR id already exists")
}
