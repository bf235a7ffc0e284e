use revassign_directory::models::{PrStats, ReviewerStats, User};

use crate::TimedStore;
use crate::error::{ServiceError, require_id};

pub struct UserService {
    store: TimedStore,
}

impl UserService {
    pub(crate) const fn new(store: TimedStore) -> Self {
        Self { store }
    }

    /// Flip the activity flag. Only later assignments see the change;
    /// reviewers already on pull requests stay where they are.
    ///
    /// # Errors
    ///
    /// * `INVALID_INPUT` if the id is blank
    /// * `NOT_FOUND` if the user is unknown
    pub async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User, ServiceError> {
        require_id("user_id", user_id)?;

        let user = self
            .store
            .call(self.store.get().set_user_active(user_id, is_active))
            .await
            .map_err(|e| ServiceError::from_lookup(e, "user not found"))?;

        log::info!("Set user {user_id} active={is_active}");

        Ok(user)
    }

    /// # Errors
    ///
    /// * `INVALID_INPUT` if the id is blank
    /// * `NOT_FOUND` if the user is unknown
    pub async fn get(&self, user_id: &str) -> Result<User, ServiceError> {
        require_id("user_id", user_id)?;

        self.store
            .call(self.store.get().get_user(user_id))
            .await
            .map_err(|e| ServiceError::from_lookup(e, "user not found"))
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn reviewer_stats(&self) -> Result<Vec<ReviewerStats>, ServiceError> {
        Ok(self.store.call(self.store.get().reviewer_stats()).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn pull_request_stats(&self) -> Result<PrStats, ServiceError> {
        Ok(self.store.call(self.store.get().pull_request_stats()).await?)
    }
}
