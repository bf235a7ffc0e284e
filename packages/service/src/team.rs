use std::collections::HashSet;

use revassign_directory::StoreError;
use revassign_directory::models::{Team, User};

use crate::TimedStore;
use crate::error::{DomainError, ErrorCode, ServiceError, require_id};

pub struct TeamService {
    store: TimedStore,
}

impl TeamService {
    pub(crate) const fn new(store: TimedStore) -> Self {
        Self { store }
    }

    /// Create a team and upsert each member into it. A member that already
    /// exists is moved to this team with the given username and activity.
    ///
    /// # Errors
    ///
    /// * `INVALID_INPUT` if a name or member id is blank, or an id repeats
    /// * `TEAM_EXISTS` if the name is taken
    pub async fn create(&self, team_name: &str, members: Vec<User>) -> Result<Team, ServiceError> {
        require_id("team_name", team_name)?;

        let mut seen = HashSet::new();
        for member in &members {
            require_id("user_id", &member.user_id)?;
            if !seen.insert(member.user_id.as_str()) {
                return Err(DomainError::invalid_input(format!(
                    "user {} listed twice",
                    member.user_id
                ))
                .into());
            }
        }

        let store = self.store.get();

        if self.store.call(store.team_exists(team_name)).await? {
            return Err(team_exists().into());
        }

        let members: Vec<User> = members
            .into_iter()
            .map(|member| User {
                team_name: team_name.to_string(),
                ..member
            })
            .collect();

        let team = self
            .store
            .call(store.create_team(team_name, &members))
            .await
            .map_err(|e| match e {
                StoreError::TeamExists(_) => ServiceError::Domain(team_exists()),
                e => ServiceError::Store(e),
            })?;

        log::info!(
            "Created team {team_name} with {} member(s)",
            team.members.len()
        );

        Ok(team)
    }

    /// # Errors
    ///
    /// * `INVALID_INPUT` if the name is blank
    /// * `NOT_FOUND` if the team is unknown
    pub async fn get(&self, team_name: &str) -> Result<Team, ServiceError> {
        require_id("team_name", team_name)?;

        self.store
            .call(self.store.get().get_team(team_name))
            .await
            .map_err(|e| ServiceError::from_lookup(e, "team not found"))
    }
}

fn team_exists() -> DomainError {
    DomainError::new(ErrorCode::TeamExists, "team already exists")
}
