//! In-process directory store with optional JSON snapshot persistence.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use revassign_directory_models::{PrStats, PrStatus, PullRequest, ReviewerStats, Team, User};

use crate::store::{DirectoryStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Directory {
    users: BTreeMap<String, User>,
    teams: BTreeSet<String>,
    pull_requests: BTreeMap<String, PullRequest>,
}

impl Directory {
    fn team(&self, team_name: &str) -> Option<Team> {
        if !self.teams.contains(team_name) {
            return None;
        }

        Some(Team {
            team_name: team_name.to_string(),
            members: self
                .users
                .values()
                .filter(|u| u.team_name == team_name)
                .cloned()
                .collect(),
        })
    }

    fn pull_request_mut(&mut self, id: &str) -> Result<&mut PullRequest, StoreError> {
        self.pull_requests
            .get_mut(id)
            .ok_or_else(|| StoreError::PullRequestNotFound(id.to_string()))
    }
}

/// Directory store holding everything behind a single lock.
///
/// Snapshot layout when persistence is enabled:
/// ```text
/// {path}            # users, team names and pull requests as pretty JSON
/// {path}.tmp        # next snapshot, renamed over {path} once fully written
/// ```
pub struct MemoryStore {
    state: Arc<RwLock<Directory>>,
    /// Where every mutation is flushed to, if anywhere.
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store that keeps nothing on disk.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(Directory::default())),
            snapshot_path: None,
        }
    }

    /// Open a store backed by a snapshot file.
    ///
    /// A missing file yields an empty store; it is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let directory = if path.exists() {
            let file = File::open(path).map_err(StoreError::Read)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).map_err(StoreError::Parse)?
        } else {
            Directory::default()
        };

        log::debug!(
            "Opened directory snapshot at {} ({} users, {} teams, {} pull requests)",
            path.display(),
            directory.users.len(),
            directory.teams.len(),
            directory.pull_requests.len()
        );

        Ok(Self {
            state: Arc::new(RwLock::new(directory)),
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    /// Default snapshot location under the XDG data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the XDG data directory cannot be determined.
    pub fn default_snapshot_path() -> Result<PathBuf, StoreError> {
        let data_dir = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(data_dir.join("revassign").join("directory.json"))
    }

    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Apply a mutation under the write lock.
    ///
    /// With a snapshot configured the mutation runs on a copy, the copy is
    /// written to disk, and only then does it replace the live directory. A
    /// failed write leaves both memory and the previous snapshot untouched.
    async fn update<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Directory) -> Result<T, StoreError> + Send,
    {
        let mut state = self.state.clone().write_owned().await;

        let Some(path) = self.snapshot_path.clone() else {
            return apply(&mut *state);
        };

        let mut next = (*state).clone();
        let value = apply(&mut next)?;

        // Swap inside the task: a dropped caller must not leave disk ahead of memory.
        tokio::task::spawn_blocking(move || {
            write_snapshot(&path, &next)?;
            *state = next;
            Ok(value)
        })
        .await
        .map_err(|e| StoreError::Write(io::Error::other(e)))?
    }
}

fn write_snapshot(path: &Path, directory: &Directory) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StoreError::CreateDir)?;
    }

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let file = File::create(&tmp).map_err(StoreError::Write)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, directory).map_err(StoreError::Serialize)?;
    writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)
        .and_then(|file| file.sync_all())
        .map_err(StoreError::Write)?;
    fs::rename(&tmp, path).map_err(StoreError::Write)?;

    log::trace!("Wrote directory snapshot to {}", path.display());

    Ok(())
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        self.state
            .read()
            .await
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError> {
        self.update(|directory| {
            let user = directory
                .users
                .get_mut(user_id)
                .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
            user.is_active = is_active;
            Ok(user.clone())
        })
        .await
    }

    async fn get_active_users_in_team(&self, team_name: &str) -> Result<Vec<User>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .filter(|u| u.is_active && u.team_name == team_name)
            .cloned()
            .collect())
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool, StoreError> {
        Ok(self.state.read().await.teams.contains(team_name))
    }

    async fn create_team(&self, team_name: &str, members: &[User]) -> Result<Team, StoreError> {
        self.update(|directory| {
            if !directory.teams.insert(team_name.to_string()) {
                return Err(StoreError::TeamExists(team_name.to_string()));
            }

            for member in members {
                let mut member = member.clone();
                member.team_name = team_name.to_string();
                directory.users.insert(member.user_id.clone(), member);
            }

            directory
                .team(team_name)
                .ok_or_else(|| StoreError::TeamNotFound(team_name.to_string()))
        })
        .await
    }

    async fn get_team(&self, team_name: &str) -> Result<Team, StoreError> {
        self.state
            .read()
            .await
            .team(team_name)
            .ok_or_else(|| StoreError::TeamNotFound(team_name.to_string()))
    }

    async fn pull_request_exists(&self, pull_request_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .pull_requests
            .contains_key(pull_request_id))
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), StoreError> {
        self.update(|directory| {
            if directory.pull_requests.contains_key(&pr.pull_request_id) {
                return Err(StoreError::PullRequestExists(pr.pull_request_id.clone()));
            }

            directory
                .pull_requests
                .insert(pr.pull_request_id.clone(), pr.clone());
            Ok(())
        })
        .await
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, StoreError> {
        self.state
            .read()
            .await
            .pull_requests
            .get(pull_request_id)
            .cloned()
            .ok_or_else(|| StoreError::PullRequestNotFound(pull_request_id.to_string()))
    }

    async fn replace_reviewers(
        &self,
        pull_request_id: &str,
        expected: &[String],
        reviewers: &[String],
    ) -> Result<PullRequest, StoreError> {
        self.update(|directory| {
            let pr = directory.pull_request_mut(pull_request_id)?;

            if pr.assigned_reviewers != expected {
                return Err(StoreError::ReviewersChanged(pull_request_id.to_string()));
            }

            pr.assigned_reviewers = reviewers.to_vec();
            Ok(pr.clone())
        })
        .await
    }

    async fn set_status(
        &self,
        pull_request_id: &str,
        status: PrStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<PullRequest, StoreError> {
        self.update(|directory| {
            let pr = directory.pull_request_mut(pull_request_id)?;
            pr.status = status;
            pr.merged_at = merged_at;
            Ok(pr.clone())
        })
        .await
    }

    async fn pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequest>, StoreError> {
        let mut prs: Vec<PullRequest> = self
            .state
            .read()
            .await
            .pull_requests
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .cloned()
            .collect();

        prs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });

        Ok(prs)
    }

    async fn reviewer_stats(&self) -> Result<Vec<ReviewerStats>, StoreError> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for pr in self.state.read().await.pull_requests.values() {
            for reviewer in &pr.assigned_reviewers {
                *counts.entry(reviewer.clone()).or_default() += 1;
            }
        }

        let mut stats: Vec<ReviewerStats> = counts
            .into_iter()
            .map(|(user_id, assignment_count)| ReviewerStats {
                user_id,
                assignment_count,
            })
            .collect();

        stats.sort_by(|a, b| {
            b.assignment_count
                .cmp(&a.assignment_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        Ok(stats)
    }

    async fn pull_request_stats(&self) -> Result<PrStats, StoreError> {
        let state = self.state.read().await;
        let mut stats = PrStats::default();
        for pr in state.pull_requests.values() {
            match pr.status {
                PrStatus::Open => stats.open += 1,
                PrStatus::Merged => stats.merged += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_snapshot() -> PathBuf {
        env::temp_dir().join(format!(
            "revassign-test-{}-{}.json",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    fn member(id: &str, active: bool) -> User {
        User::new(id, id.to_uppercase(), "", active)
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_team(
                "core",
                &[
                    member("carol", true),
                    member("alice", true),
                    member("bob", false),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[test_log::test(tokio::test)]
    async fn test_create_team_assigns_members_to_team() {
        let store = seeded_store().await;

        let team = store.get_team("core").await.unwrap();
        let ids: Vec<_> = team.members.iter().map(|m| m.user_id.as_str()).collect();

        assert_eq!(ids, vec!["alice", "bob", "carol"]);
        assert!(team.members.iter().all(|m| m.team_name == "core"));
    }

    #[test_log::test(tokio::test)]
    async fn test_create_team_twice_fails() {
        let store = seeded_store().await;

        let err = store.create_team("core", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::TeamExists(name) if name == "core"));
    }

    #[test_log::test(tokio::test)]
    async fn test_active_users_are_filtered_and_sorted() {
        let store = seeded_store().await;

        let active = store.get_active_users_in_team("core").await.unwrap();
        let ids: Vec<_> = active.iter().map(|u| u.user_id.as_str()).collect();

        assert_eq!(ids, vec!["alice", "carol"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_team_moves_existing_members() {
        let store = seeded_store().await;

        store
            .create_team("infra", &[User::new("alice", "Alice", "", true)])
            .await
            .unwrap();

        assert_eq!(store.get_team("core").await.unwrap().members.len(), 2);
        assert_eq!(store.get_team("infra").await.unwrap().members.len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_set_user_active_unknown_user() {
        let store = seeded_store().await;

        let err = store.set_user_active("nobody", true).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test_log::test(tokio::test)]
    async fn test_create_pull_request_twice_fails() {
        let store = seeded_store().await;
        let pr = PullRequest::open("pr-1", "Feature", "alice", vec![], Utc::now());

        store.create_pull_request(&pr).await.unwrap();
        let err = store.create_pull_request(&pr).await.unwrap_err();

        assert!(matches!(err, StoreError::PullRequestExists(_)));
    }

    #[test_log::test(tokio::test)]
    async fn test_replace_reviewers_compares_before_swapping() {
        let store = seeded_store().await;
        let pr = PullRequest::open(
            "pr-1",
            "Feature",
            "alice",
            vec!["carol".to_string()],
            Utc::now(),
        );
        store.create_pull_request(&pr).await.unwrap();

        let stale = vec!["bob".to_string()];
        let err = store
            .replace_reviewers("pr-1", &stale, &["dave".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReviewersChanged(_)));

        let updated = store
            .replace_reviewers("pr-1", &["carol".to_string()], &["dave".to_string()])
            .await
            .unwrap();
        assert_eq!(updated.assigned_reviewers, vec!["dave".to_string()]);
    }

    #[test_log::test(tokio::test)]
    async fn test_reviews_are_listed_newest_first() {
        let store = seeded_store().await;
        let older = Utc::now() - chrono::Duration::minutes(5);
        let newer = Utc::now();

        for (id, created_at) in [("pr-old", older), ("pr-new", newer)] {
            let pr = PullRequest::open(id, id, "alice", vec!["carol".to_string()], created_at);
            store.create_pull_request(&pr).await.unwrap();
        }

        let prs = store.pull_requests_by_reviewer("carol").await.unwrap();
        let ids: Vec<_> = prs.iter().map(|p| p.pull_request_id.as_str()).collect();

        assert_eq!(ids, vec!["pr-new", "pr-old"]);
        assert!(store.pull_requests_by_reviewer("bob").await.unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_stats() {
        let store = seeded_store().await;
        let reviewers = |ids: &[&str]| ids.iter().map(ToString::to_string).collect::<Vec<_>>();

        store
            .create_pull_request(&PullRequest::open(
                "pr-1",
                "One",
                "alice",
                reviewers(&["carol", "bob"]),
                Utc::now(),
            ))
            .await
            .unwrap();
        store
            .create_pull_request(&PullRequest::open(
                "pr-2",
                "Two",
                "bob",
                reviewers(&["carol"]),
                Utc::now(),
            ))
            .await
            .unwrap();
        store
            .set_status("pr-2", PrStatus::Merged, Some(Utc::now()))
            .await
            .unwrap();

        let stats = store.reviewer_stats().await.unwrap();
        assert_eq!(stats[0].user_id, "carol");
        assert_eq!(stats[0].assignment_count, 2);
        assert_eq!(stats[1].user_id, "bob");

        let pr_stats = store.pull_request_stats().await.unwrap();
        assert_eq!(pr_stats.open, 1);
        assert_eq!(pr_stats.merged, 1);
        assert_eq!(pr_stats.total(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_snapshot_survives_reopen() {
        let path = temp_snapshot();

        {
            let store = MemoryStore::open(&path).unwrap();
            store
                .create_team("core", &[member("alice", true)])
                .await
                .unwrap();
            store
                .create_pull_request(&PullRequest::open(
                    "pr-1",
                    "Feature",
                    "alice",
                    vec![],
                    Utc::now(),
                ))
                .await
                .unwrap();
        }

        let reopened = MemoryStore::open(&path).unwrap();
        assert!(reopened.team_exists("core").await.unwrap());
        assert!(reopened.pull_request_exists("pr-1").await.unwrap());
        assert_eq!(reopened.get_user("alice").await.unwrap().team_name, "core");

        fs::remove_file(&path).ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_snapshot_replaces_file_without_leftovers() {
        let path = temp_snapshot();
        let store = MemoryStore::open(&path).unwrap();

        store.create_team("core", &[]).await.unwrap();
        store.create_team("infra", &[]).await.unwrap();

        let mut tmp = OsString::from(path.as_os_str());
        tmp.push(".tmp");
        assert!(!Path::new(&tmp).exists());
        assert!(MemoryStore::open(&path).unwrap().team_exists("infra").await.unwrap());

        fs::remove_file(&path).ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_snapshot_write_changes_nothing() {
        let blocker = temp_snapshot();
        File::create(&blocker).unwrap();
        let store = MemoryStore::open(&blocker.join("directory.json")).unwrap();

        for _ in 0..2 {
            let err = store
                .create_team("core", &[member("alice", true)])
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::CreateDir(_)), "{err:?}");
        }

        assert!(!store.team_exists("core").await.unwrap());
        assert!(store.get_user("alice").await.unwrap_err().is_not_found());

        fs::remove_file(&blocker).ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_snapshot_write_keeps_reviewers() {
        let dir = temp_snapshot();
        let store = MemoryStore::open(&dir.join("directory.json")).unwrap();
        store
            .create_pull_request(&PullRequest::open(
                "pr-1",
                "Feature",
                "alice",
                vec!["carol".to_string()],
                Utc::now(),
            ))
            .await
            .unwrap();

        fs::remove_dir_all(&dir).unwrap();
        File::create(&dir).unwrap();

        let err = store
            .replace_reviewers("pr-1", &["carol".to_string()], &["dave".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CreateDir(_)), "{err:?}");

        let pr = store.get_pull_request("pr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["carol".to_string()]);

        let err = store
            .set_status("pr-1", PrStatus::Merged, Some(Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CreateDir(_)), "{err:?}");
        assert!(!store.get_pull_request("pr-1").await.unwrap().is_merged());

        fs::remove_file(&dir).ok();
    }

    #[test]
    fn test_open_missing_snapshot_is_empty() {
        let path = temp_snapshot();
        let store = MemoryStore::open(&path).unwrap();

        assert_eq!(store.snapshot_path(), Some(path.as_path()));
        assert!(!path.exists());
    }
}
