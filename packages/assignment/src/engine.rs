use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use revassign_directory_models::{PullRequest, User};

use crate::rng::RngSource;

/// Upper bound on reviewers per pull request.
pub const MAX_REVIEWERS: usize = 2;

/// Active members eligible to review a new pull request by `author_id`.
///
/// `team_members` is the author's team; inactive members, the author and
/// repeated ids are dropped. Input order is kept.
#[must_use]
pub fn creation_pool<'a>(author_id: &str, team_members: &'a [User]) -> Vec<&'a User> {
    eligible(team_members, |id| id == author_id)
}

/// Active members eligible to replace `old_reviewer_id` on `pr`.
///
/// `team_members` is the old reviewer's team. Excludes the old reviewer, the
/// author, and everyone currently assigned.
#[must_use]
pub fn reassignment_pool<'a>(
    pr: &PullRequest,
    old_reviewer_id: &str,
    team_members: &'a [User],
) -> Vec<&'a User> {
    eligible(team_members, |id| {
        id == old_reviewer_id || id == pr.author_id || pr.has_reviewer(id)
    })
}

fn eligible<'a>(members: &'a [User], excluded: impl Fn(&str) -> bool) -> Vec<&'a User> {
    let mut seen = HashSet::new();
    let mut pool = Vec::new();
    for member in members {
        if member.is_active && !excluded(&member.user_id) && seen.insert(member.user_id.as_str())
        {
            pool.push(member);
        }
    }
    pool
}

/// Draw up to [`MAX_REVIEWERS`] distinct reviewers for a new pull request.
///
/// An empty pool yields an empty list; that is not an error.
pub fn assign_reviewers<R: Rng + ?Sized>(
    author_id: &str,
    team_members: &[User],
    rng: &mut R,
) -> Vec<String> {
    let pool = creation_pool(author_id, team_members);

    pool.choose_multiple(rng, MAX_REVIEWERS)
        .map(|u| u.user_id.clone())
        .collect()
}

/// Draw a single replacement for `old_reviewer_id`, or `None` when nobody
/// is eligible.
pub fn pick_replacement<R: Rng + ?Sized>(
    pr: &PullRequest,
    old_reviewer_id: &str,
    team_members: &[User],
    rng: &mut R,
) -> Option<String> {
    reassignment_pool(pr, old_reviewer_id, team_members)
        .choose(rng)
        .map(|u| u.user_id.clone())
}

/// Swap `old` for `new` in place, keeping every other reviewer where it was.
#[must_use]
pub fn replace_reviewer(reviewers: &[String], old: &str, new: &str) -> Vec<String> {
    reviewers
        .iter()
        .map(|r| if r == old { new.to_string() } else { r.clone() })
        .collect()
}

/// Reviewer selection bound to a random source.
#[derive(Debug, Default)]
pub struct ReviewerAssigner {
    rng: RngSource,
}

impl ReviewerAssigner {
    #[must_use]
    pub const fn new(rng: RngSource) -> Self {
        Self { rng }
    }

    #[must_use]
    pub fn assign(&self, author_id: &str, team_members: &[User]) -> Vec<String> {
        let reviewers = assign_reviewers(author_id, team_members, &mut self.rng.rng());
        log::debug!(
            "Drew {} reviewer(s) for author {author_id} from {} team member(s)",
            reviewers.len(),
            team_members.len()
        );
        reviewers
    }

    #[must_use]
    pub fn replacement(
        &self,
        pr: &PullRequest,
        old_reviewer_id: &str,
        team_members: &[User],
    ) -> Option<String> {
        pick_replacement(pr, old_reviewer_id, team_members, &mut self.rng.rng())
    }
}
