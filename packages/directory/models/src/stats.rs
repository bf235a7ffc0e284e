use serde::{Deserialize, Serialize};

/// Number of pull requests a user is currently assigned to review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerStats {
    pub user_id: String,
    pub assignment_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrStats {
    pub open: u64,
    pub merged: u64,
}

impl PrStats {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.open + self.merged
    }
}
