use crate::{Result, User, UserId};
use async_trait::async_trait;
use std::collections::HashMap;

/// Read access to one point-in-time view of users and friendship rows.
///
/// Neighbor selects return raw `otherId` values exactly as stored; they are
/// not deduplicated and may contain the owner itself if a self-loop slipped
/// in upstream. Counting code is responsible for set semantics.
#[async_trait]
pub trait EdgeSnapshot: Send + Sync {
    async fn user(&self, id: UserId) -> Result<Option<User>>;

    /// Whether any accepted row exists for the ordered pair `(owner, other)`.
    /// Non-accepted duplicates of the same pair do not hide it.
    async fn has_accepted_edge(&self, owner: UserId, other: UserId) -> Result<bool>;

    /// `otherId` of every accepted row owned by `owner`.
    async fn accepted_neighbors(&self, owner: UserId) -> Result<Vec<UserId>>;

    /// `otherId` of every accepted row whose owner is in `owners`, grouped by owner.
    async fn accepted_neighbors_grouped(
        &self,
        owners: &[UserId],
    ) -> Result<HashMap<UserId, Vec<UserId>>>;

    /// Group-by-owner count of distinct accepted neighbors (other than the owner
    /// itself) for owners in `owners`. Owners with no accepted rows may be
    /// absent from the map.
    async fn accepted_degrees(&self, owners: &[UserId]) -> Result<HashMap<UserId, u64>>;

    /// Accepted rows owned by `owner`, joined with the user row of `otherId`.
    /// Rows whose `otherId` has no user are dropped by the join.
    async fn accepted_friends_joined(&self, owner: UserId) -> Result<Vec<User>>;
}

/// A source of consistent snapshots. One snapshot serves one request.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    type Snapshot: EdgeSnapshot + 'static;

    async fn snapshot(&self) -> Result<Self::Snapshot>;
}
