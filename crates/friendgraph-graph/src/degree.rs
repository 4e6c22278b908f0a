use friendgraph_core::{EdgeSnapshot, Result, UserId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Friend counts and neighbor sets over one snapshot.
pub struct DegreeCounter<'a, S: EdgeSnapshot + ?Sized> {
    snapshot: &'a S,
}

impl<'a, S: EdgeSnapshot + ?Sized> DegreeCounter<'a, S> {
    pub fn new(snapshot: &'a S) -> Self {
        Self { snapshot }
    }

    /// Number of distinct users `user` has an accepted row towards. Unknown users count 0.
    pub async fn total_friend_count(&self, user: UserId) -> Result<u64> {
        let degrees = self.snapshot.accepted_degrees(&[user]).await?;
        Ok(degrees.get(&user).copied().unwrap_or(0))
    }

    /// One grouped query for many users. Every requested id gets an entry.
    pub async fn total_friend_counts(&self, users: &[UserId]) -> Result<HashMap<UserId, u64>> {
        if users.is_empty() {
            return Ok(HashMap::new());
        }
        let degrees = self.snapshot.accepted_degrees(users).await?;
        debug!(
            "Batch degree query: {} requested, {} with friends",
            users.len(),
            degrees.len()
        );
        Ok(users
            .iter()
            .map(|id| (*id, degrees.get(id).copied().unwrap_or(0)))
            .collect())
    }

    /// The distinct accepted neighbors of `user`, never including `user`.
    pub async fn neighbor_set(&self, user: UserId) -> Result<HashSet<UserId>> {
        let raw = self.snapshot.accepted_neighbors(user).await?;
        Ok(distinct_neighbors(user, raw))
    }
}

/// Collapses raw neighbor rows into a set, dropping the owner.
pub(crate) fn distinct_neighbors(owner: UserId, raw: Vec<UserId>) -> HashSet<UserId> {
    let row_count = raw.len();
    let mut set: HashSet<UserId> = raw.into_iter().collect();
    let had_self_loop = set.remove(&owner);
    if had_self_loop {
        warn!("Accepted self-loop row found for user {}", owner);
    }
    if set.len() + usize::from(had_self_loop) < row_count {
        warn!(
            "User {} has {} accepted rows for {} distinct friends",
            owner,
            row_count,
            set.len()
        );
    }
    set
}
