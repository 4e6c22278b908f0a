use friendgraph_core::{EdgeSnapshot, FriendListEntry, Result, UserId};
use std::collections::HashSet;
use tracing::{debug, warn};

pub struct FriendLister<'a, S: EdgeSnapshot + ?Sized> {
    snapshot: &'a S,
}

impl<'a, S: EdgeSnapshot + ?Sized> FriendLister<'a, S> {
    pub fn new(snapshot: &'a S) -> Self {
        Self { snapshot }
    }

    /// Accepted friends of `user` joined with their display fields, in store
    /// order. One entry per distinct friend; callers must not rely on order.
    pub async fn list_friends(&self, user: UserId) -> Result<Vec<FriendListEntry>> {
        let joined = self.snapshot.accepted_friends_joined(user).await?;
        let row_count = joined.len();

        let mut seen = HashSet::with_capacity(row_count);
        let entries: Vec<FriendListEntry> = joined
            .iter()
            .filter(|friend| friend.id != user && seen.insert(friend.id))
            .map(FriendListEntry::from)
            .collect();

        if entries.len() != row_count {
            warn!(
                "Collapsed {} accepted rows into {} friends for user {}",
                row_count,
                entries.len(),
                user
            );
        }
        debug!("Listed {} friends for user {}", entries.len(), user);
        Ok(entries)
    }
}
