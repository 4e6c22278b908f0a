use crate::degree::DegreeCounter;
use crate::lister::FriendLister;
use crate::mutual::MutualCounter;
use friendgraph_core::{
    EdgeSnapshot, EdgeStore, FriendGraphError, FriendList, FriendListItem, FriendProfile, Result,
    UserId, Validate,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Entry point for the calling service layer.
///
/// Each operation opens one snapshot and runs every sub-query against it, so
/// the counts in a single result always describe the same point in time.
pub struct FriendQueryEngine<S: EdgeStore> {
    store: Arc<S>,
}

impl<S: EdgeStore> Clone for FriendQueryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EdgeStore> FriendQueryEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Profile of `target` as seen by `viewer`.
    ///
    /// Fails with NotFound unless `viewer` has an accepted row towards `target`.
    #[instrument(skip(self))]
    pub async fn get_friend_profile(&self, viewer: UserId, target: UserId) -> Result<FriendProfile> {
        let snapshot = self.store.snapshot().await?;
        friend_profile(&snapshot, viewer, target).await
    }

    /// Display fields of `viewer` plus every accepted friend with that friend's own count.
    #[instrument(skip(self))]
    pub async fn get_all_friends(&self, viewer: UserId) -> Result<FriendList> {
        let snapshot = self.store.snapshot().await?;
        all_friends(&snapshot, viewer).await
    }

    pub async fn total_friend_counts(&self, users: &[UserId]) -> Result<HashMap<UserId, u64>> {
        let snapshot = self.store.snapshot().await?;
        DegreeCounter::new(&snapshot).total_friend_counts(users).await
    }

    pub async fn mutual_friend_counts(
        &self,
        user: UserId,
        candidates: &[UserId],
    ) -> Result<HashMap<UserId, u64>> {
        let snapshot = self.store.snapshot().await?;
        MutualCounter::new(&snapshot)
            .mutual_friend_counts(user, candidates)
            .await
    }
}

pub async fn friend_profile<T: EdgeSnapshot + ?Sized>(
    snapshot: &T,
    viewer: UserId,
    target: UserId,
) -> Result<FriendProfile> {
    if viewer == target || !snapshot.has_accepted_edge(viewer, target).await? {
        debug!("No accepted friendship {} -> {}", viewer, target);
        return Err(FriendGraphError::not_found(format!(
            "friendship {} -> {}",
            viewer, target
        )));
    }

    let friend = snapshot
        .user(target)
        .await?
        .ok_or_else(|| FriendGraphError::not_found(format!("user {}", target)))?;

    let total_friend_count = DegreeCounter::new(snapshot).total_friend_count(target).await?;
    let mutual_friend_count = MutualCounter::new(snapshot)
        .mutual_friend_count(viewer, target)
        .await?;

    let profile = FriendProfile {
        id: friend.id,
        full_name: friend.full_name,
        phone_number: friend.phone_number,
        total_friend_count,
        mutual_friend_count,
    };
    checked(profile)
}

pub async fn all_friends<T: EdgeSnapshot + ?Sized>(snapshot: &T, viewer: UserId) -> Result<FriendList> {
    let user = snapshot
        .user(viewer)
        .await?
        .ok_or_else(|| FriendGraphError::not_found(format!("user {}", viewer)))?;

    let entries = FriendLister::new(snapshot).list_friends(viewer).await?;
    let ids: Vec<UserId> = entries.iter().map(|e| e.friend_user_id).collect();
    let degrees = DegreeCounter::new(snapshot).total_friend_counts(&ids).await?;

    let friends = entries
        .into_iter()
        .map(|entry| {
            let total_friend_count = degrees.get(&entry.friend_user_id).copied().unwrap_or(0);
            FriendListItem {
                entry,
                total_friend_count,
            }
        })
        .collect();

    let list = FriendList {
        id: user.id,
        full_name: user.full_name,
        phone_number: user.phone_number,
        friends,
    };
    checked(list)
}

fn checked<R: Validate + std::fmt::Debug>(record: R) -> Result<R> {
    if let Err(e) = record.validate() {
        error!("Computed record failed validation: {} ({:?})", e, record);
        return Err(FriendGraphError::Validation(e));
    }
    Ok(record)
}
