//! Mutual friend counting.
//!
//! The count is the size of a set intersection over distinct third parties:
//! `|N(a) ∩ N(b) \ {a, b}|`. Raw neighbor rows are collapsed into sets before
//! intersecting, so duplicate rows for the same third party never inflate the
//! result.

use crate::degree::{distinct_neighbors, DegreeCounter};
use friendgraph_core::{EdgeSnapshot, Result, UserId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub struct MutualCounter<'a, S: EdgeSnapshot + ?Sized> {
    snapshot: &'a S,
}

impl<'a, S: EdgeSnapshot + ?Sized> MutualCounter<'a, S> {
    pub fn new(snapshot: &'a S) -> Self {
        Self { snapshot }
    }

    /// Number of distinct users, other than `a` and `b`, who are accepted friends of both.
    pub async fn mutual_friend_count(&self, a: UserId, b: UserId) -> Result<u64> {
        let degrees = DegreeCounter::new(self.snapshot);
        let fa = degrees.neighbor_set(a).await?;
        let fb = degrees.neighbor_set(b).await?;

        let count = intersection_size(&fa, &fb, a, b);
        debug!(
            "Mutual friends of {} ({} friends) and {} ({} friends): {}",
            a,
            fa.len(),
            b,
            fb.len(),
            count
        );
        Ok(count)
    }

    /// Mutual counts between `user` and each candidate, from one neighbor
    /// query for `user` and one grouped query for all candidates.
    pub async fn mutual_friend_counts(
        &self,
        user: UserId,
        candidates: &[UserId],
    ) -> Result<HashMap<UserId, u64>> {
        if candidates.is_empty() {
            return Ok(HashMap::new());
        }

        let viewer_friends = DegreeCounter::new(self.snapshot).neighbor_set(user).await?;
        let mut counts: HashMap<UserId, u64> = candidates.iter().map(|c| (*c, 0)).collect();
        if viewer_friends.is_empty() {
            return Ok(counts);
        }

        let unique: Vec<UserId> = counts.keys().copied().collect();
        let grouped = self.snapshot.accepted_neighbors_grouped(&unique).await?;
        for (candidate, raw) in grouped {
            let candidate_friends = distinct_neighbors(candidate, raw);
            let count = intersection_size(&viewer_friends, &candidate_friends, user, candidate);
            counts.insert(candidate, count);
        }

        debug!(
            "Batch mutual query for {}: {} candidates",
            user,
            counts.len()
        );
        Ok(counts)
    }
}

/// `|fa ∩ fb|` with both endpoints excluded, iterating the smaller set.
fn intersection_size(fa: &HashSet<UserId>, fb: &HashSet<UserId>, a: UserId, b: UserId) -> u64 {
    let (small, large) = if fa.len() <= fb.len() { (fa, fb) } else { (fb, fa) };
    small
        .iter()
        .filter(|x| **x != a && **x != b && large.contains(*x))
        .count() as u64
}
