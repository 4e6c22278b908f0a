use async_trait::async_trait;
use friendgraph_core::{
    EdgeSnapshot, EdgeStore, FriendGraphError, FriendshipEdge, FriendshipStatus, Result, User,
    UserId,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// The full relation set at one version. Cloned only when a writer races a live snapshot.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    users: HashMap<UserId, User>,
    edges_by_owner: HashMap<UserId, Vec<FriendshipEdge>>,
    version: u64,
}

impl GraphState {
    fn accepted_rows(&self, owner: UserId) -> impl Iterator<Item = &FriendshipEdge> {
        self.edges_by_owner
            .get(&owner)
            .into_iter()
            .flatten()
            .filter(|e| e.is_accepted())
    }

    fn upsert_edge(&mut self, edge: FriendshipEdge) {
        let rows = self.edges_by_owner.entry(edge.owner_id).or_default();
        let mut updated = false;
        for row in rows.iter_mut().filter(|r| r.other_id == edge.other_id) {
            row.status = edge.status;
            updated = true;
        }
        if !updated {
            rows.push(edge);
        }
    }

    fn edge_count(&self) -> usize {
        self.edges_by_owner.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub users: usize,
    pub edges: usize,
}

/// Copy-on-write edge store. Every snapshot is an `Arc` of the state at the
/// moment it was taken, so concurrent writes never leak into a running request.
#[derive(Debug, Default)]
pub struct InMemoryEdgeStore {
    state: RwLock<Arc<GraphState>>,
}

impl InMemoryEdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write<T>(&self, f: impl FnOnce(&mut GraphState) -> T) -> T {
        let mut guard = self.state.write();
        let state = Arc::make_mut(&mut guard);
        let out = f(state);
        state.version += 1;
        out
    }

    pub fn insert_user(&self, user: User) {
        self.write(|state| {
            state.users.insert(user.id, user);
        });
    }

    /// Appends a raw row. No dedup and no self-loop check, so upstream defects
    /// can be reproduced as-is.
    pub fn insert_edge(&self, edge: FriendshipEdge) {
        self.write(|state| {
            state
                .edges_by_owner
                .entry(edge.owner_id)
                .or_default()
                .push(edge);
        });
    }

    /// Sets the status of the `(owner, other)` row in place, inserting it if absent.
    pub fn upsert_edge(&self, edge: FriendshipEdge) {
        self.write(|state| state.upsert_edge(edge));
    }

    /// Mutates the status of an existing row. Returns false if no such row exists.
    pub fn set_status(&self, owner: UserId, other: UserId, status: FriendshipStatus) -> bool {
        self.write(|state| {
            let mut found = false;
            if let Some(rows) = state.edges_by_owner.get_mut(&owner) {
                for row in rows.iter_mut().filter(|r| r.other_id == other) {
                    row.status = status;
                    found = true;
                }
            }
            found
        })
    }

    /// Materializes an accepted friendship as both directed rows.
    pub fn accept_friendship(&self, a: UserId, b: UserId) -> Result<()> {
        if a == b {
            return Err(FriendGraphError::Storage(format!(
                "user {} cannot befriend themselves",
                a
            )));
        }
        self.write(|state| {
            state.upsert_edge(FriendshipEdge::accepted(a, b));
            state.upsert_edge(FriendshipEdge::accepted(b, a));
        });
        Ok(())
    }

    /// Loads users and rows in one write. With `symmetrize`, rows are upserted
    /// and every accepted row gets its transpose; self-loops are skipped.
    pub fn bulk_load(
        &self,
        users: Vec<User>,
        edges: Vec<FriendshipEdge>,
        symmetrize: bool,
    ) -> LoadStats {
        let stats = self.write(|state| {
            for user in users {
                state.users.insert(user.id, user);
            }
            for edge in edges {
                if !symmetrize {
                    state.edges_by_owner.entry(edge.owner_id).or_default().push(edge);
                    continue;
                }
                if edge.is_self_loop() {
                    debug!("Skipping self-loop row for user {}", edge.owner_id);
                    continue;
                }
                if edge.is_accepted() {
                    state.upsert_edge(edge.transpose());
                }
                state.upsert_edge(edge);
            }
            LoadStats {
                users: state.users.len(),
                edges: state.edge_count(),
            }
        });
        info!(
            "Edge store loaded: {} users, {} friendship rows",
            stats.users, stats.edges
        );
        stats
    }

    pub fn user_count(&self) -> usize {
        self.state.read().users.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.read().edge_count()
    }

    pub fn version(&self) -> u64 {
        self.state.read().version
    }
}

#[async_trait]
impl EdgeStore for InMemoryEdgeStore {
    type Snapshot = MemorySnapshot;

    async fn snapshot(&self) -> Result<MemorySnapshot> {
        let state = Arc::clone(&*self.state.read());
        debug!("Opened snapshot at version {}", state.version);
        Ok(MemorySnapshot { state })
    }
}

#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    state: Arc<GraphState>,
}

impl MemorySnapshot {
    pub fn version(&self) -> u64 {
        self.state.version
    }
}

#[async_trait]
impl EdgeSnapshot for MemorySnapshot {
    async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.state.users.get(&id).cloned())
    }

    async fn has_accepted_edge(&self, owner: UserId, other: UserId) -> Result<bool> {
        Ok(self.state.accepted_rows(owner).any(|e| e.other_id == other))
    }

    async fn accepted_neighbors(&self, owner: UserId) -> Result<Vec<UserId>> {
        Ok(self.state.accepted_rows(owner).map(|e| e.other_id).collect())
    }

    async fn accepted_neighbors_grouped(
        &self,
        owners: &[UserId],
    ) -> Result<HashMap<UserId, Vec<UserId>>> {
        let mut grouped = HashMap::with_capacity(owners.len());
        for owner in owners {
            if grouped.contains_key(owner) {
                continue;
            }
            let neighbors: Vec<UserId> =
                self.state.accepted_rows(*owner).map(|e| e.other_id).collect();
            if !neighbors.is_empty() {
                grouped.insert(*owner, neighbors);
            }
        }
        Ok(grouped)
    }

    async fn accepted_degrees(&self, owners: &[UserId]) -> Result<HashMap<UserId, u64>> {
        let mut degrees = HashMap::with_capacity(owners.len());
        for owner in owners {
            if degrees.contains_key(owner) {
                continue;
            }
            let distinct: HashSet<UserId> = self
                .state
                .accepted_rows(*owner)
                .map(|e| e.other_id)
                .filter(|other| other != owner)
                .collect();
            if !distinct.is_empty() {
                degrees.insert(*owner, distinct.len() as u64);
            }
        }
        Ok(degrees)
    }

    async fn accepted_friends_joined(&self, owner: UserId) -> Result<Vec<User>> {
        Ok(self
            .state
            .accepted_rows(owner)
            .filter_map(|e| self.state.users.get(&e.other_id).cloned())
            .collect())
    }
}
