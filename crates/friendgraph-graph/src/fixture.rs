use crate::memory_storage::{InMemoryEdgeStore, LoadStats};
use friendgraph_core::{FriendshipEdge, Result, User};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// On-disk seed for the in-memory store.
///
/// ```json
/// { "users": [{"id": 1, "fullName": "Ada", "phoneNumber": "555"}],
///   "friendships": [{"userId": 1, "friendUserId": 2, "status": "accepted"}] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphFixture {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub friendships: Vec<FriendshipEdge>,
}

impl GraphFixture {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let fixture = Self::from_json(&content)?;
        info!(
            "Read fixture {} ({} users, {} friendship rows)",
            path.display(),
            fixture.users.len(),
            fixture.friendships.len()
        );
        Ok(fixture)
    }

    pub fn load_into(self, store: &InMemoryEdgeStore, symmetrize: bool) -> LoadStats {
        store.bulk_load(self.users, self.friendships, symmetrize)
    }

    pub fn into_store(self, symmetrize: bool) -> InMemoryEdgeStore {
        let store = InMemoryEdgeStore::new();
        self.load_into(&store, symmetrize);
        store
    }
}
