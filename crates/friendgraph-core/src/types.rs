use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    pub fn new(raw: u64) -> Self {
        UserId(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        UserId(raw)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(UserId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    #[default]
    #[serde(alias = "requested")]
    Pending,
    Accepted,
    Declined,
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Declined => "declined",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "requested" => Ok(FriendshipStatus::Pending),
            "accepted" => Ok(FriendshipStatus::Accepted),
            "declined" => Ok(FriendshipStatus::Declined),
            other => Err(format!("Unknown friendship status: {}", other)),
        }
    }
}

/// A user record owned by the identity subsystem. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub phone_number: String,
}

impl User {
    pub fn new(id: UserId, full_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            phone_number: phone.into(),
        }
    }
}

/// One directed friendship row: `owner` has a relationship with `other`.
///
/// An accepted friendship between A and B is stored as two rows, (A, B) and
/// (B, A), both accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipEdge {
    #[serde(alias = "userId")]
    pub owner_id: UserId,
    #[serde(alias = "friendUserId")]
    pub other_id: UserId,
    #[serde(default)]
    pub status: FriendshipStatus,
}

impl FriendshipEdge {
    pub fn new(owner_id: UserId, other_id: UserId, status: FriendshipStatus) -> Self {
        Self {
            owner_id,
            other_id,
            status,
        }
    }

    pub fn accepted(owner: UserId, other: UserId) -> Self {
        Self::new(owner, other, FriendshipStatus::Accepted)
    }

    pub fn is_accepted(&self) -> bool {
        self.status == FriendshipStatus::Accepted
    }

    pub fn is_self_loop(&self) -> bool {
        self.owner_id == self.other_id
    }

    /// The same relationship seen from the other side.
    pub fn transpose(&self) -> Self {
        Self {
            owner_id: self.other_id,
            other_id: self.owner_id,
            status: self.status,
        }
    }
}

/// A friend as seen by a viewer: display fields plus freshly computed counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendProfile {
    pub id: UserId,
    pub full_name: String,
    pub phone_number: String,
    pub total_friend_count: u64,
    pub mutual_friend_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendListEntry {
    pub friend_user_id: UserId,
    pub friend_full_name: String,
    pub friend_phone_number: String,
}

impl From<&User> for FriendListEntry {
    fn from(user: &User) -> Self {
        Self {
            friend_user_id: user.id,
            friend_full_name: user.full_name.clone(),
            friend_phone_number: user.phone_number.clone(),
        }
    }
}

/// A friend list entry enriched with that friend's own degree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendListItem {
    #[serde(flatten)]
    pub entry: FriendListEntry,
    pub total_friend_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendList {
    pub id: UserId,
    pub full_name: String,
    pub phone_number: String,
    pub friends: Vec<FriendListItem>,
}

impl FriendList {
    pub fn friend_ids(&self) -> Vec<UserId> {
        self.friends.iter().map(|f| f.entry.friend_user_id).collect()
    }
}
