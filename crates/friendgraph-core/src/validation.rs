//! Output schema checks applied to every record before it leaves the engine.
//!
//! A record that fails here is an aggregation bug, not bad user input.

use crate::types::{FriendList, FriendListEntry, FriendListItem, FriendProfile, UserId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field '{field}' is empty")]
    EmptyField { field: String },

    #[error("Invalid id for field '{field}': {value}")]
    InvalidId { field: String, value: u64 },

    #[error("Value out of range for field '{field}': {value} (max {max})")]
    ValueOutOfRange { field: String, value: u64, max: u64 },

    #[error("Duplicate entry in '{field}': {value}")]
    Duplicate { field: String, value: String },
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn valid_id(field: &str, id: UserId) -> Result<(), ValidationError> {
    if id.get() == 0 {
        return Err(ValidationError::InvalidId {
            field: field.to_string(),
            value: id.get(),
        });
    }
    Ok(())
}

impl Validate for FriendProfile {
    fn validate(&self) -> Result<(), ValidationError> {
        valid_id("id", self.id)?;
        non_empty("fullName", &self.full_name)?;
        non_empty("phoneNumber", &self.phone_number)?;

        // Every mutual friend is one of the target's own friends.
        if self.mutual_friend_count > self.total_friend_count {
            return Err(ValidationError::ValueOutOfRange {
                field: "mutualFriendCount".to_string(),
                value: self.mutual_friend_count,
                max: self.total_friend_count,
            });
        }
        Ok(())
    }
}

impl Validate for FriendListEntry {
    fn validate(&self) -> Result<(), ValidationError> {
        valid_id("friendUserId", self.friend_user_id)?;
        non_empty("friendFullName", &self.friend_full_name)?;
        non_empty("friendPhoneNumber", &self.friend_phone_number)
    }
}

impl Validate for FriendListItem {
    fn validate(&self) -> Result<(), ValidationError> {
        self.entry.validate()
    }
}

impl Validate for FriendList {
    fn validate(&self) -> Result<(), ValidationError> {
        valid_id("id", self.id)?;
        non_empty("fullName", &self.full_name)?;
        non_empty("phoneNumber", &self.phone_number)?;

        let mut seen = std::collections::HashSet::with_capacity(self.friends.len());
        for item in &self.friends {
            item.validate()?;
            if !seen.insert(item.entry.friend_user_id) {
                return Err(ValidationError::Duplicate {
                    field: "friends".to_string(),
                    value: item.entry.friend_user_id.to_string(),
                });
            }
        }
        Ok(())
    }
}
