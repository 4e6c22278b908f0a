use crate::config_manager::ConfigError;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FriendGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Result failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FriendGraphError {
    pub fn not_found(what: impl Into<String>) -> Self {
        FriendGraphError::NotFound(what.into())
    }

    /// NotFound is the only kind a caller should surface as a client error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FriendGraphError::NotFound(_))
    }

    /// Faults on our side: a computed record broke its schema, or the store failed.
    pub fn is_internal(&self) -> bool {
        !self.is_not_found()
    }
}

pub type Result<T> = std::result::Result<T, FriendGraphError>;
