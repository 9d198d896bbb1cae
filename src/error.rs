//! Error types shared by the store, the persistence layer and startup.
//!
//! Photo and analysis failures have their own enums next to the code that
//! raises them (`photo::PhotoError`, `analysis::AnalysisError`).

use crate::config::ConfigError;
use crate::state::data::ProfileId;

/// A draft that cannot become a profile yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("the cat needs a name")]
    MissingName,
    #[error("the cat needs a location")]
    MissingLocation,
}

/// Errors returned by `Library` mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Profile not found: {0}")]
    NotFound(ProfileId),
}

/// Errors raised while reading or writing the blob store.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can stop the application from starting.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}
