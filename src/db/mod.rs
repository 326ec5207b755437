pub mod query;
pub mod sqlite;
pub mod store;

pub use query::*;
pub use sqlite::*;
pub use store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Permission denied on {collection}/{id}")]
    PermissionDenied { collection: String, id: String },

    #[error("Corrupted document: {collection}/{id}")]
    CorruptDocument { collection: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Internal lock error")]
    LockPoisoned,
}

/// The two failure kinds callers of the store distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailureKind {
    Unavailable,
    PermissionDenied,
}

impl StoreError {
    pub fn kind(&self) -> StoreFailureKind {
        match self {
            Self::PermissionDenied { .. } => StoreFailureKind::PermissionDenied,
            _ => StoreFailureKind::Unavailable,
        }
    }
}
