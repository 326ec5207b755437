//! Identity provider: doctor accounts, the active session, and
//! session-change listeners.

pub mod keys;
pub mod local;

pub use keys::*;
pub use local::LocalIdentityProvider;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::StoreError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already in use: {0}")]
    EmailInUse(String),

    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("No active session")]
    NoActiveSession,

    #[error("Internal lock error")]
    LockPoisoned,

    #[error("Corrupted credentials for {0}")]
    CorruptCredentials(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for AuthError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(e))
    }
}

/// A signed-in doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub doctor_id: Uuid,
    pub email: String,
    pub signed_in_at: DateTime<Utc>,
}

pub type SessionListener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub trait IdentityProvider: Send + Sync {
    /// Register a listener. It fires once immediately with the current
    /// session and again on every sign-in and sign-out.
    fn on_session_change(&self, listener: SessionListener) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);

    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    fn sign_out(&self) -> Result<(), AuthError>;

    fn current_session(&self) -> Option<Session>;

    /// The signed-in doctor's id; `NoActiveSession` when signed out.
    fn current_session_id(&self) -> Result<Uuid, AuthError> {
        self.current_session()
            .map(|s| s.doctor_id)
            .ok_or(AuthError::NoActiveSession)
    }
}
