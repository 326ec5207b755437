//! Top-level error taxonomy surfaced to the desk's pages.

use thiserror::Error;

use crate::db::{StoreError, StoreFailureKind};
use crate::forms::ValidationError;
use crate::identity::AuthError;
use crate::models::Collection;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("A save to {0} is already in progress")]
    SubmissionInFlight(Collection),

    #[error("No active session")]
    NoActiveSession,
}

impl ClinicError {
    /// Text for the alert shown to the user. `action` names what failed,
    /// e.g. "saving patient".
    pub fn user_message(&self, action: &str) -> String {
        match self {
            Self::Auth(e) => e.to_string(),
            Self::Validation(e) => e.to_string(),
            Self::Store(e) if e.kind() == StoreFailureKind::PermissionDenied => {
                format!("Error {action}: permission denied.")
            }
            Self::Store(_) => format!("Error {action}. Please try again."),
            Self::SubmissionInFlight(_) => "Please wait, still saving.".to_string(),
            Self::NoActiveSession => "Please sign in again.".to_string(),
        }
    }
}
