//! Sign-in, sign-up and the signed-in doctor's profile.

use chrono::Utc;

use crate::clinic_state::ClinicState;
use crate::db::{get_record_in, to_body};
use crate::error::ClinicError;
use crate::forms::ValidationError;
use crate::identity::Session;
use crate::models::{Collection, DoctorProfile};

/// The signed-in doctor: session plus the stored profile, when present.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentDoctor {
    pub session: Session,
    pub profile: Option<DoctorProfile>,
}

impl CurrentDoctor {
    /// Name for the header; falls back to the sign-in email.
    pub fn display_name(&self) -> &str {
        match &self.profile {
            Some(profile) if !profile.name.trim().is_empty() => &profile.name,
            _ => &self.session.email,
        }
    }
}

pub fn sign_in(state: &ClinicState, email: &str, password: &str) -> Result<Session, ClinicError> {
    state.identity().sign_in(email, password).map_err(|e| {
        tracing::warn!("Sign-in rejected: {e}");
        ClinicError::from(e)
    })
}

/// Create the account, then write the profile under `doctors/<id>`.
pub fn sign_up(state: &ClinicState, name: &str, email: &str, password: &str) -> Result<Session, ClinicError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }

    let session = state.identity().sign_up(email, password)?;
    let profile = DoctorProfile {
        name: name.to_string(),
        email: session.email.clone(),
        created_at: Some(Utc::now()),
    };
    if let Err(e) = state
        .store()
        .put(Collection::Doctors, session.doctor_id, to_body(&profile)?)
    {
        tracing::error!(doctor_id = %session.doctor_id, "Error saving doctor profile: {e}");
        return Err(e.into());
    }
    Ok(session)
}

pub fn sign_out(state: &ClinicState) -> Result<(), ClinicError> {
    state.identity().sign_out()?;
    Ok(())
}

/// `None` when signed out. A missing or unreadable profile leaves
/// `profile` empty rather than failing.
pub fn current_doctor(state: &ClinicState) -> Option<CurrentDoctor> {
    let session = state.identity().current_session()?;
    let profile = match get_record_in::<DoctorProfile>(state.store(), Collection::Doctors, session.doctor_id) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(doctor_id = %session.doctor_id, "Error loading doctor profile: {e}");
            None
        }
    };
    Some(CurrentDoctor { session, profile })
}
