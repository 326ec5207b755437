//! Form-to-record mapping.
//!
//! Forms hold raw input text. Saving maps a form to a write payload:
//! text is trimmed, dates and times are parsed, the owning doctor is
//! stamped, and `createdAt` is set only when the record is new.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::display::{date_label, time_label};
use crate::models::{
    hhmm, Appointment, AppointmentStatus, AppointmentWrite, FollowUp, FollowUpStatus,
    FollowUpWrite, Patient, PatientWrite,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in the {0} field")]
    MissingField(&'static str),

    #[error("Please select a patient")]
    NoPatientSelected,

    #[error("Selected patient is no longer available: {0}")]
    UnknownPatient(Uuid),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid age: {0}")]
    InvalidAge(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),
}

/// Whether a save creates a record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

impl WriteKind {
    fn created_at(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Create => Some(now),
            Self::Update => None,
        }
    }
}

// ─── Field parsing ────────────────────────────────────────────────────────────

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

/// Blank or non-numeric ⇒ absent; negative or out of range ⇒ error.
pub fn parse_age(raw: &str) -> Result<Option<u32>, ValidationError> {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| ValidationError::InvalidAge(raw.to_string())),
        Err(_) => Ok(None),
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = required(raw, "date")?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate(raw))
}

fn parse_status<S: FromStr>(raw: &str) -> Result<S, ValidationError> {
    let raw = raw.trim();
    S::from_str(raw).map_err(|_| ValidationError::InvalidStatus(raw.to_string()))
}

/// Resolve the hidden selection value against the loaded patients.
pub fn resolve_patient(selection: Option<Uuid>, patients: &[Patient]) -> Result<&Patient, ValidationError> {
    let id = selection.ok_or(ValidationError::NoPatientSelected)?;
    patients
        .iter()
        .find(|p| p.id == id)
        .ok_or(ValidationError::UnknownPatient(id))
}

// ─── Patient ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub medical_history: String,
}

impl PatientForm {
    pub fn from_record(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            age: patient.age.map(|a| a.to_string()).unwrap_or_default(),
            gender: patient.gender.clone(),
            phone: patient.phone.clone(),
            email: patient.email.clone(),
            address: patient.address.clone(),
            medical_history: patient.medical_history.clone(),
        }
    }

    pub fn to_write(
        &self,
        doctor_id: Uuid,
        kind: WriteKind,
        now: DateTime<Utc>,
    ) -> Result<PatientWrite, ValidationError> {
        Ok(PatientWrite {
            name: required(&self.name, "name")?,
            age: parse_age(&self.age)?,
            gender: self.gender.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
            medical_history: self.medical_history.trim().to_string(),
            doctor_id,
            created_at: kind.created_at(now),
            updated_at: now,
        })
    }
}

// ─── Appointment ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentForm {
    /// Hidden selection value from the patient picker.
    pub patient_id: Option<Uuid>,
    pub date: String,
    pub time: String,
    pub reason: String,
    pub status: String,
}

impl AppointmentForm {
    /// A blank form for a new appointment: scheduled, dated today.
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            patient_id: None,
            date: date_label(today),
            time: String::new(),
            reason: String::new(),
            status: AppointmentStatus::Scheduled.as_str().to_string(),
        }
    }

    pub fn from_record(appointment: &Appointment) -> Self {
        Self {
            patient_id: Some(appointment.patient_id),
            date: date_label(appointment.date),
            time: time_label(appointment.time),
            reason: appointment.reason.clone(),
            status: appointment.status.as_str().to_string(),
        }
    }

    pub fn to_write(
        &self,
        patients: &[Patient],
        doctor_id: Uuid,
        kind: WriteKind,
        now: DateTime<Utc>,
    ) -> Result<AppointmentWrite, ValidationError> {
        let patient = resolve_patient(self.patient_id, patients)?;
        let date = parse_date(&self.date)?;
        let time_raw = required(&self.time, "time")?;
        let time = hhmm::parse(&time_raw).ok_or(ValidationError::InvalidTime(time_raw))?;

        Ok(AppointmentWrite {
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            patient_phone: patient.phone.clone(),
            date,
            time,
            reason: self.reason.trim().to_string(),
            status: parse_status::<AppointmentStatus>(&self.status)?,
            doctor_id,
            created_at: kind.created_at(now),
            updated_at: now,
        })
    }
}

// ─── Follow-up ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpForm {
    pub patient_id: Option<Uuid>,
    pub date: String,
    pub notes: String,
    pub status: String,
}

impl FollowUpForm {
    /// A blank form for a new follow-up: pending, dated today.
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            patient_id: None,
            date: date_label(today),
            notes: String::new(),
            status: FollowUpStatus::Pending.as_str().to_string(),
        }
    }

    pub fn from_record(followup: &FollowUp) -> Self {
        Self {
            patient_id: Some(followup.patient_id),
            date: date_label(followup.date),
            notes: followup.notes.clone(),
            status: followup.status.as_str().to_string(),
        }
    }

    pub fn to_write(
        &self,
        patients: &[Patient],
        doctor_id: Uuid,
        kind: WriteKind,
        now: DateTime<Utc>,
    ) -> Result<FollowUpWrite, ValidationError> {
        let patient = resolve_patient(self.patient_id, patients)?;

        Ok(FollowUpWrite {
            patient_id: patient.id,
            patient_name: patient.name.clone(),
            patient_phone: patient.phone.clone(),
            date: parse_date(&self.date)?,
            notes: self.notes.trim().to_string(),
            status: parse_status::<FollowUpStatus>(&self.status)?,
            doctor_id,
            created_at: kind.created_at(now),
            updated_at: now,
        })
    }
}
