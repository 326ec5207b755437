//! Roster loading: one full fetch of the signed-in doctor's records.
//!
//! A reload either replaces the whole list or, on failure, leaves the
//! previous list untouched. There is no retry and no partial patching.

use uuid::Uuid;

use super::ordering::{sort_appointments_recent_first, sort_followups_recent_first, sort_patients_by_name};
use crate::db::{list_records, DocumentStore, Query, StoreError};
use crate::models::{Appointment, FollowUp, Patient, Record};

/// The in-memory list of one record kind for the current page.
#[derive(Debug, Clone)]
pub struct Roster<T> {
    entries: Vec<T>,
    loaded: bool,
}

impl<T> Default for Roster<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            loaded: false,
        }
    }
}

impl<T: Record> Roster<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether at least one fetch has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, id: Uuid) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn replace(&mut self, entries: Vec<T>) {
        self.entries = entries;
        self.loaded = true;
    }

    /// Run `fetch` and swap in its result. On error the old list stays
    /// and the failure is logged. Returns whether the list was replaced.
    pub fn reload<F>(&mut self, fetch: F) -> bool
    where
        F: FnOnce() -> Result<Vec<T>, StoreError>,
    {
        match fetch() {
            Ok(entries) => {
                tracing::debug!(collection = %T::COLLECTION, count = entries.len(), "Roster reloaded");
                self.replace(entries);
                true
            }
            Err(e) => {
                tracing::error!(collection = %T::COLLECTION, "Failed to load roster: {e}");
                false
            }
        }
    }
}

/// The doctor's patients, by name.
pub fn load_patients(store: &dyn DocumentStore, doctor_id: Uuid) -> Result<Vec<Patient>, StoreError> {
    let mut patients = list_records::<Patient>(store, &Query::owned_by(doctor_id))?;
    sort_patients_by_name(&mut patients);
    Ok(patients)
}

/// The doctor's appointments, most recent first.
pub fn load_appointments(store: &dyn DocumentStore, doctor_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
    let mut appointments = list_records::<Appointment>(store, &Query::owned_by(doctor_id))?;
    sort_appointments_recent_first(&mut appointments);
    Ok(appointments)
}

/// The doctor's follow-ups, most recent first.
pub fn load_followups(store: &dyn DocumentStore, doctor_id: Uuid) -> Result<Vec<FollowUp>, StoreError> {
    let mut followups = list_records::<FollowUp>(store, &Query::owned_by(doctor_id))?;
    sort_followups_recent_first(&mut followups);
    Ok(followups)
}
