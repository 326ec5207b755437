//! Patient directory: name-sorted roster, free-text search, and
//! create/edit/delete.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::owned_record;
use crate::clinic_state::ClinicState;
use crate::db::{to_body, StoreError};
use crate::display::NO_PATIENTS;
use crate::error::ClinicError;
use crate::forms::{PatientForm, WriteKind};
use crate::models::{Collection, Patient};
use crate::roster::{filter_roster, load_patients, Roster};

pub struct PatientsPage {
    state: Arc<ClinicState>,
    doctor_id: Uuid,
    patients: Roster<Patient>,
    search: String,
}

impl PatientsPage {
    /// Enter the page: requires a session, loads the roster once.
    pub fn open(state: Arc<ClinicState>) -> Result<Self, ClinicError> {
        let doctor_id = state.require_doctor()?;
        let mut page = Self {
            state,
            doctor_id,
            patients: Roster::new(),
            search: String::new(),
        };
        page.reload();
        Ok(page)
    }

    pub fn reload(&mut self) -> bool {
        let store = self.state.store();
        let doctor_id = self.doctor_id;
        self.patients.reload(|| load_patients(store, doctor_id))
    }

    pub fn patients(&self) -> &[Patient] {
        self.patients.entries()
    }

    pub fn find(&self, id: Uuid) -> Option<&Patient> {
        self.patients.find(id)
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    /// The directory table: every patient when the search is blank.
    pub fn visible(&self) -> Vec<&Patient> {
        filter_roster(self.patients.entries(), &self.search)
    }

    pub fn empty_message(&self) -> &'static str {
        NO_PATIENTS
    }

    pub fn new_form(&self) -> PatientForm {
        PatientForm::default()
    }

    pub fn edit_form(&self, id: Uuid) -> Result<PatientForm, ClinicError> {
        self.patients
            .find(id)
            .map(PatientForm::from_record)
            .ok_or_else(|| not_found(id))
    }

    /// Create (`editing == None`) or update a patient, then reload.
    pub fn save(&mut self, editing: Option<Uuid>, form: &PatientForm) -> Result<Uuid, ClinicError> {
        let state = Arc::clone(&self.state);
        let _ticket = state.begin_submit(Collection::Patients)?;
        let now = Utc::now();

        let result = match editing {
            None => form
                .to_write(self.doctor_id, WriteKind::Create, now)
                .map_err(ClinicError::from)
                .and_then(|write| Ok(state.store().create(Collection::Patients, to_body(&write)?)?)),
            Some(id) => owned_record::<Patient>(state.store(), self.doctor_id, id).and_then(|_| {
                let write = form.to_write(self.doctor_id, WriteKind::Update, now)?;
                state.store().update(Collection::Patients, id, to_body(&write)?)?;
                Ok(id)
            }),
        };

        match result {
            Ok(id) => {
                tracing::info!(%id, created = editing.is_none(), "Patient saved");
                self.reload();
                Ok(id)
            }
            Err(e) => {
                tracing::error!("Error saving patient: {e}");
                Err(e)
            }
        }
    }

    pub fn delete(&mut self, id: Uuid) -> Result<(), ClinicError> {
        let state = Arc::clone(&self.state);
        owned_record::<Patient>(state.store(), self.doctor_id, id)
            .and_then(|_| Ok(state.store().delete(Collection::Patients, id)?))
            .map_err(|e| {
                tracing::error!(%id, "Error deleting patient: {e}");
                e
            })?;
        tracing::info!(%id, "Patient deleted");
        self.reload();
        Ok(())
    }
}

fn not_found(id: Uuid) -> ClinicError {
    StoreError::NotFound {
        collection: Collection::Patients.to_string(),
        id: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic_state::test_state;
    use crate::db::StoreFailureKind;
    use crate::forms::ValidationError;

    fn form(name: &str, phone: &str) -> PatientForm {
        PatientForm {
            name: name.into(),
            phone: phone.into(),
            ..PatientForm::default()
        }
    }

    fn signed_in_page() -> PatientsPage {
        let state = test_state();
        state.identity().sign_up("grey@clinic.io", "secret1").unwrap();
        PatientsPage::open(state).unwrap()
    }

    #[test]
    fn open_requires_session() {
        let state = test_state();
        assert!(matches!(PatientsPage::open(state), Err(ClinicError::NoActiveSession)));
    }

    #[test]
    fn save_creates_and_reloads_sorted() {
        let mut page = signed_in_page();
        page.save(None, &form("bob", "555-2")).unwrap();
        page.save(None, &form("Amy", "555-1")).unwrap();

        let names: Vec<_> = page.patients().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "bob"]);
        assert!(page.patients().iter().all(|p| p.created_at.is_some()));
    }

    #[test]
    fn edit_keeps_created_at() {
        let mut page = signed_in_page();
        let id = page.save(None, &form("Amy", "555-1")).unwrap();
        let created = page.find(id).unwrap().created_at;

        let mut edit = page.edit_form(id).unwrap();
        edit.name = "Amy Pond".into();
        edit.age = "30".into();
        page.save(Some(id), &edit).unwrap();

        let amy = page.find(id).unwrap();
        assert_eq!(amy.name, "Amy Pond");
        assert_eq!(amy.age, Some(30));
        assert_eq!(amy.created_at, created);
        assert!(amy.updated_at >= created);
    }

    #[test]
    fn invalid_form_writes_nothing() {
        let mut page = signed_in_page();
        let err = page.save(None, &form("  ", "")).unwrap_err();
        assert!(matches!(err, ClinicError::Validation(ValidationError::MissingField("name"))));
        assert!(page.patients().is_empty());
    }

    #[test]
    fn search_filters_the_directory() {
        let mut page = signed_in_page();
        page.save(None, &form("Alice", "555-1")).unwrap();
        page.save(None, &form("Bea", "555-2")).unwrap();

        page.set_search("  ");
        assert_eq!(page.visible().len(), 2);
        page.set_search("BEA");
        assert_eq!(page.visible()[0].name, "Bea");
        page.set_search("zzz");
        assert!(page.visible().is_empty());
        assert_eq!(page.empty_message(), "No patients found");
    }

    #[test]
    fn delete_removes_and_reloads() {
        let mut page = signed_in_page();
        let id = page.save(None, &form("Amy", "")).unwrap();
        page.delete(id).unwrap();
        assert!(page.patients().is_empty());
        assert!(page.edit_form(id).is_err());
    }

    #[test]
    fn other_doctors_records_are_off_limits() {
        let state = test_state();
        state.identity().sign_up("grey@clinic.io", "secret1").unwrap();
        let mut grey = PatientsPage::open(Arc::clone(&state)).unwrap();
        let id = grey.save(None, &form("Amy", "")).unwrap();

        state.identity().sign_up("house@clinic.io", "secret1").unwrap();
        let mut house = PatientsPage::open(Arc::clone(&state)).unwrap();
        assert!(house.patients().is_empty());

        match house.delete(id) {
            Err(ClinicError::Store(e)) => assert_eq!(e.kind(), StoreFailureKind::PermissionDenied),
            other => panic!("expected permission denied, got {other:?}"),
        }
        assert!(matches!(house.save(Some(id), &form("Mine", "")), Err(ClinicError::Store(_))));
        assert!(state.store().get(Collection::Patients, id).unwrap().is_some());
    }

    #[test]
    fn double_submit_is_rejected() {
        let mut page = signed_in_page();
        let state = Arc::clone(&page.state);
        let _held = state.begin_submit(Collection::Patients).unwrap();
        assert!(matches!(
            page.save(None, &form("Amy", "")),
            Err(ClinicError::SubmissionInFlight(Collection::Patients))
        ));
        assert!(state.store().list(Collection::Patients, &Default::default()).unwrap().is_empty());
    }
}
