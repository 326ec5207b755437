//! Appointments: the main table, today/upcoming/past panels, a patient
//! picker for the form, and create/edit/delete.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::owned_record;
use crate::clinic_state::ClinicState;
use crate::db::{to_body, StoreError};
use crate::display::{
    NO_APPOINTMENTS, NO_APPOINTMENTS_TODAY, NO_PAST_APPOINTMENTS, NO_PATIENTS,
    NO_UPCOMING_APPOINTMENTS,
};
use crate::error::ClinicError;
use crate::forms::{AppointmentForm, WriteKind};
use crate::models::{Appointment, Collection, Patient};
use crate::roster::{
    filter_roster, load_appointments, load_patients, past_appointments, today_appointments,
    upcoming_appointments, Autocomplete, Commit, NavKey, Roster,
};

pub struct AppointmentsPage {
    state: Arc<ClinicState>,
    doctor_id: Uuid,
    today: NaiveDate,
    patients: Roster<Patient>,
    appointments: Roster<Appointment>,
    picker: Autocomplete,
    search: String,
}

impl AppointmentsPage {
    pub fn open(state: Arc<ClinicState>) -> Result<Self, ClinicError> {
        let doctor_id = state.require_doctor()?;
        let today = state.today();
        let picker = Autocomplete::new(state.config().enter_policy, NO_PATIENTS);
        let mut page = Self {
            state,
            doctor_id,
            today,
            patients: Roster::new(),
            appointments: Roster::new(),
            picker,
            search: String::new(),
        };
        page.reload_patients();
        page.reload();
        Ok(page)
    }

    /// Override the date the panels treat as today.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn reload(&mut self) -> bool {
        let store = self.state.store();
        let doctor_id = self.doctor_id;
        self.appointments.reload(|| load_appointments(store, doctor_id))
    }

    pub fn reload_patients(&mut self) -> bool {
        let store = self.state.store();
        let doctor_id = self.doctor_id;
        self.patients.reload(|| load_patients(store, doctor_id))
    }

    // ── Views ──────────────────────────────────────────────

    /// Main table, most recent first, narrowed by the search box.
    pub fn all(&self) -> Vec<&Appointment> {
        filter_roster(self.appointments.entries(), &self.search)
    }

    pub fn today_panel(&self) -> Vec<&Appointment> {
        today_appointments(self.appointments.entries(), self.today)
    }

    pub fn upcoming_panel(&self) -> Vec<&Appointment> {
        upcoming_appointments(self.appointments.entries(), self.today)
    }

    pub fn past_panel(&self) -> Vec<&Appointment> {
        past_appointments(self.appointments.entries(), self.today)
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn find(&self, id: Uuid) -> Option<&Appointment> {
        self.appointments.find(id)
    }

    pub fn patients(&self) -> &[Patient] {
        self.patients.entries()
    }

    pub const EMPTY_ALL: &'static str = NO_APPOINTMENTS;
    pub const EMPTY_TODAY: &'static str = NO_APPOINTMENTS_TODAY;
    pub const EMPTY_UPCOMING: &'static str = NO_UPCOMING_APPOINTMENTS;
    pub const EMPTY_PAST: &'static str = NO_PAST_APPOINTMENTS;

    // ── Patient picker ─────────────────────────────────────

    pub fn picker(&self) -> &Autocomplete {
        &self.picker
    }

    pub fn type_patient(&mut self, text: &str) {
        self.picker.input(text, self.patients.entries());
    }

    pub fn picker_key(&mut self, key: NavKey) -> Option<Commit> {
        self.picker.key_down(key)
    }

    pub fn picker_hover(&mut self, index: usize) {
        self.picker.hover(index);
    }

    pub fn picker_click(&mut self, index: usize) -> Option<Commit> {
        self.picker.click(index)
    }

    pub fn picker_click_outside(&mut self) {
        self.picker.click_outside();
    }

    // ── Forms ──────────────────────────────────────────────

    /// Blank form for a new appointment; clears the picker.
    pub fn new_form(&mut self) -> AppointmentForm {
        self.picker.reset();
        AppointmentForm::defaults(self.today)
    }

    /// Prefilled form; the picker is bound to the linked patient when
    /// that patient is still loaded.
    pub fn edit_form(&mut self, id: Uuid) -> Result<AppointmentForm, ClinicError> {
        let appointment = self.appointments.find(id).ok_or_else(|| not_found(id))?;
        let form = AppointmentForm::from_record(appointment);
        match self.patients.find(appointment.patient_id) {
            Some(patient) => self.picker.seed(patient.id, &patient.name),
            None => self.picker.reset(),
        }
        Ok(form)
    }

    /// Save the form. The patient comes from the picker's hidden
    /// selection, never from the form or the visible text.
    pub fn save(&mut self, editing: Option<Uuid>, form: &AppointmentForm) -> Result<Uuid, ClinicError> {
        let state = Arc::clone(&self.state);
        let _ticket = state.begin_submit(Collection::Appointments)?;
        let now = Utc::now();
        let form = AppointmentForm {
            patient_id: self.picker.selection(),
            ..form.clone()
        };
        let patients = self.patients.entries();

        let result = match editing {
            None => form
                .to_write(patients, self.doctor_id, WriteKind::Create, now)
                .map_err(ClinicError::from)
                .and_then(|write| Ok(state.store().create(Collection::Appointments, to_body(&write)?)?)),
            Some(id) => owned_record::<Appointment>(state.store(), self.doctor_id, id).and_then(|_| {
                let write = form.to_write(patients, self.doctor_id, WriteKind::Update, now)?;
                state.store().update(Collection::Appointments, id, to_body(&write)?)?;
                Ok(id)
            }),
        };

        match result {
            Ok(id) => {
                tracing::info!(%id, created = editing.is_none(), "Appointment saved");
                self.picker.reset();
                self.reload();
                Ok(id)
            }
            Err(e) => {
                tracing::error!("Error saving appointment: {e}");
                Err(e)
            }
        }
    }

    pub fn delete(&mut self, id: Uuid) -> Result<(), ClinicError> {
        let state = Arc::clone(&self.state);
        owned_record::<Appointment>(state.store(), self.doctor_id, id)
            .and_then(|_| Ok(state.store().delete(Collection::Appointments, id)?))
            .map_err(|e| {
                tracing::error!(%id, "Error deleting appointment: {e}");
                e
            })?;
        tracing::info!(%id, "Appointment deleted");
        self.reload();
        Ok(())
    }
}

fn not_found(id: Uuid) -> ClinicError {
    StoreError::NotFound {
        collection: Collection::Appointments.to_string(),
        id: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic_state::test_state;
    use crate::forms::{PatientForm, ValidationError};
    use crate::models::AppointmentStatus;
    use crate::pages::PatientsPage;
    use crate::roster::fixtures::date;
    use crate::roster::SuggestionState;

    /// A signed-in page with Alice and Bea on the roster, today pinned to 2024-01-10.
    fn page() -> AppointmentsPage {
        let state = test_state();
        state.identity().sign_up("grey@clinic.io", "secret1").unwrap();
        let mut patients = PatientsPage::open(Arc::clone(&state)).unwrap();
        for (name, phone) in [("Alice", "555-1"), ("Bea", "555-2")] {
            let form = PatientForm {
                name: name.into(),
                phone: phone.into(),
                ..PatientForm::default()
            };
            patients.save(None, &form).unwrap();
        }
        let mut page = AppointmentsPage::open(state).unwrap();
        page.set_today(date("2024-01-10"));
        page
    }

    fn pick(page: &mut AppointmentsPage, text: &str) {
        page.type_patient(text);
        page.picker_key(NavKey::ArrowDown);
        page.picker_key(NavKey::Enter).unwrap();
    }

    fn book(page: &mut AppointmentsPage, patient: &str, d: &str, t: &str, status: AppointmentStatus) -> Uuid {
        let mut form = page.new_form();
        pick(page, patient);
        form.date = d.into();
        form.time = t.into();
        form.status = status.as_str().into();
        page.save(None, &form).unwrap()
    }

    #[test]
    fn picker_searches_loaded_patients() {
        let mut page = page();
        page.type_patient("55");
        assert_eq!(page.picker().suggestions().len(), 2);
        page.type_patient("nobody");
        assert_eq!(page.picker().state(), SuggestionState::Empty);
        assert_eq!(page.picker().placeholder(), Some("No patients found"));
    }

    #[test]
    fn save_copies_selected_patient() {
        let mut page = page();
        let id = book(&mut page, "bea", "2024-01-12", "10:30", AppointmentStatus::Scheduled);
        let saved = page.find(id).unwrap();
        assert_eq!(saved.patient_name, "Bea");
        assert_eq!(saved.patient_phone, "555-2");
        assert_eq!(saved.doctor_id, page.doctor_id);
        assert_eq!(page.picker().selection(), None);
    }

    #[test]
    fn typed_text_without_commit_is_rejected() {
        let mut page = page();
        let mut form = page.new_form();
        page.type_patient("Alice");
        form.time = "09:00".into();

        // A stale id on the form is ignored; only the picker counts.
        form.patient_id = Some(page.patients()[0].id);
        let err = page.save(None, &form).unwrap_err();
        assert!(matches!(err, ClinicError::Validation(ValidationError::NoPatientSelected)));
        assert!(page.all().is_empty());
    }

    #[test]
    fn keystroke_after_commit_clears_selection() {
        let mut page = page();
        let mut form = page.new_form();
        pick(&mut page, "ali");
        page.type_patient("Alice");
        form.time = "09:00".into();
        assert!(page.save(None, &form).is_err());
    }

    #[test]
    fn panels_apply_date_policies() {
        let mut page = page();
        book(&mut page, "ali", "2024-01-10", "09:00", AppointmentStatus::Scheduled);
        book(&mut page, "ali", "2024-01-10", "14:00", AppointmentStatus::Completed);
        book(&mut page, "bea", "2024-01-09", "23:59", AppointmentStatus::Scheduled);
        book(&mut page, "bea", "2024-01-15", "08:00", AppointmentStatus::Scheduled);

        let times = |list: Vec<&Appointment>| -> Vec<String> {
            list.iter().map(|a| format!("{} {}", a.date, a.time.format("%H:%M"))).collect()
        };

        assert_eq!(
            times(page.all()),
            vec!["2024-01-15 08:00", "2024-01-10 14:00", "2024-01-10 09:00", "2024-01-09 23:59"]
        );
        assert_eq!(times(page.today_panel()), vec!["2024-01-10 14:00", "2024-01-10 09:00"]);
        assert_eq!(times(page.upcoming_panel()), vec!["2024-01-10 09:00", "2024-01-15 08:00"]);
        assert_eq!(times(page.past_panel()), vec!["2024-01-10 14:00", "2024-01-09 23:59"]);
    }

    #[test]
    fn search_covers_name_phone_and_reason() {
        let mut page = page();
        let mut form = page.new_form();
        pick(&mut page, "ali");
        form.time = "09:00".into();
        form.reason = "Blood pressure check".into();
        page.save(None, &form).unwrap();
        book(&mut page, "bea", "2024-01-11", "10:00", AppointmentStatus::Scheduled);

        page.set_search("PRESSURE");
        assert_eq!(page.all().len(), 1);
        page.set_search("555-2");
        assert_eq!(page.all()[0].patient_name, "Bea");
        page.set_search("");
        assert_eq!(page.all().len(), 2);
    }

    #[test]
    fn edit_seeds_picker_and_keeps_patient() {
        let mut page = page();
        let id = book(&mut page, "ali", "2024-01-10", "09:00", AppointmentStatus::Scheduled);

        let mut form = page.edit_form(id).unwrap();
        assert_eq!(page.picker().text(), "Alice");
        assert!(page.picker().selection().is_some());

        form.status = "Completed".into();
        page.save(Some(id), &form).unwrap();
        let saved = page.find(id).unwrap();
        assert_eq!(saved.status, AppointmentStatus::Completed);
        assert_eq!(saved.patient_name, "Alice");
        assert!(saved.created_at.is_some());
    }

    #[test]
    fn delete_reloads_table() {
        let mut page = page();
        let id = book(&mut page, "ali", "2024-01-10", "09:00", AppointmentStatus::Scheduled);
        page.delete(id).unwrap();
        assert!(page.all().is_empty());
        assert!(page.edit_form(id).is_err());
    }
}
