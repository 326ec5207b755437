//! Follow-ups: pending and completed panels, the full list, a patient
//! picker, create/edit/delete and one-click completion.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::owned_record;
use crate::clinic_state::ClinicState;
use crate::db::{to_body, StoreError};
use crate::display::{NO_COMPLETED_FOLLOWUPS, NO_FOLLOWUPS, NO_PATIENTS, NO_PENDING_FOLLOWUPS};
use crate::error::ClinicError;
use crate::forms::{FollowUpForm, WriteKind};
use crate::models::{Collection, FollowUp, FollowUpCompletion, Patient};
use crate::roster::{
    completed_followups, filter_roster, load_followups, load_patients, pending_followups,
    Autocomplete, Commit, NavKey, PendingFollowUp, PendingWindow, Roster,
};

pub struct FollowUpsPage {
    state: Arc<ClinicState>,
    doctor_id: Uuid,
    today: NaiveDate,
    pending_window: PendingWindow,
    patients: Roster<Patient>,
    followups: Roster<FollowUp>,
    picker: Autocomplete,
    search: String,
}

impl FollowUpsPage {
    pub fn open(state: Arc<ClinicState>) -> Result<Self, ClinicError> {
        let doctor_id = state.require_doctor()?;
        let today = state.today();
        let pending_window = state.config().pending_window;
        let picker = Autocomplete::new(state.config().enter_policy, NO_PATIENTS);
        let mut page = Self {
            state,
            doctor_id,
            today,
            pending_window,
            patients: Roster::new(),
            followups: Roster::new(),
            picker,
            search: String::new(),
        };
        page.reload_patients();
        page.reload();
        Ok(page)
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn set_pending_window(&mut self, window: PendingWindow) {
        self.pending_window = window;
    }

    pub fn reload(&mut self) -> bool {
        let store = self.state.store();
        let doctor_id = self.doctor_id;
        self.followups.reload(|| load_followups(store, doctor_id))
    }

    pub fn reload_patients(&mut self) -> bool {
        let store = self.state.store();
        let doctor_id = self.doctor_id;
        self.patients.reload(|| load_patients(store, doctor_id))
    }

    // ── Views ──────────────────────────────────────────────

    pub fn all(&self) -> Vec<&FollowUp> {
        filter_roster(self.followups.entries(), &self.search)
    }

    pub fn pending_panel(&self) -> Vec<PendingFollowUp<'_>> {
        pending_followups(self.followups.entries(), self.today, self.pending_window)
    }

    pub fn completed_panel(&self) -> Vec<&FollowUp> {
        completed_followups(self.followups.entries())
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn find(&self, id: Uuid) -> Option<&FollowUp> {
        self.followups.find(id)
    }

    pub fn patients(&self) -> &[Patient] {
        self.patients.entries()
    }

    pub const EMPTY_ALL: &'static str = NO_FOLLOWUPS;
    pub const EMPTY_PENDING: &'static str = NO_PENDING_FOLLOWUPS;
    pub const EMPTY_COMPLETED: &'static str = NO_COMPLETED_FOLLOWUPS;

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

    pub fn new_form(&mut self) -> FollowUpForm {
        self.picker.reset();
        FollowUpForm::defaults(self.today)
    }

    pub fn edit_form(&mut self, id: Uuid) -> Result<FollowUpForm, ClinicError> {
        let followup = self.followups.find(id).ok_or_else(|| not_found(id))?;
        let form = FollowUpForm::from_record(followup);
        match self.patients.find(followup.patient_id) {
            Some(patient) => self.picker.seed(patient.id, &patient.name),
            None => self.picker.reset(),
        }
        Ok(form)
    }

    pub fn save(&mut self, editing: Option<Uuid>, form: &FollowUpForm) -> Result<Uuid, ClinicError> {
        let state = Arc::clone(&self.state);
        let _ticket = state.begin_submit(Collection::FollowUps)?;
        let now = Utc::now();
        let form = FollowUpForm {
            patient_id: self.picker.selection(),
            ..form.clone()
        };
        let patients = self.patients.entries();

        let result = match editing {
            None => form
                .to_write(patients, self.doctor_id, WriteKind::Create, now)
                .map_err(ClinicError::from)
                .and_then(|write| Ok(state.store().create(Collection::FollowUps, to_body(&write)?)?)),
            Some(id) => owned_record::<FollowUp>(state.store(), self.doctor_id, id).and_then(|_| {
                let write = form.to_write(patients, self.doctor_id, WriteKind::Update, now)?;
                state.store().update(Collection::FollowUps, id, to_body(&write)?)?;
                Ok(id)
            }),
        };

        match result {
            Ok(id) => {
                tracing::info!(%id, created = editing.is_none(), "Follow-up saved");
                self.picker.reset();
                self.reload();
                Ok(id)
            }
            Err(e) => {
                tracing::error!("Error saving follow-up: {e}");
                Err(e)
            }
        }
    }

    /// Mark done. Only `status` and `updatedAt` change.
    pub fn complete(&mut self, id: Uuid) -> Result<(), ClinicError> {
        let state = Arc::clone(&self.state);
        let _ticket = state.begin_submit(Collection::FollowUps)?;
        owned_record::<FollowUp>(state.store(), self.doctor_id, id)
            .and_then(|_| {
                let body = to_body(&FollowUpCompletion::now())?;
                Ok(state.store().update(Collection::FollowUps, id, body)?)
            })
            .map_err(|e| {
                tracing::error!(%id, "Error completing follow-up: {e}");
                e
            })?;
        tracing::info!(%id, "Follow-up completed");
        self.reload();
        Ok(())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<(), ClinicError> {
        let state = Arc::clone(&self.state);
        owned_record::<FollowUp>(state.store(), self.doctor_id, id)
            .and_then(|_| Ok(state.store().delete(Collection::FollowUps, id)?))
            .map_err(|e| {
                tracing::error!(%id, "Error deleting follow-up: {e}");
                e
            })?;
        tracing::info!(%id, "Follow-up deleted");
        self.reload();
        Ok(())
    }
}

fn not_found(id: Uuid) -> ClinicError {
    StoreError::NotFound {
        collection: Collection::FollowUps.to_string(),
        id: id.to_string(),
    }
    .into()
}
