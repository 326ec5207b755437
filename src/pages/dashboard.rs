//! Dashboard counters and panels. Everything is scoped to the signed-in
//! doctor and fetched with store-side filters.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::auth::current_doctor;
use crate::clinic_state::ClinicState;
use crate::db::{list_records, Direction, Filter, Query};
use crate::display::date_label;
use crate::error::ClinicError;
use crate::models::{Appointment, AppointmentStatus, Collection, FollowUpStatus, Patient};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub doctor_name: String,
    pub total_patients: usize,
    pub today_appointments: usize,
    pub pending_followups: usize,
    pub month_appointments: usize,
    pub recent_patients: Vec<Patient>,
    pub upcoming_appointments: Vec<Appointment>,
}

impl DashboardSummary {
    pub fn load(state: &ClinicState, today: NaiveDate) -> Result<Self, ClinicError> {
        let doctor = current_doctor(state).ok_or(ClinicError::NoActiveSession)?;
        let doctor_id = doctor.session.doctor_id;
        let store = state.store();
        let panel = state.config().dashboard_panel_size;
        let mine = || Query::owned_by(doctor_id);
        let today_str = date_label(today);
        let first_of_month = date_label(today.with_day(1).unwrap_or(today));

        let count = |collection: Collection, query: Query| -> Result<usize, ClinicError> {
            Ok(store.list(collection, &query)?.len())
        };

        let total_patients = count(Collection::Patients, mine())?;
        let today_appointments = count(
            Collection::Appointments,
            mine().filter(Filter::eq("date", today_str.as_str())),
        )?;
        let pending_followups = count(
            Collection::FollowUps,
            mine().filter(Filter::eq("status", FollowUpStatus::Pending.as_str())),
        )?;
        let month_appointments = count(
            Collection::Appointments,
            mine().filter(Filter::gte("date", first_of_month.as_str())),
        )?;

        let recent_patients = list_records::<Patient>(
            store,
            &mine().order_by("createdAt", Direction::Desc).limit(panel),
        )?;
        let upcoming_appointments = list_records::<Appointment>(
            store,
            &mine()
                .filter(Filter::gte("date", today_str.as_str()))
                .filter(Filter::eq("status", AppointmentStatus::Scheduled.as_str()))
                .order_by("date", Direction::Asc)
                .order_by("time", Direction::Asc)
                .limit(panel),
        )?;

        tracing::debug!(
            %doctor_id,
            total_patients,
            today_appointments,
            pending_followups,
            "Dashboard loaded"
        );

        Ok(Self {
            doctor_name: doctor.display_name().to_string(),
            total_patients,
            today_appointments,
            pending_followups,
            month_appointments,
            recent_patients,
            upcoming_appointments,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::to_body;
    use crate::models::{AppointmentWrite, FollowUpWrite, PatientWrite};
    use crate::pages::auth::sign_up;
    use crate::roster::fixtures::{date, time};
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    fn add_patient(state: &ClinicState, doctor_id: Uuid, name: &str, minutes_ago: i64) -> Uuid {
        add_patient_at(state, doctor_id, name, Utc::now() - Duration::minutes(minutes_ago))
    }

    fn add_patient_at(state: &ClinicState, doctor_id: Uuid, name: &str, now: DateTime<Utc>) -> Uuid {
        let write = PatientWrite {
            name: name.into(),
            age: None,
            gender: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            medical_history: String::new(),
            doctor_id,
            created_at: Some(now),
            updated_at: now,
        };
        state.store().create(Collection::Patients, to_body(&write).unwrap()).unwrap()
    }

    fn add_appointment(state: &ClinicState, doctor_id: Uuid, d: &str, t: &str, status: AppointmentStatus) {
        let write = AppointmentWrite {
            patient_id: Uuid::new_v4(),
            patient_name: "Alice".into(),
            patient_phone: String::new(),
            date: date(d),
            time: time(t),
            reason: String::new(),
            status,
            doctor_id,
            created_at: Some(Utc::now()),
            updated_at: Utc::now(),
        };
        state.store().create(Collection::Appointments, to_body(&write).unwrap()).unwrap();
    }

    fn add_followup(state: &ClinicState, doctor_id: Uuid, d: &str, status: FollowUpStatus) {
        let write = FollowUpWrite {
            patient_id: Uuid::new_v4(),
            patient_name: "Alice".into(),
            patient_phone: String::new(),
            date: date(d),
            notes: String::new(),
            status,
            doctor_id,
            created_at: Some(Utc::now()),
            updated_at: Utc::now(),
        };
        state.store().create(Collection::FollowUps, to_body(&write).unwrap()).unwrap();
    }

    #[test]
    fn requires_session() {
        let state = crate::clinic_state::test_state();
        assert!(matches!(
            DashboardSummary::load(&state, date("2024-01-10")),
            Err(ClinicError::NoActiveSession)
        ));
    }

    #[test]
    fn counts_and_panels_are_scoped_to_doctor() {
        let state: Arc<ClinicState> = crate::clinic_state::test_state();
        let other = Uuid::new_v4();
        let me = sign_up(&state, "Dr. Grey", "grey@clinic.io", "secret1").unwrap().doctor_id;

        for (i, name) in ["P1", "P2", "P3", "P4", "P5", "P6"].iter().enumerate() {
            add_patient(&state, me, name, 60 - i as i64);
        }
        add_patient(&state, other, "Not mine", 0);

        add_appointment(&state, me, "2024-01-10", "15:00", AppointmentStatus::Scheduled);
        add_appointment(&state, me, "2024-01-10", "09:00", AppointmentStatus::Completed);
        add_appointment(&state, me, "2024-01-02", "09:00", AppointmentStatus::Completed);
        add_appointment(&state, me, "2023-12-30", "09:00", AppointmentStatus::Scheduled);
        add_appointment(&state, me, "2024-02-01", "08:00", AppointmentStatus::Scheduled);
        add_appointment(&state, me, "2024-01-11", "10:00", AppointmentStatus::Cancelled);
        add_appointment(&state, other, "2024-01-10", "10:00", AppointmentStatus::Scheduled);

        add_followup(&state, me, "2023-12-01", FollowUpStatus::Pending);
        add_followup(&state, me, "2024-03-01", FollowUpStatus::Pending);
        add_followup(&state, me, "2024-01-01", FollowUpStatus::Completed);
        add_followup(&state, other, "2024-01-10", FollowUpStatus::Pending);

        let summary = DashboardSummary::load(&state, date("2024-01-10")).unwrap();
        assert_eq!(summary.doctor_name, "Dr. Grey");
        assert_eq!(summary.total_patients, 6);
        assert_eq!(summary.today_appointments, 2);
        assert_eq!(summary.pending_followups, 2);
        // First of month onwards, including later months.
        assert_eq!(summary.month_appointments, 5);

        let recent: Vec<_> = summary.recent_patients.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(recent, vec!["P6", "P5", "P4", "P3", "P2"]);

        let upcoming: Vec<_> = summary
            .upcoming_appointments
            .iter()
            .map(|a| format!("{} {}", a.date, a.time.format("%H:%M")))
            .collect();
        assert_eq!(upcoming, vec!["2024-01-10 15:00", "2024-02-01 08:00"]);
    }

    #[test]
    fn recent_patients_order_survives_sub_second_timestamps() {
        let state = crate::clinic_state::test_state();
        let me = sign_up(&state, "Dr. Grey", "grey@clinic.io", "secret1").unwrap().doctor_id;
        let base = DateTime::parse_from_rfc3339("2024-01-10T10:00:00Z").unwrap().with_timezone(&Utc);

        add_patient_at(&state, me, "On the second", base);
        add_patient_at(&state, me, "Half past", base + Duration::milliseconds(500));
        add_patient_at(&state, me, "Nanos", base + Duration::nanoseconds(123_456_789));

        let summary = DashboardSummary::load(&state, date("2024-01-10")).unwrap();
        let recent: Vec<_> = summary.recent_patients.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(recent, vec!["Half past", "Nanos", "On the second"]);
    }
}
