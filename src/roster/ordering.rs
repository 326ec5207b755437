//! Ordering policies for each list view.
//!
//! All sorts are stable. Panels select from an already-sorted base list
//! and either keep its order or impose their own.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;

use super::UnknownOption;
use crate::models::{Appointment, AppointmentStatus, FollowUp, FollowUpStatus, Patient};

// ─── Comparators ──────────────────────────────────────────────────────────────

pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Earliest slot first. Double bookings fall back to the id so the order is total.
pub fn compare_slots(a: &Appointment, b: &Appointment) -> Ordering {
    (a.date, a.time, a.id).cmp(&(b.date, b.time, b.id))
}

// ─── Base lists ───────────────────────────────────────────────────────────────

pub fn sort_patients_by_name(patients: &mut [Patient]) {
    patients.sort_by(|a, b| compare_names(&a.name, &b.name));
}

/// Main appointments table: date descending, then time descending.
pub fn sort_appointments_recent_first(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| compare_slots(b, a));
}

pub fn sort_appointments_chronological(appointments: &mut [Appointment]) {
    appointments.sort_by(compare_slots);
}

pub fn sort_followups_recent_first(followups: &mut [FollowUp]) {
    followups.sort_by(|a, b| b.date.cmp(&a.date));
}

// ─── Appointment panels ───────────────────────────────────────────────────────

/// Appointments on `today`, in base-list order.
pub fn today_appointments(appointments: &[Appointment], today: NaiveDate) -> Vec<&Appointment> {
    appointments.iter().filter(|a| a.date == today).collect()
}

/// Scheduled appointments from today on, soonest first.
pub fn upcoming_appointments(appointments: &[Appointment], today: NaiveDate) -> Vec<&Appointment> {
    let mut upcoming: Vec<_> = appointments
        .iter()
        .filter(|a| a.date >= today && a.status == AppointmentStatus::Scheduled)
        .collect();
    upcoming.sort_by(|a, b| compare_slots(a, b));
    upcoming
}

/// Appointments before today or already completed, most recent first.
pub fn past_appointments(appointments: &[Appointment], today: NaiveDate) -> Vec<&Appointment> {
    let mut past: Vec<_> = appointments
        .iter()
        .filter(|a| a.date < today || a.status == AppointmentStatus::Completed)
        .collect();
    past.sort_by(|a, b| compare_slots(b, a));
    past
}

// ─── Follow-up panels ─────────────────────────────────────────────────────────

/// Which pending follow-ups the pending panel lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingWindow {
    /// Every pending follow-up; past-dated ones are flagged overdue.
    IncludeOverdue,
    /// Only pending follow-ups dated today or later.
    FromToday,
}

impl PendingWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncludeOverdue => "include-overdue",
            Self::FromToday => "from-today",
        }
    }
}

impl FromStr for PendingWindow {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "include-overdue" => Ok(Self::IncludeOverdue),
            "from-today" => Ok(Self::FromToday),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingFollowUp<'a> {
    pub followup: &'a FollowUp,
    pub overdue: bool,
}

pub fn is_overdue(followup: &FollowUp, today: NaiveDate) -> bool {
    followup.status == FollowUpStatus::Pending && followup.date < today
}

/// Pending follow-ups, earliest first, each flagged overdue when dated before today.
pub fn pending_followups(
    followups: &[FollowUp],
    today: NaiveDate,
    window: PendingWindow,
) -> Vec<PendingFollowUp<'_>> {
    let mut pending: Vec<_> = followups
        .iter()
        .filter(|f| f.status == FollowUpStatus::Pending)
        .filter(|f| window == PendingWindow::IncludeOverdue || f.date >= today)
        .collect();
    pending.sort_by(|a, b| a.date.cmp(&b.date));
    pending
        .into_iter()
        .map(|followup| PendingFollowUp {
            followup,
            overdue: is_overdue(followup, today),
        })
        .collect()
}

pub fn completed_followups(followups: &[FollowUp]) -> Vec<&FollowUp> {
    let mut done: Vec<_> = followups
        .iter()
        .filter(|f| f.status == FollowUpStatus::Completed)
        .collect();
    done.sort_by(|a, b| b.date.cmp(&a.date));
    done
}
