//! Display text for list rows and panels.

use chrono::{NaiveDate, NaiveTime};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NEVER: &str = "Never";

pub const NO_PATIENTS: &str = "No patients found";
pub const NO_APPOINTMENTS: &str = "No appointments found";
pub const NO_APPOINTMENTS_TODAY: &str = "No appointments today";
pub const NO_UPCOMING_APPOINTMENTS: &str = "No upcoming appointments";
pub const NO_PAST_APPOINTMENTS: &str = "No past appointments";
pub const NO_PENDING_FOLLOWUPS: &str = "No pending follow-ups";
pub const NO_COMPLETED_FOLLOWUPS: &str = "No completed follow-ups";
pub const NO_FOLLOWUPS: &str = "No follow-ups found";

/// `value` or "N/A" when blank.
pub fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

pub fn age_label(age: Option<u32>) -> String {
    age.map_or_else(|| NOT_AVAILABLE.to_string(), |a| a.to_string())
}

pub fn last_visit_label(last_visit: Option<NaiveDate>) -> String {
    last_visit.map_or_else(|| NEVER.to_string(), date_label)
}

pub fn date_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn time_label(time: NaiveTime) -> String {
    time.format(crate::models::hhmm::FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blanks_become_placeholders() {
        assert_eq!(or_na(""), "N/A");
        assert_eq!(or_na("   "), "N/A");
        assert_eq!(or_na("555-1"), "555-1");
        assert_eq!(age_label(None), "N/A");
        assert_eq!(age_label(Some(0)), "0");
        assert_eq!(last_visit_label(None), "Never");
    }

    #[test]
    fn dates_and_times_use_iso_forms() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(last_visit_label(Some(d)), "2024-03-07");
        assert_eq!(time_label(NaiveTime::from_hms_opt(9, 5, 30).unwrap()), "09:05");
    }
}
