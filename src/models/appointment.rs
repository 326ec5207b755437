use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{hhmm, timestamp, AppointmentStatus, Collection, Record};

/// An appointment as loaded from the `appointments` collection.
///
/// `patient_name` and `patient_phone` are copies taken when the appointment
/// was saved; later edits to the patient do not flow back here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub reason: String,
    pub status: AppointmentStatus,
    pub doctor_id: Uuid,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Appointment {
    const COLLECTION: Collection = Collection::Appointments;

    fn id(&self) -> Uuid {
        self.id
    }

    fn doctor_id(&self) -> Uuid {
        self.doctor_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentWrite {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub patient_phone: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub reason: String,
    pub status: AppointmentStatus,
    pub doctor_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_stored_document_shape() {
        let doc = json!({
            "id": "6f1c1a56-6a55-4b8e-9d54-0f9f3c0b6a11",
            "patientId": "0b9f5a61-1c53-4f59-8f8e-2d0f1a2b3c4d",
            "patientName": "Alice",
            "date": "2024-01-10",
            "time": "09:00",
            "status": "Scheduled",
            "doctorId": "9a3e2b1c-0d4f-4e5a-8b6c-7d8e9f0a1b2c",
            "createdAt": "2024-01-01T10:00:00.000Z"
        });
        let appt: Appointment = serde_json::from_value(doc).unwrap();
        assert_eq!(appt.patient_name, "Alice");
        assert_eq!(appt.patient_phone, "");
        assert_eq!(appt.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert!(appt.created_at.is_some());
        assert!(appt.updated_at.is_none());
    }

    #[test]
    fn write_omits_created_at_on_update() {
        let write = AppointmentWrite {
            patient_id: Uuid::new_v4(),
            patient_name: "Alice".into(),
            patient_phone: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            reason: String::new(),
            status: AppointmentStatus::Completed,
            doctor_id: Uuid::new_v4(),
            created_at: None,
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&write).unwrap();
        assert!(value.get("createdAt").is_none());
        assert_eq!(value["time"], "14:00");
        assert_eq!(value["date"], "2024-01-10");
    }
}
