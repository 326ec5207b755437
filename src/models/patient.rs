use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{lenient_age, timestamp, Collection, Record};

/// A patient as loaded from the `patients` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_age::deserialize")]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<NaiveDate>,
    pub doctor_id: Uuid,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Patient {
    const COLLECTION: Collection = Collection::Patients;

    fn id(&self) -> Uuid {
        self.id
    }

    fn doctor_id(&self) -> Uuid {
        self.doctor_id
    }
}

/// Fields written when a patient is created or edited.
///
/// `created_at` is only present on create so an edit never resets it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientWrite {
    pub name: String,
    pub age: Option<u32>,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub medical_history: String,
    pub doctor_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}
