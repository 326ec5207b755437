use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{timestamp, Collection, FollowUpStatus, Record};

/// A follow-up as loaded from the `followups` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    pub status: FollowUpStatus,
    pub doctor_id: Uuid,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for FollowUp {
    const COLLECTION: Collection = Collection::FollowUps;

    fn id(&self) -> Uuid {
        self.id
    }

    fn doctor_id(&self) -> Uuid {
        self.doctor_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpWrite {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub patient_phone: String,
    pub date: NaiveDate,
    pub notes: String,
    pub status: FollowUpStatus,
    pub doctor_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Partial update that marks a follow-up done and touches nothing else.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpCompletion {
    pub status: FollowUpStatus,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl FollowUpCompletion {
    pub fn now() -> Self {
        Self {
            status: FollowUpStatus::Completed,
            updated_at: Utc::now(),
        }
    }
}
