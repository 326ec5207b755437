//! Shared state for one desk instance.
//!
//! `ClinicState` owns the two collaborators (document store and identity
//! provider) plus configuration. Pages hold an `Arc<ClinicState>` and
//! their own rosters; nothing here is page-specific.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::ClinicConfig;
use crate::db::{Database, DocumentStore, SqliteDocumentStore, StoreError};
use crate::error::ClinicError;
use crate::identity::{IdentityProvider, LocalIdentityProvider};
use crate::models::Collection;

pub struct ClinicState {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    config: ClinicConfig,
    /// Collections with a save in flight.
    submissions: Mutex<HashSet<Collection>>,
}

impl ClinicState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        config: ClinicConfig,
    ) -> Self {
        Self {
            store,
            identity,
            config,
            submissions: Mutex::new(HashSet::new()),
        }
    }

    /// Open the on-disk database named by `config` and wire the local
    /// store and identity provider over it.
    pub fn open(config: ClinicConfig) -> Result<Self, StoreError> {
        let db = Arc::new(Database::open(&config.database_path)?);
        tracing::info!(path = %config.database_path.display(), "Clinic database opened");
        Ok(Self::over(db, config))
    }

    /// Same wiring over an in-memory database.
    pub fn in_memory(config: ClinicConfig) -> Result<Self, StoreError> {
        let db = Arc::new(Database::open_in_memory()?);
        Ok(Self::over(db, config))
    }

    fn over(db: Arc<Database>, config: ClinicConfig) -> Self {
        let store = Arc::new(SqliteDocumentStore::new(Arc::clone(&db)));
        let identity = Arc::new(LocalIdentityProvider::with_iterations(db, config.pbkdf2_iterations));
        Self::new(store, identity, config)
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    /// The signed-in doctor's id.
    pub fn require_doctor(&self) -> Result<Uuid, ClinicError> {
        self.identity
            .current_session()
            .map(|s| s.doctor_id)
            .ok_or(ClinicError::NoActiveSession)
    }

    /// The local calendar date used by every date policy.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    /// Claim the save slot for `collection`. A second claim while the
    /// first ticket is alive fails with `SubmissionInFlight`.
    pub fn begin_submit(&self, collection: Collection) -> Result<SubmitTicket<'_>, ClinicError> {
        let mut inflight = self
            .submissions
            .lock()
            .map_err(|_| ClinicError::Store(StoreError::LockPoisoned))?;
        if !inflight.insert(collection) {
            tracing::warn!(%collection, "Duplicate submission rejected");
            return Err(ClinicError::SubmissionInFlight(collection));
        }
        Ok(SubmitTicket {
            submissions: &self.submissions,
            collection,
        })
    }
}

/// Releases its collection's save slot on drop.
pub struct SubmitTicket<'a> {
    submissions: &'a Mutex<HashSet<Collection>>,
    collection: Collection,
}

impl Drop for SubmitTicket<'_> {
    fn drop(&mut self) {
        if let Ok(mut inflight) = self.submissions.lock() {
            inflight.remove(&self.collection);
        }
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> Arc<ClinicState> {
    let config = ClinicConfig {
        pbkdf2_iterations: 1_000,
        ..ClinicConfig::default()
    };
    Arc::new(ClinicState::in_memory(config).unwrap())
}
