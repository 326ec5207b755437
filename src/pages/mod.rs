//! Page controllers.
//!
//! Each page owns its rosters for as long as it is open: created on
//! entry, reloaded in full after every write, dropped on navigation.

pub mod appointments;
pub mod auth;
pub mod dashboard;
pub mod followups;
pub mod patients;

pub use appointments::AppointmentsPage;
pub use auth::{current_doctor, sign_in, sign_out, sign_up, CurrentDoctor};
pub use dashboard::DashboardSummary;
pub use followups::FollowUpsPage;
pub use patients::PatientsPage;

use uuid::Uuid;

use crate::clinic_state::ClinicState;
use crate::db::{get_record, DocumentStore, StoreError};
use crate::error::ClinicError;
use crate::models::Record;

/// Where a navigation request ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    Dashboard,
    Patients,
    Appointments,
    FollowUps,
}

impl Route {
    /// Signed-out visitors land on sign-in; signed-in doctors skip it.
    pub fn resolve(state: &ClinicState, requested: Route) -> Route {
        let signed_in = state.identity().current_session().is_some();
        match (requested, signed_in) {
            (Route::SignIn, true) => Route::Dashboard,
            (_, false) => Route::SignIn,
            (route, true) => route,
        }
    }
}

/// Fetch `id` and confirm the signed-in doctor owns it.
pub(crate) fn owned_record<T: Record>(
    store: &dyn DocumentStore,
    doctor_id: Uuid,
    id: Uuid,
) -> Result<T, ClinicError> {
    let record = get_record::<T>(store, id)?.ok_or_else(|| StoreError::NotFound {
        collection: T::COLLECTION.to_string(),
        id: id.to_string(),
    })?;
    if record.doctor_id() != doctor_id {
        tracing::warn!(collection = %T::COLLECTION, %id, "Rejected access to another doctor's record");
        return Err(StoreError::PermissionDenied {
            collection: T::COLLECTION.to_string(),
            id: id.to_string(),
        }
        .into());
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic_state::test_state;

    #[test]
    fn routes_follow_the_session() {
        let state = test_state();
        assert_eq!(Route::resolve(&state, Route::Patients), Route::SignIn);
        assert_eq!(Route::resolve(&state, Route::SignIn), Route::SignIn);

        state.identity().sign_up("grey@clinic.io", "secret1").unwrap();
        assert_eq!(Route::resolve(&state, Route::SignIn), Route::Dashboard);
        assert_eq!(Route::resolve(&state, Route::FollowUps), Route::FollowUps);
    }
}
