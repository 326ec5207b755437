use std::path::PathBuf;

use crate::identity::PBKDF2_ITERATIONS;
use crate::roster::autocomplete::EnterPolicy;
use crate::roster::ordering::PendingWindow;

/// Application-level constants
pub const APP_NAME: &str = "Clinic Desk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of rows shown in each dashboard panel.
pub const DASHBOARD_PANEL_SIZE: usize = 5;

/// Get the application data directory.
/// ~/ClinicDesk/ on all platforms; falls back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ClinicDesk")
}

/// Get the default database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,clinic_desk_lib=debug"
}

/// Runtime configuration for one clinic desk instance.
#[derive(Debug, Clone)]
pub struct ClinicConfig {
    pub database_path: PathBuf,
    pub pbkdf2_iterations: u32,
    pub enter_policy: EnterPolicy,
    pub pending_window: PendingWindow,
    pub dashboard_panel_size: usize,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            database_path: database_path(),
            pbkdf2_iterations: PBKDF2_ITERATIONS,
            enter_policy: EnterPolicy::Highlighted,
            pending_window: PendingWindow::IncludeOverdue,
            dashboard_panel_size: DASHBOARD_PANEL_SIZE,
        }
    }
}

impl ClinicConfig {
    /// Defaults overridden by `CLINIC_DESK_DB`, `CLINIC_DESK_ENTER_POLICY`
    /// and `CLINIC_DESK_PENDING_WINDOW`. Unrecognised values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("CLINIC_DESK_DB") {
            if !path.trim().is_empty() {
                config.database_path = PathBuf::from(path);
            }
        }

        if let Ok(value) = std::env::var("CLINIC_DESK_ENTER_POLICY") {
            match value.parse() {
                Ok(policy) => config.enter_policy = policy,
                Err(_) => tracing::warn!(%value, "Ignoring unknown CLINIC_DESK_ENTER_POLICY"),
            }
        }

        if let Ok(value) = std::env::var("CLINIC_DESK_PENDING_WINDOW") {
            match value.parse() {
                Ok(window) => config.pending_window = window,
                Err(_) => tracing::warn!(%value, "Ignoring unknown CLINIC_DESK_PENDING_WINDOW"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_folder() {
        assert!(app_data_dir().ends_with("ClinicDesk"));
    }

    #[test]
    fn database_path_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("clinic.db"));
    }

    #[test]
    fn app_name_is_clinic_desk() {
        assert_eq!(APP_NAME, "Clinic Desk");
    }

    #[test]
    fn default_config_uses_fixed_behaviour() {
        let config = ClinicConfig::default();
        assert_eq!(config.enter_policy, EnterPolicy::Highlighted);
        assert_eq!(config.pending_window, PendingWindow::IncludeOverdue);
        assert_eq!(config.dashboard_panel_size, 5);
        assert_eq!(config.pbkdf2_iterations, PBKDF2_ITERATIONS);
    }
}
