pub mod clinic_state;
pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod forms;
pub mod identity;
pub mod models;
pub mod pages;
pub mod roster;

pub use clinic_state::ClinicState;
pub use config::ClinicConfig;
pub use error::ClinicError;

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` wins over the default filter.
/// Calling this more than once keeps the first subscriber.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
