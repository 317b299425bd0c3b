use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use teachteam::config::{AppConfig, AppEnvironment, StorageConfig};
use teachteam::error::AppError;
use teachteam::store::{FileStore, KeyValueStore, MemoryStore, StoreError};
use teachteam::workflows::accounts::{
    default_accounts, AccountService, CaptchaVerifier, ConfiguredCaptchaVerifier,
};
use teachteam::workflows::applicants::{default_applications, ApplicantService};
use tracing::{info, warn};

/// Store shared by every service in the process.
pub(crate) type SharedStore = Arc<dyn KeyValueStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// File-backed store when a data directory is configured, in-memory otherwise.
pub(crate) fn open_store(config: &StorageConfig) -> Result<SharedStore, StoreError> {
    match &config.data_dir {
        Some(dir) => {
            let store = FileStore::open(dir)?;
            info!(data_dir = %store.root().display(), "using file-backed store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("no data directory configured; state is kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Outside production a missing reCAPTCHA secret lets every token through.
pub(crate) fn captcha_verifier(config: &AppConfig) -> ConfiguredCaptchaVerifier {
    let allow_bypass = config.environment != AppEnvironment::Production;
    if config.captcha.secret.is_none() {
        if allow_bypass {
            warn!("RECAPTCHA_SECRET_KEY not set; captcha verification is bypassed");
        } else {
            warn!("RECAPTCHA_SECRET_KEY not set; sign-up is disabled");
        }
    }
    ConfiguredCaptchaVerifier::from_config(&config.captcha, allow_bypass)
}

/// Write the demo accounts and starter applications when the store has none.
pub(crate) fn seed_defaults<S, V>(
    accounts: &AccountService<S, V>,
    applicants: &ApplicantService<S>,
) -> Result<(), AppError>
where
    S: KeyValueStore + Clone,
    V: CaptchaVerifier + ?Sized,
{
    let users = accounts.seed(default_accounts())?;
    let applications = applicants.seed_if_empty(&default_applications())?;
    if users > 0 || applications > 0 {
        info!(users, applications, "seeded default data");
    }
    Ok(())
}
