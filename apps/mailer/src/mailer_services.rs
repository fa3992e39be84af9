use std::sync::Arc;

use mailbridge_application::{MailConfigBridge, ProfileRegistry};
use mailbridge_core::AppError;
use mailbridge_infrastructure::{EnvConfigStore, JsonConfigStore};

use crate::mailer_config::MailerConfig;

/// Registers the default profiles from the configuration file, falling back
/// to `SMTP_*`/`MAIL_*` environment variables.
pub fn build_profile_registry(config: &MailerConfig) -> Result<ProfileRegistry, AppError> {
    let primary = match &config.config_path {
        Some(path) => JsonConfigStore::from_file(path)?,
        None => JsonConfigStore::default(),
    };

    let bridge = MailConfigBridge::new(Arc::new(primary))
        .with_fallback(Arc::new(EnvConfigStore::from_env()));

    let registry = ProfileRegistry::new();
    bridge.bootstrap(&registry)?;

    Ok(registry)
}
