//! mailbridge command-line mailer.
//!
//! Bootstraps mail profiles from `MAILER_CONFIG_PATH` or the environment and
//! sends one message described by `MAILER_*` variables.

#![forbid(unsafe_code)]

mod mailer_config;
mod mailer_services;

use mailbridge_application::MessageComposer;
use mailbridge_core::AppError;
use mailbridge_infrastructure::LettreTransportFactory;
use tracing::info;

use crate::mailer_config::{MailerConfig, init_tracing};
use crate::mailer_services::build_profile_registry;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = MailerConfig::load()?;
    let registry = build_profile_registry(&config)?;

    let mut message = MessageComposer::from_registry(&registry, &LettreTransportFactory::new())?;

    if let Some(from_address) = &config.from_address {
        message.anonymize(from_address, config.from_name.as_deref())?;
    }

    if let Some(format) = &config.format {
        message.email_format(format);
    }

    message
        .to(&config.to, config.to_name.as_deref())
        .subject(&config.subject)
        .body(&config.body);

    if config.debug {
        println!("{}", message.render_debug());
        return Ok(());
    }

    message.send().await?;
    info!(to = %config.to, "email sent");

    Ok(())
}
