//! Maps transport profiles to transport implementations.

use std::sync::Arc;

use mailbridge_application::{MailTransport, TransportFactory};
use mailbridge_core::{AppError, AppResult};
use mailbridge_domain::TransportSettings;

use crate::{ConsoleMailTransport, SmtpMailTransport, SmtpTransportConfig};

/// Builds SMTP and console transports from profile settings.
///
/// The profile's `className` (or `scheme`) selects the implementation,
/// case-insensitively and with an optional `Transport` suffix, so `Smtp`,
/// `SmtpTransport` and `smtp` are equivalent.
#[derive(Clone, Default)]
pub struct LettreTransportFactory;

impl LettreTransportFactory {
    /// Creates a new transport factory.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TransportFactory for LettreTransportFactory {
    fn build(&self, settings: &TransportSettings) -> AppResult<Arc<dyn MailTransport>> {
        let Some(kind) = settings.kind() else {
            return Err(AppError::Configuration(
                "transport profile names neither a className nor a scheme".to_owned(),
            ));
        };

        match kind.trim_end_matches("transport") {
            "smtp" => Ok(Arc::new(SmtpMailTransport::new(
                SmtpTransportConfig::from_settings(settings)?,
            )?)),
            "console" | "debug" => Ok(Arc::new(ConsoleMailTransport::new())),
            _ => Err(AppError::Configuration(format!(
                "unsupported transport class '{kind}'"
            ))),
        }
    }
}
