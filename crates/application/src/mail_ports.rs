//! Ports for mail delivery and host configuration.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use mailbridge_core::AppResult;
use mailbridge_domain::{OutgoingMail, TransportSettings};

/// Port for delivering composed messages. Infrastructure provides SMTP or
/// console implementations.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Delivers one message. A failure means nothing was accepted for delivery.
    async fn deliver(&self, mail: &OutgoingMail) -> AppResult<()>;
}

/// Read-only view of the host application's configuration.
pub trait HostConfigStore: Send + Sync {
    /// Looks up a value by dotted path, e.g. `Email.default`.
    fn read(&self, path: &str) -> Option<Value>;
}

/// Builds transports from registered transport settings.
pub trait TransportFactory: Send + Sync {
    /// Creates a transport for the given settings.
    fn build(&self, settings: &TransportSettings) -> AppResult<Arc<dyn MailTransport>>;
}
