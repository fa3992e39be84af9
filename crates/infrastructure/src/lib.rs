//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_mail_transport;
mod env_config_store;
mod json_config_store;
mod lettre_transport_factory;
mod smtp_mail_transport;

pub use console_mail_transport::ConsoleMailTransport;
pub use env_config_store::EnvConfigStore;
pub use json_config_store::JsonConfigStore;
pub use lettre_transport_factory::LettreTransportFactory;
pub use smtp_mail_transport::{SmtpMailTransport, SmtpTlsMode, SmtpTransportConfig};
