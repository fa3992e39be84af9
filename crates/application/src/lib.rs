//! Application services and ports.

#![forbid(unsafe_code)]

mod mail_config_bridge;
mod mail_ports;
mod message_composer;
mod profile_registry;

pub use mail_config_bridge::{
    ConfigSource, DEFAULT_PROFILE, MESSAGE_CONFIG_KEY, MailConfigBridge, ResolvedMailConfig,
    TRANSPORT_CONFIG_KEY,
};
pub use mail_ports::{HostConfigStore, MailTransport, TransportFactory};
pub use message_composer::{DEBUG_HEADER, MessageComposer, ORIGINAL_RECIPIENTS_HEADER};
pub use profile_registry::{ProfileRegistry, TransportConfig, TransportProfile};
