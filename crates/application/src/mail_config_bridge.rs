//! Bootstrap of mail profiles from host configuration.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use mailbridge_core::AppResult;

use crate::{HostConfigStore, ProfileRegistry, TransportConfig};

/// Host configuration key holding transport profiles.
pub const TRANSPORT_CONFIG_KEY: &str = "EmailTransport";

/// Host configuration key holding message profiles.
pub const MESSAGE_CONFIG_KEY: &str = "Email";

/// Profile name read by message composers.
pub const DEFAULT_PROFILE: &str = "default";

/// Which configuration source supplied the default profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// The host application's own configuration store.
    Primary,
    /// The fallback store, consulted when the primary has no message profile.
    Fallback,
}

/// Default profile settings picked from one configuration source.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMailConfig {
    /// Settings for the `default` transport profile.
    pub transport: Value,
    /// Settings for the `default` message profile.
    pub message: Value,
    /// Source the settings were read from.
    pub source: ConfigSource,
}

/// Copies mail settings from host configuration into a [`ProfileRegistry`].
#[derive(Clone)]
pub struct MailConfigBridge {
    primary: Arc<dyn HostConfigStore>,
    fallback: Option<Arc<dyn HostConfigStore>>,
}

impl MailConfigBridge {
    /// Creates a bridge reading from the host configuration store.
    #[must_use]
    pub fn new(primary: Arc<dyn HostConfigStore>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Adds a store consulted when the primary store has no message profile.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn HostConfigStore>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Picks the default profile settings.
    ///
    /// The primary store wins whenever it has a non-empty `Email.default`;
    /// otherwise both profiles come from the fallback store.
    #[must_use]
    pub fn resolve(&self) -> ResolvedMailConfig {
        let primary = read_defaults(self.primary.as_ref(), ConfigSource::Primary);
        if !is_empty(&primary.message) {
            return primary;
        }

        match &self.fallback {
            Some(fallback) => read_defaults(fallback.as_ref(), ConfigSource::Fallback),
            None => primary,
        }
    }

    /// Registers the resolved `default` message and transport profiles.
    ///
    /// Empty settings are skipped with a warning; message composers then
    /// report the missing profile when they are constructed.
    pub fn bootstrap(&self, registry: &ProfileRegistry) -> AppResult<ResolvedMailConfig> {
        let resolved = self.resolve();

        if is_empty(&resolved.message) {
            warn!("no email message configuration found, skipping message profile");
        } else {
            registry.set_config(DEFAULT_PROFILE, resolved.message.clone())?;
        }

        if is_empty(&resolved.transport) {
            warn!("no email transport configuration found, skipping transport profile");
        } else {
            registry.set_transport(
                DEFAULT_PROFILE,
                TransportConfig::Settings(resolved.transport.clone()),
            )?;
        }

        info!(source = ?resolved.source, "email profiles bootstrapped");

        Ok(resolved)
    }
}

fn read_defaults(store: &dyn HostConfigStore, source: ConfigSource) -> ResolvedMailConfig {
    ResolvedMailConfig {
        transport: store
            .read(&format!("{TRANSPORT_CONFIG_KEY}.{DEFAULT_PROFILE}"))
            .unwrap_or(Value::Null),
        message: store
            .read(&format!("{MESSAGE_CONFIG_KEY}.{DEFAULT_PROFILE}"))
            .unwrap_or(Value::Null),
        source,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use super::{ConfigSource, MailConfigBridge};
    use crate::{HostConfigStore, ProfileRegistry};

    struct StaticConfigStore(Value);

    impl HostConfigStore for StaticConfigStore {
        fn read(&self, path: &str) -> Option<Value> {
            path.split('.')
                .try_fold(&self.0, |value, segment| value.get(segment))
                .cloned()
        }
    }

    fn store(value: Value) -> Arc<dyn HostConfigStore> {
        Arc::new(StaticConfigStore(value))
    }

    #[test]
    fn primary_configuration_is_preferred() {
        let bridge = MailConfigBridge::new(store(json!({
            "EmailTransport": { "default": { "scheme": "smtp", "host": "primary.x.com" } },
            "Email": { "default": { "sender": "primary@x.com" } },
        })))
        .with_fallback(store(json!({
            "EmailTransport": { "default": { "scheme": "smtp", "host": "fallback.x.com" } },
            "Email": { "default": { "sender": "fallback@x.com" } },
        })));

        let registry = ProfileRegistry::new();
        let resolved = bridge
            .bootstrap(&registry)
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(resolved.source, ConfigSource::Primary);
        let message = registry
            .config("default")
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_else(|| unreachable!());
        assert_eq!(message.sender, "primary@x.com");
    }

    #[test]
    fn fallback_supplies_both_profiles_when_primary_message_is_empty() {
        let bridge = MailConfigBridge::new(store(json!({
            "EmailTransport": { "default": { "scheme": "smtp", "host": "primary.x.com" } },
            "Email": { "default": {} },
        })))
        .with_fallback(store(json!({
            "EmailTransport": { "default": { "url": "smtp://fallback.x.com:2525" } },
            "Email": { "default": { "sender": "fallback@x.com" } },
        })));

        let registry = ProfileRegistry::new();
        let resolved = bridge
            .bootstrap(&registry)
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(resolved.source, ConfigSource::Fallback);
        let transport = registry
            .transport("default")
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_else(|| unreachable!());
        assert_eq!(transport.settings().host(), Some("fallback.x.com"));
        assert_eq!(
            transport.settings().port().unwrap_or_else(|_| unreachable!()),
            Some(2525)
        );
    }

    #[test]
    fn missing_configuration_registers_nothing() {
        let bridge = MailConfigBridge::new(store(json!({})));
        let registry = ProfileRegistry::new();

        assert!(bridge.bootstrap(&registry).is_ok());
        assert!(
            registry
                .configured()
                .unwrap_or_else(|_| unreachable!())
                .is_empty()
        );
        assert!(
            registry
                .configured_transports()
                .unwrap_or_else(|_| unreachable!())
                .is_empty()
        );
    }

    #[test]
    fn second_bootstrap_into_same_registry_conflicts() {
        let bridge = MailConfigBridge::new(store(json!({
            "EmailTransport": { "default": { "scheme": "smtp" } },
            "Email": { "default": { "sender": "a@x.com" } },
        })));
        let registry = ProfileRegistry::new();

        assert!(bridge.bootstrap(&registry).is_ok());
        assert!(bridge.bootstrap(&registry).is_err());
    }
}
