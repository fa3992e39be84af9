//! Named transport and message profiles.
//!
//! Profiles are write-once: registering a name that already exists is
//! rejected and leaves the stored profile untouched. A name has to be dropped
//! explicitly before it can be registered again.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::debug;

use mailbridge_core::{AppError, AppResult, NonEmptyString};
use mailbridge_domain::{MessageProfile, TransportSettings};

use crate::MailTransport;

/// Transport configuration as supplied by the host application.
#[derive(Clone)]
pub enum TransportConfig {
    /// Plain settings, optionally carrying a DSN under `url`.
    Settings(Value),
    /// A transport built by the caller, used as the profile's class.
    Instance(Arc<dyn MailTransport>),
}

impl From<Value> for TransportConfig {
    fn from(value: Value) -> Self {
        Self::Settings(value)
    }
}

impl Debug for TransportConfig {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Settings(settings) => formatter.debug_tuple("Settings").field(settings).finish(),
            Self::Instance(_) => formatter.write_str("Instance(..)"),
        }
    }
}

/// A registered transport profile.
#[derive(Clone)]
pub struct TransportProfile {
    settings: TransportSettings,
    instance: Option<Arc<dyn MailTransport>>,
}

impl TransportProfile {
    /// Returns the transport settings.
    #[must_use]
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Returns the prebuilt transport, if one was registered.
    #[must_use]
    pub fn instance(&self) -> Option<Arc<dyn MailTransport>> {
        self.instance.clone()
    }
}

impl Debug for TransportProfile {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TransportProfile")
            .field("settings", &self.settings)
            .field("instance", &self.instance.is_some())
            .finish()
    }
}

impl TryFrom<TransportConfig> for TransportProfile {
    type Error = AppError;

    fn try_from(config: TransportConfig) -> Result<Self, Self::Error> {
        match config {
            TransportConfig::Settings(value) => Ok(Self {
                settings: TransportSettings::from_value(value)?,
                instance: None,
            }),
            TransportConfig::Instance(transport) => Ok(Self {
                settings: TransportSettings::default(),
                instance: Some(transport),
            }),
        }
    }
}

/// Registry of named transport and message profiles.
///
/// Create one at startup, register profiles, then share it with `Arc`.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    transports: RwLock<BTreeMap<String, TransportProfile>>,
    messages: RwLock<BTreeMap<String, MessageProfile>>,
}

impl ProfileRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transport profile under `name`.
    pub fn set_transport(&self, name: &str, config: impl Into<TransportConfig>) -> AppResult<()> {
        let name = NonEmptyString::new(name)?;
        let mut transports = self.transports.write().map_err(|error| {
            AppError::Internal(format!("failed to lock transport profiles: {error}"))
        })?;

        if transports.contains_key(name.as_str()) {
            return Err(AppError::Conflict(format!(
                "cannot modify an existing transport config '{name}'"
            )));
        }

        let profile = TransportProfile::try_from(config.into())?;
        debug!(profile = %name, kind = ?profile.settings.kind(), "registered transport profile");
        transports.insert(name.into(), profile);

        Ok(())
    }

    /// Registers several transport profiles in order.
    ///
    /// Stops at the first failure; entries before it stay registered.
    pub fn set_transports<I, N, C>(&self, entries: I) -> AppResult<()>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: Into<TransportConfig>,
    {
        for (name, config) in entries {
            self.set_transport(name.as_ref(), config)?;
        }

        Ok(())
    }

    /// Registers message profile settings under `name`.
    pub fn set_config(&self, name: &str, settings: Value) -> AppResult<()> {
        let profile = match settings {
            Value::Object(settings) => MessageProfile::from_map(settings)?,
            other => {
                return Err(AppError::Validation(format!(
                    "message profile '{name}' must be an object, got {other}"
                )));
            }
        };

        self.set_message_profile(name, profile)
    }

    /// Registers an already built message profile under `name`.
    pub fn set_message_profile(&self, name: &str, profile: MessageProfile) -> AppResult<()> {
        let name = NonEmptyString::new(name)?;
        let mut messages = self.messages.write().map_err(|error| {
            AppError::Internal(format!("failed to lock message profiles: {error}"))
        })?;

        if messages.contains_key(name.as_str()) {
            return Err(AppError::Conflict(format!(
                "cannot modify an existing config '{name}'"
            )));
        }

        debug!(profile = %name, "registered message profile");
        messages.insert(name.into(), profile);

        Ok(())
    }

    /// Registers several message profiles in order.
    ///
    /// Stops at the first failure; entries before it stay registered.
    pub fn set_configs<I, N>(&self, entries: I) -> AppResult<()>
    where
        I: IntoIterator<Item = (N, Value)>,
        N: AsRef<str>,
    {
        for (name, settings) in entries {
            self.set_config(name.as_ref(), settings)?;
        }

        Ok(())
    }

    /// Returns the transport profile registered under `name`.
    pub fn transport(&self, name: &str) -> AppResult<Option<TransportProfile>> {
        let transports = self.transports.read().map_err(|error| {
            AppError::Internal(format!("failed to lock transport profiles: {error}"))
        })?;

        Ok(transports.get(name).cloned())
    }

    /// Returns the message profile registered under `name`.
    pub fn config(&self, name: &str) -> AppResult<Option<MessageProfile>> {
        let messages = self.messages.read().map_err(|error| {
            AppError::Internal(format!("failed to lock message profiles: {error}"))
        })?;

        Ok(messages.get(name).cloned())
    }

    /// Removes a transport profile. Returns whether one was registered.
    pub fn drop_transport(&self, name: &str) -> AppResult<bool> {
        let mut transports = self.transports.write().map_err(|error| {
            AppError::Internal(format!("failed to lock transport profiles: {error}"))
        })?;

        Ok(transports.remove(name).is_some())
    }

    /// Removes a message profile. Returns whether one was registered.
    pub fn drop_config(&self, name: &str) -> AppResult<bool> {
        let mut messages = self.messages.write().map_err(|error| {
            AppError::Internal(format!("failed to lock message profiles: {error}"))
        })?;

        Ok(messages.remove(name).is_some())
    }

    /// Lists registered transport profile names in sorted order.
    pub fn configured_transports(&self) -> AppResult<Vec<String>> {
        let transports = self.transports.read().map_err(|error| {
            AppError::Internal(format!("failed to lock transport profiles: {error}"))
        })?;

        Ok(transports.keys().cloned().collect())
    }

    /// Lists registered message profile names in sorted order.
    pub fn configured(&self) -> AppResult<Vec<String>> {
        let messages = self.messages.read().map_err(|error| {
            AppError::Internal(format!("failed to lock message profiles: {error}"))
        })?;

        Ok(messages.keys().cloned().collect())
    }
}
