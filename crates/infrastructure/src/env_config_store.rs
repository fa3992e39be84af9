//! Host configuration assembled from environment variables.

use std::collections::HashMap;

use mailbridge_application::{
    DEFAULT_PROFILE, HostConfigStore, MESSAGE_CONFIG_KEY, TRANSPORT_CONFIG_KEY,
};
use serde_json::{Map, Value, json};

use crate::JsonConfigStore;

/// Configuration store exposing `SMTP_*` and `MAIL_*` environment variables
/// under the `EmailTransport.default` and `Email.default` paths.
///
/// | Variable | Path |
/// |----------|------|
/// | `MAIL_TRANSPORT_URL` | `EmailTransport.default.url` |
/// | `SMTP_HOST` | `EmailTransport.default.host` (also sets scheme `smtp`) |
/// | `SMTP_PORT` | `EmailTransport.default.port` |
/// | `SMTP_USERNAME` | `EmailTransport.default.user` |
/// | `SMTP_PASSWORD` | `EmailTransport.default.pass` |
/// | `SMTP_TLS` | `EmailTransport.default.tls` |
/// | `SMTP_FROM_ADDRESS` | `Email.default.sender` |
/// | `MAIL_CHARSET` | `Email.default.charset` |
/// | `MAIL_FORMAT` | `Email.default.emailFormat` |
/// | `MAIL_TEST_RECIPIENTS` | `Email.default.testing` (comma separated) |
#[derive(Debug, Clone)]
pub struct EnvConfigStore {
    inner: JsonConfigStore,
}

const TRANSPORT_VARS: &[(&str, &str)] = &[
    ("MAIL_TRANSPORT_URL", "url"),
    ("SMTP_HOST", "host"),
    ("SMTP_PORT", "port"),
    ("SMTP_USERNAME", "user"),
    ("SMTP_PASSWORD", "pass"),
    ("SMTP_TLS", "tls"),
];

const MESSAGE_VARS: &[(&str, &str)] = &[
    ("SMTP_FROM_ADDRESS", "sender"),
    ("MAIL_CHARSET", "charset"),
    ("MAIL_FORMAT", "emailFormat"),
];

impl EnvConfigStore {
    /// Reads the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Builds the store from explicit variables. Blank values are ignored.
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();

        let mut transport = collect(&vars, TRANSPORT_VARS);
        if transport.contains_key("host") && !transport.contains_key("url") {
            transport.insert("scheme".to_owned(), Value::String("smtp".to_owned()));
        }

        let mut message = collect(&vars, MESSAGE_VARS);
        if let Some(recipients) = vars.get("MAIL_TEST_RECIPIENTS") {
            let testing = recipients
                .split(',')
                .map(str::trim)
                .filter(|recipient| !recipient.is_empty())
                .map(|recipient| Value::String(recipient.to_owned()))
                .collect();
            message.insert("testing".to_owned(), Value::Array(testing));
        }

        Self {
            inner: JsonConfigStore::new(json!({
                TRANSPORT_CONFIG_KEY: { DEFAULT_PROFILE: transport },
                MESSAGE_CONFIG_KEY: { DEFAULT_PROFILE: message },
            })),
        }
    }
}

fn collect(vars: &HashMap<String, String>, mapping: &[(&str, &str)]) -> Map<String, Value> {
    mapping
        .iter()
        .filter_map(|(variable, key)| {
            vars.get(*variable)
                .map(|value| ((*key).to_owned(), Value::String(value.trim().to_owned())))
        })
        .collect()
}

impl HostConfigStore for EnvConfigStore {
    fn read(&self, path: &str) -> Option<Value> {
        self.inner.read(path)
    }
}
