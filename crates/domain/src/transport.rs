//! Transport profile settings and DSN parsing.

use mailbridge_core::{AppError, AppResult};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use url::Url;

/// Settings describing how to reach a mail-sending backend.
///
/// Keys follow the host configuration layout: `className`, `scheme`, `host`,
/// `port`, `user`, `pass`, `path`, plus any scheme-specific options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportSettings(Map<String, Value>);

impl TransportSettings {
    /// Builds settings from a raw configuration map.
    ///
    /// A `url` entry is parsed as a DSN and removed; explicit entries win
    /// over values parsed from the DSN.
    pub fn from_map(mut settings: Map<String, Value>) -> AppResult<Self> {
        let Some(url) = settings.remove("url") else {
            return Ok(Self(settings));
        };

        let Value::String(url) = url else {
            return Err(AppError::Validation(
                "transport 'url' must be a string".to_owned(),
            ));
        };

        let mut merged = parse_dsn(url.as_str())?;
        merged.extend(settings);

        Ok(Self(merged))
    }

    /// Builds settings from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(settings) => Self::from_map(settings),
            Value::Null => Ok(Self::default()),
            other => Err(AppError::Validation(format!(
                "transport settings must be an object, got {other}"
            ))),
        }
    }

    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the string stored under `key`, ignoring other value types.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns the configured transport class name.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.get_str("className")
    }

    /// Returns the DSN scheme, e.g. `smtp`.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.get_str("scheme")
    }

    /// Returns the transport kind used to pick an implementation:
    /// `className` when present, otherwise `scheme`.
    #[must_use]
    pub fn kind(&self) -> Option<String> {
        self.class_name()
            .or_else(|| self.scheme())
            .map(str::to_ascii_lowercase)
    }

    /// Returns the server hostname.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.get_str("host")
    }

    /// Returns the authentication user name.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.get_str("user")
    }

    /// Returns the authentication password.
    #[must_use]
    pub fn pass(&self) -> Option<&str> {
        self.get_str("pass")
    }

    /// Returns the server port. Accepts numbers and numeric strings.
    pub fn port(&self) -> AppResult<Option<u16>> {
        self.get_u16("port")
    }

    /// Returns a numeric option. Accepts numbers and numeric strings.
    pub fn get_u64(&self, key: &str) -> AppResult<Option<u64>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => number.as_u64().map(Some).ok_or_else(|| {
                AppError::Validation(format!("transport '{key}' must be a non-negative integer"))
            }),
            Some(Value::String(text)) => text.trim().parse::<u64>().map(Some).map_err(|error| {
                AppError::Validation(format!("invalid transport '{key}' '{text}': {error}"))
            }),
            Some(other) => Err(AppError::Validation(format!(
                "transport '{key}' must be a number, got {other}"
            ))),
        }
    }

    fn get_u16(&self, key: &str) -> AppResult<Option<u16>> {
        self.get_u64(key)?
            .map(|value| {
                u16::try_from(value).map_err(|_| {
                    AppError::Validation(format!("transport '{key}' {value} is out of range"))
                })
            })
            .transpose()
    }

    /// Returns the underlying settings map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Parses a DSN of the form `scheme://[user[:pass]@]host[:port][/path][?query]`.
///
/// The scheme also becomes the default `className`. Query parameters are
/// added as individual keys, with `true`, `false`, `null` and integers
/// converted to their JSON types.
pub fn parse_dsn(dsn: &str) -> AppResult<Map<String, Value>> {
    if !dsn.contains("://") {
        return Err(AppError::Validation(format!(
            "DSN '{dsn}' must have the form scheme://host"
        )));
    }

    let url = Url::parse(dsn)
        .map_err(|error| AppError::Validation(format!("invalid DSN '{dsn}': {error}")))?;

    let mut parsed = Map::new();
    let scheme = url.scheme().to_owned();
    parsed.insert("className".to_owned(), Value::String(scheme.clone()));
    parsed.insert("scheme".to_owned(), Value::String(scheme));

    if let Some(host) = url.host_str().filter(|host| !host.is_empty()) {
        parsed.insert("host".to_owned(), Value::String(host.to_owned()));
    }

    if let Some(port) = url.port() {
        parsed.insert("port".to_owned(), Value::from(port));
    }

    if !url.username().is_empty() {
        parsed.insert("user".to_owned(), Value::String(decode(url.username())?));
    }

    if let Some(password) = url.password() {
        parsed.insert("pass".to_owned(), Value::String(decode(password)?));
    }

    let path = url.path().trim_start_matches('/');
    if !path.is_empty() {
        parsed.insert("path".to_owned(), Value::String(decode(path)?));
    }

    for (key, value) in url.query_pairs() {
        parsed.insert(key.into_owned(), query_value(value.as_ref()));
    }

    Ok(parsed)
}

fn decode(component: &str) -> AppResult<String> {
    percent_decode_str(component)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|error| AppError::Validation(format!("invalid DSN component encoding: {error}")))
}

fn query_value(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => value
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_owned())),
    }
}
