//! Host configuration backed by a JSON document.

use std::fs;
use std::path::Path;

use mailbridge_application::HostConfigStore;
use mailbridge_core::{AppError, AppResult};
use serde_json::Value;

/// Configuration store over an in-memory JSON document with dotted-path lookup.
#[derive(Debug, Clone, Default)]
pub struct JsonConfigStore {
    root: Value,
}

impl JsonConfigStore {
    /// Creates a store over an existing document.
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parses a JSON document.
    pub fn parse(document: &str) -> AppResult<Self> {
        serde_json::from_str(document)
            .map(Self::new)
            .map_err(|error| AppError::Validation(format!("invalid configuration JSON: {error}")))
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|error| {
            AppError::Configuration(format!(
                "failed to read configuration file '{}': {error}",
                path.display()
            ))
        })?;

        Self::parse(document.as_str())
    }
}

impl HostConfigStore for JsonConfigStore {
    fn read(&self, path: &str) -> Option<Value> {
        if path.is_empty() {
            return Some(self.root.clone());
        }

        path.split('.')
            .try_fold(&self.root, |value, segment| value.get(segment))
            .cloned()
    }
}
