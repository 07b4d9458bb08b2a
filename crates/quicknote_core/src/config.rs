//! Runtime configuration for the note store.
//!
//! # Responsibility
//! - Hold the storage key, debounce windows and create cool-down.
//! - Load overrides from JSON; missing fields keep their defaults.
//!
//! # Invariants
//! - `storage_key` is never blank after `validate()`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORAGE_KEY: &str = "quicknote.store";
pub const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_EDITOR_DEBOUNCE_MS: u64 = 100;
pub const DEFAULT_CREATE_COOLDOWN_MS: u64 = 300;
pub const DEFAULT_PREVIEW_CHARS: usize = 60;

/// Config loading/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Note store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoteStoreConfig {
    /// Single key under which the whole store snapshot lives.
    pub storage_key: String,
    /// Quiescence window before a store mutation is persisted.
    pub persist_debounce_ms: u64,
    /// Quiescence window before buffered editor input reaches the store.
    pub editor_debounce_ms: u64,
    /// Window during which repeated create requests are ignored.
    pub create_cooldown_ms: u64,
    /// Max characters in list previews.
    pub preview_chars: usize,
}

impl Default for NoteStoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            persist_debounce_ms: DEFAULT_PERSIST_DEBOUNCE_MS,
            editor_debounce_ms: DEFAULT_EDITOR_DEBOUNCE_MS,
            create_cooldown_ms: DEFAULT_CREATE_COOLDOWN_MS,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl NoteStoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(raw.as_str())
    }

    /// Trims the storage key and rejects values that cannot work.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let trimmed = self.storage_key.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid(
                "storage_key cannot be empty".to_string(),
            ));
        }
        self.storage_key = trimmed.to_string();
        if self.preview_chars == 0 {
            return Err(ConfigError::Invalid(
                "preview_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn editor_debounce(&self) -> Duration {
        Duration::from_millis(self.editor_debounce_ms)
    }

    pub fn create_cooldown(&self) -> Duration {
        Duration::from_millis(self.create_cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, NoteStoreConfig, DEFAULT_STORAGE_KEY};

    #[test]
    fn empty_document_yields_defaults() {
        let config = NoteStoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, NoteStoreConfig::default());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.persist_debounce().as_millis(), 500);
        assert_eq!(config.editor_debounce().as_millis(), 100);
        assert_eq!(config.create_cooldown().as_millis(), 300);
    }

    #[test]
    fn partial_document_overrides_only_given_fields() {
        let config =
            NoteStoreConfig::from_json_str(r#"{"persist_debounce_ms": 50, "storage_key": " k "}"#)
                .unwrap();
        assert_eq!(config.persist_debounce_ms, 50);
        assert_eq!(config.storage_key, "k");
        assert_eq!(config.editor_debounce_ms, 100);
    }

    #[test]
    fn blank_key_and_unknown_fields_are_rejected() {
        let blank = NoteStoreConfig::from_json_str(r#"{"storage_key": "  "}"#).unwrap_err();
        assert!(matches!(blank, ConfigError::Invalid(_)));

        let unknown = NoteStoreConfig::from_json_str(r#"{"persist_ms": 1}"#).unwrap_err();
        assert!(matches!(unknown, ConfigError::Parse(_)));
    }
}
