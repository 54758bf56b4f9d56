//! Settings Storage
//!
//! The settings record is read by every checkout request and written only by
//! the administrator. Stores are injected where they are needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::error::{CheckoutError, Result};
use crate::settings::Settings;
use crate::validation::{sanitize_settings, RawSettings, ValidationResult};

/// Settings storage trait
pub trait SettingsStore: Send + Sync {
    /// Stored record, if one has been saved
    fn load(&self) -> Result<Option<Settings>>;

    /// Replace the stored record
    fn save(&self, settings: &Settings) -> Result<()>;

    /// Remove the record entirely (uninstall)
    fn purge(&self) -> Result<()>;

    /// Current settings, defaults when nothing is stored
    fn get(&self) -> Result<Settings> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Sanitize a form submission and store the result.
    ///
    /// The sanitized record is saved even when it carries validation errors.
    fn set(&self, input: &RawSettings) -> Result<ValidationResult> {
        let result = sanitize_settings(input);
        self.save(&result.settings)?;

        tracing::info!(
            mode = %result.settings.mode(),
            messages = result.messages.len(),
            "Saved checkout settings"
        );

        Ok(result)
    }
}

/// In-memory settings store (for development and tests)
pub struct MemorySettingsStore {
    record: RwLock<Option<Settings>>,
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySettingsStore {
    pub const fn new() -> Self {
        Self {
            record: RwLock::new(None),
        }
    }

    /// Store pre-loaded with a record
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            record: RwLock::new(Some(settings)),
        }
    }
}

fn poisoned<T>(_: T) -> CheckoutError {
    CheckoutError::Storage("settings lock poisoned".into())
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<Settings>> {
        let record = self.record.read().map_err(poisoned)?;
        Ok(record.clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut record = self.record.write().map_err(poisoned)?;
        *record = Some(settings.clone());
        Ok(())
    }

    fn purge(&self) -> Result<()> {
        let mut record = self.record.write().map_err(poisoned)?;
        *record = None;
        Ok(())
    }
}

/// On-disk shape of the settings blob
#[derive(Debug, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(flatten)]
    settings: Settings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// JSON file store: one blob per option name under a directory.
///
/// Writes go to a temp file that is renamed into place, so a concurrent
/// reader sees either the old or the new record.
pub struct JsonFileSettingsStore {
    dir: PathBuf,
    option_name: String,
    multisite: bool,
    write_lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new(dir: impl Into<PathBuf>, option_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            option_name: option_name.into(),
            multisite: false,
            write_lock: Mutex::new(()),
        }
    }

    /// Also manage the network-wide copy of the record
    #[must_use]
    pub const fn multisite(mut self, enabled: bool) -> Self {
        self.multisite = enabled;
        self
    }

    /// Path of the site record
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.option_name))
    }

    /// Path of the network-wide record
    pub fn network_path(&self) -> PathBuf {
        self.dir
            .join("network")
            .join(format!("{}.json", self.option_name))
    }

    fn remove_if_present(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<Option<Settings>> {
        let raw = match std::fs::read_to_string(self.path()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSettings = serde_json::from_str(&raw)?;
        Ok(Some(stored.settings))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(poisoned)?;

        std::fs::create_dir_all(&self.dir)?;

        let stored = StoredSettings {
            settings: settings.clone(),
            updated_at: Some(Utc::now()),
        };
        let body = serde_json::to_vec_pretty(&stored)?;

        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &path)?;

        tracing::debug!(path = %path.display(), "Wrote settings blob");
        Ok(())
    }

    fn purge(&self) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(poisoned)?;

        Self::remove_if_present(&self.path())?;
        if self.multisite {
            Self::remove_if_present(&self.network_path())?;
        }

        tracing::info!(option = %self.option_name, multisite = self.multisite, "Purged checkout settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> RawSettings {
        RawSettings {
            test_mode: Some("1".into()),
            test_secret_key: Some("sk_test_1".into()),
            test_publishable_key: Some("pk_test_1".into()),
            price_id: Some("price_abc".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_memory_defaults_on_first_read() {
        let store = MemorySettingsStore::new();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.get().unwrap(), Settings::default());
    }

    #[test]
    fn test_memory_set_overwrites() {
        let store = MemorySettingsStore::new();
        store.set(&submission()).unwrap();
        assert!(store.get().unwrap().test_mode.is_enabled());

        // checkbox left out of the next submission
        let result = store
            .set(&RawSettings {
                test_mode: None,
                ..submission()
            })
            .unwrap();
        assert!(!result.settings.test_mode.is_enabled());
        assert!(!store.get().unwrap().test_mode.is_enabled());

        store.purge().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSettingsStore::new(dir.path(), "spc_settings");

        assert_eq!(store.get().unwrap(), Settings::default());

        let result = store.set(&submission()).unwrap();
        assert_eq!(store.get().unwrap(), result.settings);
        assert!(dir.path().join("spc_settings.json").exists());
        assert!(!dir.path().join("spc_settings.json.tmp").exists());
    }

    #[test]
    fn test_file_store_reads_legacy_blob() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sspc_settings.json"),
            r#"{"test_mode":1,"test_secret_key":"sk_test_9"}"#,
        )
        .unwrap();

        let store = JsonFileSettingsStore::new(dir.path(), "sspc_settings");
        let settings = store.get().unwrap();
        assert!(settings.test_mode.is_enabled());
        assert_eq!(settings.active_keys().secret_key, "sk_test_9");
        assert!(settings.price_id.is_empty());
    }

    #[test]
    fn test_file_store_purge_removes_network_copy() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSettingsStore::new(dir.path(), "sspc_settings").multisite(true);
        store.save(&Settings::default()).unwrap();

        std::fs::create_dir_all(dir.path().join("network")).unwrap();
        std::fs::write(store.network_path(), "{}").unwrap();

        store.purge().unwrap();
        assert!(!store.path().exists());
        assert!(!store.network_path().exists());

        // purging twice is fine
        store.purge().unwrap();
    }

    #[test]
    fn test_file_store_corrupt_blob_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("spc_settings.json"), "not json").unwrap();

        let store = JsonFileSettingsStore::new(dir.path(), "spc_settings");
        assert!(matches!(store.get(), Err(CheckoutError::Storage(_))));
    }
}
