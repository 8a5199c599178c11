use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::SettingsError;

pub const SERVER_URL_KEY: &str = "comfyui.serverUrl";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8188";

/// Durable string key-value storage.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// Persisted server URL, or the built-in default when absent or unreadable.
pub fn load_server_url(store: &dyn SettingsStore) -> String {
    match store.get(SERVER_URL_KEY) {
        Ok(Some(url)) if !url.trim().is_empty() => url,
        Ok(_) => DEFAULT_SERVER_URL.to_string(),
        Err(error) => {
            tracing::warn!("Failed to read saved server URL, using default: {}", error);
            DEFAULT_SERVER_URL.to_string()
        }
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(error) => Err(error.into()),
    }
}

fn lock_values(values: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    match values.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Flat JSON object on disk. Every `set` rewrites the whole file.
pub struct JsonFileSettings {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileSettings {
    /// A missing, unreadable or corrupt file starts empty, so lookups fall back
    /// to their defaults. The next `set` rewrites the file.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(error) => {
                tracing::warn!("Ignoring settings file {}: {}", path.display(), error);
                BTreeMap::new()
            }
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(lock_values(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut values = lock_values(&self.values);
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        self.write(&next)?;
        *values = next;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(lock_values(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        lock_values(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}
