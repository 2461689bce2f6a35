//! Persistence layer for the settings store

use crate::error::SettingsError;
use crate::settings::{SettingValue, SettingsStore};
use bincode;
use sled;
use std::path::Path;

const KEY_PREFIX: &str = "setting:";

/// Sled-based implementation of SettingsStore
pub struct SledSettingsStore {
    db: sled::Db,
}

impl SledSettingsStore {
    /// Open (or create) a settings database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let db = sled::open(path).map_err(|e| {
            SettingsError::Storage(format!("Failed to open sled database: {}", e))
        })?;
        Ok(Self { db })
    }

    /// Wrap an already opened database
    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<(), SettingsError> {
        self.db
            .flush()
            .map_err(|e| SettingsError::Storage(format!("Failed to flush settings: {}", e)))?;
        Ok(())
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }
}

impl SettingsStore for SledSettingsStore {
    fn get(&self, key: &str) -> Result<Option<SettingValue>, SettingsError> {
        match self
            .db
            .get(Self::storage_key(key))
            .map_err(|e| SettingsError::Storage(format!("Failed to get setting: {}", e)))?
        {
            Some(bytes) => {
                let value: SettingValue = bincode::deserialize(&bytes).map_err(|e| {
                    SettingsError::Serialization(format!(
                        "Failed to deserialize setting '{}': {}",
                        key, e
                    ))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        let bytes = bincode::serialize(&value).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize setting '{}': {}", key, e))
        })?;
        self.db
            .insert(Self::storage_key(key), bytes)
            .map_err(|e| SettingsError::Storage(format!("Failed to put setting: {}", e)))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.db
            .remove(Self::storage_key(key))
            .map_err(|e| SettingsError::Storage(format!("Failed to remove setting: {}", e)))?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, SettingsError> {
        let mut keys = Vec::new();
        for entry in self.db.scan_prefix(KEY_PREFIX) {
            let (key, _) = entry
                .map_err(|e| SettingsError::Storage(format!("Failed to scan settings: {}", e)))?;
            let key = String::from_utf8_lossy(&key);
            if let Some(stripped) = key.strip_prefix(KEY_PREFIX) {
                keys.push(stripped.to_string());
            }
        }
        Ok(keys)
    }
}
