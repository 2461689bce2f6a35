//! Settings Store
//!
//! Read-mostly typed key/value configuration. The engine only depends on the
//! [`SettingsStore`] trait; [`MemorySettings`] and
//! [`persistence::SledSettingsStore`] are the bundled implementations.
//!
//! Typed access goes through [`Setting`] descriptors, which carry the key,
//! the default, and the reboot/export flags.

pub mod catalog;
pub mod persistence;

pub use catalog::{export_json, import_json, ImportReport};
pub use persistence::SledSettingsStore;

use crate::error::SettingsError;
use crate::profile::ClientType;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Typed scalar stored under a settings key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Str(String),
}

impl SettingValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Int(_) => "int",
            SettingValue::Float(_) => "float",
            SettingValue::Str(_) => "string",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{}", v),
            SettingValue::Int(v) => write!(f, "{}", v),
            SettingValue::Float(v) => write!(f, "{}", v),
            SettingValue::Str(v) => f.write_str(v),
        }
    }
}

/// Settings store interface
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<SettingValue>, SettingsError>;
    fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError>;
    fn remove(&self, key: &str) -> Result<(), SettingsError>;
    fn keys(&self) -> Result<Vec<String>, SettingsError>;
}

/// In-memory settings store
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, SettingValue>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<SettingValue>, SettingsError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.values.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, SettingsError> {
        let mut keys: Vec<String> = self.values.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Conversion between a Rust type and its stored/exported representation.
pub trait SettingType: Sized + Copy + PartialEq + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    fn to_value(self) -> SettingValue;
    fn from_value(value: &SettingValue) -> Option<Self>;
    fn to_json(self) -> JsonValue;
    fn from_json(value: &JsonValue) -> Option<Self>;
}

impl SettingType for bool {
    const TYPE_NAME: &'static str = "bool";

    fn to_value(self) -> SettingValue {
        SettingValue::Bool(self)
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn to_json(self) -> JsonValue {
        JsonValue::Bool(self)
    }

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_bool()
    }
}

impl SettingType for i64 {
    const TYPE_NAME: &'static str = "int";

    fn to_value(self) -> SettingValue {
        SettingValue::Int(self)
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn to_json(self) -> JsonValue {
        JsonValue::from(self)
    }

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_i64()
    }
}

impl SettingType for f32 {
    const TYPE_NAME: &'static str = "float";

    fn to_value(self) -> SettingValue {
        SettingValue::Float(self)
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Float(v) => Some(*v),
            // Floats persisted as strings by older stores.
            SettingValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn to_json(self) -> JsonValue {
        JsonValue::from(f64::from(self))
    }

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_f64().map(|v| v as f32)
    }
}

impl SettingType for ClientType {
    const TYPE_NAME: &'static str = "client_type";

    fn to_value(self) -> SettingValue {
        SettingValue::Str(self.name().to_string())
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn to_json(self) -> JsonValue {
        JsonValue::String(self.name().to_string())
    }

    fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_str().and_then(|s| s.parse().ok())
    }
}

/// Typed descriptor for one named setting.
#[derive(Debug, Clone, Copy)]
pub struct Setting<T: SettingType> {
    pub key: &'static str,
    pub default: T,
    pub reboot_required: bool,
    pub include_in_export: bool,
}

impl<T: SettingType> Setting<T> {
    pub const fn new(key: &'static str, default: T) -> Self {
        Self {
            key,
            default,
            reboot_required: false,
            include_in_export: true,
        }
    }

    pub const fn requires_reboot(mut self) -> Self {
        self.reboot_required = true;
        self
    }

    pub const fn exclude_from_export(mut self) -> Self {
        self.include_in_export = false;
        self
    }

    /// Stored value, or an error when the stored value has the wrong type.
    pub fn try_get(&self, store: &dyn SettingsStore) -> Result<T, SettingsError> {
        match store.get(self.key)? {
            None => Ok(self.default),
            Some(value) => T::from_value(&value).ok_or_else(|| SettingsError::TypeMismatch {
                key: self.key.to_string(),
                expected: T::TYPE_NAME,
                actual: value.type_name(),
            }),
        }
    }

    /// Stored value, falling back to the default on any failure.
    pub fn get(&self, store: &dyn SettingsStore) -> T {
        match self.try_get(store) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = self.key, error = %e, "Falling back to setting default");
                self.default
            }
        }
    }

    /// Explicitly stored value only; `None` when unset or unreadable.
    pub fn stored(&self, store: &dyn SettingsStore) -> Option<T> {
        match store.get(self.key) {
            Ok(Some(value)) => {
                let typed = T::from_value(&value);
                if typed.is_none() {
                    warn!(
                        key = self.key,
                        expected = T::TYPE_NAME,
                        actual = value.type_name(),
                        "Ignoring stored setting with unexpected type"
                    );
                }
                typed
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key = self.key, error = %e, "Could not read setting");
                None
            }
        }
    }

    pub fn save(&self, store: &dyn SettingsStore, value: T) -> Result<(), SettingsError> {
        store.set(self.key, value.to_value())
    }

    /// Remove the stored value so reads return the default again.
    pub fn reset(&self, store: &dyn SettingsStore) -> Result<(), SettingsError> {
        store.remove(self.key)
    }
}

/// Object-safe view over [`Setting`] used for import/export and listings.
pub trait SettingDescriptor: Send + Sync {
    fn key(&self) -> &'static str;
    fn type_name(&self) -> &'static str;
    fn reboot_required(&self) -> bool;
    fn include_in_export(&self) -> bool;
    /// Effective value rendered for display.
    fn display_value(&self, store: &dyn SettingsStore) -> String;
    /// Exported JSON value, `None` when the value equals the default.
    fn export(&self, store: &dyn SettingsStore) -> Option<JsonValue>;
    /// Apply an imported value (`None` resets to default). Returns whether
    /// the effective value changed.
    fn import(
        &self,
        store: &dyn SettingsStore,
        value: Option<&JsonValue>,
    ) -> Result<bool, SettingsError>;
    /// Parse and store a value given as text.
    fn set_from_str(&self, store: &dyn SettingsStore, raw: &str) -> Result<(), SettingsError>;
}

impl<T: SettingType + fmt::Debug + std::str::FromStr> SettingDescriptor for Setting<T> {
    fn key(&self) -> &'static str {
        self.key
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn reboot_required(&self) -> bool {
        self.reboot_required
    }

    fn include_in_export(&self) -> bool {
        self.include_in_export
    }

    fn display_value(&self, store: &dyn SettingsStore) -> String {
        self.get(store).to_value().to_string()
    }

    fn export(&self, store: &dyn SettingsStore) -> Option<JsonValue> {
        let value = self.get(store);
        (value != self.default).then(|| value.to_json())
    }

    fn import(
        &self,
        store: &dyn SettingsStore,
        value: Option<&JsonValue>,
    ) -> Result<bool, SettingsError> {
        let before = self.get(store);
        match value {
            Some(json) => {
                let parsed = T::from_json(json).ok_or_else(|| {
                    SettingsError::InvalidImport(format!(
                        "'{}' expects a {} value, got {}",
                        self.key,
                        T::TYPE_NAME,
                        json
                    ))
                })?;
                self.save(store, parsed)?;
            }
            None => self.reset(store)?,
        }
        Ok(self.get(store) != before)
    }

    fn set_from_str(&self, store: &dyn SettingsStore, raw: &str) -> Result<(), SettingsError> {
        let parsed = raw.trim().parse::<T>().map_err(|_| SettingsError::TypeMismatch {
            key: self.key.to_string(),
            expected: T::TYPE_NAME,
            actual: "string",
        })?;
        self.save(store, parsed)
    }
}
