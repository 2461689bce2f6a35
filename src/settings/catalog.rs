//! Named settings and JSON import/export.

use crate::error::SettingsError;
use crate::profile::ClientType;
use crate::settings::{Setting, SettingDescriptor, SettingsStore};
use serde_json::{Map, Value as JsonValue};
use tracing::{info, warn};

pub static SPOOF_CLIENT: Setting<bool> = Setting::new("spoof_client", true).requires_reboot();
pub static SPOOF_CLIENT_GENERAL: Setting<ClientType> =
    Setting::new("spoof_client_general", ClientType::AndroidTestsuite).requires_reboot();
pub static SPOOF_CLIENT_LIVESTREAM: Setting<ClientType> =
    Setting::new("spoof_client_livestream", ClientType::AndroidVr).requires_reboot();
pub static SPOOF_CLIENT_FALLBACK: Setting<ClientType> =
    Setting::new("spoof_client_fallback", ClientType::TvEmbedded).requires_reboot();
pub static SPOOF_CLIENT_SHORTS: Setting<ClientType> =
    Setting::new("spoof_client_shorts", ClientType::Ios).requires_reboot();
pub static SPOOF_CLIENT_STATS_FOR_NERDS: Setting<bool> =
    Setting::new("spoof_client_stats_for_nerds", false);

pub static ENABLE_SAVE_VIDEO_SPEED: Setting<bool> = Setting::new("enable_save_video_speed", true);
pub static DEFAULT_VIDEO_SPEED: Setting<f32> = Setting::new("default_video_speed", 1.0);
pub static ENABLE_CUSTOM_VIDEO_SPEED: Setting<bool> =
    Setting::new("enable_custom_video_speed", false).requires_reboot();

/// Every named setting, in display order.
pub fn all() -> [&'static dyn SettingDescriptor; 9] {
    [
        &SPOOF_CLIENT,
        &SPOOF_CLIENT_GENERAL,
        &SPOOF_CLIENT_LIVESTREAM,
        &SPOOF_CLIENT_FALLBACK,
        &SPOOF_CLIENT_SHORTS,
        &SPOOF_CLIENT_STATS_FOR_NERDS,
        &ENABLE_SAVE_VIDEO_SPEED,
        &DEFAULT_VIDEO_SPEED,
        &ENABLE_CUSTOM_VIDEO_SPEED,
    ]
}

/// Look up a named setting by key.
pub fn find(key: &str) -> Option<&'static dyn SettingDescriptor> {
    all().into_iter().find(|setting| setting.key() == key)
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Settings whose effective value changed
    pub updated: usize,
    /// At least one changed setting only takes effect after a restart
    pub reboot_required: bool,
}

/// Export non-default, exportable settings as a pretty-printed JSON object.
pub fn export_json(
    store: &dyn SettingsStore,
    settings: &[&dyn SettingDescriptor],
) -> Result<String, SettingsError> {
    let mut object = Map::new();
    for setting in settings.iter().filter(|s| s.include_in_export()) {
        if let Some(value) = setting.export(store) {
            object.insert(setting.key().to_string(), value);
        }
    }
    serde_json::to_string_pretty(&JsonValue::Object(object))
        .map_err(|e| SettingsError::Serialization(e.to_string()))
}

/// Import a JSON object produced by [`export_json`].
///
/// Exportable settings missing from the object are reset to their defaults.
/// The whole document is validated before anything is written.
pub fn import_json(
    store: &dyn SettingsStore,
    settings: &[&dyn SettingDescriptor],
    json: &str,
) -> Result<ImportReport, SettingsError> {
    let document: JsonValue =
        serde_json::from_str(json).map_err(|e| SettingsError::InvalidImport(e.to_string()))?;
    let object = document.as_object().ok_or_else(|| {
        SettingsError::InvalidImport("expected a JSON object at the top level".to_string())
    })?;

    for key in object.keys() {
        if !settings.iter().any(|s| s.include_in_export() && s.key() == key) {
            warn!(key = %key, "Ignoring unknown setting in import");
        }
    }

    // Validate against a scratch store first so a bad value leaves the real
    // store untouched.
    let scratch = super::MemorySettings::new();
    for setting in settings.iter().filter(|s| s.include_in_export()) {
        setting.import(&scratch, object.get(setting.key()))?;
    }

    let mut report = ImportReport::default();
    for setting in settings.iter().filter(|s| s.include_in_export()) {
        if setting.import(store, object.get(setting.key()))? {
            report.updated += 1;
            report.reboot_required |= setting.reboot_required();
        }
    }

    info!(
        updated = report.updated,
        reboot_required = report.reboot_required,
        "Imported settings"
    );
    Ok(report)
}
