//! Integration tests for persisted settings

use persona::profile::ClientType;
use persona::resolver::SpoofConfig;
use persona::settings::catalog::{self, DEFAULT_VIDEO_SPEED, SPOOF_CLIENT_GENERAL, SPOOF_CLIENT_STATS_FOR_NERDS};
use persona::settings::{export_json, import_json, MemorySettings, SettingsStore, SledSettingsStore};
use tempfile::TempDir;

#[test]
fn test_settings_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings");

    {
        let store = SledSettingsStore::new(&path).unwrap();
        SPOOF_CLIENT_GENERAL.save(&store, ClientType::Android).unwrap();
        DEFAULT_VIDEO_SPEED.save(&store, 1.5).unwrap();
        store.flush().unwrap();
    }

    let store = SledSettingsStore::new(&path).unwrap();
    assert_eq!(SPOOF_CLIENT_GENERAL.get(&store), ClientType::Android);
    assert_eq!(DEFAULT_VIDEO_SPEED.get(&store), 1.5);

    let config = SpoofConfig::default().with_settings(&store);
    assert_eq!(config.general, ClientType::Android);
    assert_eq!(config.livestream, ClientType::AndroidVr);
}

#[test]
fn test_export_import_between_stores() {
    let temp_dir = TempDir::new().unwrap();
    let source = SledSettingsStore::new(temp_dir.path().join("source")).unwrap();
    SPOOF_CLIENT_STATS_FOR_NERDS.save(&source, true).unwrap();
    DEFAULT_VIDEO_SPEED.save(&source, 2.0).unwrap();

    let json = export_json(&source, &catalog::all()).unwrap();
    let exported: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(exported.as_object().unwrap().len(), 2);

    let target = MemorySettings::new();
    SPOOF_CLIENT_GENERAL.save(&target, ClientType::Ios).unwrap();
    let report = import_json(&target, &catalog::all(), &json).unwrap();

    assert_eq!(report.updated, 3);
    assert!(report.reboot_required, "resetting the general client needs a restart");
    assert!(SPOOF_CLIENT_STATS_FOR_NERDS.get(&target));
    assert_eq!(DEFAULT_VIDEO_SPEED.get(&target), 2.0);
    assert_eq!(SPOOF_CLIENT_GENERAL.get(&target), ClientType::AndroidTestsuite);
}

#[test]
fn test_rejected_import_leaves_store_untouched() {
    let store = MemorySettings::new();
    DEFAULT_VIDEO_SPEED.save(&store, 1.25).unwrap();

    let result = import_json(
        &store,
        &catalog::all(),
        r#"{"default_video_speed": 2.0, "spoof_client_general": "not_a_client"}"#,
    );

    assert!(result.is_err());
    assert_eq!(DEFAULT_VIDEO_SPEED.get(&store), 1.25);
}

#[test]
fn test_mistyped_value_falls_back_to_default() {
    let temp_dir = TempDir::new().unwrap();
    let store = SledSettingsStore::new(temp_dir.path().join("settings")).unwrap();
    store
        .set(
            DEFAULT_VIDEO_SPEED.key,
            persona::settings::SettingValue::Str("fast".to_string()),
        )
        .unwrap();

    assert_eq!(DEFAULT_VIDEO_SPEED.get(&store), 1.0);
    assert!(DEFAULT_VIDEO_SPEED.try_get(&store).is_err());
}
