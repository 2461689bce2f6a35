//! Integration tests for layered configuration loading

use crate::integration::test_utils::with_isolated_env;
use persona::config::{ConfigLoader, PersonaConfig};
use persona::profile::ClientType;
use tempfile::TempDir;

fn write(path: &std::path::Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn test_empty_workspace_loads_defaults() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let workspace = test_dir.path().join("workspace");
        std::fs::create_dir_all(&workspace).unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config, PersonaConfig::default());
        assert!(config.validate().is_ok());
    });
}

#[test]
fn test_layers_apply_in_precedence_order() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let workspace = test_dir.path().join("workspace");
        write(
            &test_dir.path().join("xdg/persona/config.toml"),
            r#"
[spoof]
general = "android"
shorts = "android_embedded"
"#,
        );
        write(
            &workspace.join("config/config.toml"),
            r#"
[spoof]
general = "ios"

[prefetch]
timeout_ms = 1500
"#,
        );
        write(
            &workspace.join("config/staging.toml"),
            r#"
[prefetch]
timeout_ms = 500
"#,
        );
        std::env::set_var("PERSONA_ENV", "staging");
        std::env::set_var("PERSONA__SPOOF__ENABLED", "false");

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.spoof.shorts, ClientType::AndroidEmbedded, "global file");
        assert_eq!(config.spoof.general, ClientType::Ios, "workspace overrides global");
        assert_eq!(config.prefetch.timeout_ms, 500, "environment file overrides base");
        assert!(!config.spoof.enabled, "environment variable overrides files");
        assert_eq!(config.spoof.livestream, ClientType::AndroidVr);
    });
}

#[test]
fn test_explicit_file_rejects_unknown_client() {
    let test_dir = TempDir::new().unwrap();
    let config_file = test_dir.path().join("persona.toml");
    std::fs::write(&config_file, "[spoof]\nfallback = \"web\"\n").unwrap();

    with_isolated_env(&test_dir, || {
        assert!(ConfigLoader::load_from_file(&config_file).is_err());
    });
}

#[test]
fn test_invalid_values_fail_validation() {
    let test_dir = TempDir::new().unwrap();
    let config_file = test_dir.path().join("persona.toml");
    std::fs::write(
        &config_file,
        r#"
[prefetch]
timeout_ms = 0

[speed]
max_standard_speed = -1.0
"#,
    )
    .unwrap();

    let config = with_isolated_env(&test_dir, || ConfigLoader::load_from_file(&config_file)).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(config.ensure_valid().is_err());
}

#[test]
fn test_shown_config_loads_back() {
    let test_dir = TempDir::new().unwrap();
    let mut config = PersonaConfig::default();
    config.spoof.fallback = ClientType::Android;
    config.prefetch.timeout_ms = 750;

    let config_file = test_dir.path().join("round.toml");
    std::fs::write(&config_file, config.to_toml_string().unwrap()).unwrap();

    let loaded = with_isolated_env(&test_dir, || ConfigLoader::load_from_file(&config_file)).unwrap();
    assert_eq!(loaded, config);
}
