//! CLI presentation: text and JSON rendering of command results.

use crate::error::ApiError;
use crate::profile::{ClientType, SpeedMenu};
use crate::resolver::SpoofConfig;
use crate::settings::{SettingDescriptor, SettingsStore};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde_json::json;

fn tiers_for(client: ClientType, config: &SpoofConfig) -> Vec<&'static str> {
    let mut tiers = Vec::new();
    if config.general == client {
        tiers.push("general");
    }
    if config.livestream == client {
        tiers.push("livestream");
    }
    if config.fallback == client {
        tiers.push("fallback");
    }
    if config.shorts == client {
        tiers.push("shorts");
    }
    tiers
}

fn speed_menu_label(menu: SpeedMenu) -> &'static str {
    match menu {
        SpeedMenu::Present => "present",
        SpeedMenu::Missing => "forced on",
        SpeedMenu::MissingReversed => "forced off (reversed)",
    }
}

pub fn format_profiles(config: &SpoofConfig, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        let arr: Vec<serde_json::Value> = ClientType::ALL
            .iter()
            .map(|&client| {
                json!({
                    "name": client.name(),
                    "id": client.id(),
                    "version": client.version(),
                    "model": client.model(),
                    "friendly_name": client.friendly_name(),
                    "speed_menu": speed_menu_label(client.speed_menu()),
                    "tiers": tiers_for(client, config),
                })
            })
            .collect();
        return serde_json::to_string_pretty(&arr).map_err(|e| ApiError::ConfigError(e.to_string()));
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "ID", "Version", "Model", "Display", "Speed Menu", "Tiers"]);
    for client in ClientType::ALL {
        let tiers = tiers_for(client, config);
        let tiers = if tiers.is_empty() {
            "-".to_string()
        } else {
            tiers.join(", ")
        };
        table.add_row(vec![
            client.name().to_string(),
            client.id().to_string(),
            client.version().to_string(),
            client.model().to_string(),
            client.friendly_name().to_string(),
            speed_menu_label(client.speed_menu()).to_string(),
            tiers,
        ]);
    }
    Ok(table.to_string())
}

pub fn format_resolution(client: ClientType) -> String {
    format!(
        "{} (id {}, version {}, model {})",
        client.friendly_name(),
        client.id(),
        client.version(),
        client.model()
    )
}

pub fn format_settings_list(
    store: &dyn SettingsStore,
    settings: &[&dyn SettingDescriptor],
    format: &str,
) -> Result<String, ApiError> {
    if format == "json" {
        let arr: Vec<serde_json::Value> = settings
            .iter()
            .map(|s| {
                json!({
                    "key": s.key(),
                    "type": s.type_name(),
                    "value": s.display_value(store),
                    "reboot_required": s.reboot_required(),
                    "exported": s.include_in_export(),
                })
            })
            .collect();
        return serde_json::to_string_pretty(&arr).map_err(|e| ApiError::ConfigError(e.to_string()));
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Key", "Type", "Value", "Reboot"]);
    for s in settings {
        table.add_row(vec![
            s.key().to_string(),
            s.type_name().to_string(),
            s.display_value(store),
            if s.reboot_required() { "yes" } else { "no" }.to_string(),
        ]);
    }
    Ok(table.to_string())
}
