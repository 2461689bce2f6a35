//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, SettingsCommands};
pub use presentation::{format_profiles, format_resolution, format_settings_list};
pub use route::RunContext;
