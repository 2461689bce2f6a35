//! CLI parse: clap types for Persona. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Persona CLI - client profile resolution diagnostics
#[derive(Parser)]
#[command(name = "persona")]
#[command(about = "Client profile resolution backed by a metadata prefetch cache")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable logging entirely
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable verbose logging (debug level)
    #[arg(long, short)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known client profiles and the tier each is configured for
    Profiles {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Resolve a profile from supplied metadata without fetching anything
    Resolve {
        /// Treat the content as a short or clip
        #[arg(long)]
        short: bool,
        /// Metadata says the content is live
        #[arg(long, conflicts_with = "no_metadata")]
        live: bool,
        /// Metadata says playback is not possible
        #[arg(long, conflicts_with = "no_metadata")]
        unplayable: bool,
        /// Resolve as if the fetch has not completed yet
        #[arg(long)]
        no_metadata: bool,
    },
    /// Classify player parameters as short/clip or ordinary content
    Classify {
        /// Player request parameters
        #[arg(long)]
        params: Option<String>,
        /// A short is opening or playing
        #[arg(long)]
        short_playing: bool,
    },
    /// Run a player response through a session with a simulated fetch
    Simulate {
        /// Content id
        #[arg(long)]
        video_id: String,
        /// Player request parameters
        #[arg(long)]
        params: Option<String>,
        /// Simulated metadata: live
        #[arg(long)]
        live: bool,
        /// Simulated metadata: not playable
        #[arg(long)]
        unplayable: bool,
        /// Simulated fetch latency in milliseconds
        #[arg(long, default_value = "0")]
        fetch_delay_ms: u64,
        /// Simulated fetch failure
        #[arg(long)]
        fail: bool,
    },
    /// Manage stored settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// List all settings with their effective values
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one setting
    Get { key: String },
    /// Store a value for a setting
    Set { key: String, value: String },
    /// Reset a setting to its default
    Reset { key: String },
    /// Export non-default settings as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import settings from a JSON file
    Import { path: PathBuf },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the effective configuration
    Validate,
}
