//! Persistent application configuration model and defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};

pub const MAX_DECK_COUNT: u32 = 4;
pub const MAX_SAMPLER_COUNT: u32 = 64;

/// Root configuration persisted to `touchdeck.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Library database location.
    pub library: LibraryConfig,
    #[serde(default)]
    /// UI preferences.
    pub ui: UiConfig,
    #[serde(default)]
    /// Deck and sampler setup.
    pub players: PlayerConfig,
}

/// Library database preferences.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LibraryConfig {
    /// Path to the SQLite library. Empty selects the per-user data directory.
    #[serde(default)]
    pub database_path: String,
}

/// UI preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UiConfig {
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Player layout and loading policy.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_deck_count")]
    pub deck_count: u32,
    #[serde(default = "default_sampler_count")]
    pub sampler_count: u32,
    #[serde(default)]
    pub allow_track_load_to_playing_deck: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            log_level: default_log_level(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            deck_count: default_deck_count(),
            sampler_count: default_sampler_count(),
            allow_track_load_to_playing_deck: false,
        }
    }
}

impl UiConfig {
    /// Parsed log level, falling back to `Info` for unknown names.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(self.log_level.trim()).unwrap_or(log::LevelFilter::Info)
    }
}

impl LibraryConfig {
    /// Resolves the database path, defaulting to `<data_dir>/touchdeck/mixxxdb.sqlite`.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        if !self.database_path.trim().is_empty() {
            return Some(PathBuf::from(self.database_path.trim()));
        }
        dirs::data_dir().map(|dir| dir.join("touchdeck").join("mixxxdb.sqlite"))
    }
}

fn default_window_width() -> u32 {
    800
}

fn default_window_height() -> u32 {
    480
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_deck_count() -> u32 {
    2
}

fn default_sampler_count() -> u32 {
    4
}

/// Clamps values that would produce an unusable view or player layout.
pub fn sanitize_config(config: Config) -> Config {
    Config {
        library: config.library,
        ui: UiConfig {
            window_width: config.ui.window_width.clamp(320, 7_680),
            window_height: config.ui.window_height.clamp(240, 4_320),
            log_level: config.ui.log_level,
        },
        players: PlayerConfig {
            deck_count: config.players.deck_count.clamp(1, MAX_DECK_COUNT),
            sampler_count: config.players.sampler_count.min(MAX_SAMPLER_COUNT),
            allow_track_load_to_playing_deck: config.players.allow_track_load_to_playing_deck,
        },
    }
}

/// Reads the config at `config_file`, writing defaults first when it is missing.
///
/// A file that fails to parse is left untouched and defaults are used instead.
pub fn load_or_create_config(config_file: &Path) -> Result<Config, std::io::Error> {
    if !config_file.exists() {
        info!(
            "Config file not found. Creating default config. path={}",
            config_file.display()
        );
        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let default_config = toml::to_string(&Config::default())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        std::fs::write(config_file, default_config)?;
    }

    let config_content = std::fs::read_to_string(config_file)?;
    let config = match toml::from_str::<Config>(&config_content) {
        Ok(config) => config,
        Err(err) => {
            warn!(
                "Failed to parse config, using defaults: {}. path={}",
                err,
                config_file.display()
            );
            Config::default()
        }
    };
    Ok(sanitize_config(config))
}
