//! Runtime configuration shared by the session service.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use directories::ProjectDirs;
use encounter_core::CombatConfig;

use crate::error::{Result, RuntimeError};
use crate::events::EventBus;

/// Runtime configuration shared across the session service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    /// Per-topic buffer of the event bus.
    pub event_buffer_size: usize,
    /// Directory for file snapshots. `None` keeps snapshots in memory.
    pub save_dir: Option<PathBuf>,
    /// Whether snapshots are written after each mutation.
    pub persist: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: EventBus::DEFAULT_CAPACITY,
            save_dir: None,
            persist: true,
        }
    }
}

impl RuntimeConfig {
    pub const ENV_EVENT_BUFFER: &'static str = "ENCOUNTER_EVENT_BUFFER";
    pub const ENV_SAVE_DIR: &'static str = "ENCOUNTER_SAVE_DIR";
    pub const ENV_PERSIST: &'static str = "ENCOUNTER_PERSIST";
    pub const ENV_LOG_CAP: &'static str = "ENCOUNTER_LOG_CAP";
    pub const ENV_FACT_LIMIT: &'static str = "ENCOUNTER_FACT_LIMIT";
    pub const ENV_ESCAPE_DC: &'static str = "ENCOUNTER_ESCAPE_DC";
    pub const ENV_AUTOPLAY_LIMIT: &'static str = "ENCOUNTER_AUTOPLAY_LIMIT";

    /// Overlays `ENCOUNTER_*` environment variables on top of `self`.
    ///
    /// `ENCOUNTER_SAVE_DIR=default` selects the platform data directory.
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(size) = parse_var(Self::ENV_EVENT_BUFFER)? {
            self.event_buffer_size = size;
        }
        if let Some(dir) = read_var(Self::ENV_SAVE_DIR) {
            self.save_dir = if dir.eq_ignore_ascii_case("default") {
                default_save_dir()
            } else {
                Some(PathBuf::from(dir))
            };
        }
        if let Some(value) = read_var(Self::ENV_PERSIST) {
            self.persist = parse_flag(Self::ENV_PERSIST, &value)?;
        }
        if let Some(cap) = parse_var(Self::ENV_LOG_CAP)? {
            self.combat.log_cap = cap;
        }
        if let Some(limit) = parse_var(Self::ENV_FACT_LIMIT)? {
            self.combat.fact_limit = limit;
        }
        if let Some(dc) = parse_var(Self::ENV_ESCAPE_DC)? {
            self.combat.escape_dc = dc;
        }
        if let Some(limit) = parse_var(Self::ENV_AUTOPLAY_LIMIT)? {
            self.combat.autoplay_limit = limit;
        }
        Ok(self)
    }

    /// Defaults overlaid with the environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }
}

/// Platform data directory for session snapshots, e.g.
/// `~/.local/share/encounter/sessions` on Linux.
pub fn default_save_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "encounter").map(|dirs| dirs.data_dir().join("sessions"))
}

fn read_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>> {
    read_var(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| RuntimeError::InvalidConfig { key, value })
        })
        .transpose()
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RuntimeError::InvalidConfig {
            key,
            value: value.to_owned(),
        }),
    }
}
