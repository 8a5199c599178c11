use std::path::PathBuf;
use std::time::Duration;

use crate::backends::STATUS_TIMEOUT;

pub const SETTINGS_PATH_VAR: &str = "COMFY_STUDIO_SETTINGS_PATH";
pub const STATUS_TIMEOUT_VAR: &str = "COMFY_STUDIO_STATUS_TIMEOUT_MS";
pub const GENERATE_DELAY_VAR: &str = "COMFY_STUDIO_GENERATE_DELAY_MS";
pub const OFFLINE_VAR: &str = "COMFY_STUDIO_OFFLINE";
pub const DARK_MODE_VAR: &str = "COMFY_STUDIO_DARK_MODE";

const DEFAULT_SETTINGS_FILE: &str = "comfy-studio-settings.json";
const DEFAULT_GENERATE_DELAY: Duration = Duration::from_millis(3000);

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub settings_path: PathBuf,
    pub status_timeout: Duration,
    pub generate_delay: Duration,
    pub offline: bool,
    pub dark_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from(DEFAULT_SETTINGS_FILE),
            status_timeout: STATUS_TIMEOUT,
            generate_delay: DEFAULT_GENERATE_DELAY,
            offline: false,
            dark_mode: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let settings_path = lookup(SETTINGS_PATH_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.settings_path);
        Self {
            settings_path,
            status_timeout: parse_millis(&lookup, STATUS_TIMEOUT_VAR).unwrap_or(defaults.status_timeout),
            generate_delay: parse_millis(&lookup, GENERATE_DELAY_VAR).unwrap_or(defaults.generate_delay),
            offline: parse_flag(&lookup, OFFLINE_VAR).unwrap_or(defaults.offline),
            dark_mode: parse_flag(&lookup, DARK_MODE_VAR).unwrap_or(defaults.dark_mode),
        }
    }
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(millis) => Some(Duration::from_millis(millis)),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: expected milliseconds", key, raw);
            None
        }
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = lookup(key)?;
    match raw.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => {
            tracing::warn!("Ignoring {}={:?}: expected 0 or 1", key, raw);
            None
        }
    }
}
