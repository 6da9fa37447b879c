use std::path::{Path, PathBuf};

use serde::Deserialize;

const APP_DIR: &str = "studysnap";
const APP_CONFIG_FILE: &str = "config.json";

/// Application-level settings from `config.json`. Every field is optional;
/// a missing or unreadable file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Tracing filter directives, overriding `RUST_LOG`.
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Whether persistence-failure alerts reach the desktop. Defaults on.
    #[serde(default)]
    pub notifications: Option<bool>,
}

impl AppConfig {
    pub fn notifications_enabled(&self) -> bool {
        self.notifications.unwrap_or(true)
    }
}

pub fn load_app_config() -> AppConfig {
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let Some(path) = app_config_path(xdg_config_home.as_deref(), home.as_deref()) else {
        return AppConfig::default();
    };
    if !path.exists() {
        return AppConfig::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

fn app_config_path(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    let root = match xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        Some(xdg) => xdg.to_path_buf(),
        None => home?.join(".config"),
    };
    Some(root.join(APP_DIR).join(APP_CONFIG_FILE))
}
