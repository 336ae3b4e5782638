use std::{fs, path::Path};

use serde::Deserialize;

pub const CONFIG_FILE: &str = "evidence-pack.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub log_level: String,
    pub early_access_address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/evidence-pack.db".into(),
            log_level: "warn".into(),
            early_access_address: readiness::EARLY_ACCESS_ADDRESS.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    database_url: Option<String>,
    log_level: Option<String>,
    early_access_address: Option<String>,
}

/// Settings plus any problem with the config file, reported once logging is up.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub file_error: Option<String>,
}

pub fn load_settings() -> LoadedSettings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> LoadedSettings {
    let mut settings = Settings::default();
    let mut file_error = None;

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if let Some(v) = file_cfg.log_level {
                    settings.log_level = v;
                }
                if let Some(v) = file_cfg.early_access_address {
                    settings.early_access_address = v;
                }
            }
            Err(err) => {
                file_error = Some(format!("{}: {err}", path.display()));
            }
        }
    }

    if let Some(v) = env("EVIDENCE_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__LOG_LEVEL") {
        settings.log_level = v;
    }

    if let Some(v) = env("APP__EARLY_ACCESS_ADDRESS") {
        settings.early_access_address = v;
    }

    LoadedSettings {
        settings,
        file_error,
    }
}

/// Turns a plain path or `sqlite:` path into a `sqlite://` url. The storage
/// crate creates the parent directory when it opens the database.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
