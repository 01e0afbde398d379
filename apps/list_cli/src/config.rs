use std::{fs, path::Path};

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub resource: String,
    pub per_page: Option<u32>,
    pub debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            resource: "api/loads".into(),
            per_page: None,
            debounce_ms: 500,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    resource: Option<String>,
    per_page: Option<u32>,
    debounce_ms: Option<u64>,
}

/// Defaults, then `path` if it parses, then `APP__*` environment variables.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw, path);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str, path: &Path) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("config: ignoring unreadable settings file {}: {err}", path.display());
            return;
        }
    };

    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.resource {
        settings.resource = v;
    }
    if let Some(v) = file_cfg.per_page {
        settings.per_page = Some(v);
    }
    if let Some(v) = file_cfg.debounce_ms {
        settings.debounce_ms = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__RESOURCE") {
        settings.resource = v;
    }
    if let Some(v) = lookup("APP__PER_PAGE") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.per_page = Some(parsed),
            Err(_) => warn!("config: APP__PER_PAGE is not a number: {v}"),
        }
    }
    if let Some(v) = lookup("APP__DEBOUNCE_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.debounce_ms = parsed,
            Err(_) => warn!("config: APP__DEBOUNCE_MS is not a number: {v}"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
