use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::query::DEFAULT_PAGE_SIZE;

pub const DEFAULT_SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not a valid http(s) url: '{value}'")]
    InvalidUrl { key: &'static str, value: String },
    #[error("page_size must be a positive integer, got '{0}'")]
    InvalidPageSize(String),
    #[error("failed to parse settings file '{path}': {source}")]
    File {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub persons_api_url: String,
    pub demography_api_url: String,
    pub page_size: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            persons_api_url: "http://localhost:8080/api".into(),
            demography_api_url: "http://localhost:8081/demography".into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    persons_api_url: Option<String>,
    demography_api_url: Option<String>,
    page_size: Option<u32>,
}

/// Defaults, then `file` if it exists, then the environment as read through `env`.
pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ConfigError> {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(file) {
        Ok(raw) => {
            let file_cfg: FileSettings =
                toml::from_str(&raw).map_err(|source| ConfigError::File {
                    path: file.display().to_string(),
                    source,
                })?;
            if let Some(v) = file_cfg.persons_api_url {
                settings.persons_api_url = v;
            }
            if let Some(v) = file_cfg.demography_api_url {
                settings.demography_api_url = v;
            }
            if let Some(v) = file_cfg.page_size {
                settings.page_size = v;
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!("ignoring unreadable settings file {}: {err}", file.display()),
    }

    for key in ["PERSONS_API_URL", "APP__PERSONS_API_URL"] {
        if let Some(v) = env(key) {
            settings.persons_api_url = v;
        }
    }
    for key in ["DEMOGRAPHY_API_URL", "APP__DEMOGRAPHY_API_URL"] {
        if let Some(v) = env(key) {
            settings.demography_api_url = v;
        }
    }
    if let Some(v) = env("APP__PAGE_SIZE") {
        settings.page_size = v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPageSize(v.clone()))?;
    }

    settings.validate()
}

impl ClientSettings {
    /// Checks both base urls and the page size, trimming trailing slashes.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.persons_api_url = normalize_base_url("persons_api_url", &self.persons_api_url)?;
        self.demography_api_url =
            normalize_base_url("demography_api_url", &self.demography_api_url)?;
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize("0".into()));
        }
        Ok(self)
    }
}

fn normalize_base_url(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = || ConfigError::InvalidUrl {
        key,
        value: raw.to_string(),
    };
    let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
