use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_LANG: &str = "tr";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Units requested from the provider. Not configurable: the public schema is Celsius.
pub const UNITS: &str = "metric";

pub const ENV_API_KEY: &str = "OPENWEATHERMAP_API_KEY";
pub const ENV_BASE_URL: &str = "OPENWEATHERMAP_URL";
pub const ENV_LANG: &str = "WEATHER_PROXY_LANG";
pub const ENV_BIND: &str = "WEATHER_PROXY_BIND";
pub const ENV_TIMEOUT_SECS: &str = "WEATHER_PROXY_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "OPENWEATHERMAP_API_KEY is not set.\n\
         Hint: export it or add it to a `.env` file in the working directory."
    )]
    MissingApiKey,

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key} ({value:?}): {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Could not determine platform config directory")]
    NoConfigDir,
}

/// Optional settings read from `config.toml`.
///
/// Example TOML:
/// ```toml
/// base_url = "http://api.openweathermap.org/data/2.5/weather"
/// lang = "en"
/// bind = "0.0.0.0:8000"
/// request_timeout_secs = 5
/// ```
///
/// The API key is only read from the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub lang: Option<String>,
    pub bind: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Process-wide settings, resolved once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub lang: String,
    pub bind: SocketAddr,
    pub request_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("lang", &self.lang)
            .field("bind", &self.bind)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Load the config file (explicit path, or the platform default if present) and overlay
    /// the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::from_path(path)?,
            None => {
                let path = Self::config_file_path()?;
                if path.exists() {
                    FileConfig::from_path(&path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Resolve settings from a file config and an environment lookup. Environment wins.
    pub fn from_sources<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = lookup(ENV_BASE_URL)
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        reqwest::Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            key: "base_url",
            value: base_url.clone(),
            reason: e.to_string(),
        })?;

        let lang = lookup(ENV_LANG)
            .or(file.lang)
            .unwrap_or_else(|| DEFAULT_LANG.to_string());
        if lang.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "lang",
                value: lang,
                reason: "must not be empty".to_string(),
            });
        }

        let bind_raw = lookup(ENV_BIND)
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key: "bind",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "request_timeout_secs",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            api_key,
            base_url,
            lang,
            bind,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Path to the default config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weather-proxy", "weather-proxy")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
