//! Configuration management for Clashpilot
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section is optional; a missing file section falls back to defaults
//! that match a stock local daemon.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable overriding `daemon.api_url`
pub const ENV_API_URL: &str = "CLASH_API_URL";
/// Environment variable overriding `daemon.secret`
pub const ENV_API_SECRET: &str = "CLASH_API_SECRET";

/// Upper bound for a single delay probe, in milliseconds
pub const MAX_PROBE_TIMEOUT_MS: u64 = 60_000;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Environment variables that replaced a file value, logged once
    /// telemetry is up
    #[serde(skip)]
    env_overrides: Vec<&'static str>,
}

/// Daemon control API connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer credential; an empty secret is sent as-is and rejected upstream
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            secret: String::new(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "http://127.0.0.1:9097".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// Delay probe defaults used when a caller does not supply its own
///
/// Fields are private so validated values cannot be mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_timeout")]
    timeout_ms: u64,
    #[serde(default = "default_probe_url")]
    url: String,
    #[serde(default = "default_group")]
    default_group: String,
}

impl ProbeConfig {
    /// Get the default probe timeout in milliseconds
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Get the default probe target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the group used when a caller names none
    pub fn default_group(&self) -> &str {
        &self.default_group
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_probe_timeout(),
            url: default_probe_url(),
            default_group: default_group(),
        }
    }
}

fn default_probe_timeout() -> u64 {
    5000
}

fn default_probe_url() -> String {
    "https://www.gstatic.com/generate_204".to_string()
}

fn default_group() -> String {
    "Proxies".to_string()
}

/// Status report settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    /// Groups whose current selection the status report shows
    #[serde(default = "default_key_groups")]
    pub key_groups: Vec<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            key_groups: default_key_groups(),
        }
    }
}

fn default_key_groups() -> Vec<String> {
    ["Proxies", "GLOBAL", "Telegram", "Netflix"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Clash Verge profile store
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfilesConfig {
    /// Directory holding `profiles.yaml` and the `profiles/` subscription
    /// files; profile features are off when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Observability side listener
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Address serving `/health` and `/metrics`; disabled when unset
    #[serde(default)]
    pub listen: Option<SocketAddr>,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        // Phase 1: Read file (preserves io::Error context)
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            crate::error::AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 2: Parse TOML (preserves toml::de::Error context)
        let config: Self = toml::from_str(&content).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 3: Validate parsed config (provides contextual reason)
        config
            .validate()
            .map_err(|e| crate::error::AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Load the config file if one is given, otherwise use defaults, then
    /// apply environment overrides and validate the result
    pub fn load(path: Option<&Path>) -> crate::error::AppResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `CLASH_API_URL` / `CLASH_API_SECRET` style overrides
    ///
    /// The lookup is injected so tests do not have to touch process env.
    /// Applied variable names are kept in [`Config::env_overrides`]; loading
    /// happens before the subscriber exists, so nothing is logged here.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.daemon.api_url = url.trim().to_string();
            self.env_overrides.push(ENV_API_URL);
        }
        if let Some(secret) = lookup(ENV_API_SECRET) {
            self.daemon.secret = secret;
            self.env_overrides.push(ENV_API_SECRET);
        }
    }

    /// Names of the environment variables applied by the last override pass
    pub fn env_overrides(&self) -> &[&'static str] {
        &self.env_overrides
    }

    /// Validate configuration after parsing
    ///
    /// This is called automatically by `from_file()` and `load()`, but can also
    /// be called explicitly when constructing Config via other means.
    pub fn validate(&self) -> crate::error::AppResult<()> {
        if !is_http_url(&self.daemon.api_url) {
            return Err(crate::error::AppError::Config(format!(
                "daemon.api_url '{}' must start with 'http://' or 'https://'",
                self.daemon.api_url
            )));
        }

        if self.daemon.request_timeout_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "daemon.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.daemon.request_timeout_seconds > 300 {
            return Err(crate::error::AppError::Config(format!(
                "daemon.request_timeout_seconds cannot exceed 300 seconds (5 minutes), got {}",
                self.daemon.request_timeout_seconds
            )));
        }

        validate_probe_timeout(self.probe.timeout_ms)?;
        validate_probe_url(&self.probe.url)?;

        if self.probe.default_group.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "probe.default_group must not be empty".to_string(),
            ));
        }

        if let Some(dir) = &self.profiles.dir
            && dir.as_os_str().is_empty()
        {
            return Err(crate::error::AppError::Config(
                "profiles.dir must not be empty when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check a caller-supplied probe timeout against the allowed range (0, 60000]
pub fn validate_probe_timeout(timeout_ms: u64) -> crate::error::AppResult<()> {
    if timeout_ms == 0 {
        return Err(crate::error::AppError::Config(
            "probe timeout must be greater than 0 ms".to_string(),
        ));
    }
    if timeout_ms > MAX_PROBE_TIMEOUT_MS {
        return Err(crate::error::AppError::Config(format!(
            "probe timeout cannot exceed {} ms, got {}",
            MAX_PROBE_TIMEOUT_MS, timeout_ms
        )));
    }
    Ok(())
}

/// Check a caller-supplied probe URL
pub fn validate_probe_url(url: &str) -> crate::error::AppResult<()> {
    if !is_http_url(url) {
        return Err(crate::error::AppError::Config(format!(
            "probe url '{}' must start with 'http://' or 'https://'",
            url
        )));
    }
    Ok(())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl FromStr for Config {
    type Err = crate::error::AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(toml_str).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            }
        })?;

        // Validate config before returning
        config.validate()?;
        Ok(config)
    }
}
