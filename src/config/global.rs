//! User-level settings from `$XDG_CONFIG_HOME/gust/config.yaml`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{default_user_agent, APP_NAME, DEFAULT_TIMEOUT, GLOBAL_CONFIG_FILE};
use crate::error::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
    pub default_environment: Option<String>,
    pub pretty_print: Option<bool>,
    /// Duration string such as `30s` or `1500ms`
    pub timeout: Option<String>,
    pub user_agent: Option<String>,
}

impl GlobalConfig {
    /// Load from the standard location; no config file means defaults.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No config directory found, using defaults");
                Ok(GlobalConfig::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let key = path.display().to_string();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(GlobalConfig::default())
            }
            Err(e) => return Err(Error::storage("read global config", key, e)),
        };
        if content.trim().is_empty() {
            return Ok(GlobalConfig::default());
        }
        serde_yaml::from_str(&content).map_err(|e| Error::storage("parse global config", key, e))
    }

    /// Configured timeout; an unparsable value falls back to the default.
    pub fn timeout(&self) -> Duration {
        let Some(raw) = self.timeout.as_deref() else {
            return DEFAULT_TIMEOUT;
        };
        parse_duration(raw).unwrap_or_else(|e| {
            tracing::warn!(timeout = raw, error = %e, "Ignoring invalid timeout");
            DEFAULT_TIMEOUT
        })
    }

    pub fn user_agent(&self) -> String {
        match self.user_agent.as_deref() {
            Some(ua) if !ua.is_empty() => ua.to_string(),
            _ => default_user_agent(),
        }
    }

    /// JSON bodies are pretty-printed unless explicitly disabled
    pub fn pretty_print(&self) -> bool {
        self.pretty_print.unwrap_or(true)
    }

    pub fn default_environment(&self) -> Option<&str> {
        self.default_environment.as_deref().filter(|e| !e.is_empty())
    }
}

/// `$XDG_CONFIG_HOME/gust/config.yaml`, else `~/.config/gust/config.yaml`
pub fn config_path() -> Option<PathBuf> {
    let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    resolve_config_path(xdg, dirs::home_dir())
}

fn resolve_config_path(xdg: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    let base = xdg
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| home.map(|h| h.join(".config")))?;
    Some(base.join(APP_NAME).join(GLOBAL_CONFIG_FILE))
}

/// Parse durations like `30s`, `1500ms`, `2m`, `1.5s` or `1m30s`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || Error::Validation(format!("invalid duration: {input}"));
    let s = input.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..num_len].parse().map_err(|_| invalid())?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        nanos += value * scale;
        rest = &rest[unit_len..];
    }

    Ok(Duration::from_nanos(nanos.round() as u64))
}
