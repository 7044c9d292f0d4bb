//! Workspace discovery
//!
//! The workspace root is the nearest ancestor holding `.gust.yaml` or `.git`.
//! Saved calls, auth presets and `.env` are all resolved relative to it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{ENV_FILE, WORKSPACE_CONFIG_FILE};
use crate::error::{Error, Result};

/// Contents of `.gust.yaml`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceConfig {
    pub name: String,
    pub base_url: String,
    pub default_headers: HashMap<String, String>,
    pub environments: HashMap<String, HashMap<String, String>>,
}

impl WorkspaceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let key = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::storage("read workspace config", key.clone(), e))?;
        if content.trim().is_empty() {
            return Ok(WorkspaceConfig::default());
        }
        serde_yaml::from_str(&content).map_err(|e| Error::storage("parse workspace config", key, e))
    }
}

/// The workspace a command runs in
#[derive(Clone, Debug, Default)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: Option<WorkspaceConfig>,
    /// Variables from `.env`
    pub env: HashMap<String, String>,
}

impl Workspace {
    /// Detect the workspace containing the current directory.
    pub fn detect() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::storage("read current directory", ".", e))?;
        Self::load(&cwd)
    }

    /// Find the root above `start` and load its config and `.env`.
    pub fn load(start: &Path) -> Result<Self> {
        let root = find_root(start);

        let config_path = root.join(WORKSPACE_CONFIG_FILE);
        let config = if config_path.is_file() {
            Some(WorkspaceConfig::load(&config_path)?)
        } else {
            None
        };

        let env_path = root.join(ENV_FILE);
        let env = if env_path.is_file() {
            load_env_file(&env_path)?
        } else {
            HashMap::new()
        };

        tracing::debug!(
            root = %root.display(),
            has_config = config.is_some(),
            env_vars = env.len(),
            "Detected workspace"
        );
        Ok(Workspace { root, config, env })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.config
            .as_ref()
            .map(|c| c.base_url.as_str())
            .filter(|url| !url.is_empty())
    }

    pub fn default_headers(&self) -> Option<&HashMap<String, String>> {
        self.config.as_ref().map(|c| &c.default_headers)
    }

    pub fn has_environment(&self, name: &str) -> bool {
        self.config
            .as_ref()
            .is_some_and(|c| c.environments.contains_key(name))
    }

    /// `.env` variables overlaid with the named environment block.
    ///
    /// Naming an environment the config does not define is an error.
    pub fn env_vars(&self, environment: Option<&str>) -> Result<HashMap<String, String>> {
        let mut vars = self.env.clone();
        let Some(name) = environment else {
            return Ok(vars);
        };

        let block = self
            .config
            .as_ref()
            .and_then(|c| c.environments.get(name))
            .ok_or_else(|| Error::Validation(format!("unknown environment: {name}")))?;
        vars.extend(block.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(vars)
    }
}

/// Walk up from `start` to the first directory with `.gust.yaml` or `.git`.
/// Falls back to `start` itself.
pub fn find_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(WORKSPACE_CONFIG_FILE).exists() || dir.join(".git").exists())
        .unwrap_or(start)
        .to_path_buf()
}

/// Parse a dotenv-style file: `KEY=VALUE` lines, blank and `#` lines skipped.
pub fn load_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::storage("read env file", path.display().to_string(), e))?;
    Ok(parse_env(&content))
}

fn parse_env(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}
