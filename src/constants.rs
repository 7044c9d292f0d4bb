//! Application constants
//!
//! Centralized location for file names and configuration defaults.

use std::time::Duration;

/// Application name, also used for the global config directory
pub const APP_NAME: &str = "gust";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Workspace marker and config file, looked up at the workspace root
pub const WORKSPACE_CONFIG_FILE: &str = ".gust.yaml";

/// Per-workspace data directory holding saved calls and auth presets
pub const WORKSPACE_DATA_DIR: &str = ".gust";

/// Subdirectory of the data directory holding one file per saved call
pub const CALLS_DIR: &str = "calls";

/// Auth preset file inside the data directory
pub const AUTH_FILE: &str = "auth.yaml";

/// Dotenv-style file at the workspace root
pub const ENV_FILE: &str = ".env";

/// Global config file name inside `$XDG_CONFIG_HOME/gust`
pub const GLOBAL_CONFIG_FILE: &str = "config.yaml";

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "GUST_LOG";

/// Request timeout when the global config does not set one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header
pub fn default_user_agent() -> String {
    format!("{APP_NAME}/{APP_VERSION}")
}
