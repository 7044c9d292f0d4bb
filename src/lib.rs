//! # gust
//!
//! A fast, scriptable HTTP client for the command line, in the HTTPie style.
//!
//! ## Features
//! - Requests from plain arguments: `gust post <url> -H k:v -d body q==1 id=5`
//! - `{name}` path variables and `${NAME}` environment variables
//! - Saved calls per workspace, replayed with `gust recall`
//! - Named auth presets (basic, bearer, custom header)
//! - Workspace config (`.gust.yaml`, `.env`) and a global user config
//!
//! ## Architecture
//! - CLI layer: argument parsing into a [`cli::Command`]
//! - App layer: merges workspace defaults, environments and templates
//! - Network layer: builds and executes requests on a pooled `reqwest` client

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod network;
pub mod output;
pub mod prompt;
pub mod storage;
pub mod template;

// Re-export commonly used types
pub use app::App;
pub use auth::{AuthManager, AuthPreset, AuthScheme};
pub use cli::{parse, Command};
pub use config::{GlobalConfig, Workspace};
pub use error::{Error, Result};
pub use models::{HttpMethod, Request, Response, SavedCall};
pub use network::{build_request, Executor};
pub use output::{Formatter, OutputFormat};
pub use storage::SavedCallStore;
pub use template::Template;
