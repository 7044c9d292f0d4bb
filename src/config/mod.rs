//! Workspace and user-level configuration

pub mod global;
pub mod workspace;

pub use global::{parse_duration, GlobalConfig};
pub use workspace::{load_env_file, Workspace, WorkspaceConfig};
