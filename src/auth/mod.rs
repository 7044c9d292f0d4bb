//! Authentication presets - named credentials applied to requests on demand

pub mod manager;
pub mod preset;

pub use manager::AuthManager;
pub use preset::{AuthPreset, AuthPresetRecord, AuthScheme};
