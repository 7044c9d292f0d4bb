//! Per-workspace auth preset store
//!
//! The whole preset set lives in memory and is flushed to a single YAML file
//! on every mutation. The file holds credentials, so it is written with
//! owner-only permissions. Records with an unknown type are kept as loaded
//! so the file stays usable; they only fail when looked up.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::preset::{AuthPreset, AuthPresetRecord};
use crate::constants::{AUTH_FILE, WORKSPACE_DATA_DIR};
use crate::error::{Error, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthConfig {
    #[serde(default)]
    presets: BTreeMap<String, AuthPresetRecord>,
}

/// Manages auth presets for one workspace
pub struct AuthManager {
    config_path: PathBuf,
    presets: BTreeMap<String, AuthPreset>,
    unsupported: BTreeMap<String, AuthPresetRecord>,
}

impl AuthManager {
    pub fn new(workspace_root: &Path) -> Self {
        AuthManager {
            config_path: workspace_root.join(WORKSPACE_DATA_DIR).join(AUTH_FILE),
            presets: BTreeMap::new(),
            unsupported: BTreeMap::new(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load presets from disk. A missing file is an empty store.
    pub fn load(&mut self) -> Result<()> {
        let key = self.config_path.display().to_string();
        let content = match fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::storage("read auth config", key, e)),
        };

        let config: AuthConfig = serde_yaml::from_str(&content)
            .map_err(|e| Error::storage("parse auth config", key.clone(), e))?;

        let mut presets = BTreeMap::new();
        let mut unsupported = BTreeMap::new();
        for (name, mut record) in config.presets {
            if record.name.is_empty() {
                record.name = name.clone();
            }
            match AuthPreset::from_record(record.clone()) {
                Ok(preset) => {
                    presets.insert(name, preset);
                }
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Keeping unusable auth preset");
                    unsupported.insert(name, record);
                }
            }
        }
        tracing::debug!(
            count = presets.len(),
            unsupported = unsupported.len(),
            path = %key,
            "Loaded auth presets"
        );
        self.presets = presets;
        self.unsupported = unsupported;
        Ok(())
    }

    /// Rewrite the whole preset file.
    pub fn save(&self) -> Result<()> {
        let key = self.config_path.display().to_string();
        if let Some(dir) = self.config_path.parent() {
            create_private_dir(dir)
                .map_err(|e| Error::storage("create auth config directory", key.clone(), e))?;
        }

        let config = AuthConfig {
            presets: self
                .presets
                .iter()
                .map(|(name, preset)| (name.clone(), preset.to_record()))
                .chain(
                    self.unsupported
                        .iter()
                        .map(|(name, record)| (name.clone(), record.clone())),
                )
                .collect(),
        };
        let content = serde_yaml::to_string(&config)
            .map_err(|e| Error::storage("serialize auth config", key.clone(), e))?;

        write_private_file(&self.config_path, content.as_bytes())
            .map_err(|e| Error::storage("write auth config", key, e))?;
        Ok(())
    }

    /// Look up a preset. A stored record of an unknown type is a
    /// validation error here rather than at load time.
    pub fn get(&self, name: &str) -> Result<&AuthPreset> {
        if let Some(record) = self.unsupported.get(name) {
            return Err(Error::Validation(format!(
                "unknown auth type: {}",
                record.kind
            )));
        }
        self.presets
            .get(name)
            .ok_or_else(|| Error::AuthNotFound(name.to_string()))
    }

    /// Add or replace a preset, then flush.
    pub fn add(&mut self, preset: AuthPreset) -> Result<()> {
        if preset.name.is_empty() {
            return Err(Error::Validation("preset name cannot be empty".to_string()));
        }
        preset.validate()?;

        tracing::info!(name = %preset.name, kind = preset.scheme.type_name(), "Adding auth preset");
        self.unsupported.remove(&preset.name);
        self.presets.insert(preset.name.clone(), preset);
        self.save()
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        let removed = self.presets.remove(name).is_some();
        let removed_unsupported = self.unsupported.remove(name).is_some();
        if !removed && !removed_unsupported {
            return Err(Error::AuthNotFound(name.to_string()));
        }
        tracing::info!(name, "Removed auth preset");
        self.save()
    }

    /// All presets, ordered by name
    pub fn list(&self) -> impl Iterator<Item = &AuthPreset> {
        self.presets.values()
    }

    /// Stored records whose type is not recognised, ordered by name
    pub fn unsupported(&self) -> impl Iterator<Item = &AuthPresetRecord> {
        self.unsupported.values()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty() && self.unsupported.is_empty()
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    if dir.exists() {
        return Ok(());
    }
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files that already existed.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)
}
