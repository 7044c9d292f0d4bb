//! Saved-call storage - one YAML file per named call

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CALLS_DIR, WORKSPACE_DATA_DIR};
use crate::error::{Error, Result};
use crate::models::SavedCall;

/// Manages saved calls under `<workspace>/.gust/calls`
pub struct SavedCallStore {
    calls_dir: PathBuf,
}

impl SavedCallStore {
    pub fn new(workspace_root: &Path) -> Self {
        SavedCallStore {
            calls_dir: workspace_root.join(WORKSPACE_DATA_DIR).join(CALLS_DIR),
        }
    }

    pub fn calls_dir(&self) -> &Path {
        &self.calls_dir
    }

    /// Full path of the file backing a call
    pub fn call_path(&self, name: &str) -> PathBuf {
        self.calls_dir.join(format!("{}.yaml", name))
    }

    /// Ensure the calls directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.calls_dir.exists() {
            fs::create_dir_all(&self.calls_dir).map_err(|e| {
                Error::storage("create calls directory", self.calls_dir.display().to_string(), e)
            })?;
        }
        Ok(())
    }

    /// Save a call, replacing any call with the same name
    pub fn save(&self, call: &SavedCall) -> Result<()> {
        validate_name(&call.name)?;
        self.ensure_dir()?;

        let content = serde_yaml::to_string(call)
            .map_err(|e| Error::storage("serialize call", call.name.clone(), e))?;
        fs::write(self.call_path(&call.name), content)
            .map_err(|e| Error::storage("save call", call.name.clone(), e))?;

        tracing::info!(name = %call.name, method = %call.method, url = %call.url, "Saved call");
        Ok(())
    }

    /// Load a call by name
    pub fn load(&self, name: &str) -> Result<SavedCall> {
        validate_name(name)?;
        let content = match fs::read_to_string(self.call_path(name)) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::storage("load call", name, "call not found"))
            }
            Err(e) => return Err(Error::storage("load call", name, e)),
        };
        serde_yaml::from_str(&content).map_err(|e| Error::storage("parse call", name, e))
    }

    /// All saved calls, sorted by name. Files that fail to parse are skipped.
    pub fn list(&self) -> Result<Vec<SavedCall>> {
        if !self.calls_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.calls_dir).map_err(|e| {
            Error::storage("list calls", self.calls_dir.display().to_string(), e)
        })?;

        let mut calls = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::storage("list calls", self.calls_dir.display().to_string(), e)
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(".yaml"))
            else {
                continue;
            };

            match self.load(name) {
                Ok(call) => calls.push(call),
                Err(e) => tracing::warn!(name, error = %e, "Skipping unreadable saved call"),
            }
        }

        calls.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(calls)
    }

    /// Delete a call; deleting a missing call is an error
    pub fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        fs::remove_file(self.call_path(name))
            .map_err(|e| Error::storage("delete call", name, e))?;
        tracing::info!(name, "Deleted call");
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.call_path(name).is_file()
    }
}

/// Call names are file stems, so they cannot be empty or contain separators.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("call name cannot be empty".to_string()));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::Validation(format!("invalid call name: {name}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpMethod;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn call(name: &str, method: HttpMethod, url: &str, body: &str) -> SavedCall {
        SavedCall::new(name, method, url, HashMap::new(), HashMap::new(), body)
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = SavedCallStore::new(dir.path());

        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer token".to_string());
        headers.insert("X-Custom".to_string(), "value with spaces & special !@#$%".to_string());
        let mut query = HashMap::new();
        query.insert("limit".to_string(), "10".to_string());
        let mut saved = SavedCall::new(
            "test-request",
            HttpMethod::POST,
            "https://api.example.com/users/{id}",
            headers,
            query,
            r#"{"name":"John \"Doe\""}"#,
        )
        .with_description("creates a user");
        // A fixed timestamp proves it is stored verbatim, not regenerated
        saved.created_at = "2024-01-02T03:04:05Z".to_string();

        store.save(&saved).unwrap();
        let loaded = store.load("test-request").unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_list_sorted() {
        let dir = tempdir().unwrap();
        let store = SavedCallStore::new(dir.path());
        for (name, method) in [
            ("get-users", HttpMethod::GET),
            ("create-user", HttpMethod::POST),
            ("delete-user", HttpMethod::DELETE),
        ] {
            store
                .save(&call(name, method, "https://api.example.com/users", ""))
                .unwrap();
        }

        let names: Vec<String> = store.list().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["create-user", "delete-user", "get-users"]);
    }

    #[test]
    fn test_list_empty_and_skips_invalid() {
        let dir = tempdir().unwrap();
        let store = SavedCallStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());

        store
            .save(&call("ok", HttpMethod::GET, "https://x", ""))
            .unwrap();
        fs::write(store.calls_dir().join("broken.yaml"), "::: not yaml [").unwrap();
        fs::write(store.calls_dir().join("notes.txt"), "ignored").unwrap();

        let calls = store.list().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "ok");
    }

    #[test]
    fn test_delete_and_exists() {
        let dir = tempdir().unwrap();
        let store = SavedCallStore::new(dir.path());
        store
            .save(&call("to-delete", HttpMethod::GET, "https://x", ""))
            .unwrap();
        assert!(store.exists("to-delete"));

        store.delete("to-delete").unwrap();
        assert!(!store.exists("to-delete"));
        assert!(matches!(
            store.delete("to-delete"),
            Err(Error::Storage { op: "delete call", .. })
        ));
    }

    #[test]
    fn test_load_missing() {
        let dir = tempdir().unwrap();
        let store = SavedCallStore::new(dir.path());
        let err = store.load("nonexistent").unwrap_err();
        assert_eq!(err.to_string(), "failed to load call 'nonexistent': call not found");
    }

    #[test]
    fn test_overwrite_replaces_record() {
        let dir = tempdir().unwrap();
        let store = SavedCallStore::new(dir.path());
        store
            .save(&call("test", HttpMethod::GET, "https://api.example.com/v1", "").with_description("old"))
            .unwrap();
        store
            .save(&call("test", HttpMethod::POST, "https://api.example.com/v2", "body"))
            .unwrap();

        let loaded = store.load("test").unwrap();
        assert_eq!(loaded.method, HttpMethod::POST);
        assert_eq!(loaded.url, "https://api.example.com/v2");
        assert_eq!(loaded.body, "body");
        assert!(loaded.description.is_empty());
    }

    #[test]
    fn test_call_path() {
        let store = SavedCallStore::new(Path::new("/workspace"));
        assert_eq!(
            store.call_path("my-request"),
            Path::new("/workspace/.gust/calls/my-request.yaml")
        );
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempdir().unwrap();
        let store = SavedCallStore::new(dir.path());
        let err = store
            .save(&call("../escape", HttpMethod::GET, "https://x", ""))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(!store.exists("../escape"));
    }

    #[test]
    fn test_persisted_keys_are_camel_case() {
        let dir = tempdir().unwrap();
        let store = SavedCallStore::new(dir.path());
        store
            .save(&call("keys", HttpMethod::GET, "https://x", ""))
            .unwrap();
        let raw = fs::read_to_string(store.call_path("keys")).unwrap();
        assert!(raw.contains("queryParams:"));
        assert!(raw.contains("createdAt:"));
        assert!(raw.contains("method: GET"));
    }
}
