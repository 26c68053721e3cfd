//! Opaque JSON documents with atomic write-back
//!
//! Host files are loaded as untyped `serde_json::Value` trees so that keys
//! claudeup does not manage survive a patch unchanged.

use crate::error::{HostError, HostResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
///
/// The content is written to a temp file in the destination directory and
/// renamed over the target, so readers see either the old or the new file.
/// Returns `false` without touching the disk when the file already holds
/// exactly this content.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> HostResult<bool> {
    let mut content = serde_json::to_string_pretty(value).map_err(|e| HostError::json(path, e))?;
    content.push('\n');

    if let Ok(existing) = fs::read_to_string(path) {
        if existing == content {
            debug!(path = %path.display(), "content unchanged, skipping write");
            return Ok(false);
        }
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| HostError::io(&parent, e))?;

    let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| HostError::io(&parent, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| HostError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| HostError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| HostError::io(path, e.error))?;

    debug!(path = %path.display(), "wrote document");
    Ok(true)
}

/// Read and deserialize a JSON file, returning `None` if it does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> HostResult<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(HostError::io(path, e)),
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| HostError::json(path, e))
}

/// A JSON object document loaded from disk, tracking whether it was modified
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
    root: Map<String, Value>,
    baseline: Map<String, Value>,
    existed: bool,
}

impl JsonDocument {
    /// Load a document; a missing file loads as an empty object
    pub fn load(path: &Path) -> HostResult<Self> {
        let loaded: Option<Value> = read_json(path)?;
        let existed = loaded.is_some();
        let root = match loaded {
            Some(Value::Object(map)) => map,
            Some(_) => return Err(HostError::NotAnObject(path.to_path_buf())),
            None => Map::new(),
        };
        Ok(Self {
            path: path.to_path_buf(),
            baseline: root.clone(),
            root,
            existed,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file existed when loaded
    #[must_use]
    pub fn existed(&self) -> bool {
        self.existed
    }

    /// Root object of the document
    #[must_use]
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Walk (creating as needed) a chain of object keys from the root
    pub fn object_at_mut(&mut self, keys: &[&str]) -> HostResult<&mut Map<String, Value>> {
        let path = self.path.clone();
        let mut current = &mut self.root;
        for key in keys {
            let entry = current
                .entry((*key).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = entry
                .as_object_mut()
                .ok_or_else(|| HostError::NotAnObject(path.clone()))?;
        }
        Ok(current)
    }

    /// Read-only lookup of a chain of object keys
    #[must_use]
    pub fn object_at(&self, keys: &[&str]) -> Option<&Map<String, Value>> {
        let mut current = &self.root;
        for key in keys {
            current = current.get(*key)?.as_object()?;
        }
        Some(current)
    }

    /// Whether the in-memory value differs from what was loaded
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.root != self.baseline
    }

    /// Pretty-printed content as loaded (empty if the file did not exist)
    #[must_use]
    pub fn original_text(&self) -> String {
        if self.existed {
            render(&self.baseline)
        } else {
            String::new()
        }
    }

    /// Pretty-printed current content
    #[must_use]
    pub fn current_text(&self) -> String {
        render(&self.root)
    }

    /// Write the document back if it was modified
    pub fn save(&mut self) -> HostResult<bool> {
        if !self.is_modified() {
            return Ok(false);
        }
        let written = write_json_atomic(&self.path, &self.root)?;
        self.baseline = self.root.clone();
        self.existed = true;
        Ok(written)
    }
}

fn render(value: &Map<String, Value>) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_default();
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_write_json_atomic_skips_identical_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("doc.json");

        assert!(write_json_atomic(&path, &json!({"a": 1})).unwrap());
        assert!(!write_json_atomic(&path, &json!({"a": 1})).unwrap());
        assert!(write_json_atomic(&path, &json!({"a": 2})).unwrap());

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name() != "doc.json")
            .collect();
        assert!(leftovers.is_empty(), "temp files must not be left behind");
    }

    #[test]
    fn test_document_preserves_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, r#"{"model": "opus", "permissions": {"allow": ["Bash"]}}"#).unwrap();

        let mut doc = JsonDocument::load(&path).unwrap();
        doc.object_at_mut(&["enabledPlugins"])
            .unwrap()
            .insert("x@y".to_string(), json!(true));
        assert!(doc.is_modified());
        assert!(doc.save().unwrap());

        let reread: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread["model"], "opus");
        assert_eq!(reread["permissions"]["allow"][0], "Bash");
        assert_eq!(reread["enabledPlugins"]["x@y"], true);
    }

    #[test]
    fn test_missing_document_loads_empty() {
        let temp = TempDir::new().unwrap();
        let mut doc = JsonDocument::load(&temp.path().join("absent.json")).unwrap();
        assert!(!doc.existed());
        assert!(!doc.is_modified());
        assert!(!doc.save().unwrap());
        assert!(!temp.path().join("absent.json").exists());
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            JsonDocument::load(&path),
            Err(HostError::NotAnObject(_))
        ));
    }
}
