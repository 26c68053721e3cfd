//! MCP server tables
//!
//! A table is the `mcpServers` object of `.mcp.json`, of the top level of
//! `.claude.json`, or of a `projects.<path>` entry inside `.claude.json`.

use crate::document::JsonDocument;
use crate::error::HostResult;
use crate::layout::McpLocation;
use serde_json::Value;
use std::collections::BTreeMap;

const MCP_SERVERS_KEY: &str = "mcpServers";
const PROJECTS_KEY: &str = "projects";

/// An MCP server table inside a host document
#[derive(Debug, Clone)]
pub struct McpDocument {
    doc: JsonDocument,
    project_key: Option<String>,
}

impl McpDocument {
    pub fn load(location: &McpLocation) -> HostResult<Self> {
        Ok(Self {
            doc: JsonDocument::load(&location.path)?,
            project_key: location.project_key.clone(),
        })
    }

    fn keys(&self) -> Vec<&str> {
        table_keys(self.project_key.as_deref())
    }

    /// Server definitions by name
    #[must_use]
    pub fn servers(&self) -> BTreeMap<String, Value> {
        self.doc
            .object_at(&self.keys())
            .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn server(&self, name: &str) -> Option<&Value> {
        self.doc.object_at(&self.keys()).and_then(|obj| obj.get(name))
    }

    /// Insert or replace a server; returns whether the table changed
    pub fn upsert(&mut self, name: &str, definition: Value) -> HostResult<bool> {
        if self.server(name) == Some(&definition) {
            return Ok(false);
        }
        let keys = table_keys(self.project_key.as_deref());
        self.doc
            .object_at_mut(&keys)?
            .insert(name.to_string(), definition);
        Ok(true)
    }

    /// Remove a server; returns whether it was present
    pub fn remove(&mut self, name: &str) -> HostResult<bool> {
        if self.server(name).is_none() {
            return Ok(false);
        }
        let keys = table_keys(self.project_key.as_deref());
        Ok(self.doc.object_at_mut(&keys)?.remove(name).is_some())
    }

    #[must_use]
    pub fn document(&self) -> &JsonDocument {
        &self.doc
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.doc.is_modified()
    }

    pub fn save(&mut self) -> HostResult<bool> {
        self.doc.save()
    }
}

fn table_keys(project_key: Option<&str>) -> Vec<&str> {
    match project_key {
        Some(project) => vec![PROJECTS_KEY, project, MCP_SERVERS_KEY],
        None => vec![MCP_SERVERS_KEY],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_local_table_is_nested_under_project() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".claude.json");
        fs::write(&path, r#"{"numStartups": 4, "mcpServers": {"global": {"command": "g"}}}"#)
            .unwrap();

        let location = McpLocation {
            path: path.clone(),
            project_key: Some("/work/app".to_string()),
        };
        let mut doc = McpDocument::load(&location).unwrap();
        assert!(doc.servers().is_empty());
        assert!(doc.upsert("local", json!({"command": "l"})).unwrap());
        doc.save().unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["numStartups"], 4);
        assert_eq!(raw["mcpServers"]["global"]["command"], "g");
        assert_eq!(raw["projects"]["/work/app"]["mcpServers"]["local"]["command"], "l");
    }

    #[test]
    fn test_upsert_and_remove_are_idempotent() {
        let temp = TempDir::new().unwrap();
        let location = McpLocation {
            path: temp.path().join(".mcp.json"),
            project_key: None,
        };
        let mut doc = McpDocument::load(&location).unwrap();
        let def = json!({"command": "npx", "args": ["-y", "server"]});

        assert!(doc.upsert("s", def.clone()).unwrap());
        assert!(!doc.upsert("s", def).unwrap());
        assert!(doc.remove("s").unwrap());
        assert!(!doc.remove("s").unwrap());
        assert_eq!(doc.document().path(), PathBuf::from(&location.path).as_path());
    }
}
