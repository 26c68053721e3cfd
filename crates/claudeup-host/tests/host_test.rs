//! Host document integration tests
//!
//! Patches go through the same layout Claude Code uses and must leave
//! every key claudeup does not manage untouched.

use claudeup_host::{HostLayout, McpDocument, Scope, SettingsDocument};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn layout(root: &Path) -> HostLayout {
    HostLayout::new(root.join(".claude"), root.join(".claude.json"))
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("Failed to read document"))
        .expect("Failed to parse document")
}

#[test]
fn test_settings_patch_keeps_foreign_keys() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let layout = layout(temp.path());
    let project = temp.path().join("app");
    let path = layout
        .settings_path(Scope::Local, Some(&project))
        .expect("Failed to resolve settings path");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{"permissions": {"allow": ["Bash(ls)"]}, "enabledPlugins": {"a@m": false}}"#,
    )
    .unwrap();

    let mut settings = SettingsDocument::load(&path).unwrap();
    assert!(settings.set_plugin_enabled("a@m", true).unwrap());
    assert!(settings.set_plugin_enabled("b@m", true).unwrap());
    assert!(settings.save().unwrap());

    let written = read(&path);
    assert_eq!(written["permissions"]["allow"][0], "Bash(ls)");
    assert_eq!(written["enabledPlugins"], json!({"a@m": true, "b@m": true}));

    let mut reloaded = SettingsDocument::load(&path).unwrap();
    assert!(!reloaded.set_plugin_enabled("a@m", true).unwrap());
    assert!(!reloaded.save().unwrap());
}

#[test]
fn test_local_mcp_servers_live_under_project_entry() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let layout = layout(temp.path());
    let project = temp.path().join("app");
    fs::write(
        layout.claude_json(),
        r#"{"numStartups": 7, "mcpServers": {"global": {"command": "g"}}}"#,
    )
    .unwrap();

    let location = layout.mcp_location(Scope::Local, Some(&project)).unwrap();
    let mut table = McpDocument::load(&location).unwrap();
    assert!(table.servers().is_empty());
    table
        .upsert("docs", json!({"command": "docs-mcp", "args": ["--stdio"]}))
        .unwrap();
    table.save().unwrap();

    let written = read(layout.claude_json());
    assert_eq!(written["numStartups"], 7);
    assert_eq!(written["mcpServers"]["global"]["command"], "g");
    let key = project.to_string_lossy();
    assert_eq!(
        written["projects"][key.as_ref()]["mcpServers"]["docs"]["command"],
        "docs-mcp"
    );

    let user = McpDocument::load(&layout.mcp_location(Scope::User, None).unwrap()).unwrap();
    assert_eq!(user.servers().len(), 1);
}

#[test]
fn test_project_scope_requires_project_dir() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let layout = layout(temp.path());
    assert!(layout.settings_path(Scope::Project, None).is_err());
    assert!(layout.mcp_location(Scope::Local, None).is_err());
    assert_eq!(
        layout.settings_path(Scope::User, None).unwrap(),
        temp.path().join(".claude").join("settings.json")
    );
}
