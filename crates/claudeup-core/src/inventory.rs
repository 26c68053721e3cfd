//! Listings of installed plugins and configured MCP servers

use crate::error::ProfileResult;
use crate::paths::ClaudeupPaths;
use crate::registry::{Category, EnabledFilter, EnabledRegistry};
use claudeup_host::plugins::split_plugin_id;
use claudeup_host::{InstalledPlugins, McpDocument, PluginStatus, Scope, SettingsDocument};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One install of one plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRow {
    pub id: String,
    pub name: String,
    pub marketplace: Option<String>,
    pub version: String,
    pub scope: String,
    pub install_path: PathBuf,
    pub status: PluginStatus,
}

/// Totals over plugin rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PluginSummary {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    pub stale: usize,
}

impl PluginSummary {
    #[must_use]
    pub fn from_rows(rows: &[PluginRow]) -> Self {
        let count = |status| rows.iter().filter(|r| r.status == status).count();
        Self {
            total: rows.len(),
            enabled: count(PluginStatus::Enabled),
            disabled: count(PluginStatus::Disabled),
            stale: count(PluginStatus::Stale),
        }
    }
}

impl fmt::Display for PluginSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} plugins ({} enabled, {} disabled, {} stale)",
            self.total, self.enabled, self.disabled, self.stale
        )
    }
}

/// Enablement merged across scopes: user, then project, then local
pub fn merged_enablement(
    paths: &ClaudeupPaths,
    project: Option<&Path>,
) -> ProfileResult<BTreeMap<String, bool>> {
    let host = paths.host();
    let mut merged = BTreeMap::new();
    for scope in Scope::ALL {
        if scope.needs_project() && project.is_none() {
            continue;
        }
        let settings = SettingsDocument::load(&host.settings_path(scope, project)?)?;
        merged.extend(settings.enabled_plugins());
    }
    Ok(merged)
}

/// Every install record with its derived status, sorted by plugin id
pub fn plugin_rows(
    paths: &ClaudeupPaths,
    project: Option<&Path>,
    filter: EnabledFilter,
) -> ProfileResult<Vec<PluginRow>> {
    let installed = InstalledPlugins::load(&paths.host().installed_plugins_path())?;
    let enablement = merged_enablement(paths, project)?;

    let mut rows = Vec::new();
    for (id, records) in &installed.plugins {
        let (name, marketplace) = split_plugin_id(id);
        for record in records {
            let status = PluginStatus::derive(record, enablement.get(id).copied());
            let keep = match filter {
                EnabledFilter::All => true,
                EnabledFilter::Enabled => status == PluginStatus::Enabled,
                EnabledFilter::Disabled => status == PluginStatus::Disabled,
            };
            if !keep {
                continue;
            }
            rows.push(PluginRow {
                id: id.clone(),
                name: name.to_string(),
                marketplace: marketplace.map(str::to_string),
                version: record.version.clone(),
                scope: record.scope.clone(),
                install_path: record.install_path.clone(),
                status,
            });
        }
    }
    Ok(rows)
}

/// One MCP server configured at one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McpRow {
    pub name: String,
    pub scope: Scope,
    /// Command line, or URL for remote servers
    pub target: String,
    pub enabled: bool,
}

/// MCP servers from every scope's table
pub fn mcp_rows(
    paths: &ClaudeupPaths,
    project: Option<&Path>,
    filter: EnabledFilter,
) -> ProfileResult<Vec<McpRow>> {
    let host = paths.host();
    let registry = EnabledRegistry::load(&paths.enabled_file())?;
    let mut rows = Vec::new();
    for scope in Scope::ALL {
        if scope.needs_project() && project.is_none() {
            continue;
        }
        let table = McpDocument::load(&host.mcp_location(scope, project)?)?;
        for (name, definition) in table.servers() {
            let enabled = registry.is_enabled(Category::McpServers, &name);
            if !filter.matches(enabled) {
                continue;
            }
            rows.push(McpRow {
                target: describe_target(&definition),
                name,
                scope,
                enabled,
            });
        }
    }
    Ok(rows)
}

fn describe_target(definition: &Value) -> String {
    if let Some(url) = definition.get("url").and_then(Value::as_str) {
        return url.to_string();
    }
    let command = definition
        .get("command")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let args = definition
        .get("args")
        .and_then(Value::as_array)
        .map(|args| {
            args.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{command} {args}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_local_settings_override_user() {
        let temp = TempDir::new().unwrap();
        let paths = ClaudeupPaths::rooted(temp.path());
        let project = temp.path().join("app");
        write(
            &temp.path().join(".claude/settings.json"),
            r#"{"enabledPlugins": {"a@m": true, "b@m": true}}"#,
        );
        write(
            &project.join(".claude/settings.local.json"),
            r#"{"enabledPlugins": {"b@m": false}}"#,
        );

        let merged = merged_enablement(&paths, Some(&project)).unwrap();
        assert_eq!(merged["a@m"], true);
        assert_eq!(merged["b@m"], false);
        let user_only = merged_enablement(&paths, None).unwrap();
        assert_eq!(user_only["b@m"], true);
    }

    #[test]
    fn test_plugin_rows_and_summary() {
        let temp = TempDir::new().unwrap();
        let paths = ClaudeupPaths::rooted(temp.path());
        let present = temp.path().join("cache/a");
        fs::create_dir_all(&present).unwrap();
        let installed = json!({
            "version": 2,
            "plugins": {
                "a@m": [{"scope": "user", "installPath": present, "version": "1.0.0"}],
                "b@m": [{"scope": "user", "installPath": present, "version": "2.0.0"}],
                "gone@m": [{"scope": "user", "installPath": temp.path().join("missing"), "version": "0.1.0"}]
            }
        });
        write(
            &paths.host().installed_plugins_path(),
            &installed.to_string(),
        );
        write(
            &temp.path().join(".claude/settings.json"),
            r#"{"enabledPlugins": {"a@m": true, "b@m": false}}"#,
        );

        let rows = plugin_rows(&paths, None, EnabledFilter::All).unwrap();
        assert_eq!(rows.len(), 3);
        let summary = PluginSummary::from_rows(&rows);
        assert_eq!(summary.to_string(), "3 plugins (1 enabled, 1 disabled, 1 stale)");

        let disabled = plugin_rows(&paths, None, EnabledFilter::Disabled).unwrap();
        assert_eq!(disabled.len(), 1);
        assert_eq!(disabled[0].name, "b");
        assert_eq!(disabled[0].marketplace.as_deref(), Some("m"));
    }

    #[test]
    fn test_mcp_rows_span_scopes() {
        let temp = TempDir::new().unwrap();
        let paths = ClaudeupPaths::rooted(temp.path());
        let project = temp.path().join("app");
        write(
            paths.host().claude_json(),
            r#"{"mcpServers": {"search": {"command": "npx", "args": ["-y", "search"]}}}"#,
        );
        write(
            &project.join(".mcp.json"),
            r#"{"mcpServers": {"docs": {"type": "http", "url": "https://docs.example.com/mcp"}}}"#,
        );

        let rows = mcp_rows(&paths, Some(&project), EnabledFilter::All).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].target, "npx -y search");
        assert_eq!(rows[1].scope, Scope::Project);
        assert_eq!(rows[1].target, "https://docs.example.com/mcp");
    }
}
