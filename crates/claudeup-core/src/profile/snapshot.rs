//! Profile snapshot creation from live state

use super::types::{McpServer, Profile, SecretRef};
use crate::error::ProfileResult;
use crate::paths::ClaudeupPaths;
use crate::registry::{Category, EnabledRegistry};
use claudeup_host::{KnownMarketplaces, McpDocument, Scope, SettingsDocument};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Build a profile from what is currently configured at `scope`.
///
/// Captures registered marketplaces, plugins enabled in the scope's
/// settings, the scope's MCP servers and enabled local extensions. Literal
/// environment values are never captured; `${NAME}` placeholders become
/// declared secrets.
pub fn snapshot(
    name: &str,
    scope: Scope,
    project: Option<&Path>,
    paths: &ClaudeupPaths,
) -> ProfileResult<Profile> {
    let host = paths.host();
    let mut profile = Profile::new(name);

    let known = KnownMarketplaces::load(&host.known_marketplaces_path())?;
    for entry in known.entries.values() {
        if !profile.marketplaces.contains(&entry.source) {
            profile.marketplaces.push(entry.source.clone());
        }
    }

    let settings = SettingsDocument::load(&host.settings_path(scope, project)?)?;
    let plugins = settings
        .enabled_plugins()
        .into_iter()
        .filter_map(|(id, enabled)| enabled.then_some(id));

    let mcp = McpDocument::load(&host.mcp_location(scope, project)?)?;
    let servers: Vec<McpServer> = mcp
        .servers()
        .into_iter()
        .filter_map(|(name, definition)| server_from_definition(&name, &definition))
        .collect();

    let declared = profile.scope_mut(scope);
    declared.plugins.extend(plugins);
    declared.mcp_servers = servers;
    if declared.is_empty() {
        profile.scopes.remove(&scope);
    }

    let registry = EnabledRegistry::load(&paths.enabled_file())?;
    for category in Category::EXTENSIONS {
        let items = registry.enabled_items(category);
        if !items.is_empty() {
            profile.extensions.insert(category, items.into_iter().collect());
        }
    }

    debug!(profile = name, %scope, "snapshot taken");
    Ok(profile)
}

/// Convert a live `{command, args, env}` entry; entries without a command
/// (remote servers) are skipped
fn server_from_definition(name: &str, definition: &Value) -> Option<McpServer> {
    let command = definition.get("command")?.as_str()?;
    let mut server = McpServer::new(name, command);
    server.args = definition
        .get("args")
        .and_then(Value::as_array)
        .map(|args| {
            args.iter()
                .filter_map(|a| a.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    if let Some(env) = definition.get("env").and_then(Value::as_object) {
        for (key, value) in env {
            if value.as_str().and_then(placeholder_name) == Some(key.as_str()) {
                server.secrets.insert(key.clone(), SecretRef::default());
            }
        }
    }
    Some(server)
}

/// `NAME` from a `${NAME}` placeholder
fn placeholder_name(value: &str) -> Option<&str> {
    value.strip_prefix("${")?.strip_suffix('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_from_definition_keeps_placeholders_only() {
        let def = json!({
            "command": "npx",
            "args": ["-y", "server"],
            "env": {"API_TOKEN": "${API_TOKEN}", "REGION": "eu-west-1"}
        });
        let server = server_from_definition("api", &def).unwrap();
        assert_eq!(server.args, vec!["-y", "server"]);
        assert_eq!(server.secrets.len(), 1);
        assert!(server.secrets.contains_key("API_TOKEN"));
    }

    #[test]
    fn test_remote_servers_are_skipped() {
        let def = json!({"type": "http", "url": "https://example.com/mcp"});
        assert!(server_from_definition("remote", &def).is_none());
    }
}
