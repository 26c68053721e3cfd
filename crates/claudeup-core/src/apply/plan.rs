//! Diff of declared against live state
//!
//! Planning patches the in-memory documents it loaded, so the same pass
//! yields both the action list and the documents to write.

use super::Action;
use crate::error::{ProfileError, ProfileResult};
use crate::extensions::LocalExtensions;
use crate::paths::ClaudeupPaths;
use crate::profile::{McpServer, Profile, ScopeSettings};
use crate::registry::{Category, EnabledRegistry};
use claudeup_host::{
    InstalledPlugins, KnownMarketplaces, McpDocument, Scope, SettingsDocument,
};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Live state for one scope, loaded fresh
#[derive(Debug, Clone)]
pub(crate) struct LiveState {
    pub settings: SettingsDocument,
    pub mcp: McpDocument,
    pub installed: InstalledPlugins,
    pub known: KnownMarketplaces,
    pub registry: EnabledRegistry,
    pub registry_baseline: EnabledRegistry,
    pub extensions: LocalExtensions,
}

impl LiveState {
    pub fn load(paths: &ClaudeupPaths, scope: Scope, project: Option<&Path>) -> ProfileResult<Self> {
        let host = paths.host();
        let registry = EnabledRegistry::load(&paths.enabled_file())?;
        Ok(Self {
            settings: SettingsDocument::load(&host.settings_path(scope, project)?)?,
            mcp: McpDocument::load(&host.mcp_location(scope, project)?)?,
            installed: InstalledPlugins::load(&host.installed_plugins_path())?,
            known: KnownMarketplaces::load(&host.known_marketplaces_path())?,
            registry_baseline: registry.clone(),
            registry,
            extensions: LocalExtensions::new(paths),
        })
    }
}

/// Actions plus non-fatal findings
#[derive(Debug, Clone, Default)]
pub(crate) struct Plan {
    pub actions: Vec<Action>,
    pub warnings: Vec<String>,
}

/// Compute the actions that bring `live` to `profile` at `scope`, patching
/// `live` in memory as it goes
pub(crate) fn build_plan(
    profile: &Profile,
    scope: Scope,
    project: Option<&Path>,
    live: &mut LiveState,
    replace: bool,
) -> ProfileResult<Plan> {
    let mut plan = Plan::default();
    let empty = ScopeSettings::default();
    let declared = profile.scope(scope).unwrap_or(&empty);

    plan_marketplaces(profile, live, &mut plan);
    plan_plugins(declared, scope, project, live, replace, &mut plan)?;
    plan_mcp_servers(declared, scope, live, replace, &mut plan)?;
    plan_extensions(profile, live, replace, &mut plan)?;

    debug!(
        profile = %profile.name,
        %scope,
        actions = plan.actions.len(),
        warnings = plan.warnings.len(),
        "planned apply"
    );
    Ok(plan)
}

fn plan_marketplaces(profile: &Profile, live: &LiveState, plan: &mut Plan) {
    for source in &profile.marketplaces {
        if !live.known.contains_source(source) {
            plan.actions.push(Action::AddMarketplace {
                source: source.clone(),
            });
        }
    }
}

fn plan_plugins(
    declared: &ScopeSettings,
    scope: Scope,
    project: Option<&Path>,
    live: &mut LiveState,
    replace: bool,
    plan: &mut Plan,
) -> ProfileResult<()> {
    for plugin in &declared.plugins {
        if !live.installed.is_installed_for(plugin, scope, project) {
            plan.actions.push(Action::InstallPlugin {
                plugin: plugin.clone(),
                scope,
            });
        }
        let in_settings = live.settings.set_plugin_enabled(plugin, true)?;
        let in_registry = live.registry.state(Category::Plugins, plugin) == Some(false)
            && live.registry.set_enabled(Category::Plugins, plugin, true);
        if in_settings || in_registry {
            plan.actions.push(Action::EnablePlugin {
                plugin: plugin.clone(),
                scope,
            });
        }
    }

    if replace {
        for (plugin, enabled) in live.settings.enabled_plugins() {
            if !enabled || declared.plugins.contains(&plugin) {
                continue;
            }
            live.settings.set_plugin_enabled(&plugin, false)?;
            live.registry.set_enabled(Category::Plugins, &plugin, false);
            plan.actions.push(Action::DisablePlugin { plugin, scope });
        }
    }
    Ok(())
}

fn plan_mcp_servers(
    declared: &ScopeSettings,
    scope: Scope,
    live: &mut LiveState,
    replace: bool,
    plan: &mut Plan,
) -> ProfileResult<()> {
    for server in &declared.mcp_servers {
        let definition = merge_definition(live.mcp.server(&server.name), server);
        let in_table = live.mcp.upsert(&server.name, definition)?;
        let in_registry = live.registry.state(Category::McpServers, &server.name) == Some(false)
            && live.registry.set_enabled(Category::McpServers, &server.name, true);
        if in_table || in_registry {
            plan.actions.push(Action::WriteMcpServer {
                name: server.name.clone(),
                scope,
            });
        }
    }

    if replace {
        let names: BTreeSet<&str> = declared.mcp_servers.iter().map(|s| s.name.as_str()).collect();
        for name in live.mcp.servers().into_keys() {
            if names.contains(name.as_str()) {
                continue;
            }
            let removed = live.mcp.remove(&name)?;
            let in_registry = live.registry.state(Category::McpServers, &name) == Some(true)
                && live.registry.set_enabled(Category::McpServers, &name, false);
            if removed || in_registry {
                plan.actions.push(Action::RemoveMcpServer { name, scope });
            }
        }
    }
    Ok(())
}

/// Live definition with the declared command and args laid over it.
///
/// Keys claudeup does not manage are kept. Each declared secret gets a
/// `${NAME}` env placeholder unless the env already sets that variable.
pub(crate) fn merge_definition(existing: Option<&Value>, server: &McpServer) -> Value {
    let mut definition = existing
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    definition.insert("command".to_string(), Value::String(server.command.clone()));
    if server.args.is_empty() {
        definition.remove("args");
    } else {
        definition.insert(
            "args".to_string(),
            Value::Array(server.args.iter().cloned().map(Value::String).collect()),
        );
    }

    let mut env = match definition.remove("env") {
        Some(Value::Object(env)) => env,
        _ => Map::new(),
    };
    for name in server.secrets.keys() {
        env.entry(name.clone())
            .or_insert_with(|| Value::String(format!("${{{name}}}")));
    }
    if !env.is_empty() {
        definition.insert("env".to_string(), Value::Object(env));
    }

    Value::Object(definition)
}

fn plan_extensions(
    profile: &Profile,
    live: &mut LiveState,
    replace: bool,
    plan: &mut Plan,
) -> ProfileResult<()> {
    for (&category, items) in &profile.extensions {
        for item in items {
            let local = match live.extensions.find(category, item) {
                Ok(local) => local,
                Err(ProfileError::ItemNotFound { .. }) => {
                    plan.warnings.push(format!(
                        "{category} '{item}' is not in local storage; skipped"
                    ));
                    continue;
                }
                Err(e) => return Err(e),
            };
            let recorded = live.registry.set_enabled(category, item, true);
            if recorded || !live.extensions.is_linked(&local) {
                plan.actions.push(Action::EnableExtension {
                    category,
                    item: item.clone(),
                });
            }
        }
    }

    if replace {
        for category in Category::EXTENSIONS {
            let declared = profile.extensions.get(&category);
            for item in live.registry.enabled_items(category) {
                if declared.is_some_and(|items| items.contains(&item)) {
                    continue;
                }
                live.registry.set_enabled(category, &item, false);
                plan.actions.push(Action::DisableExtension { category, item });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SecretRef;
    use serde_json::json;

    fn server_with_secret() -> McpServer {
        let mut server = McpServer::new("db", "pg-mcp");
        server.args = vec!["--readonly".to_string()];
        server
            .secrets
            .insert("DB_URL".to_string(), SecretRef::default());
        server
    }

    #[test]
    fn test_merge_fresh_definition() {
        let merged = merge_definition(None, &server_with_secret());
        assert_eq!(
            merged,
            json!({"command": "pg-mcp", "args": ["--readonly"], "env": {"DB_URL": "${DB_URL}"}})
        );
    }

    #[test]
    fn test_merge_keeps_user_env_and_unknown_keys() {
        let existing = json!({
            "type": "stdio",
            "command": "old",
            "args": ["x"],
            "env": {"DB_URL": "postgres://localhost/dev", "LOG": "1"}
        });
        let merged = merge_definition(Some(&existing), &server_with_secret());
        assert_eq!(merged["type"], "stdio");
        assert_eq!(merged["command"], "pg-mcp");
        assert_eq!(merged["env"]["DB_URL"], "postgres://localhost/dev");
        assert_eq!(merged["env"]["LOG"], "1");
    }

    #[test]
    fn test_merge_is_stable() {
        let first = merge_definition(None, &server_with_secret());
        let second = merge_definition(Some(&first), &server_with_secret());
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_drops_empty_args() {
        let existing = json!({"command": "c", "args": ["old"]});
        let merged = merge_definition(Some(&existing), &McpServer::new("s", "c"));
        assert_eq!(merged, json!({"command": "c"}));
    }
}
