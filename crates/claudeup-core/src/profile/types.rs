//! Canonical in-memory profile model
//!
//! Whatever shape a profile file uses, it is normalized into this per-scope
//! form right after parsing.

use crate::registry::Category;
use claudeup_host::{MarketplaceSource, Scope};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Where a secret value can be obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSource {
    /// Source kind, e.g. `env` or `1password`
    #[serde(rename = "type")]
    pub kind: String,
    /// Lookup key within that source
    pub key: String,
}

/// A secret an MCP server needs in its environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    #[serde(default)]
    pub description: String,
    /// Candidate sources, tried in order
    #[serde(default)]
    pub sources: Vec<SecretSource>,
}

/// An MCP server declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServer {
    pub name: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Restricts a flat declaration to one scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    /// Environment variable name -> requirement. Keyed map so iteration is sorted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secrets: BTreeMap<String, SecretRef>,
}

impl McpServer {
    #[must_use]
    pub fn new(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            args: Vec::new(),
            scope: None,
            secrets: BTreeMap::new(),
        }
    }
}

/// Plugins and MCP servers declared for one scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSettings {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub plugins: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp_servers: Vec<McpServer>,
}

impl ScopeSettings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty() && self.mcp_servers.is_empty()
    }

    /// Insert a server, replacing any earlier declaration of the same name
    pub fn upsert_server(&mut self, server: McpServer) {
        match self.mcp_servers.iter_mut().find(|s| s.name == server.name) {
            Some(existing) => *existing = server,
            None => self.mcp_servers.push(server),
        }
    }
}

/// A named configuration bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub description: String,
    pub marketplaces: Vec<MarketplaceSource>,
    pub scopes: BTreeMap<Scope, ScopeSettings>,
    pub extensions: BTreeMap<Category, BTreeSet<String>>,
}

/// A secret some declared MCP server needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretRequirement {
    pub server: String,
    pub env: String,
    pub description: String,
    pub sources: Vec<SecretSource>,
}

impl Profile {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Declarations for a scope
    #[must_use]
    pub fn scope(&self, scope: Scope) -> Option<&ScopeSettings> {
        self.scopes.get(&scope)
    }

    /// Mutable declarations for a scope, created on first use
    pub fn scope_mut(&mut self, scope: Scope) -> &mut ScopeSettings {
        self.scopes.entry(scope).or_default()
    }

    /// Whether the profile declares nothing at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marketplaces.is_empty()
            && self.scopes.values().all(ScopeSettings::is_empty)
            && self.extensions.values().all(BTreeSet::is_empty)
    }

    /// Secrets needed by the servers declared for `scope`, sorted by server
    /// then variable name
    #[must_use]
    pub fn secret_requirements(&self, scope: Scope) -> Vec<SecretRequirement> {
        let Some(settings) = self.scope(scope) else {
            return Vec::new();
        };
        let mut servers: Vec<&McpServer> = settings.mcp_servers.iter().collect();
        servers.sort_by(|a, b| a.name.cmp(&b.name));
        servers
            .into_iter()
            .flat_map(|server| {
                server.secrets.iter().map(|(env, secret)| SecretRequirement {
                    server: server.name.clone(),
                    env: env.clone(),
                    description: secret.description.clone(),
                    sources: secret.sources.clone(),
                })
            })
            .collect()
    }
}
