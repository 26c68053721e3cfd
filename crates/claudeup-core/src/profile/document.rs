//! On-disk profile documents
//!
//! Two shapes exist: the legacy flat one (`plugins`/`mcpServers` at the top
//! level) and the per-scope one (`perScope`). Both parse into
//! [`ProfileDocument`]; [`ProfileDocument::into_profile`] normalizes to the
//! canonical [`Profile`]. Saving always writes the per-scope shape.

use super::types::{McpServer, Profile, ScopeSettings};
use crate::error::{ProfileError, ProfileResult};
use crate::registry::Category;
use claudeup_host::{MarketplaceSource, Scope};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A profile file as written on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marketplaces: Vec<MarketplaceSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_scope: Option<BTreeMap<Scope, ScopeSettings>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, Vec<String>>,
}

impl ProfileDocument {
    /// Parse a document from JSON text
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn has_flat_fields(&self) -> bool {
        self.plugins.as_ref().is_some_and(|p| !p.is_empty())
            || self.mcp_servers.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Normalize into the canonical per-scope profile named `name`.
    ///
    /// The document's own `name` field is informational; the file location
    /// decides the identity.
    pub fn into_profile(self, name: &str) -> ProfileResult<Profile> {
        if self.has_flat_fields() && self.per_scope.is_some() {
            return Err(ProfileError::MixedSchema(name.to_string()));
        }

        let mut profile = Profile::new(name);
        profile.description = self.description;
        profile.marketplaces = dedup_marketplaces(self.marketplaces);

        if let Some(per_scope) = self.per_scope {
            profile.scopes = per_scope;
        } else {
            let plugins = self.plugins.unwrap_or_default();
            for scope in Scope::ALL {
                if !plugins.is_empty() {
                    profile.scope_mut(scope).plugins.extend(plugins.iter().cloned());
                }
            }
            for server in self.mcp_servers.unwrap_or_default() {
                match server.scope {
                    Some(scope) => profile.scope_mut(scope).upsert_server(server),
                    None => {
                        for scope in Scope::ALL {
                            profile.scope_mut(scope).upsert_server(server.clone());
                        }
                    }
                }
            }
        }

        for (key, items) in self.extensions {
            let category: Category = key.parse().map_err(|_| ProfileError::InvalidProfile {
                name: name.to_string(),
                reason: format!("unknown extension category '{key}'"),
            })?;
            if !category.is_extension() {
                return Err(ProfileError::InvalidProfile {
                    name: name.to_string(),
                    reason: format!("'{key}' is not an extension category"),
                });
            }
            profile
                .extensions
                .entry(category)
                .or_default()
                .extend(items);
        }

        Ok(profile)
    }
}

impl From<&Profile> for ProfileDocument {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            description: profile.description.clone(),
            marketplaces: profile.marketplaces.clone(),
            plugins: None,
            mcp_servers: None,
            per_scope: Some(profile.scopes.clone()),
            extensions: profile
                .extensions
                .iter()
                .map(|(category, items)| {
                    (
                        category.as_str().to_string(),
                        items.iter().cloned().collect(),
                    )
                })
                .collect(),
        }
    }
}

fn dedup_marketplaces(sources: Vec<MarketplaceSource>) -> Vec<MarketplaceSource> {
    let mut seen = BTreeSet::new();
    sources
        .into_iter()
        .filter(|source| seen.insert(source.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ProfileResult<Profile> {
        ProfileDocument::parse(text).unwrap().into_profile("test")
    }

    #[test]
    fn test_flat_plugins_apply_to_every_scope() {
        let profile = parse(r#"{"plugins": ["lint@tools"]}"#).unwrap();
        for scope in Scope::ALL {
            assert!(profile.scope(scope).unwrap().plugins.contains("lint@tools"));
        }
    }

    #[test]
    fn test_flat_server_scope_tag_is_honoured() {
        let profile = parse(
            r#"{"mcpServers": [
                {"name": "db", "command": "pg", "scope": "project"},
                {"name": "search", "command": "s"}
            ]}"#,
        )
        .unwrap();

        let project = profile.scope(Scope::Project).unwrap();
        assert_eq!(project.mcp_servers.len(), 2);
        let user = profile.scope(Scope::User).unwrap();
        assert_eq!(user.mcp_servers.len(), 1);
        assert_eq!(user.mcp_servers[0].name, "search");
    }

    #[test]
    fn test_mixed_schema_is_rejected() {
        let err = parse(r#"{"plugins": ["a@m"], "perScope": {"user": {"plugins": ["b@m"]}}}"#)
            .unwrap_err();
        assert!(matches!(err, ProfileError::MixedSchema(ref n) if n == "test"));
    }

    #[test]
    fn test_empty_flat_fields_do_not_count_as_mixing() {
        let profile =
            parse(r#"{"plugins": [], "perScope": {"user": {"plugins": ["b@m"]}}}"#).unwrap();
        assert!(profile.scope(Scope::User).unwrap().plugins.contains("b@m"));
        assert!(profile.scope(Scope::Project).is_none());
    }

    #[test]
    fn test_extension_categories_are_validated() {
        let err = parse(r#"{"extensions": {"plugins": ["x"]}}"#).unwrap_err();
        assert_eq!(err.code(), "INVALID_PROFILE");
        let err = parse(r#"{"extensions": {"widgets": ["x"]}}"#).unwrap_err();
        assert!(err.to_string().contains("widgets"));

        let profile = parse(r#"{"extensions": {"rules": ["style", "style"]}}"#).unwrap();
        assert_eq!(profile.extensions[&Category::Rules].len(), 1);
    }

    #[test]
    fn test_save_shape_is_per_scope() {
        let profile = parse(r#"{"description": "d", "plugins": ["a@m"]}"#).unwrap();
        let doc = ProfileDocument::from(&profile);
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("plugins").is_none());
        assert_eq!(json["perScope"]["local"]["plugins"][0], "a@m");
        assert_eq!(json["name"], "test");
    }

    #[test]
    fn test_duplicate_marketplaces_collapse() {
        let profile = parse(
            r#"{"marketplaces": [
                {"source": "github", "repo": "acme/tools"},
                {"source": "github", "repo": "acme/tools"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(profile.marketplaces.len(), 1);
    }
}
