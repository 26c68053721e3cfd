//! Built-in profiles, bundled into the binary

use super::document::ProfileDocument;
use super::types::Profile;
use crate::error::{ProfileError, ProfileResult};

/// `(name, JSON document)` of every built-in profile
pub const BUILTIN_PROFILES: &[(&str, &str)] = &[
    ("default", include_str!("../../profiles/default.json")),
    ("frontend", include_str!("../../profiles/frontend.json")),
    ("backend", include_str!("../../profiles/backend.json")),
    ("languages/go", include_str!("../../profiles/languages/go.json")),
    ("languages/rust", include_str!("../../profiles/languages/rust.json")),
];

/// Parse the bundled profiles
pub fn load_builtins() -> ProfileResult<Vec<Profile>> {
    BUILTIN_PROFILES
        .iter()
        .map(|(name, text)| {
            ProfileDocument::parse(text)
                .map_err(|e| ProfileError::InvalidProfile {
                    name: (*name).to_string(),
                    reason: e.to_string(),
                })?
                .into_profile(name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use claudeup_host::Scope;

    #[test]
    fn test_every_builtin_parses() {
        let builtins = load_builtins().unwrap();
        assert_eq!(builtins.len(), BUILTIN_PROFILES.len());
        assert!(builtins.iter().all(|p| !p.description.is_empty()));
    }

    #[test]
    fn test_default_is_empty() {
        let builtins = load_builtins().unwrap();
        let default = builtins.iter().find(|p| p.name == "default").unwrap();
        assert!(default.is_empty());
    }

    #[test]
    fn test_backend_server_is_project_only() {
        let builtins = load_builtins().unwrap();
        let backend = builtins.iter().find(|p| p.name == "backend").unwrap();
        assert!(backend.scope(Scope::User).unwrap().mcp_servers.is_empty());
        let reqs = backend.secret_requirements(Scope::Project);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].env, "DATABASE_URL");
        assert_eq!(reqs[0].sources.len(), 2);
    }
}
